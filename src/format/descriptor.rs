use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{PeakformError, PeakformResult};

pub const KEY_FORMAT: &str = "fmt";
pub const KEY_RATE: &str = "rate";
pub const KEY_WIDTH: &str = "width";
pub const KEY_CHANNELS: &str = "channels";
pub const KEY_START: &str = "start";
pub const KEY_END: &str = "end";

/// Reserved keys in canonical serialization order.
pub const RESERVED_KEYS: [&str; 6] = [
    KEY_FORMAT,
    KEY_RATE,
    KEY_WIDTH,
    KEY_CHANNELS,
    KEY_START,
    KEY_END,
];

pub const VALID_WIDTHS: [u16; 3] = [8, 16, 24];
pub const VALID_CHANNELS: [u16; 2] = [1, 2];

/// Audio stream encoding named by the `fmt` key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    /// RIFF/WAVE container.
    #[default]
    Wav,
    /// Headerless linear PCM.
    Pcm,
    /// Headerless G.711 A-law.
    Alaw,
    /// Headerless G.711 µ-law.
    Mulaw,
}

impl AudioFormat {
    pub const ALL: [Self; 4] = [Self::Wav, Self::Pcm, Self::Alaw, Self::Mulaw];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Pcm => "pcm",
            Self::Alaw => "alaw",
            Self::Mulaw => "mulaw",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioFormat {
    type Err = PeakformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                PeakformError::malformed_header(format!(
                    "invalid format: {s:?}, expected one of: wav, pcm, alaw, mulaw"
                ))
            })
    }
}

/// A single structured descriptor value before coercion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DescriptorValue {
    Int(i64),
    Text(String),
}

impl DescriptorValue {
    fn into_text(self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::Text(s) => s,
        }
    }
}

impl From<i64> for DescriptorValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for DescriptorValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u16> for DescriptorValue {
    fn from(v: u16) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for DescriptorValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for DescriptorValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<AudioFormat> for DescriptorValue {
    fn from(v: AudioFormat) -> Self {
        Self::Text(v.as_str().to_string())
    }
}

impl TryFrom<serde_json::Value> for DescriptorValue {
    type Error = PeakformError;

    fn try_from(v: serde_json::Value) -> Result<Self, Self::Error> {
        match v {
            serde_json::Value::String(s) => Ok(Self::Text(s)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if let Some(f) = n.as_f64()
                    && f.fract() == 0.0
                    && f.abs() < 9.0e15
                {
                    Ok(Self::Int(f as i64))
                } else {
                    Ok(Self::Text(n.to_string()))
                }
            }
            other => Err(PeakformError::malformed_header(format!(
                "descriptor values must be strings or integers, got {other}"
            ))),
        }
    }
}

/// One construction source for a [`FormatDescriptor`].
#[derive(Clone, Debug)]
pub enum DescriptorSource {
    /// Comma-separated `key=value` text.
    Text(String),
    /// Structured key/value mapping.
    Fields(Vec<(String, DescriptorValue)>),
    /// An already validated descriptor.
    Descriptor(FormatDescriptor),
}

/// Validated description of an audio stream's encoding and optional frame window.
///
/// Fields are private: every value of this type has passed validation, and every mutation path
/// returns a freshly validated descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatDescriptor {
    format: AudioFormat,
    width_bits: Option<u16>,
    channels: Option<u16>,
    rate_hz: Option<u32>,
    start: Option<u64>,
    end: Option<u64>,
    extra: BTreeMap<String, String>,
}

impl FormatDescriptor {
    /// Parse a `key=value[,key=value...]` descriptor string.
    pub fn parse(s: &str) -> PeakformResult<Self> {
        Self::from_raw(split_pairs(s)?)
    }

    /// Build from a structured key/value mapping.
    pub fn from_fields<I, K, V>(fields: I) -> PeakformResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DescriptorValue>,
    {
        let mut raw = BTreeMap::new();
        for (k, v) in fields {
            insert_unique(&mut raw, k.into(), v.into().into_text())?;
        }
        Self::from_raw(raw)
    }

    pub fn builder() -> FormatDescriptorBuilder {
        FormatDescriptorBuilder::default()
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Declared bits per sample (`width` key).
    pub fn sample_width_bits(&self) -> Option<u16> {
        self.width_bits
    }

    pub fn channels(&self) -> Option<u16> {
        self.channels
    }

    pub fn sample_rate_hz(&self) -> Option<u32> {
        self.rate_hz
    }

    pub fn start(&self) -> Option<u64> {
        self.start
    }

    pub fn end(&self) -> Option<u64> {
        self.end
    }

    /// Unreserved key retained verbatim from the source.
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }

    pub fn extras(&self) -> impl Iterator<Item = (&str, &str)> {
        self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_wav(&self) -> bool {
        self.format == AudioFormat::Wav
    }

    pub fn has_window(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Replace the frame window, re-validating the result.
    pub fn with_window(&self, start: Option<u64>, end: Option<u64>) -> PeakformResult<Self> {
        let mut next = self.clone();
        next.start = start;
        next.end = end;
        next.validate()?;
        Ok(next)
    }

    /// Copy without `start`/`end`.
    pub fn without_window(&self) -> Self {
        Self {
            start: None,
            end: None,
            ..self.clone()
        }
    }

    /// Set (or replace) one key, re-validating the result.
    pub fn with_field(
        &self,
        key: impl Into<String>,
        value: impl Into<DescriptorValue>,
    ) -> PeakformResult<Self> {
        let (key, value) = normalize_pair(key.into(), value.into().into_text())?;
        let mut raw = self.to_raw();
        raw.insert(key, value);
        Self::from_raw(raw)
    }

    fn to_raw(&self) -> BTreeMap<String, String> {
        self.pairs().collect()
    }

    /// Key/value pairs in canonical order.
    fn pairs(&self) -> impl Iterator<Item = (String, String)> + '_ {
        let reserved = [
            (KEY_FORMAT, Some(self.format.as_str().to_string())),
            (KEY_RATE, self.rate_hz.map(|v| v.to_string())),
            (KEY_WIDTH, self.width_bits.map(|v| v.to_string())),
            (KEY_CHANNELS, self.channels.map(|v| v.to_string())),
            (KEY_START, self.start.map(|v| v.to_string())),
            (KEY_END, self.end.map(|v| v.to_string())),
        ];
        reserved
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
            .chain(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())))
    }

    fn from_raw(mut raw: BTreeMap<String, String>) -> PeakformResult<Self> {
        let format = match raw.remove(KEY_FORMAT) {
            Some(v) => v.parse::<AudioFormat>()?,
            None => AudioFormat::Wav,
        };
        let out = Self {
            format,
            width_bits: take_int(&mut raw, KEY_WIDTH)?
                .map(|v| narrow::<u16>(KEY_WIDTH, v))
                .transpose()?,
            channels: take_int(&mut raw, KEY_CHANNELS)?
                .map(|v| narrow::<u16>(KEY_CHANNELS, v))
                .transpose()?,
            rate_hz: take_int(&mut raw, KEY_RATE)?
                .map(|v| narrow::<u32>(KEY_RATE, v))
                .transpose()?,
            start: take_int(&mut raw, KEY_START)?
                .map(|v| narrow::<u64>(KEY_START, v))
                .transpose()?,
            end: take_int(&mut raw, KEY_END)?
                .map(|v| narrow::<u64>(KEY_END, v))
                .transpose()?,
            extra: raw,
        };
        out.validate()?;
        Ok(out)
    }

    fn validate(&self) -> PeakformResult<()> {
        if let Some(w) = self.width_bits
            && !VALID_WIDTHS.contains(&w)
        {
            return Err(PeakformError::malformed_header(format!(
                "invalid width: {w}, expected one of: 8, 16, 24"
            )));
        }
        if let Some(c) = self.channels
            && !VALID_CHANNELS.contains(&c)
        {
            return Err(PeakformError::malformed_header(format!(
                "invalid channels: {c}, expected one of: 1, 2"
            )));
        }
        if let Some(r) = self.rate_hz
            && r < 1
        {
            return Err(PeakformError::malformed_header(format!(
                "invalid rate: {r}, expected integer >= 1"
            )));
        }
        if let Some(e) = self.end
            && e == 0
        {
            return Err(PeakformError::malformed_header(
                "invalid end: 0, expected > 0",
            ));
        }
        if let (Some(s), Some(e)) = (self.start, self.end)
            && s >= e
        {
            return Err(PeakformError::malformed_header(format!(
                "invalid start/end range - start:{s}, end:{e}"
            )));
        }
        for key in self.extra.keys() {
            if key.is_empty() || key.contains([',', '=']) {
                return Err(PeakformError::malformed_header(format!(
                    "invalid descriptor key: {key:?}"
                )));
            }
        }
        for (key, value) in &self.extra {
            if value.contains(',') {
                return Err(PeakformError::malformed_header(format!(
                    "value for {key:?} must not contain ','"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.pairs().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

impl FromStr for FormatDescriptor {
    type Err = PeakformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for FormatDescriptor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for FormatDescriptor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Fields(BTreeMap<String, serde_json::Value>),
        }

        let parsed = match Repr::deserialize(deserializer)? {
            Repr::Text(s) => Self::parse(&s),
            Repr::Fields(map) => map
                .into_iter()
                .map(|(k, v)| DescriptorValue::try_from(v).map(|v| (k, v)))
                .collect::<PeakformResult<Vec<_>>>()
                .and_then(Self::from_fields),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

/// Assembles a descriptor from exactly one source: either a [`DescriptorSource`] or explicit
/// fields.
#[derive(Clone, Debug, Default)]
pub struct FormatDescriptorBuilder {
    sources: Vec<DescriptorSource>,
    fields: Vec<(String, DescriptorValue)>,
}

impl FormatDescriptorBuilder {
    pub fn source(mut self, source: DescriptorSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn format(self, format: AudioFormat) -> Self {
        self.field(KEY_FORMAT, format)
    }

    pub fn rate(self, hz: u32) -> Self {
        self.field(KEY_RATE, hz)
    }

    pub fn width(self, bits: u16) -> Self {
        self.field(KEY_WIDTH, bits)
    }

    pub fn channels(self, channels: u16) -> Self {
        self.field(KEY_CHANNELS, channels)
    }

    pub fn start(self, frame: u64) -> Self {
        self.field(KEY_START, DescriptorValue::Text(frame.to_string()))
    }

    pub fn end(self, frame: u64) -> Self {
        self.field(KEY_END, DescriptorValue::Text(frame.to_string()))
    }

    /// Explicit field, reserved or not.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<DescriptorValue>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> PeakformResult<FormatDescriptor> {
        if self.sources.len() > 1 {
            return Err(PeakformError::config_conflict(
                "provide a single descriptor source, not several",
            ));
        }
        match self.sources.into_iter().next() {
            Some(_) if !self.fields.is_empty() => Err(PeakformError::config_conflict(
                "provide either a descriptor source or fields to build one; not both",
            )),
            Some(DescriptorSource::Text(s)) => FormatDescriptor::parse(&s),
            Some(DescriptorSource::Fields(fields)) => FormatDescriptor::from_fields(fields),
            Some(DescriptorSource::Descriptor(d)) => Ok(d),
            None => FormatDescriptor::from_fields(self.fields),
        }
    }
}

fn split_pairs(s: &str) -> PeakformResult<BTreeMap<String, String>> {
    if s.trim().is_empty() {
        return Err(PeakformError::malformed_header("empty descriptor string"));
    }
    let mut raw = BTreeMap::new();
    for segment in s.split(',') {
        let (key, value) = segment.split_once('=').ok_or_else(|| {
            PeakformError::malformed_header(format!("expected key=value, got {segment:?}"))
        })?;
        insert_unique(&mut raw, key.to_string(), value.to_string())?;
    }
    Ok(raw)
}

fn insert_unique(
    raw: &mut BTreeMap<String, String>,
    key: String,
    value: String,
) -> PeakformResult<()> {
    let (key, value) = normalize_pair(key, value)?;
    if raw.contains_key(&key) {
        return Err(PeakformError::malformed_header(format!(
            "duplicate descriptor key: {key:?}"
        )));
    }
    raw.insert(key, value);
    Ok(())
}

fn normalize_pair(key: String, value: String) -> PeakformResult<(String, String)> {
    let key = key.trim();
    if key.is_empty() {
        return Err(PeakformError::malformed_header("empty descriptor key"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn take_int(raw: &mut BTreeMap<String, String>, key: &str) -> PeakformResult<Option<i64>> {
    let Some(value) = raw.remove(key) else {
        return Ok(None);
    };
    value.parse::<i64>().map(Some).map_err(|_| {
        PeakformError::malformed_header(format!("invalid {key}: {value:?}, expected integer"))
    })
}

fn narrow<T: TryFrom<i64>>(key: &str, v: i64) -> PeakformResult<T> {
    T::try_from(v).map_err(|_| {
        let expected = match key {
            KEY_START => ">= 0",
            KEY_END => "> 0",
            KEY_RATE => "integer >= 1",
            _ => "a listed value",
        };
        PeakformError::malformed_header(format!("invalid {key}: {v}, expected {expected}"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/format/descriptor.rs"]
mod tests;
