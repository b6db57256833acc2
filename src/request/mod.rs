//! JSON request envelope: source file path, optional format descriptor and endpoint settings.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;

use crate::format::descriptor::FormatDescriptor;
use crate::foundation::error::{PeakformError, PeakformResult};
use crate::settings::presets::{MP3_SCHEMA, OGG_SCHEMA, WAVEFORM_SCHEMA};
use crate::settings::schema::{Schema, Settings};
use crate::waveform::decimate::DecimateOpts;
use crate::waveform::pipeline::{PNG_CONTENT_TYPE, RenderedWaveform, render_waveform_bytes};

/// Output kinds a request can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Mp3,
    Ogg,
    Waveform,
}

impl Endpoint {
    pub const ALL: [Self; 3] = [Self::Mp3, Self::Ogg, Self::Waveform];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
            Self::Waveform => "waveform",
        }
    }

    pub fn schema(self) -> Schema {
        match self {
            Self::Mp3 => MP3_SCHEMA,
            Self::Ogg => OGG_SCHEMA,
            Self::Waveform => WAVEFORM_SCHEMA,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg3",
            Self::Ogg => "audio/ogg",
            Self::Waveform => PNG_CONTENT_TYPE,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = PeakformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| {
                PeakformError::validation(format!(
                    "unknown endpoint {s:?}, expected mp3, ogg or waveform"
                ))
            })
    }
}

/// Request body as exchanged over the wire.
///
/// ```json
/// {"filePath": "/data/a.raw", "headerSpec": "fmt=pcm, width=16, channels=1", "settings": {"width": 800}}
/// ```
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AudioRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_spec: Option<FormatDescriptor>,
    #[serde(default, skip_serializing_if = "Settings::is_empty")]
    pub settings: Settings,
}

impl AudioRequest {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(file_path.into()),
            ..Self::default()
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> PeakformResult<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| PeakformError::validation(format!("invalid request json: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> PeakformResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("open request file '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn to_json(&self) -> PeakformResult<String> {
        Ok(serde_json::to_string(self).context("serialize request")?)
    }

    /// Check the request is usable for `endpoint`.
    ///
    /// A file path is mandatory. Settings are validated against the endpoint schema. The header
    /// spec is not re-checked: a [`FormatDescriptor`] is valid by construction, so a malformed one
    /// fails in [`AudioRequest::from_reader`].
    pub fn validate(&self, endpoint: Endpoint, check_file_exists: bool) -> PeakformResult<()> {
        let path = self.path()?;
        if check_file_exists && !path.is_file() {
            return Err(PeakformError::validation(format!(
                "file '{}' does not exist",
                path.display()
            )));
        }
        endpoint.schema().validate(&self.settings)
    }

    pub fn descriptor(&self) -> FormatDescriptor {
        self.header_spec.clone().unwrap_or_default()
    }

    /// Read the referenced file and render its waveform.
    #[tracing::instrument(skip(self, opts), fields(file = ?self.file_path))]
    pub fn render_waveform(&self, opts: &DecimateOpts) -> PeakformResult<RenderedWaveform> {
        self.validate(Endpoint::Waveform, true)?;
        let path = self.path()?;
        let bytes = std::fs::read(path)
            .with_context(|| format!("read audio file '{}'", path.display()))?;
        render_waveform_bytes(bytes, &self.descriptor(), &self.settings, opts)
    }

    fn path(&self) -> PeakformResult<&Path> {
        match &self.file_path {
            Some(p) if !p.as_os_str().is_empty() => Ok(p),
            _ => Err(PeakformError::validation("request has no file path")),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/request/request.rs"]
mod tests;
