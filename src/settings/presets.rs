use std::fmt;
use std::str::FromStr;

use crate::foundation::core::Bilevel;
use crate::foundation::error::{PeakformError, PeakformResult};
use crate::settings::schema::{FieldRule, Schema, SettingValue, Settings};
use crate::waveform::decimate::ChannelSelect;
use crate::waveform::raster::MAX_RASTER_DIMENSION;

pub const DEFAULT_WAVEFORM_WIDTH: u32 = 1400;
pub const DEFAULT_WAVEFORM_HEIGHT: u32 = 150;
pub const DEFAULT_BACKGROUND: Bilevel = Bilevel::WHITE;
pub const DEFAULT_FOREGROUND: Bilevel = Bilevel::BLACK;

pub const FIELD_BIT_RATE: &str = "bitRate";
pub const FIELD_WIDTH: &str = "width";
pub const FIELD_HEIGHT: &str = "height";
pub const FIELD_COLOUR: &str = "colour";
pub const FIELD_CHANNEL: &str = "channel";

pub const BIT_RATES: [i64; 7] = [32, 64, 96, 128, 192, 256, 320];
pub const COLOUR_NAMES: [&str; 2] = ["black-on-white", "white-on-black"];
pub const CHANNEL_NAMES: [&str; 3] = ["left", "right", "mix"];

/// Lossy MP3 encoding: a single optional bit rate from the standard set.
pub const MP3_SCHEMA: Schema = Schema::new(
    "mp3",
    &[(FIELD_BIT_RATE, FieldRule::integer().allowed_integers(&BIT_RATES))],
);

/// Ogg encoding takes no parameters.
pub const OGG_SCHEMA: Schema = Schema::new("ogg", &[]);

/// Waveform rendering. Width and height run from 1 to [`MAX_RASTER_DIMENSION`].
pub const WAVEFORM_SCHEMA: Schema = Schema::new(
    "waveform",
    &[
        (FIELD_HEIGHT, FieldRule::integer().min(1).max(MAX_RASTER_DIMENSION as i64)),
        (FIELD_WIDTH, FieldRule::integer().min(1).max(MAX_RASTER_DIMENSION as i64)),
        (FIELD_COLOUR, FieldRule::text().allowed_texts(&COLOUR_NAMES)),
        (FIELD_CHANNEL, FieldRule::text().allowed_texts(&CHANNEL_NAMES)),
    ],
);

/// Symbolic colour selector of the waveform schema.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColourScheme {
    #[default]
    BlackOnWhite,
    WhiteOnBlack,
}

impl ColourScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BlackOnWhite => COLOUR_NAMES[0],
            Self::WhiteOnBlack => COLOUR_NAMES[1],
        }
    }

    /// `(background, foreground)` pixel values.
    pub fn pixels(self) -> (Bilevel, Bilevel) {
        match self {
            Self::BlackOnWhite => (Bilevel::WHITE, Bilevel::BLACK),
            Self::WhiteOnBlack => (Bilevel::BLACK, Bilevel::WHITE),
        }
    }
}

impl fmt::Display for ColourScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColourScheme {
    type Err = PeakformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "black-on-white" => Ok(Self::BlackOnWhite),
            "white-on-black" => Ok(Self::WhiteOnBlack),
            other => Err(PeakformError::UnknownColour(other.to_string())),
        }
    }
}

/// Expand and remove the `colour` key, returning `(background, foreground)` if it was present.
pub fn translate_colour(settings: &mut Settings) -> PeakformResult<Option<(Bilevel, Bilevel)>> {
    let Some(value) = settings.remove(FIELD_COLOUR) else {
        return Ok(None);
    };
    let scheme = match value {
        SettingValue::Text(s) => s.parse::<ColourScheme>()?,
        other => return Err(PeakformError::UnknownColour(other.to_string())),
    };
    Ok(Some(scheme.pixels()))
}

/// Validated, typed waveform rendering parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveformOptions {
    pub width: u32,
    pub height: u32,
    pub background: Bilevel,
    pub foreground: Bilevel,
    pub channel: ChannelSelect,
}

impl Default for WaveformOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WAVEFORM_WIDTH,
            height: DEFAULT_WAVEFORM_HEIGHT,
            background: DEFAULT_BACKGROUND,
            foreground: DEFAULT_FOREGROUND,
            channel: ChannelSelect::default(),
        }
    }
}

impl WaveformOptions {
    /// Validate against [`WAVEFORM_SCHEMA`], translate the colour selector and apply defaults.
    pub fn from_settings(settings: &Settings) -> PeakformResult<Self> {
        let mut settings = WAVEFORM_SCHEMA.coerce(settings)?;
        let mut out = Self::default();

        if let Some((background, foreground)) = translate_colour(&mut settings)? {
            out.background = background;
            out.foreground = foreground;
        }
        if let Some(w) = settings.integer(FIELD_WIDTH) {
            out.width = dimension(FIELD_WIDTH, w)?;
        }
        if let Some(h) = settings.integer(FIELD_HEIGHT) {
            out.height = dimension(FIELD_HEIGHT, h)?;
        }
        if let Some(c) = settings.text(FIELD_CHANNEL) {
            out.channel = c.parse()?;
        }
        Ok(out)
    }
}

fn dimension(field: &str, v: i64) -> PeakformResult<u32> {
    u32::try_from(v).map_err(|_| {
        PeakformError::validation(format!("{field} {v} does not fit a raster dimension"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/settings/presets.rs"]
mod tests;
