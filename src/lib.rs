//! Peakform renders audio streams as bi-level waveform images.
//!
//! The pipeline has four stages:
//!
//! - Describe the stream with a [`FormatDescriptor`] (`fmt=pcm, width=16, channels=2`)
//! - Validate caller settings against a [`Schema`] such as [`WAVEFORM_SCHEMA`]
//! - Decimate a [`FrameSource`] into one [`PeakPair`] per output column
//! - Rasterize the peaks and encode a greyscale PNG
//!
//! [`render_waveform_bytes`] runs all four; [`AudioRequest`] wraps them behind the JSON
//! request envelope.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod format;
pub(crate) mod request;
pub(crate) mod settings;
pub(crate) mod source;
pub(crate) mod waveform;

pub use crate::foundation::core::{Bilevel, FrameSpan, PeakPair, column_span};
pub use crate::foundation::error::{PeakformError, PeakformResult};

pub use crate::format::descriptor::{
    AudioFormat, DescriptorSource, DescriptorValue, FormatDescriptor, FormatDescriptorBuilder,
    RESERVED_KEYS, VALID_CHANNELS, VALID_WIDTHS,
};
pub use crate::request::{AudioRequest, Endpoint};
pub use crate::settings::presets::{
    ColourScheme, DEFAULT_WAVEFORM_HEIGHT, DEFAULT_WAVEFORM_WIDTH, FIELD_BIT_RATE, FIELD_CHANNEL,
    FIELD_COLOUR, FIELD_HEIGHT, FIELD_WIDTH, MP3_SCHEMA, OGG_SCHEMA, WAVEFORM_SCHEMA,
    WaveformOptions, translate_colour,
};
pub use crate::settings::schema::{Allowed, FieldKind, FieldRule, Schema, SettingValue, Settings};
pub use crate::source::g711::{alaw_to_linear, mulaw_to_linear};
pub use crate::source::memory::MemorySource;
pub use crate::source::pcm::{PcmSource, SampleEncoding};
pub use crate::source::wav::WavSource;
pub use crate::source::window::Windowed;
pub use crate::source::{FrameSource, open_frame_source};
pub use crate::waveform::decimate::{
    ChannelSelect, DecimateOpts, Decimation, DegradedBlock, decimate,
};
pub use crate::waveform::pipeline::{
    PNG_CONTENT_TYPE, RenderStats, RenderedWaveform, WaveformPng, render_waveform,
    render_waveform_bytes,
};
pub use crate::waveform::raster::{
    MAX_RASTER_DIMENSION, WaveformImage, amplitude_to_y, check_raster_size, rasterize,
};
