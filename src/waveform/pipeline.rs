use std::sync::Arc;

use crate::format::descriptor::FormatDescriptor;
use crate::foundation::error::PeakformResult;
use crate::settings::presets::WaveformOptions;
use crate::settings::schema::Settings;
use crate::source::{FrameSource, open_frame_source};
use crate::waveform::decimate::{DecimateOpts, DegradedBlock, decimate};
use crate::waveform::raster::{check_raster_size, rasterize};

pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Encoded waveform image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaveformPng {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl WaveformPng {
    pub fn content_type(&self) -> &'static str {
        PNG_CONTENT_TYPE
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub columns: u32,
    pub frames_total: u64,
    pub degraded_blocks: usize,
}

#[derive(Clone, Debug)]
pub struct RenderedWaveform {
    pub png: WaveformPng,
    pub stats: RenderStats,
    pub degraded: Vec<DegradedBlock>,
}

/// Decimate `source` and draw it as a PNG.
///
/// The channel comes from `waveform`; the one in `opts` is ignored.
#[tracing::instrument(skip(source, opts), fields(frames = source.frame_count()))]
pub fn render_waveform(
    source: &mut dyn FrameSource,
    waveform: &WaveformOptions,
    opts: &DecimateOpts,
) -> PeakformResult<RenderedWaveform> {
    let opts = DecimateOpts {
        channel: waveform.channel,
        ..opts.clone()
    };
    check_raster_size(waveform.width, waveform.height)?;
    let frames_total = source.frame_count();
    let decimation = decimate(source, waveform.width, &opts)?;
    let image = rasterize(
        waveform.width,
        waveform.height,
        waveform.background,
        waveform.foreground,
        &decimation.peaks,
    )?;
    let bytes = image.encode_png()?;

    let stats = RenderStats {
        columns: waveform.width,
        frames_total,
        degraded_blocks: decimation.degraded.len(),
    };
    if stats.degraded_blocks > 0 {
        tracing::warn!(
            degraded = stats.degraded_blocks,
            "waveform rendered with silent substitutions"
        );
    }
    tracing::debug!(png_bytes = bytes.len(), "waveform rendered");

    Ok(RenderedWaveform {
        png: WaveformPng {
            width: waveform.width,
            height: waveform.height,
            bytes,
        },
        stats,
        degraded: decimation.degraded,
    })
}

/// Validate `settings`, open `bytes` per `descriptor` and render.
///
/// Settings are checked before the stream is touched.
pub fn render_waveform_bytes(
    bytes: impl Into<Arc<[u8]>>,
    descriptor: &FormatDescriptor,
    settings: &Settings,
    opts: &DecimateOpts,
) -> PeakformResult<RenderedWaveform> {
    let waveform = WaveformOptions::from_settings(settings)?;
    let mut source = open_frame_source(bytes, descriptor)?;
    render_waveform(source.as_mut(), &waveform, opts)
}

#[cfg(test)]
#[path = "../../tests/unit/waveform/pipeline.rs"]
mod tests;
