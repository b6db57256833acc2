//! Random-access frame sources.
//!
//! The decimator only sees the [`FrameSource`] trait. Concrete sources decode WAV containers,
//! raw linear PCM and raw G.711 streams held in memory; [`open_frame_source`] picks one from a
//! [`FormatDescriptor`].

pub(crate) mod g711;
pub(crate) mod memory;
pub(crate) mod pcm;
pub(crate) mod wav;
pub(crate) mod window;

use std::sync::Arc;

use crate::format::descriptor::{AudioFormat, FormatDescriptor};
use crate::foundation::error::{PeakformError, PeakformResult};

use self::pcm::{PcmSource, SampleEncoding};
use self::wav::WavSource;
use self::window::Windowed;

/// Random-access reader over interleaved fixed-point audio frames.
pub trait FrameSource: Send {
    /// Total frames in the stream.
    fn frame_count(&self) -> u64;

    fn channels(&self) -> u16;

    /// Significant bits per decoded sample. Samples lie in `[-2^(bits-1), 2^(bits-1))`.
    fn sample_width_bits(&self) -> u16;

    /// Position the reader at `frame`. Seeking to `frame_count()` is allowed.
    fn seek(&mut self, frame: u64) -> PeakformResult<()>;

    /// Read up to `frames` frames from the current position as interleaved samples.
    ///
    /// Returns fewer frames only at the end of the stream.
    fn read_frames(&mut self, frames: usize) -> PeakformResult<Vec<i32>>;

    /// Independent reader over the same data, positioned at frame 0.
    ///
    /// Sources that cannot be duplicated return `None`, which disables column-parallel
    /// decimation.
    fn fork(&self) -> Option<Box<dyn FrameSource>> {
        None
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn frame_count(&self) -> u64 {
        (**self).frame_count()
    }

    fn channels(&self) -> u16 {
        (**self).channels()
    }

    fn sample_width_bits(&self) -> u16 {
        (**self).sample_width_bits()
    }

    fn seek(&mut self, frame: u64) -> PeakformResult<()> {
        (**self).seek(frame)
    }

    fn read_frames(&mut self, frames: usize) -> PeakformResult<Vec<i32>> {
        (**self).read_frames(frames)
    }

    fn fork(&self) -> Option<Box<dyn FrameSource>> {
        (**self).fork()
    }
}

/// Open the stream described by `descriptor` over in-memory `bytes`.
///
/// `pcm` needs `width` and `channels`; `alaw`/`mulaw` need `channels` and only accept 8-bit
/// width. For `wav`, declared fields must agree with the container header. A `start`/`end`
/// window is applied on top of the decoded stream.
pub fn open_frame_source(
    bytes: impl Into<Arc<[u8]>>,
    descriptor: &FormatDescriptor,
) -> PeakformResult<Box<dyn FrameSource>> {
    let bytes = bytes.into();
    let source: Box<dyn FrameSource> = match descriptor.format() {
        AudioFormat::Wav => {
            let wav = WavSource::new(bytes)?;
            check_declared(descriptor, wav.channels(), wav.sample_width_bits())?;
            Box::new(wav)
        }
        AudioFormat::Pcm => {
            let width = descriptor.sample_width_bits().ok_or_else(|| {
                PeakformError::malformed_header("pcm streams require a width")
            })?;
            Box::new(PcmSource::linear(bytes, width, required_channels(descriptor)?)?)
        }
        AudioFormat::Alaw | AudioFormat::Mulaw => {
            if let Some(w) = descriptor.sample_width_bits()
                && w != 8
            {
                return Err(PeakformError::malformed_header(format!(
                    "{} streams are 8 bits per sample, got width {w}",
                    descriptor.format()
                )));
            }
            let encoding = if descriptor.format() == AudioFormat::Alaw {
                SampleEncoding::Alaw
            } else {
                SampleEncoding::Mulaw
            };
            Box::new(PcmSource::companded(
                bytes,
                encoding,
                required_channels(descriptor)?,
            )?)
        }
    };

    tracing::debug!(
        format = %descriptor.format(),
        frames = source.frame_count(),
        channels = source.channels(),
        bits = source.sample_width_bits(),
        "opened frame source"
    );

    if descriptor.has_window() {
        Ok(Box::new(Windowed::new(
            source,
            descriptor.start(),
            descriptor.end(),
        )))
    } else {
        Ok(source)
    }
}

fn required_channels(descriptor: &FormatDescriptor) -> PeakformResult<u16> {
    descriptor.channels().ok_or_else(|| {
        PeakformError::malformed_header(format!(
            "{} streams require a channel count",
            descriptor.format()
        ))
    })
}

fn check_declared(descriptor: &FormatDescriptor, channels: u16, bits: u16) -> PeakformResult<()> {
    if let Some(c) = descriptor.channels()
        && c != channels
    {
        return Err(PeakformError::malformed_header(format!(
            "descriptor declares {c} channels but the wav header has {channels}"
        )));
    }
    if let Some(w) = descriptor.sample_width_bits()
        && w != bits
    {
        return Err(PeakformError::malformed_header(format!(
            "descriptor declares width {w} but the wav header has {bits}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/source/open.rs"]
mod tests;
