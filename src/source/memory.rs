use std::sync::Arc;

use crate::foundation::error::{PeakformError, PeakformResult};
use crate::source::FrameSource;

/// Already-decoded interleaved samples.
///
/// This is the adapter for compressed formats decoded elsewhere: hand the decoder's output
/// buffer to [`MemorySource::new`] and render it like any other stream.
#[derive(Clone, Debug)]
pub struct MemorySource {
    samples: Arc<[i32]>,
    channels: u16,
    bits: u16,
    pos: u64,
}

impl MemorySource {
    pub fn new(samples: impl Into<Arc<[i32]>>, channels: u16, bits: u16) -> PeakformResult<Self> {
        let samples = samples.into();
        if channels == 0 {
            return Err(PeakformError::frame_source("channel count must be positive"));
        }
        if !(1..=32).contains(&bits) {
            return Err(PeakformError::frame_source(format!(
                "sample width must be 1..=32 bits, got {bits}"
            )));
        }
        if samples.len() % usize::from(channels) != 0 {
            return Err(PeakformError::frame_source(format!(
                "{} samples do not divide into {channels}-channel frames",
                samples.len()
            )));
        }
        Ok(Self {
            samples,
            channels,
            bits,
            pos: 0,
        })
    }
}

impl FrameSource for MemorySource {
    fn frame_count(&self) -> u64 {
        (self.samples.len() / usize::from(self.channels)) as u64
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_width_bits(&self) -> u16 {
        self.bits
    }

    fn seek(&mut self, frame: u64) -> PeakformResult<()> {
        if frame > self.frame_count() {
            return Err(PeakformError::frame_source(format!(
                "seek to frame {frame} past end of {}-frame stream",
                self.frame_count()
            )));
        }
        self.pos = frame;
        Ok(())
    }

    fn read_frames(&mut self, frames: usize) -> PeakformResult<Vec<i32>> {
        let n = (frames as u64).min(self.frame_count() - self.pos);
        let channels = usize::from(self.channels);
        let from = self.pos as usize * channels;
        let to = from + n as usize * channels;
        self.pos += n;
        Ok(self.samples[from..to].to_vec())
    }

    fn fork(&self) -> Option<Box<dyn FrameSource>> {
        Some(Box::new(Self {
            pos: 0,
            ..self.clone()
        }))
    }
}
