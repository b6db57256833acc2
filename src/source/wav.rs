use std::io::Cursor;
use std::sync::Arc;

use crate::foundation::error::{PeakformError, PeakformResult};
use crate::source::FrameSource;

type Reader = hound::WavReader<Cursor<Arc<[u8]>>>;

/// RIFF/WAVE container over shared in-memory bytes.
pub struct WavSource {
    bytes: Arc<[u8]>,
    reader: Reader,
    channels: u16,
    bits: u16,
    frames: u64,
    pos: u64,
}

impl WavSource {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> PeakformResult<Self> {
        let bytes = bytes.into();
        let reader = hound::WavReader::new(Cursor::new(bytes.clone()))
            .map_err(|e| PeakformError::frame_source(format!("parse wav header: {e}")))?;
        let spec = reader.spec();
        if spec.sample_format != hound::SampleFormat::Int {
            return Err(PeakformError::frame_source(
                "floating-point wav data is not supported",
            ));
        }
        if !matches!(spec.bits_per_sample, 8 | 16 | 24) {
            return Err(PeakformError::frame_source(format!(
                "unsupported wav sample width {}",
                spec.bits_per_sample
            )));
        }
        if spec.channels == 0 {
            return Err(PeakformError::frame_source("wav header declares no channels"));
        }

        Ok(Self {
            frames: u64::from(reader.duration()),
            channels: spec.channels,
            bits: spec.bits_per_sample,
            bytes,
            reader,
            pos: 0,
        })
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.reader.spec().sample_rate
    }

    fn reopen(&mut self) -> PeakformResult<()> {
        self.reader = hound::WavReader::new(Cursor::new(self.bytes.clone()))
            .map_err(|e| PeakformError::frame_source(format!("reopen wav: {e}")))?;
        self.pos = 0;
        Ok(())
    }
}

impl std::fmt::Debug for WavSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavSource")
            .field("channels", &self.channels)
            .field("bits", &self.bits)
            .field("frames", &self.frames)
            .field("pos", &self.pos)
            .finish()
    }
}

impl FrameSource for WavSource {
    fn frame_count(&self) -> u64 {
        self.frames
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_width_bits(&self) -> u16 {
        self.bits
    }

    fn seek(&mut self, frame: u64) -> PeakformResult<()> {
        if frame > self.frames {
            return Err(PeakformError::frame_source(format!(
                "seek to frame {frame} past end of {}-frame stream",
                self.frames
            )));
        }
        // frame <= duration(), which is a u32
        let target = u32::try_from(frame).unwrap_or(u32::MAX);
        self.reader
            .seek(target)
            .map_err(|e| PeakformError::frame_source(format!("seek to frame {frame}: {e}")))?;
        self.pos = frame;
        Ok(())
    }

    fn read_frames(&mut self, frames: usize) -> PeakformResult<Vec<i32>> {
        let n = (frames as u64).min(self.frames - self.pos) as usize;
        let channels = usize::from(self.channels);
        let mut out = Vec::with_capacity(n * channels);
        let mut failure = None;
        for sample in self.reader.samples::<i32>().take(n * channels) {
            match sample {
                Ok(s) => out.push(s),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        if let Some(e) = failure {
            let err = PeakformError::frame_source(format!(
                "read samples at frame {}: {e}",
                self.pos
            ));
            // hound's sample counter has run ahead of the cursor; reopen to resync.
            self.reopen()?;
            return Err(err);
        }
        out.truncate(out.len() - out.len() % channels);
        self.pos += (out.len() / channels) as u64;
        Ok(out)
    }

    fn fork(&self) -> Option<Box<dyn FrameSource>> {
        match Self::new(self.bytes.clone()) {
            Ok(source) => Some(Box::new(source)),
            Err(err) => {
                tracing::debug!(%err, "could not fork wav source");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/wav.rs"]
mod tests;
