use std::sync::Arc;

use crate::foundation::error::{PeakformError, PeakformResult};
use crate::source::FrameSource;
use crate::source::g711::{alaw_to_linear, mulaw_to_linear};

/// On-the-wire sample coding of a headerless stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleEncoding {
    /// Little-endian linear PCM. 8-bit samples are unsigned with a 128 offset.
    Linear,
    Alaw,
    Mulaw,
}

/// Headerless interleaved stream held in memory.
#[derive(Clone, Debug)]
pub struct PcmSource {
    bytes: Arc<[u8]>,
    encoding: SampleEncoding,
    channels: u16,
    wire_bits: u16,
    frames: u64,
    pos: u64,
}

impl PcmSource {
    pub fn linear(
        bytes: impl Into<Arc<[u8]>>,
        width_bits: u16,
        channels: u16,
    ) -> PeakformResult<Self> {
        if !matches!(width_bits, 8 | 16 | 24) {
            return Err(PeakformError::frame_source(format!(
                "unsupported linear pcm width {width_bits}"
            )));
        }
        Self::with_layout(bytes.into(), SampleEncoding::Linear, width_bits, channels)
    }

    /// G.711 stream; each byte is one sample, expanded to 16-bit linear on read.
    pub fn companded(
        bytes: impl Into<Arc<[u8]>>,
        encoding: SampleEncoding,
        channels: u16,
    ) -> PeakformResult<Self> {
        if encoding == SampleEncoding::Linear {
            return Err(PeakformError::frame_source(
                "companded sources need an alaw or mulaw encoding",
            ));
        }
        Self::with_layout(bytes.into(), encoding, 8, channels)
    }

    fn with_layout(
        bytes: Arc<[u8]>,
        encoding: SampleEncoding,
        wire_bits: u16,
        channels: u16,
    ) -> PeakformResult<Self> {
        if channels == 0 {
            return Err(PeakformError::frame_source("channel count must be positive"));
        }
        let frame_bytes = usize::from(wire_bits / 8) * usize::from(channels);
        // A trailing partial frame is ignored.
        let frames = (bytes.len() / frame_bytes) as u64;
        Ok(Self {
            bytes,
            encoding,
            channels,
            wire_bits,
            frames,
            pos: 0,
        })
    }

    pub fn encoding(&self) -> SampleEncoding {
        self.encoding
    }

    fn sample_bytes(&self) -> usize {
        usize::from(self.wire_bits / 8)
    }

    fn decode(&self, raw: &[u8]) -> i32 {
        match (self.encoding, raw) {
            (SampleEncoding::Alaw, [b]) => i32::from(alaw_to_linear(*b)),
            (SampleEncoding::Mulaw, [b]) => i32::from(mulaw_to_linear(*b)),
            (SampleEncoding::Linear, [b]) => i32::from(*b) - 128,
            (SampleEncoding::Linear, [lo, hi]) => i32::from(i16::from_le_bytes([*lo, *hi])),
            (SampleEncoding::Linear, [b0, b1, b2]) => {
                (i32::from_le_bytes([*b0, *b1, *b2, 0]) << 8) >> 8
            }
            _ => 0,
        }
    }
}

impl FrameSource for PcmSource {
    fn frame_count(&self) -> u64 {
        self.frames
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_width_bits(&self) -> u16 {
        match self.encoding {
            SampleEncoding::Linear => self.wire_bits,
            SampleEncoding::Alaw | SampleEncoding::Mulaw => 16,
        }
    }

    fn seek(&mut self, frame: u64) -> PeakformResult<()> {
        if frame > self.frames {
            return Err(PeakformError::frame_source(format!(
                "seek to frame {frame} past end of {}-frame stream",
                self.frames
            )));
        }
        self.pos = frame;
        Ok(())
    }

    fn read_frames(&mut self, frames: usize) -> PeakformResult<Vec<i32>> {
        let n = (frames as u64).min(self.frames - self.pos);
        let width = self.sample_bytes();
        let frame_bytes = width * usize::from(self.channels);
        let from = self.pos as usize * frame_bytes;
        let to = from + n as usize * frame_bytes;

        let out = self.bytes[from..to]
            .chunks_exact(width)
            .map(|raw| self.decode(raw))
            .collect();
        self.pos += n;
        Ok(out)
    }

    fn fork(&self) -> Option<Box<dyn FrameSource>> {
        Some(Box::new(Self {
            pos: 0,
            ..self.clone()
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/pcm.rs"]
mod tests;
