use crate::foundation::error::{PeakformError, PeakformResult};
use crate::source::FrameSource;

/// Sub-range `[start, end)` of an inner source, re-based to frame 0.
///
/// `end` is clamped to the inner length and a `start` at or past it yields an empty stream.
#[derive(Debug)]
pub struct Windowed<S> {
    inner: S,
    offset: u64,
    frames: u64,
    pos: u64,
}

impl<S: FrameSource> Windowed<S> {
    pub fn new(inner: S, start: Option<u64>, end: Option<u64>) -> Self {
        let total = inner.frame_count();
        let start = start.unwrap_or(0).min(total);
        let end = end.unwrap_or(total).clamp(start, total);
        Self {
            inner,
            offset: start,
            frames: end - start,
            pos: 0,
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: FrameSource> FrameSource for Windowed<S> {
    fn frame_count(&self) -> u64 {
        self.frames
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_width_bits(&self) -> u16 {
        self.inner.sample_width_bits()
    }

    fn seek(&mut self, frame: u64) -> PeakformResult<()> {
        if frame > self.frames {
            return Err(PeakformError::frame_source(format!(
                "seek to frame {frame} past end of {}-frame window",
                self.frames
            )));
        }
        self.inner.seek(self.offset + frame)?;
        self.pos = frame;
        Ok(())
    }

    fn read_frames(&mut self, frames: usize) -> PeakformResult<Vec<i32>> {
        if self.pos == 0 {
            // inner may not have been positioned yet
            self.inner.seek(self.offset)?;
        }
        let n = (frames as u64).min(self.frames - self.pos) as usize;
        let out = self.inner.read_frames(n)?;
        self.pos += (out.len() / usize::from(self.inner.channels().max(1))) as u64;
        Ok(out)
    }

    fn fork(&self) -> Option<Box<dyn FrameSource>> {
        let inner = self.inner.fork()?;
        Some(Box::new(Windowed {
            inner,
            offset: self.offset,
            frames: self.frames,
            pos: 0,
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/window.rs"]
mod tests;
