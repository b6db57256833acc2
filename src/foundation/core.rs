use crate::foundation::error::{PeakformError, PeakformResult};

/// Half-open frame interval `[start, end)` in stream frame units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FrameSpan {
    pub start: u64,
    pub end: u64, // exclusive
}

impl FrameSpan {
    pub fn new(start: u64, end: u64) -> PeakformResult<Self> {
        if start > end {
            return Err(PeakformError::validation("FrameSpan start must be <= end"));
        }
        Ok(Self { start, end })
    }

    pub fn len_frames(self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn contains(self, frame: u64) -> bool {
        self.start <= frame && frame < self.end
    }
}

/// Frames covered by output column `x` of `width` over a stream of `total_frames`.
///
/// Proportional partition: `[floor(x*N/W), floor((x+1)*N/W))`. Consecutive columns share
/// boundaries exactly, so the union over all columns is `[0, N)` with no gaps or overlaps.
pub fn column_span(x: u32, width: u32, total_frames: u64) -> FrameSpan {
    debug_assert!(width > 0 && x < width);
    let n = u128::from(total_frames);
    let w = u128::from(width);
    let start = (u128::from(x) * n / w) as u64;
    let end = ((u128::from(x) + 1) * n / w) as u64;
    FrameSpan { start, end }
}

/// Normalized amplitude extremes for one output column, in order of occurrence.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PeakPair {
    pub first: f32,
    pub second: f32,
}

impl PeakPair {
    pub const SILENT: Self = Self {
        first: 0.0,
        second: 0.0,
    };

    pub fn new(first: f32, second: f32) -> Self {
        Self { first, second }
    }

    pub fn is_silent(self) -> bool {
        self.first == 0.0 && self.second == 0.0
    }

    pub fn min(self) -> f32 {
        self.first.min(self.second)
    }

    pub fn max(self) -> f32 {
        self.first.max(self.second)
    }
}

impl From<(f32, f32)> for PeakPair {
    fn from((first, second): (f32, f32)) -> Self {
        Self { first, second }
    }
}

/// Bi-level pixel value. `0` is black and `1` is white.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Bilevel(u8);

impl Bilevel {
    pub const BLACK: Self = Self(0);
    pub const WHITE: Self = Self(1);

    pub fn new(v: u8) -> PeakformResult<Self> {
        match v {
            0 | 1 => Ok(Self(v)),
            _ => Err(PeakformError::validation(format!(
                "bi-level pixel must be 0 or 1, got {v}"
            ))),
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// 8-bit greyscale intensity used when serializing.
    pub fn luma(self) -> u8 {
        if self.0 == 0 { 0 } else { 255 }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
