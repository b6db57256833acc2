use std::io::Cursor;

use anyhow::Context;

use crate::foundation::core::{Bilevel, PeakPair};
use crate::foundation::error::{PeakformError, PeakformResult};

/// Bi-level raster that peak pairs are drawn into, one column at a time.
#[derive(Clone, Debug)]
pub struct WaveformImage {
    width: u32,
    height: u32,
    foreground: Bilevel,
    pixels: Vec<Bilevel>,
    previous: Option<Anchor>,
}

#[derive(Clone, Copy, Debug)]
struct Anchor {
    x: i64,
    y: i64,
    silent: bool,
}

/// Largest accepted raster width or height. The pixel buffer is allocated up front, so this
/// caps it at 256 MiB.
pub const MAX_RASTER_DIMENSION: u32 = 16_384;

/// Reject rasters that are empty or larger than [`MAX_RASTER_DIMENSION`] on either axis.
pub fn check_raster_size(width: u32, height: u32) -> PeakformResult<()> {
    if width == 0 || height == 0 {
        return Err(PeakformError::validation(format!(
            "waveform raster must be at least 1x1, got {width}x{height}"
        )));
    }
    if width > MAX_RASTER_DIMENSION || height > MAX_RASTER_DIMENSION {
        return Err(PeakformError::validation(format!(
            "waveform raster {width}x{height} exceeds {MAX_RASTER_DIMENSION} pixels per side"
        )));
    }
    Ok(())
}

/// Vertical pixel for normalized amplitude `a`: `h/2 - a*(h-4)/2`, truncated toward zero.
pub fn amplitude_to_y(a: f32, height: u32) -> i64 {
    let h = f64::from(height);
    (h * 0.5 - f64::from(a) * (h - 4.0) * 0.5) as i64
}

impl WaveformImage {
    pub fn new(
        width: u32,
        height: u32,
        background: Bilevel,
        foreground: Bilevel,
    ) -> PeakformResult<Self> {
        check_raster_size(width, height)?;
        Ok(Self {
            width,
            height,
            foreground,
            pixels: vec![background; width as usize * height as usize],
            previous: None,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Bilevel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Draw column `x`: a connector from the previous column's second point to this column's
    /// first point, then a vertical stroke between this column's two points.
    ///
    /// Segments whose endpoints both sit at exact zero amplitude are skipped, so silence leaves
    /// the raster untouched.
    pub fn draw_peaks(&mut self, x: u32, peaks: PeakPair) {
        let x = i64::from(x);
        let y0 = amplitude_to_y(peaks.first, self.height);
        let y1 = amplitude_to_y(peaks.second, self.height);

        if let Some(prev) = self.previous
            && !(prev.silent && peaks.first == 0.0)
        {
            self.draw_line((prev.x, prev.y), (x, y0));
        }
        if !peaks.is_silent() {
            self.draw_line((x, y0), (x, y1));
        }
        self.previous = Some(Anchor {
            x,
            y: y1,
            silent: peaks.second == 0.0,
        });
    }

    /// Bresenham line with inclusive endpoints, clipped per pixel.
    fn draw_line(&mut self, (x0, y0): (i64, i64), (x1, y1): (i64, i64)) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.plot(x, y);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn plot(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels[idx] = self.foreground;
    }

    pub fn count(&self, value: Bilevel) -> usize {
        self.pixels.iter().filter(|&&p| p == value).count()
    }

    /// Row-major luma buffer: 0 for black, 255 for white.
    pub fn to_luma8(&self) -> PeakformResult<image::GrayImage> {
        let raw = self.pixels.iter().map(|p| p.luma()).collect::<Vec<_>>();
        image::GrayImage::from_raw(self.width, self.height, raw).ok_or_else(|| {
            PeakformError::validation(format!(
                "pixel buffer does not match a {}x{} raster",
                self.width, self.height
            ))
        })
    }

    /// 8-bit greyscale PNG: pixel 0 is black, pixel 1 is white.
    pub fn encode_png(&self) -> PeakformResult<Vec<u8>> {
        let mut out = Vec::new();
        image::DynamicImage::ImageLuma8(self.to_luma8()?)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .context("encode waveform png")?;
        Ok(out)
    }
}

/// Draw `peaks` left to right onto a fresh `width`x`height` raster.
pub fn rasterize(
    width: u32,
    height: u32,
    background: Bilevel,
    foreground: Bilevel,
    peaks: &[PeakPair],
) -> PeakformResult<WaveformImage> {
    let mut img = WaveformImage::new(width, height, background, foreground)?;
    for (x, p) in peaks.iter().enumerate() {
        let x = u32::try_from(x)
            .map_err(|_| PeakformError::validation("more peak pairs than raster columns"))?;
        img.draw_peaks(x, *p);
    }
    Ok(img)
}

#[cfg(test)]
#[path = "../../tests/unit/waveform/raster.rs"]
mod tests;
