use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::time::Instant;

use rayon::prelude::*;

use crate::foundation::core::{FrameSpan, PeakPair, column_span};
use crate::foundation::error::{PeakformError, PeakformResult};
use crate::source::FrameSource;

/// Frames read per block while scanning a column.
pub const DEFAULT_BLOCK_FRAMES: usize = 4096;
/// Columns handed to one worker in parallel mode.
pub const DEFAULT_CHUNK_COLUMNS: usize = 64;

/// Which channel of a multi-channel stream feeds the waveform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChannelSelect {
    #[default]
    Left,
    /// Second channel; the stream must have at least two.
    Right,
    /// Arithmetic mean of all channels.
    Mix,
}

impl ChannelSelect {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Mix => "mix",
        }
    }
}

impl fmt::Display for ChannelSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelSelect {
    type Err = PeakformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "mix" => Ok(Self::Mix),
            other => Err(PeakformError::validation(format!(
                "unknown channel selector {other:?}, expected left, right or mix"
            ))),
        }
    }
}

/// Decimation knobs. Output does not depend on `parallel`, `chunk_columns` or `threads`.
#[derive(Clone, Debug)]
pub struct DecimateOpts {
    pub channel: ChannelSelect,
    pub block_frames: usize,
    /// Abort with [`PeakformError::DeadlineExceeded`] once this instant passes.
    pub deadline: Option<Instant>,
    pub parallel: bool,
    pub chunk_columns: usize,
    pub threads: Option<usize>,
}

impl Default for DecimateOpts {
    fn default() -> Self {
        Self {
            channel: ChannelSelect::Left,
            block_frames: DEFAULT_BLOCK_FRAMES,
            deadline: None,
            parallel: false,
            chunk_columns: DEFAULT_CHUNK_COLUMNS,
            threads: None,
        }
    }
}

/// Block that failed to read and was replaced by silence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DegradedBlock {
    pub column: u32,
    pub start_frame: u64,
    pub frames: usize,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Decimation {
    pub peaks: Vec<PeakPair>,
    pub degraded: Vec<DegradedBlock>,
}

/// Reduce `source` to exactly `width` peak pairs.
///
/// Column `x` covers the frames of [`column_span`]. Spans of zero or one frame sample the
/// single frame at the span start, two-frame spans return both samples in order, and longer
/// spans are scanned in blocks for their first-occurring minimum and maximum, emitted in
/// order of occurrence. Unreadable blocks are replaced with silence and reported in
/// [`Decimation::degraded`].
#[tracing::instrument(skip(source, opts), fields(frames = source.frame_count()))]
pub fn decimate(
    source: &mut dyn FrameSource,
    width: u32,
    opts: &DecimateOpts,
) -> PeakformResult<Decimation> {
    let scan = ScanParams::new(&*source, width, opts)?;

    if opts.parallel && width > 1 {
        if let Some(jobs) = fork_jobs(&*source, width, opts.chunk_columns) {
            return decimate_parallel(jobs, &scan, opts.threads);
        }
        tracing::debug!("frame source cannot fork; decimating sequentially");
    }

    decimate_columns(source, 0..width, &scan)
}

#[derive(Clone, Copy, Debug)]
struct ScanParams {
    width: u32,
    total_frames: u64,
    channels: usize,
    channel: ChannelSelect,
    scale: f32,
    block_frames: usize,
    deadline: Option<Instant>,
}

impl ScanParams {
    fn new(source: &dyn FrameSource, width: u32, opts: &DecimateOpts) -> PeakformResult<Self> {
        if width == 0 {
            return Err(PeakformError::validation("waveform width must be >= 1"));
        }
        let channels = source.channels();
        if channels == 0 {
            return Err(PeakformError::validation("frame source reports no channels"));
        }
        if opts.channel == ChannelSelect::Right && channels < 2 {
            return Err(PeakformError::validation(format!(
                "channel 'right' needs a stereo stream, source has {channels} channel(s)"
            )));
        }
        let bits = source.sample_width_bits();
        if !(1..=32).contains(&bits) {
            return Err(PeakformError::validation(format!(
                "unsupported sample width {bits}"
            )));
        }
        Ok(Self {
            width,
            total_frames: source.frame_count(),
            channels: usize::from(channels),
            channel: opts.channel,
            scale: 2f32.powi(i32::from(bits) - 1),
            block_frames: opts.block_frames.max(1),
            deadline: opts.deadline,
        })
    }

    fn past_deadline(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

fn fork_jobs(
    source: &dyn FrameSource,
    width: u32,
    chunk_columns: usize,
) -> Option<Vec<(Range<u32>, Box<dyn FrameSource>)>> {
    let chunk = u32::try_from(chunk_columns.max(1)).unwrap_or(u32::MAX);
    let mut jobs = Vec::new();
    let mut start = 0u32;
    while start < width {
        let end = start.saturating_add(chunk).min(width);
        jobs.push((start..end, source.fork()?));
        start = end;
    }
    Some(jobs)
}

fn decimate_parallel(
    jobs: Vec<(Range<u32>, Box<dyn FrameSource>)>,
    scan: &ScanParams,
    threads: Option<usize>,
) -> PeakformResult<Decimation> {
    let pool = build_thread_pool(threads)?;
    tracing::debug!(chunks = jobs.len(), "decimating columns in parallel");

    let chunks = pool.install(|| {
        jobs.into_par_iter()
            .map(|(columns, mut source)| decimate_columns(source.as_mut(), columns, scan))
            .collect::<Vec<_>>()
    });

    let mut out = Decimation {
        peaks: Vec::with_capacity(scan.width as usize),
        degraded: Vec::new(),
    };
    for chunk in chunks {
        let chunk = chunk?;
        out.peaks.extend(chunk.peaks);
        out.degraded.extend(chunk.degraded);
    }
    Ok(out)
}

fn build_thread_pool(threads: Option<usize>) -> PeakformResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(PeakformError::validation(
            "decimation 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| PeakformError::validation(format!("failed to build rayon thread pool: {e}")))
}

fn decimate_columns(
    source: &mut dyn FrameSource,
    columns: Range<u32>,
    scan: &ScanParams,
) -> PeakformResult<Decimation> {
    let mut reader = ColumnReader {
        source,
        scan,
        degraded: Vec::new(),
    };
    let mut peaks = Vec::with_capacity(columns.len());
    for x in columns {
        if scan.past_deadline() {
            return Err(PeakformError::DeadlineExceeded {
                completed: x,
                total: scan.width,
            });
        }
        let span = column_span(x, scan.width, scan.total_frames);
        peaks.push(reader.column_peaks(x, span));
    }
    Ok(Decimation {
        peaks,
        degraded: reader.degraded,
    })
}

struct ColumnReader<'a> {
    source: &'a mut dyn FrameSource,
    scan: &'a ScanParams,
    degraded: Vec<DegradedBlock>,
}

impl ColumnReader<'_> {
    fn column_peaks(&mut self, x: u32, span: FrameSpan) -> PeakPair {
        let len = span.len_frames();
        match len {
            0 | 1 => {
                let s = self.read_window(x, span.start, 1);
                PeakPair::new(s[0], s[0])
            }
            2 => {
                let s = self.read_window(x, span.start, 2);
                PeakPair::new(s[0], s[1])
            }
            _ => self.scan_blocks(x, span),
        }
    }

    fn scan_blocks(&mut self, x: u32, span: FrameSpan) -> PeakPair {
        let len = span.len_frames();
        let block = self.scan.block_frames as u64;
        let (mut max_v, mut max_i) = (-1.0f32, None::<u64>);
        let (mut min_v, mut min_i) = (1.0f32, None::<u64>);

        let mut offset = 0u64;
        while offset < len {
            let n = block.min(len - offset);
            let samples = self.read_window(x, span.start + offset, n as usize);
            for (i, &v) in samples.iter().enumerate() {
                let idx = offset + i as u64;
                if v > max_v {
                    (max_v, max_i) = (v, Some(idx));
                }
                if v < min_v {
                    (min_v, min_i) = (v, Some(idx));
                }
            }
            offset += n;
        }

        // None sorts before Some, matching an unset index of -1.
        if min_i < max_i {
            PeakPair::new(min_v, max_v)
        } else {
            PeakPair::new(max_v, min_v)
        }
    }

    /// Selected-channel samples for `[start, start+size)`, zero-padded past the end of stream.
    fn read_window(&mut self, x: u32, start: u64, size: usize) -> Vec<f32> {
        let available = self.scan.total_frames.saturating_sub(start);
        let to_read = (size as u64).min(available) as usize;

        let mut out = if to_read == 0 {
            Vec::with_capacity(size)
        } else {
            match self.read_channel(start, to_read) {
                Ok(samples) => samples,
                Err(err) => {
                    tracing::warn!(
                        column = x,
                        start_frame = start,
                        frames = to_read,
                        %err,
                        "substituting silence for unreadable block"
                    );
                    self.degraded.push(DegradedBlock {
                        column: x,
                        start_frame: start,
                        frames: to_read,
                        reason: err.to_string(),
                    });
                    vec![0.0; to_read]
                }
            }
        };
        out.resize(size, 0.0);
        out
    }

    fn read_channel(&mut self, start: u64, frames: usize) -> PeakformResult<Vec<f32>> {
        self.source.seek(start)?;
        let raw = self.source.read_frames(frames)?;
        let channels = self.scan.channels;
        if raw.len() < frames * channels {
            return Err(PeakformError::frame_source(format!(
                "short read: wanted {frames} frames, got {}",
                raw.len() / channels
            )));
        }

        let scale = self.scan.scale;
        let out = raw
            .chunks_exact(channels)
            .take(frames)
            .map(|frame| match self.scan.channel {
                ChannelSelect::Left => frame[0] as f32 / scale,
                ChannelSelect::Right => frame[1] as f32 / scale,
                ChannelSelect::Mix => {
                    let sum: f32 = frame.iter().map(|&s| s as f32 / scale).sum();
                    sum / channels as f32
                }
            })
            .collect();
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/waveform/decimate.rs"]
mod tests;
