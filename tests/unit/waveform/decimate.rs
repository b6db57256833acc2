use std::time::Instant;

use super::*;
use crate::source::memory::MemorySource;

fn mono(samples: &[i32]) -> MemorySource {
    MemorySource::new(samples.to_vec(), 1, 16).unwrap()
}

fn pairs(d: &Decimation) -> Vec<(f32, f32)> {
    d.peaks.iter().map(|p| (p.first, p.second)).collect()
}

/// Memory source that fails every read starting at or after `bad_from`.
struct Flaky {
    inner: MemorySource,
    bad_from: u64,
    pos: u64,
}

impl FrameSource for Flaky {
    fn frame_count(&self) -> u64 {
        self.inner.frame_count()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_width_bits(&self) -> u16 {
        self.inner.sample_width_bits()
    }

    fn seek(&mut self, frame: u64) -> PeakformResult<()> {
        self.inner.seek(frame)?;
        self.pos = frame;
        Ok(())
    }

    fn read_frames(&mut self, frames: usize) -> PeakformResult<Vec<i32>> {
        if self.pos >= self.bad_from {
            return Err(PeakformError::frame_source("bad sector"));
        }
        self.inner.read_frames(frames)
    }
}

#[test]
fn zero_width_is_rejected() {
    let err = decimate(&mut mono(&[1, 2, 3]), 0, &DecimateOpts::default()).unwrap_err();
    assert!(matches!(err, PeakformError::Validation(_)));
}

#[test]
fn single_frame_columns_repeat_the_sample() {
    let mut src = mono(&[16384, -16384, 0, -32768]);
    let d = decimate(&mut src, 4, &DecimateOpts::default()).unwrap();
    assert_eq!(
        pairs(&d),
        vec![(0.5, 0.5), (-0.5, -0.5), (0.0, 0.0), (-1.0, -1.0)]
    );
}

#[test]
fn two_frame_columns_keep_stream_order() {
    let mut src = mono(&[16384, -16384, -8192, 8192]);
    let d = decimate(&mut src, 2, &DecimateOpts::default()).unwrap();
    assert_eq!(pairs(&d), vec![(0.5, -0.5), (-0.25, 0.25)]);
}

#[test]
fn extremes_are_emitted_in_order_of_occurrence() {
    let mut src = mono(&[0, 8192, -16384, 4096]);
    let d = decimate(&mut src, 1, &DecimateOpts::default()).unwrap();
    assert_eq!(pairs(&d), vec![(0.25, -0.5)]);

    let mut src = mono(&[-16384, 0, 16384, 0]);
    let d = decimate(&mut src, 1, &DecimateOpts::default()).unwrap();
    assert_eq!(pairs(&d), vec![(-0.5, 0.5)]);
}

#[test]
fn block_size_does_not_change_result() {
    let samples: Vec<i32> = (0..5000).map(|i| ((i * 7919) % 65536) - 32768).collect();
    let big = decimate(&mut mono(&samples), 13, &DecimateOpts::default()).unwrap();
    let opts = DecimateOpts {
        block_frames: 7,
        ..DecimateOpts::default()
    };
    let small = decimate(&mut mono(&samples), 13, &opts).unwrap();
    assert_eq!(big, small);
}

#[test]
fn empty_stream_yields_silence() {
    let d = decimate(&mut mono(&[]), 5, &DecimateOpts::default()).unwrap();
    assert_eq!(d.peaks, vec![PeakPair::SILENT; 5]);
    assert!(d.degraded.is_empty());
}

#[test]
fn fewer_frames_than_columns() {
    let mut src = mono(&[16384, -16384, 8192]);
    let d = decimate(&mut src, 7, &DecimateOpts::default()).unwrap();
    assert_eq!(d.peaks.len(), 7);
    let allowed = [0.5, -0.5, 0.25];
    for p in &d.peaks {
        assert_eq!(p.first, p.second);
        assert!(allowed.contains(&p.first), "unexpected sample {p:?}");
    }
    assert_eq!(d.peaks[0].first, 0.5);
}

#[test]
fn channel_selection() {
    let stereo = || MemorySource::new(vec![16384, -16384, 16384, 0], 2, 16).unwrap();

    let d = decimate(&mut stereo(), 2, &DecimateOpts::default()).unwrap();
    assert_eq!(pairs(&d), vec![(0.5, 0.5), (0.5, 0.5)]);

    let right = DecimateOpts {
        channel: ChannelSelect::Right,
        ..DecimateOpts::default()
    };
    let d = decimate(&mut stereo(), 2, &right).unwrap();
    assert_eq!(pairs(&d), vec![(-0.5, -0.5), (0.0, 0.0)]);

    let mix = DecimateOpts {
        channel: ChannelSelect::Mix,
        ..DecimateOpts::default()
    };
    let d = decimate(&mut stereo(), 2, &mix).unwrap();
    assert_eq!(pairs(&d), vec![(0.0, 0.0), (0.25, 0.25)]);

    let err = decimate(&mut mono(&[1]), 1, &right).unwrap_err();
    assert!(matches!(err, PeakformError::Validation(_)));
}

#[test]
fn channel_names_parse() {
    assert_eq!("left".parse::<ChannelSelect>().unwrap(), ChannelSelect::Left);
    assert_eq!("mix".parse::<ChannelSelect>().unwrap(), ChannelSelect::Mix);
    assert!("centre".parse::<ChannelSelect>().is_err());
    assert_eq!(ChannelSelect::Right.to_string(), "right");
}

#[test]
fn unreadable_block_degrades_to_silence() {
    let mut src = Flaky {
        inner: mono(&[16384; 8]),
        bad_from: 4,
        pos: 0,
    };
    let d = decimate(&mut src, 2, &DecimateOpts::default()).unwrap();
    assert_eq!(pairs(&d), vec![(0.5, 0.5), (0.0, 0.0)]);
    assert_eq!(d.degraded.len(), 1);
    assert_eq!(d.degraded[0].column, 1);
    assert_eq!(d.degraded[0].start_frame, 4);
    assert_eq!(d.degraded[0].frames, 4);
}

#[test]
fn expired_deadline_aborts() {
    let opts = DecimateOpts {
        deadline: Some(Instant::now()),
        ..DecimateOpts::default()
    };
    let err = decimate(&mut mono(&[0; 100]), 10, &opts).unwrap_err();
    assert!(matches!(
        err,
        PeakformError::DeadlineExceeded {
            completed: 0,
            total: 10
        }
    ));
}

#[test]
fn parallel_matches_sequential() {
    let samples: Vec<i32> = (0..20_011).map(|i| ((i * 104_729) % 65536) - 32768).collect();
    let seq = decimate(&mut mono(&samples), 97, &DecimateOpts::default()).unwrap();
    let opts = DecimateOpts {
        parallel: true,
        chunk_columns: 5,
        threads: Some(3),
        ..DecimateOpts::default()
    };
    let par = decimate(&mut mono(&samples), 97, &opts).unwrap();
    assert_eq!(seq, par);
}

#[test]
fn unforkable_source_falls_back_to_sequential() {
    let opts = DecimateOpts {
        parallel: true,
        chunk_columns: 1,
        ..DecimateOpts::default()
    };
    let mut src = Flaky {
        inner: mono(&[16384; 8]),
        bad_from: u64::MAX,
        pos: 0,
    };
    let d = decimate(&mut src, 4, &opts).unwrap();
    assert_eq!(d.peaks, vec![PeakPair::new(0.5, 0.5); 4]);
}

#[test]
fn zero_threads_is_rejected_in_parallel_mode() {
    let opts = DecimateOpts {
        parallel: true,
        threads: Some(0),
        ..DecimateOpts::default()
    };
    let err = decimate(&mut mono(&[0; 16]), 4, &opts).unwrap_err();
    assert!(matches!(err, PeakformError::Validation(_)));
}
