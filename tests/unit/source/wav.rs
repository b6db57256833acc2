use std::io::Cursor;

use super::*;

fn wav_bytes(channels: u16, bits: u16, samples: &[i32]) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 8000,
        bits_per_sample: bits,
        sample_format: hound::SampleFormat::Int,
    };
    let mut buf = Vec::new();
    let mut w = hound::WavWriter::new(Cursor::new(&mut buf), spec).unwrap();
    for &s in samples {
        w.write_sample(s).unwrap();
    }
    w.finalize().unwrap();
    buf
}

#[test]
fn reads_header_and_frames() {
    let bytes = wav_bytes(2, 16, &[1, 2, 3, 4, 5, 6]);
    let mut src = WavSource::new(bytes).unwrap();
    assert_eq!(src.frame_count(), 3);
    assert_eq!(src.channels(), 2);
    assert_eq!(src.sample_width_bits(), 16);
    assert_eq!(src.sample_rate_hz(), 8000);

    src.seek(1).unwrap();
    assert_eq!(src.read_frames(5).unwrap(), vec![3, 4, 5, 6]);
    assert!(src.read_frames(1).unwrap().is_empty());
}

#[test]
fn eight_bit_samples_are_signed_after_decode() {
    let bytes = wav_bytes(1, 8, &[-128, 0, 127]);
    let mut src = WavSource::new(bytes).unwrap();
    assert_eq!(src.read_frames(3).unwrap(), vec![-128, 0, 127]);
}

#[test]
fn garbage_is_a_source_error() {
    let err = WavSource::new(vec![0u8; 16]).unwrap_err();
    assert!(matches!(err, PeakformError::Source(_)));
}

#[test]
fn fork_reads_independently() {
    let bytes = wav_bytes(1, 16, &[10, 20, 30]);
    let mut src = WavSource::new(bytes).unwrap();
    src.seek(2).unwrap();
    let mut fork = src.fork().unwrap();
    assert_eq!(fork.read_frames(3).unwrap(), vec![10, 20, 30]);
    assert_eq!(src.read_frames(3).unwrap(), vec![30]);
}
