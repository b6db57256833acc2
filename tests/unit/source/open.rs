use std::io::Cursor;

use super::*;

fn wav_bytes(channels: u16, samples: &[i16]) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 44100,
        bits_per_sample: 16,
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

fn open_err(bytes: Vec<u8>, d: &FormatDescriptor) -> PeakformError {
    match open_frame_source(bytes, d) {
        Ok(_) => panic!("open should fail for {d}"),
        Err(e) => e,
    }
}

#[test]
fn default_descriptor_opens_wav() {
    let src = open_frame_source(wav_bytes(2, &[0; 8]), &FormatDescriptor::default()).unwrap();
    assert_eq!(src.frame_count(), 4);
    assert_eq!(src.channels(), 2);
}

#[test]
fn wav_declared_fields_must_match_header() {
    let d = FormatDescriptor::parse("fmt=wav, channels=1").unwrap();
    let err = open_err(wav_bytes(2, &[0; 4]), &d);
    assert!(matches!(err, PeakformError::MalformedHeader(_)));

    let d = FormatDescriptor::parse("fmt=wav, width=24").unwrap();
    let err = open_err(wav_bytes(1, &[0; 4]), &d);
    assert!(matches!(err, PeakformError::MalformedHeader(_)));

    let d = FormatDescriptor::parse("fmt=wav, width=16, channels=2").unwrap();
    open_frame_source(wav_bytes(2, &[0; 4]), &d).unwrap();
}

#[test]
fn pcm_needs_width_and_channels() {
    let d = FormatDescriptor::parse("fmt=pcm, channels=1").unwrap();
    let err = open_err(vec![0u8; 8], &d);
    assert!(matches!(err, PeakformError::MalformedHeader(_)));

    let d = FormatDescriptor::parse("fmt=pcm, width=16").unwrap();
    let err = open_err(vec![0u8; 8], &d);
    assert!(matches!(err, PeakformError::MalformedHeader(_)));

    let d = FormatDescriptor::parse("fmt=pcm, width=16, channels=2").unwrap();
    let src = open_frame_source(vec![0u8; 8], &d).unwrap();
    assert_eq!(src.frame_count(), 2);
}

#[test]
fn companded_width_must_be_eight() {
    let d = FormatDescriptor::parse("fmt=mulaw, channels=1, width=16").unwrap();
    let err = open_err(vec![0xFFu8; 4], &d);
    assert!(matches!(err, PeakformError::MalformedHeader(_)));

    let d = FormatDescriptor::parse("fmt=alaw, channels=1").unwrap();
    let src = open_frame_source(vec![0xD5u8; 4], &d).unwrap();
    assert_eq!(src.sample_width_bits(), 16);
}

#[test]
fn window_applies_on_top_of_format() {
    let d = FormatDescriptor::parse("fmt=pcm, width=8, channels=1, start=2, end=5").unwrap();
    let mut src = open_frame_source(vec![128u8, 129, 130, 131, 132, 133], &d).unwrap();
    assert_eq!(src.frame_count(), 3);
    assert_eq!(src.read_frames(8).unwrap(), vec![2, 3, 4]);
}
