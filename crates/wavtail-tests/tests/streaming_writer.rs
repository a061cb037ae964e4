//! End-to-end tests for the streaming WAV writer.
//!
//! Every check reads the file back from disk, so the assertions hold for
//! what a player would see between writer calls.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p wavtail-tests --test streaming_writer
//! ```

use std::fs;

use pretty_assertions::assert_eq;
use wavtail_core::wav::{inspect, StreamingWavWriter};
use wavtail_core::WavError;
use wavtail_tests::harness::{assert_capture, assert_markers, validate_wav_file};
use wavtail_tests::TestHarness;

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_one_second_capture() {
    let harness = TestHarness::new();
    let path = harness.file("one_second.wav");

    let mut writer = StreamingWavWriter::create(&path).unwrap();
    writer.append_all(&vec![1000i16; 44100]).unwrap();

    assert_eq!(fs::metadata(&path).unwrap().len(), 88244);
    let info = inspect(&path).unwrap();
    assert_eq!(info.data_size, 88200);
    assert_eq!(info.riff_size, 88236);

    writer.close().unwrap();
    assert_capture(&path, &vec![1000i16; 44100]);
}

#[test]
fn test_one_second_then_trim_half_second() {
    let harness = TestHarness::new();
    let path = harness.file("trimmed.wav");

    let mut writer = StreamingWavWriter::create(&path).unwrap();
    writer.append_all(&vec![1000i16; 44100]).unwrap();
    writer.truncate_tail(500).unwrap();

    assert_eq!(fs::metadata(&path).unwrap().len(), 44144);
    assert_eq!(inspect(&path).unwrap().data_size, 44100);

    writer.close().unwrap();
    assert_capture(&path, &vec![1000i16; 22050]);
}

#[test]
fn test_create_then_close_is_header_only() {
    let harness = TestHarness::new();
    let path = harness.file("empty.wav");

    let mut writer = StreamingWavWriter::create(&path).unwrap();
    writer.close().unwrap();

    assert_eq!(fs::metadata(&path).unwrap().len(), 44);
    let info = validate_wav_file(&path).unwrap();
    assert_eq!(info.riff_size, 36);
    assert_eq!(info.data_len, 0);
    assert_eq!(info.audio_format, 1);
    assert_markers(&path);
    assert_capture(&path, &[]);
}

// ============================================================================
// File stays valid between calls
// ============================================================================

#[test]
fn test_file_readable_after_every_burst() {
    let harness = TestHarness::new();
    let path = harness.file("bursts.wav");

    let mut writer = StreamingWavWriter::create(&path).unwrap();
    let mut expected = Vec::new();

    for burst in 0..20i16 {
        let samples: Vec<i16> = (0..(burst as usize * 37 + 1))
            .map(|i| (i as i16).wrapping_mul(burst).wrapping_sub(500))
            .collect();
        writer.append_all(&samples).unwrap();
        expected.extend_from_slice(&samples);

        // A reader opening the file mid-capture sees every sample so far.
        assert_capture(&path, &expected);
    }

    writer.close().unwrap();
    assert_capture(&path, &expected);
}

#[test]
fn test_extreme_sample_values_round_trip() {
    let harness = TestHarness::new();
    let path = harness.file("extremes.wav");
    let samples = [i16::MIN, -1, 0, 1, i16::MAX, i16::MIN + 1, i16::MAX - 1];

    let mut writer = StreamingWavWriter::create(&path).unwrap();
    writer.append_all(&samples).unwrap();
    writer.close().unwrap();

    assert_capture(&path, &samples);
}

#[test]
fn test_trim_interleaved_with_appends() {
    let harness = TestHarness::new();
    let path = harness.file("interleaved.wav");

    let mut writer = StreamingWavWriter::create(&path).unwrap();
    writer.append_all(&vec![7i16; 4410]).unwrap(); // 100 ms
    writer.truncate_tail(50).unwrap();
    writer.append_all(&vec![-7i16; 441]).unwrap(); // 10 ms
    writer.truncate_tail(5).unwrap(); // 441 bytes, rounded up to 221 samples
    writer.close().unwrap();

    let mut expected = vec![7i16; 2205];
    expected.extend(vec![-7i16; 220]);
    assert_capture(&path, &expected);
    assert_markers(&path);
}

#[test]
fn test_trim_clamps_repeatedly() {
    let harness = TestHarness::new();
    let path = harness.file("clamp.wav");

    let mut writer = StreamingWavWriter::create(&path).unwrap();
    writer.append_all(&[1, 2, 3]).unwrap();
    for _ in 0..3 {
        writer.truncate_tail(10_000).unwrap();
        assert_capture(&path, &[]);
    }
    writer.close().unwrap();
}

// ============================================================================
// Lifecycle and misuse
// ============================================================================

#[test]
fn test_create_truncates_previous_capture() {
    let harness = TestHarness::new();
    let path = harness.file("reuse.wav");

    let mut first = StreamingWavWriter::create(&path).unwrap();
    first.append_all(&[1; 1000]).unwrap();
    first.close().unwrap();

    let mut second = StreamingWavWriter::create(&path).unwrap();
    second.append_all(&[2, 3]).unwrap();
    second.close().unwrap();

    assert_capture(&path, &[2, 3]);
}

#[test]
fn test_use_after_close_leaves_file_intact() {
    let harness = TestHarness::new();
    let path = harness.file("closed.wav");

    let mut writer = StreamingWavWriter::create(&path).unwrap();
    writer.append_all(&[5, 6]).unwrap();
    writer.close().unwrap();

    assert!(matches!(writer.append_all(&[7]), Err(WavError::Closed)));
    assert!(matches!(writer.truncate_tail(1000), Err(WavError::Closed)));
    assert_capture(&path, &[5, 6]);
}

#[test]
fn test_dropped_writer_leaves_valid_file() {
    let harness = TestHarness::new();
    let path = harness.file("dropped.wav");

    {
        let mut writer = StreamingWavWriter::create(&path).unwrap();
        writer.append_all(&[9, 8, 7]).unwrap();
    }

    assert_capture(&path, &[9, 8, 7]);
}

#[test]
fn test_reopen_and_trim_in_later_session() {
    let harness = TestHarness::new();
    let path = harness.file("later.wav");

    let mut writer = StreamingWavWriter::create(&path).unwrap();
    writer.append_all(&vec![3i16; 44100]).unwrap();
    writer.close().unwrap();

    let mut reopened = StreamingWavWriter::open_existing(&path).unwrap();
    reopened.truncate_tail(600).unwrap();
    reopened.close().unwrap();

    // 600 ms is 52920 bytes, 26460 samples.
    assert_capture(&path, &vec![3i16; 44100 - 26460]);
}

// ============================================================================
// 32-bit size limit (sparse files, never read whole)
// ============================================================================

/// Writes a header-only capture, then extends it sparsely to `len` bytes.
fn sparse_capture(path: &std::path::Path, len: u64) {
    let mut writer = StreamingWavWriter::create(path).unwrap();
    writer.close().unwrap();
    fs::OpenOptions::new()
        .write(true)
        .open(path)
        .unwrap()
        .set_len(len)
        .unwrap();
}

#[test]
fn test_append_past_size_limit_rejected() {
    let harness = TestHarness::new();
    let path = harness.file("huge.wav");
    let len = u32::MAX as u64 + 7;
    sparse_capture(&path, len);

    let mut writer = StreamingWavWriter::open_existing(&path).unwrap();
    assert_eq!(writer.data_len(), len - 44);
    assert!(inspect(&path).unwrap().sizes_match(len));

    let err = writer.append_all(&[1, 2]).unwrap_err();
    assert!(
        matches!(err, WavError::DataTooLarge { bytes } if bytes == len + 4 - 44),
        "got {:?}",
        err
    );
    assert_eq!(err.code(), "WAV_007");

    // Nothing was written and the writer is still usable.
    assert_eq!(fs::metadata(&path).unwrap().len(), len);
    assert!(inspect(&path).unwrap().sizes_match(len));
    writer.truncate_tail(1000).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), len - 88200);
    writer.close().unwrap();
}

#[test]
fn test_open_oversized_file_rejected() {
    let harness = TestHarness::new();
    let path = harness.file("oversized.wav");
    let len = u32::MAX as u64 + 10;
    sparse_capture(&path, len);

    let err = StreamingWavWriter::open_existing(&path).unwrap_err();
    assert!(
        matches!(err, WavError::DataTooLarge { bytes } if bytes == len - 44),
        "got {:?}",
        err
    );
    assert_eq!(fs::metadata(&path).unwrap().len(), len);
}
