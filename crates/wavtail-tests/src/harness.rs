//! Test harness utilities for writing captures and validating outputs.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::format_validators::{validate_wav, FormatError, WavInfo};

/// A scratch directory for capture files.
pub struct TestHarness {
    /// Working directory for test outputs.
    pub work_dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness.
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().expect("Failed to create work dir"),
        }
    }

    /// Get the working directory path.
    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }

    /// Path of a file inside the working directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a WAV file on disk with the strict chunk walker.
pub fn validate_wav_file(path: &Path) -> Result<WavInfo, FormatError> {
    let data = fs::read(path)
        .map_err(|e| FormatError::new(format!("Failed to read file: {}", e)))?;
    validate_wav(&data)
}

/// Decode every sample of a WAV file with `hound`.
pub fn read_samples_with_hound(path: &Path) -> Vec<i16> {
    let mut reader = hound::WavReader::open(path).expect("hound failed to open WAV");
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);
    reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .expect("hound failed to decode samples")
}

/// Assert that `path` is a valid capture holding exactly `expected` samples.
pub fn assert_capture(path: &Path, expected: &[i16]) {
    let info = validate_wav_file(path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
    assert_eq!(info.num_samples, expected.len(), "sample count mismatch");
    assert_eq!(
        fs::metadata(path).unwrap().len(),
        44 + 2 * expected.len() as u64
    );
    assert_eq!(read_samples_with_hound(path), expected);
}

/// Header marker bytes at offsets 0, 8, 12 and 36.
pub fn assert_markers(path: &Path) {
    let data = fs::read(path).unwrap();
    assert_eq!(&data[0..4], b"RIFF");
    assert_eq!(&data[8..12], b"WAVE");
    assert_eq!(&data[12..16], b"fmt ");
    assert_eq!(&data[36..40], b"data");
}
