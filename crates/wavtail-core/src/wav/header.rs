//! Canonical 44-byte RIFF/WAVE header encoding and decoding.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::format::WavFormat;
use crate::error::{WavError, WavResult};

/// Length of the canonical header in bytes.
pub const HEADER_LEN: usize = 44;

/// Offset of the RIFF chunk size field (`file length - 8`).
pub const RIFF_SIZE_OFFSET: u64 = 4;

/// Offset of the data subchunk size field (`file length - 44`).
pub const DATA_SIZE_OFFSET: u64 = 40;

/// Size of the PCM fmt subchunk.
const FMT_CHUNK_SIZE: u32 = 16;

/// Audio format code for integer PCM.
const AUDIO_FORMAT_PCM: u16 = 1;

/// Decoded header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderInfo {
    /// RIFF chunk size (offset 4).
    pub riff_size: u32,
    /// fmt subchunk size (offset 16).
    pub fmt_size: u32,
    /// Audio format code (offset 20).
    pub audio_format: u16,
    /// Channel count (offset 22).
    pub channels: u16,
    /// Sample rate in Hz (offset 24).
    pub sample_rate: u32,
    /// Byte rate (offset 28).
    pub byte_rate: u32,
    /// Block align (offset 32).
    pub block_align: u16,
    /// Bits per sample (offset 34).
    pub bits_per_sample: u16,
    /// Data subchunk size (offset 40).
    pub data_size: u32,
}

impl HeaderInfo {
    /// Number of samples declared by the data size field.
    pub fn num_samples(&self) -> u64 {
        if self.block_align == 0 {
            return 0;
        }
        u64::from(self.data_size) / u64::from(self.block_align)
    }

    /// Declared duration in milliseconds.
    pub fn duration_millis(&self) -> u64 {
        if self.byte_rate == 0 {
            return 0;
        }
        u64::from(self.data_size) * 1000 / u64::from(self.byte_rate)
    }

    /// Whether both size fields agree with an actual file length.
    pub fn sizes_match(&self, file_len: u64) -> bool {
        file_len >= HEADER_LEN as u64
            && u64::from(self.riff_size) == file_len - 8
            && u64::from(self.data_size) == file_len - HEADER_LEN as u64
    }
}

/// Encodes the header for `data_len` bytes of audio.
///
/// A freshly created file is written with `data_len == 0`; the size fields
/// are patched after every mutation.
pub fn encode_header(format: &WavFormat, data_len: u32) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    let riff_size = data_len.saturating_add(HEADER_LEN as u32 - 8);

    // RIFF header
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&riff_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
    header[20..22].copy_from_slice(&AUDIO_FORMAT_PCM.to_le_bytes());
    header[22..24].copy_from_slice(&format.channels.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&format.byte_rate().to_le_bytes());
    header[32..34].copy_from_slice(&format.block_align().to_le_bytes());
    header[34..36].copy_from_slice(&format.bits_per_sample.to_le_bytes());

    // data chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_len.to_le_bytes());

    header
}

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn expect_marker(bytes: &[u8], offset: usize, marker: &[u8; 4]) -> WavResult<()> {
    let found = &bytes[offset..offset + 4];
    if found != marker {
        return Err(WavError::invalid_header(
            offset,
            format!(
                "expected '{}', got {:?}",
                String::from_utf8_lossy(marker),
                found
            ),
        ));
    }
    Ok(())
}

fn expect_field<T: PartialEq + std::fmt::Display>(
    offset: usize,
    name: &str,
    found: T,
    expected: T,
) -> WavResult<()> {
    if found != expected {
        return Err(WavError::invalid_header(
            offset,
            format!("{name} is {found}, expected {expected}"),
        ));
    }
    Ok(())
}

/// Parses a canonical header written in the capture format.
///
/// Only the exact layout produced by [`encode_header`] is accepted: the
/// "fmt " subchunk must directly follow "WAVE" and "data" must start at
/// offset 36. The size fields are returned as found, unchecked.
pub fn parse_header(bytes: &[u8]) -> WavResult<HeaderInfo> {
    if bytes.len() < HEADER_LEN {
        return Err(WavError::invalid_header(
            bytes.len(),
            format!(
                "file too short: {} bytes (minimum {} required)",
                bytes.len(),
                HEADER_LEN
            ),
        ));
    }

    expect_marker(bytes, 0, b"RIFF")?;
    expect_marker(bytes, 8, b"WAVE")?;
    expect_marker(bytes, 12, b"fmt ")?;
    expect_marker(bytes, 36, b"data")?;

    let info = HeaderInfo {
        riff_size: u32_at(bytes, 4),
        fmt_size: u32_at(bytes, 16),
        audio_format: u16_at(bytes, 20),
        channels: u16_at(bytes, 22),
        sample_rate: u32_at(bytes, 24),
        byte_rate: u32_at(bytes, 28),
        block_align: u16_at(bytes, 32),
        bits_per_sample: u16_at(bytes, 34),
        data_size: u32_at(bytes, 40),
    };

    let format = WavFormat::CAPTURE;
    expect_field(16, "fmt chunk size", info.fmt_size, FMT_CHUNK_SIZE)?;
    expect_field(20, "audio format", info.audio_format, AUDIO_FORMAT_PCM)?;
    expect_field(22, "channel count", info.channels, format.channels)?;
    expect_field(24, "sample rate", info.sample_rate, format.sample_rate)?;
    expect_field(28, "byte rate", info.byte_rate, format.byte_rate())?;
    expect_field(32, "block align", info.block_align, format.block_align())?;
    expect_field(
        34,
        "bits per sample",
        info.bits_per_sample,
        format.bits_per_sample,
    )?;

    Ok(info)
}

/// Reads and parses the header of a file on disk.
pub fn inspect(path: impl AsRef<Path>) -> WavResult<HeaderInfo> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|source| WavError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut bytes = Vec::with_capacity(HEADER_LEN);
    file.by_ref()
        .take(HEADER_LEN as u64)
        .read_to_end(&mut bytes)?;
    parse_header(&bytes)
}
