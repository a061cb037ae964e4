//! Independent RIFF/WAVE validator for test infrastructure.
//!
//! Walks the chunk list generically instead of assuming the canonical
//! 44-byte layout, so it checks captures the way a third-party reader would.

use std::fmt;

/// Error type for format validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    /// Description of what went wrong.
    pub message: String,
    /// Byte offset where the error occurred, if applicable.
    pub offset: Option<usize>,
}

impl FormatError {
    /// Create a new format error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offset: None,
        }
    }

    /// Create a format error with a byte offset.
    pub fn at_offset(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset: Some(offset),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "WAV error at offset {}: {}", offset, self.message),
            None => write!(f, "WAV error: {}", self.message),
        }
    }
}

impl std::error::Error for FormatError {}

/// Information extracted from a WAV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavInfo {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample.
    pub bits_per_sample: u16,
    /// Audio format code (1 = PCM).
    pub audio_format: u16,
    /// Byte rate declared in the fmt chunk.
    pub byte_rate: u32,
    /// Block alignment declared in the fmt chunk.
    pub block_align: u16,
    /// Value of the RIFF size field.
    pub riff_size: u32,
    /// Offset of the first data byte.
    pub data_offset: usize,
    /// Length of the data chunk in bytes.
    pub data_len: usize,
    /// Number of samples per channel.
    pub num_samples: usize,
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Validate a WAV file strictly.
///
/// Beyond the markers, this checks that the RIFF size equals the file length
/// minus 8, that the data chunk ends exactly at end of file, that derived fmt
/// fields are consistent, and that the data holds whole sample frames.
pub fn validate_wav(data: &[u8]) -> Result<WavInfo, FormatError> {
    const MIN_HEADER_SIZE: usize = 44;

    if data.len() < MIN_HEADER_SIZE {
        return Err(FormatError::new(format!(
            "File too short: {} bytes (minimum {} required)",
            data.len(),
            MIN_HEADER_SIZE
        )));
    }
    if &data[0..4] != b"RIFF" {
        return Err(FormatError::at_offset("Invalid RIFF header", 0));
    }
    if &data[8..12] != b"WAVE" {
        return Err(FormatError::at_offset("Invalid WAVE format", 8));
    }

    let riff_size = read_u32(data, 4);
    if riff_size as usize != data.len() - 8 {
        return Err(FormatError::at_offset(
            format!(
                "RIFF size {} does not match file length {} - 8",
                riff_size,
                data.len()
            ),
            4,
        ));
    }

    let mut offset = 12;
    let mut fmt: Option<(u16, u16, u32, u32, u16, u16)> = None;

    while offset + 8 <= data.len() {
        let chunk_id = &data[offset..offset + 4];
        let chunk_size = read_u32(data, offset + 4) as usize;

        if chunk_id == b"fmt " {
            if chunk_size < 16 || offset + 8 + 16 > data.len() {
                return Err(FormatError::at_offset("Truncated fmt chunk", offset));
            }
            let f = offset + 8;
            fmt = Some((
                read_u16(data, f),
                read_u16(data, f + 2),
                read_u32(data, f + 4),
                read_u32(data, f + 8),
                read_u16(data, f + 12),
                read_u16(data, f + 14),
            ));
        }

        if chunk_id == b"data" {
            let Some((audio_format, channels, sample_rate, byte_rate, block_align, bits)) = fmt
            else {
                return Err(FormatError::at_offset(
                    "data chunk found before fmt chunk",
                    offset,
                ));
            };

            let data_offset = offset + 8;
            if data_offset + chunk_size != data.len() {
                return Err(FormatError::at_offset(
                    format!(
                        "data chunk declares {} bytes, file holds {}",
                        chunk_size,
                        data.len() - data_offset
                    ),
                    offset + 4,
                ));
            }
            if block_align == 0 || block_align != channels * bits / 8 {
                return Err(FormatError::new("Inconsistent block align"));
            }
            if byte_rate != sample_rate * u32::from(block_align) {
                return Err(FormatError::new("Inconsistent byte rate"));
            }
            if chunk_size % usize::from(block_align) != 0 {
                return Err(FormatError::new("Data ends mid-frame"));
            }

            return Ok(WavInfo {
                channels,
                sample_rate,
                bits_per_sample: bits,
                audio_format,
                byte_rate,
                block_align,
                riff_size,
                data_offset,
                data_len: chunk_size,
                num_samples: chunk_size / usize::from(block_align),
            });
        }

        // Move to next chunk (chunks are word-aligned)
        let padded_size = (chunk_size + 1) & !1;
        offset += 8 + padded_size;
    }

    if fmt.is_none() {
        return Err(FormatError::new("Missing fmt chunk"));
    }
    Err(FormatError::new("Missing data chunk"))
}
