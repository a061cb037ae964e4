//! Streaming mono 16-bit PCM WAV writer.
//!
//! The file on disk is a valid canonical WAV after every completed call: the
//! 44-byte header is written once and its two size fields are patched from
//! the file's real length after each append or tail trim.

mod format;
mod header;
mod pcm;
mod writer;


// Re-export public API
pub use format::{WavFormat, BITS_PER_SAMPLE, SAMPLE_RATE};
pub use header::{
    encode_header, inspect, parse_header, HeaderInfo, DATA_SIZE_OFFSET, HEADER_LEN,
    RIFF_SIZE_OFFSET,
};
pub use pcm::{bytes_to_pcm16, compute_pcm_hash, extract_pcm_data, pcm16_to_bytes};
pub use writer::StreamingWavWriter;
