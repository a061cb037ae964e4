//! wavtail core
//!
//! Streaming capture of mono 16-bit PCM into canonical RIFF/WAVE files.
//!
//! # Overview
//!
//! Audio arrives in bursts. Each burst is appended to the file and the two
//! RIFF size fields are patched immediately, so the file is playable by any
//! WAV reader at every point of a capture. A trailing duration can be cut off
//! in place (to drop the click of a stop button) without rewriting the data.
//!
//! # Example
//!
//! ```no_run
//! use wavtail_core::wav::StreamingWavWriter;
//!
//! let mut writer = StreamingWavWriter::create("take.wav")?;
//! writer.append_all(&[0, 1200, -1200, 0])?;
//! writer.truncate_tail(600)?;
//! writer.close()?;
//! # Ok::<(), wavtail_core::WavError>(())
//! ```
//!
//! # Crate Structure
//!
//! - [`wav`] - Streaming writer, header codec and PCM helpers
//! - [`recorder`] - Capture sessions serialized on a worker thread
//! - [`config`] - Recorder configuration
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod recorder;
pub mod wav;

pub use config::RecorderConfig;
pub use error::{WavError, WavResult};
pub use recorder::{Recorder, RecorderError, RecordingSummary};
pub use wav::StreamingWavWriter;
