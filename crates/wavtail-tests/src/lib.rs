//! wavtail Integration Test Infrastructure
//!
//! Checks capture files the way an outside reader would: a strict chunk
//! walker ([`format_validators`]) and the `hound` decoder both have to accept
//! every file the writer leaves on disk.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p wavtail-tests
//! ```

pub mod format_validators;
pub mod harness;

pub use format_validators::{validate_wav, FormatError, WavInfo};
pub use harness::TestHarness;
