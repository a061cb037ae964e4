//! Error types for the WAV writer.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for WAV operations.
pub type WavResult<T> = Result<T, WavError>;

/// Errors that can occur while writing or inspecting a WAV file.
#[derive(Debug, Error)]
pub enum WavError {
    /// The target path could not be created, opened or truncated.
    #[error("failed to open '{}': {source}", path.display())]
    Open {
        /// Path that was being opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A read, write, seek or size-field patch failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An argument was rejected before any mutation took place.
    #[error("invalid argument '{name}': {message}")]
    InvalidArgument {
        /// Argument name.
        name: &'static str,
        /// Error message.
        message: String,
    },

    /// The writer has already been closed.
    #[error("writer closed")]
    Closed,

    /// A previous failure left the size fields unrepaired.
    #[error("writer poisoned by an earlier unrecoverable I/O failure")]
    Poisoned,

    /// The file does not carry the expected header.
    #[error("invalid WAV header at offset {offset}: {message}")]
    InvalidHeader {
        /// Byte offset of the offending field.
        offset: usize,
        /// Error message.
        message: String,
    },

    /// The data region would overflow the 32-bit RIFF size fields.
    #[error("data region of {bytes} bytes exceeds the RIFF size limit")]
    DataTooLarge {
        /// Requested data length in bytes.
        bytes: u64,
    },
}

impl WavError {
    /// Creates an invalid argument error.
    pub fn invalid_arg(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            message: message.into(),
        }
    }

    /// Creates an invalid header error.
    pub fn invalid_header(offset: usize, message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            offset,
            message: message.into(),
        }
    }

    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            WavError::Open { .. } => "WAV_001",
            WavError::Io(_) => "WAV_002",
            WavError::InvalidArgument { .. } => "WAV_003",
            WavError::Closed => "WAV_004",
            WavError::Poisoned => "WAV_005",
            WavError::InvalidHeader { .. } => "WAV_006",
            WavError::DataTooLarge { .. } => "WAV_007",
        }
    }

    /// Returns true if the writer that produced this error should be discarded.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            WavError::Open { .. } | WavError::Io(_) | WavError::Poisoned
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_arg_helper() {
        let err = WavError::invalid_arg("count", "exceeds buffer length");
        assert!(err.to_string().contains("count"));
        assert!(err.to_string().contains("exceeds buffer length"));
        assert_eq!(err.code(), "WAV_003");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_open_error_mentions_path() {
        let err = WavError::Open {
            path: PathBuf::from("/no/such/dir/take.wav"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/no/such/dir/take.wav"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_codes_are_unique() {
        let errors = [
            WavError::Open {
                path: PathBuf::new(),
                source: std::io::Error::other("x"),
            },
            WavError::Io(std::io::Error::other("x")),
            WavError::invalid_arg("a", "b"),
            WavError::Closed,
            WavError::Poisoned,
            WavError::invalid_header(0, "bad"),
            WavError::DataTooLarge { bytes: 0 },
        ];
        let mut codes: Vec<_> = errors.iter().map(WavError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
