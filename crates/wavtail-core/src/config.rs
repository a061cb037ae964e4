//! Recorder configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default tail trimmed on stop, in milliseconds.
pub const DEFAULT_END_MARGIN_MS: u64 = 600;

/// Default maximum recording length, in milliseconds.
pub const DEFAULT_MAX_DURATION_MS: u64 = 15_000;

/// Errors that can occur while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config is not valid JSON for [`RecorderConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds an unusable value.
    #[error("invalid config field '{field}': {message}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// Error message.
        message: String,
    },
}

/// Settings for a [`Recorder`](crate::recorder::Recorder) session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecorderConfig {
    /// WAV file written by each session. Its parent directory must exist.
    pub output_path: PathBuf,
    /// Audio discarded right after start (covers the start cue).
    #[serde(default)]
    pub lead_in_ms: u64,
    /// Audio trimmed from the tail on stop (covers the stop click).
    #[serde(default = "default_end_margin_ms")]
    pub end_margin_ms: u64,
    /// Session length after which recording stops on its own. 0 disables.
    #[serde(default = "default_max_duration_ms")]
    pub max_duration_ms: u64,
}

fn default_end_margin_ms() -> u64 {
    DEFAULT_END_MARGIN_MS
}

fn default_max_duration_ms() -> u64 {
    DEFAULT_MAX_DURATION_MS
}

impl RecorderConfig {
    /// Creates a config with default margins for `output_path`.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            lead_in_ms: 0,
            end_margin_ms: DEFAULT_END_MARGIN_MS,
            max_duration_ms: DEFAULT_MAX_DURATION_MS,
        }
    }

    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks field values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "output_path",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
