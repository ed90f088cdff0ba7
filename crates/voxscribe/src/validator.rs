use std::path::Path;

use crate::config::QueueConfig;
use crate::error::ValidationError;

/// Whisper's own upload limit.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;

/// Details of an audio file that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAudio {
    pub file_size: u64,
}

/// Rejects unusable audio files before they reach the provider.
///
/// Only existence and size are checked; codec and duration are not inspected.
#[derive(Debug, Clone)]
pub struct AudioValidator {
    max_file_size: u64,
}

impl AudioValidator {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Uses the configured `maxFileSizeBytes`.
    pub fn from_config(config: &QueueConfig) -> Self {
        Self::new(config.max_file_size_bytes)
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub async fn validate(&self, path: &Path) -> Result<ValidatedAudio, ValidationError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ValidationError::Stat {
                path: path.to_path_buf(),
                source: e,
            })?;

        if !metadata.is_file() {
            return Err(ValidationError::NotAFile(path.to_path_buf()));
        }

        let size = metadata.len();
        if size > self.max_file_size {
            return Err(ValidationError::TooLarge {
                path: path.to_path_buf(),
                size,
                max: self.max_file_size,
            });
        }

        Ok(ValidatedAudio { file_size: size })
    }
}

impl Default for AudioValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}
