use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoxscribeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transcription error: {0}")]
    Provider(#[from] crate::provider::ProviderError),

    #[error("Content store error: {0}")]
    Content(#[from] ContentStoreError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Secret error: {0}")]
    Secret(#[from] crate::secrets::SecretError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

/// Reasons an audio file is rejected before it reaches the provider.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Cannot access audio file '{path}': {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Audio path is not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("File too large (max {}MB): {size} bytes", .max / (1024 * 1024))]
    TooLarge { path: PathBuf, size: u64, max: u64 },
}

#[derive(Error, Debug)]
pub enum ContentStoreError {
    #[error("Content not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] crate::db::DatabaseError),
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter '{directive}': {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("A global subscriber is already installed")]
    AlreadyInitialized,
}

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Scheduler has been shut down")]
    ShutDown,
}

pub type Result<T> = std::result::Result<T, VoxscribeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_large_message_mentions_limit() {
        let err = ValidationError::TooLarge {
            path: PathBuf::from("/uploads/big.mp3"),
            size: 30 * 1024 * 1024,
            max: 25 * 1024 * 1024,
        };
        let msg = err.to_string();
        assert!(msg.contains("too large"));
        assert!(msg.contains("max 25MB"));
    }

    #[test]
    fn test_wraps_into_top_level_error() {
        let err: VoxscribeError = SchedulerError::ShutDown.into();
        assert!(matches!(err, VoxscribeError::Scheduler(SchedulerError::ShutDown)));
        assert_eq!(
            err.to_string(),
            "Scheduler error: Scheduler has been shut down"
        );
    }
}
