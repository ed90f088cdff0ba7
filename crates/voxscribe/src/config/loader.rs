use std::path::Path;

use crate::config::schema::{QueueConfig, MAX_RETENTION_HOURS};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../schema/queue-config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<QueueConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<QueueConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: QueueConfig = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

/// Cross-field checks the schema cannot express.
pub fn validate_config(config: &QueueConfig) -> Result<(), ConfigError> {
    if config.max_attempts == 0 {
        return Err(ConfigError::Validation {
            message: "maxAttempts must be at least 1".to_string(),
        });
    }

    if config.progress_ceiling >= 100 {
        return Err(ConfigError::Validation {
            message: "progressCeiling must stay below 100".to_string(),
        });
    }

    if config.progress_step == 0 {
        return Err(ConfigError::Validation {
            message: "progressStep must be at least 1".to_string(),
        });
    }

    if config.initial_progress > config.validated_progress
        || config.validated_progress > config.progress_ceiling
    {
        return Err(ConfigError::Validation {
            message: format!(
                "progress milestones must be ordered: initialProgress ({}) <= validatedProgress ({}) <= progressCeiling ({})",
                config.initial_progress, config.validated_progress, config.progress_ceiling
            ),
        });
    }

    if config.progress_interval_ms == 0 || config.reap_interval_secs == 0 {
        return Err(ConfigError::Validation {
            message: "progressIntervalMs and reapIntervalSecs must be non-zero".to_string(),
        });
    }

    if config.retention_hours == 0 || config.retention_hours > MAX_RETENTION_HOURS {
        return Err(ConfigError::Validation {
            message: format!(
                "retentionHours must be between 1 and {}",
                MAX_RETENTION_HOURS
            ),
        });
    }

    Ok(())
}
