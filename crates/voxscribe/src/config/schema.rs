use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::validator::DEFAULT_MAX_FILE_SIZE;

/// Upper bound on `retentionHours`: one year.
pub const MAX_RETENTION_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
    #[serde(default = "default_progress_step")]
    pub progress_step: u8,
    #[serde(default = "default_progress_ceiling")]
    pub progress_ceiling: u8,
    #[serde(default = "default_initial_progress")]
    pub initial_progress: u8,
    #[serde(default = "default_validated_progress")]
    pub validated_progress: u8,
    #[serde(default = "default_cycle_delay_ms")]
    pub cycle_delay_ms: u64,
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,
    #[serde(default = "default_reap_interval_secs")]
    pub reap_interval_secs: u64,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_progress_interval_ms() -> u64 {
    1000
}

fn default_progress_step() -> u8 {
    5
}

fn default_progress_ceiling() -> u8 {
    90
}

fn default_initial_progress() -> u8 {
    5
}

fn default_validated_progress() -> u8 {
    10
}

fn default_cycle_delay_ms() -> u64 {
    1000
}

fn default_retention_hours() -> u64 {
    24
}

fn default_reap_interval_secs() -> u64 {
    60 * 60
}

impl QueueConfig {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn cycle_delay(&self) -> Duration {
        Duration::from_millis(self.cycle_delay_ms)
    }

    /// Saturates at [`MAX_RETENTION_HOURS`]; loaded configs never exceed it.
    pub fn retention(&self) -> chrono::Duration {
        let hours = i64::try_from(self.retention_hours.min(MAX_RETENTION_HOURS))
            .unwrap_or(MAX_RETENTION_HOURS as i64);
        chrono::Duration::try_hours(hours).unwrap_or(chrono::Duration::MAX)
    }

    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval_secs)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            max_file_size_bytes: default_max_file_size(),
            progress_interval_ms: default_progress_interval_ms(),
            progress_step: default_progress_step(),
            progress_ceiling: default_progress_ceiling(),
            initial_progress: default_initial_progress(),
            validated_progress: default_validated_progress(),
            cycle_delay_ms: default_cycle_delay_ms(),
            retention_hours: default_retention_hours(),
            reap_interval_secs: default_reap_interval_secs(),
            provider: ProviderConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Whisper,
    Mock,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Inline key, for local testing only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_file: Option<String>,
    #[serde(default = "default_api_key_env_var")]
    pub api_key_env_var: Option<String>,
    #[serde(default = "default_mock_delay_ms")]
    pub mock_delay_ms: u64,
    /// No timeout unless set; the provider's own behavior applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "whisper-1".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_api_key_env_var() -> Option<String> {
    Some("OPENAI_API_KEY".to_string())
}

fn default_mock_delay_ms() -> u64 {
    5000
}

impl ProviderConfig {
    pub fn mock_delay(&self) -> Duration {
        Duration::from_millis(self.mock_delay_ms)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            api_key: None,
            api_key_file: None,
            api_key_env_var: default_api_key_env_var(),
            mock_delay_ms: default_mock_delay_ms(),
            request_timeout_secs: None,
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .field("api_key_file", &self.api_key_file)
            .field("api_key_env_var", &self.api_key_env_var)
            .field("mock_delay_ms", &self.mock_delay_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("data").join("voxscribe.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
