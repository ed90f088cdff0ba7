//! Speech-to-text provider contract and the adapters that implement it.

pub mod mock;
pub mod whisper;

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{ProviderConfig, ProviderKind};
use crate::job::Language;
use crate::secrets;

pub use mock::MockProvider;
pub use whisper::WhisperProvider;

/// A completed transcription.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub transcript: String,
    /// Language detected from the returned text, not the hint.
    pub language: Language,
    pub confidence: Option<f64>,
    pub processing_time: Duration,
}

/// Error codes a provider may report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderErrorCode {
    InvalidApiKey,
    FileTooLarge,
    UnsupportedFileType,
    InvalidFile,
    RateLimitExceeded,
    ServerError,
    Timeout,
    NetworkError,
    Other(String),
}

impl ProviderErrorCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "invalid_api_key" => Self::InvalidApiKey,
            "file_too_large" => Self::FileTooLarge,
            "unsupported_file_type" => Self::UnsupportedFileType,
            "invalid_file" => Self::InvalidFile,
            "rate_limit_exceeded" => Self::RateLimitExceeded,
            "server_error" => Self::ServerError,
            "timeout" => Self::Timeout,
            "network_error" => Self::NetworkError,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidApiKey => "invalid_api_key",
            Self::FileTooLarge => "file_too_large",
            Self::UnsupportedFileType => "unsupported_file_type",
            Self::InvalidFile => "invalid_file",
            Self::RateLimitExceeded => "rate_limit_exceeded",
            Self::ServerError => "server_error",
            Self::Timeout => "timeout",
            Self::NetworkError => "network_error",
            Self::Other(code) => code,
        }
    }

    /// `None` when the code alone does not decide retryability.
    fn retryable(&self) -> Option<bool> {
        match self {
            Self::InvalidApiKey | Self::FileTooLarge | Self::UnsupportedFileType | Self::InvalidFile => {
                Some(false)
            }
            Self::RateLimitExceeded | Self::ServerError | Self::Timeout | Self::NetworkError => {
                Some(true)
            }
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified transcription failure.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
    pub code: Option<ProviderErrorCode>,
    /// HTTP-style status reported by the provider, if any.
    pub status: Option<u16>,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            status: None,
        }
    }

    pub fn with_code(mut self, code: ProviderErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Known codes decide; otherwise only 5xx statuses are retried.
    pub fn is_retryable(&self) -> bool {
        if let Some(decided) = self.code.as_ref().and_then(ProviderErrorCode::retryable) {
            return decided;
        }
        self.status.is_some_and(|s| s >= 500)
    }
}

/// Black-box speech-to-text backend.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    async fn transcribe(
        &self,
        path: &Path,
        language_hint: Language,
    ) -> Result<Transcription, ProviderError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Classifies text as Farsi when it contains Arabic-script characters.
pub fn detect_language(text: &str) -> Language {
    let is_arabic_script = |c: char| {
        matches!(c,
            '\u{0600}'..='\u{06FF}'
            | '\u{0750}'..='\u{077F}'
            | '\u{FB50}'..='\u{FDFF}'
            | '\u{FE70}'..='\u{FEFF}')
    };

    if text.chars().any(is_arabic_script) {
        Language::Farsi
    } else {
        Language::English
    }
}

/// Builds the configured provider.
///
/// A `whisper` provider with no resolvable API key falls back to the mock
/// provider so uploads still complete with placeholder text.
pub fn build_provider(config: &ProviderConfig) -> crate::Result<Arc<dyn TranscriptionProvider>> {
    match config.kind {
        ProviderKind::Mock => Ok(Arc::new(MockProvider::new(config.mock_delay()))),
        ProviderKind::Whisper => match secrets::resolve_api_key(config)? {
            Some(api_key) => Ok(Arc::new(WhisperProvider::from_config(config, api_key)?)),
            None => {
                tracing::warn!(
                    "No speech-to-text API key configured; using mock transcription provider"
                );
                Ok(Arc::new(MockProvider::new(config.mock_delay())))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_retryable_codes() {
        for code in [
            "invalid_api_key",
            "file_too_large",
            "unsupported_file_type",
            "invalid_file",
        ] {
            // Even with a 5xx status the code wins.
            let err = ProviderError::new("boom")
                .with_code(ProviderErrorCode::parse(code))
                .with_status(503);
            assert!(!err.is_retryable(), "{} should not be retryable", code);
        }
    }

    #[test]
    fn test_retryable_codes() {
        for code in ["rate_limit_exceeded", "server_error", "timeout", "network_error"] {
            let err = ProviderError::new("boom").with_code(ProviderErrorCode::parse(code));
            assert!(err.is_retryable(), "{} should be retryable", code);
        }
    }

    #[test]
    fn test_unknown_code_falls_back_to_status() {
        let err = ProviderError::new("upstream")
            .with_code(ProviderErrorCode::parse("weird"))
            .with_status(502);
        assert!(err.is_retryable());

        let err = ProviderError::new("bad").with_status(400);
        assert!(!err.is_retryable());

        assert!(!ProviderError::new("no info").is_retryable());
    }

    #[test]
    fn test_code_round_trip_names() {
        assert_eq!(ProviderErrorCode::parse("timeout").as_str(), "timeout");
        assert_eq!(
            ProviderErrorCode::parse("something_else"),
            ProviderErrorCode::Other("something_else".to_string())
        );
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("Hello there"), Language::English);
        assert_eq!(detect_language("سلام دنیا"), Language::Farsi);
        assert_eq!(detect_language("mixed متن text"), Language::Farsi);
        assert_eq!(detect_language(""), Language::English);
        // Arabic presentation form
        assert_eq!(detect_language("\u{FEFB}"), Language::Farsi);
    }

    #[test]
    fn test_error_display_is_message() {
        let err = ProviderError::new("Rate limit exceeded").with_status(429);
        assert_eq!(err.to_string(), "Rate limit exceeded");
    }

    #[test]
    fn test_build_mock_provider() {
        let config = ProviderConfig {
            kind: ProviderKind::Mock,
            ..ProviderConfig::default()
        };
        assert_eq!(build_provider(&config).unwrap().name(), "mock");
    }

    #[test]
    fn test_build_whisper_with_direct_key() {
        let config = ProviderConfig {
            api_key: Some("sk-test".to_string()),
            ..ProviderConfig::default()
        };
        assert_eq!(build_provider(&config).unwrap().name(), "whisper");
    }

    #[test]
    fn test_whisper_without_key_falls_back_to_mock() {
        let config = ProviderConfig {
            api_key_env_var: Some("VOXSCRIBE_PROVIDER_TEST_UNSET_KEY".to_string()),
            ..ProviderConfig::default()
        };
        assert_eq!(build_provider(&config).unwrap().name(), "mock");
    }

    #[test]
    #[serial_test::serial]
    fn test_whisper_with_empty_env_key_falls_back_to_mock() {
        std::env::set_var("VOXSCRIBE_PROVIDER_TEST_EMPTY_KEY", "");
        let config = ProviderConfig {
            api_key_env_var: Some("VOXSCRIBE_PROVIDER_TEST_EMPTY_KEY".to_string()),
            ..ProviderConfig::default()
        };
        let name = build_provider(&config).unwrap().name();
        std::env::remove_var("VOXSCRIBE_PROVIDER_TEST_EMPTY_KEY");
        assert_eq!(name, "mock");
    }
}
