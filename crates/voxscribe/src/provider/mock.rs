//! Placeholder provider used when no API key is configured.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;

use super::{ProviderError, Transcription, TranscriptionProvider};
use crate::job::Language;

pub struct MockProvider {
    delay: Duration,
}

impl MockProvider {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[async_trait]
impl TranscriptionProvider for MockProvider {
    async fn transcribe(
        &self,
        _path: &Path,
        language_hint: Language,
    ) -> Result<Transcription, ProviderError> {
        let started = Instant::now();
        tokio::time::sleep(self.delay).await;

        Ok(Transcription {
            transcript: format!(
                "Mock transcript generated at {}. This is placeholder text.",
                Utc::now().to_rfc3339()
            ),
            language: language_hint,
            confidence: None,
            processing_time: started.elapsed(),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
