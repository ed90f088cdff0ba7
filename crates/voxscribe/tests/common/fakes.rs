//! In-memory stand-ins for the scheduler's external collaborators.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use voxscribe::error::ContentStoreError;
use voxscribe::provider::{ProviderError, ProviderErrorCode};
use voxscribe::{ContentStore, Language, Transcription, TranscriptionProvider};

/// One scripted provider response.
#[derive(Debug, Clone)]
pub enum Step {
    Succeed(String),
    Fail(ProviderError),
}

impl Step {
    pub fn rate_limited() -> Self {
        Step::Fail(
            ProviderError::new("Rate limit exceeded")
                .with_code(ProviderErrorCode::RateLimitExceeded)
                .with_status(429),
        )
    }

    pub fn invalid_key() -> Self {
        Step::Fail(
            ProviderError::new("Incorrect API key provided")
                .with_code(ProviderErrorCode::InvalidApiKey)
                .with_status(401),
        )
    }
}

/// Provider that replays a script, then succeeds with a default transcript.
pub struct FakeProvider {
    script: Mutex<VecDeque<Step>>,
    delay: Duration,
    calls: Mutex<Vec<PathBuf>>,
    active: AtomicUsize,
    peak_active: AtomicUsize,
}

impl FakeProvider {
    pub fn new(script: Vec<Step>) -> Self {
        Self::with_delay(script, Duration::from_millis(5))
    }

    pub fn with_delay(script: Vec<Step>, delay: Duration) -> Self {
        Self {
            script: Mutex::new(script.into()),
            delay,
            calls: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            peak_active: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Highest number of overlapping `transcribe` calls seen.
    pub fn peak_active(&self) -> usize {
        self.peak_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptionProvider for FakeProvider {
    async fn transcribe(
        &self,
        path: &Path,
        _language_hint: Language,
    ) -> Result<Transcription, ProviderError> {
        self.calls.lock().unwrap().push(path.to_path_buf());
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(now_active, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Step::Succeed("transcribed text".to_string()));
        self.active.fetch_sub(1, Ordering::SeqCst);

        match step {
            Step::Succeed(text) => Ok(Transcription {
                language: voxscribe::provider::detect_language(&text),
                transcript: text,
                confidence: Some(-0.2),
                processing_time: self.delay,
            }),
            Step::Fail(err) => Err(err),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Content store that records every write.
#[derive(Default)]
pub struct FakeContentStore {
    saved: Mutex<Vec<(String, String, Language)>>,
    unprocessed: Mutex<Vec<String>>,
    fail_saves: bool,
}

impl FakeContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose transcript writes always fail.
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn saved(&self) -> Vec<(String, String, Language)> {
        self.saved.lock().unwrap().clone()
    }

    pub fn unprocessed(&self) -> Vec<String> {
        self.unprocessed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentStore for FakeContentStore {
    async fn update_content_transcript(
        &self,
        content_id: &str,
        transcript: &str,
        language: Language,
    ) -> Result<(), ContentStoreError> {
        if self.fail_saves {
            return Err(ContentStoreError::NotFound(content_id.to_string()));
        }
        self.saved
            .lock()
            .unwrap()
            .push((content_id.to_string(), transcript.to_string(), language));
        Ok(())
    }

    async fn mark_content_unprocessed(&self, content_id: &str) -> Result<(), ContentStoreError> {
        self.unprocessed.lock().unwrap().push(content_id.to_string());
        Ok(())
    }
}
