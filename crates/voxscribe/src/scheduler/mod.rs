//! Single-worker scheduler driving jobs from `Pending` to a terminal state.
//!
//! One job is processed at a time. Submission only enqueues and wakes the
//! worker; callers learn outcomes by polling the [`StatusReporter`].
//!
//! [`StatusReporter`]: crate::status::StatusReporter

pub mod progress;

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::QueueConfig;
use crate::content::ContentStore;
use crate::error::{ContentStoreError, SchedulerError, ValidationError};
use crate::job::{Job, JobStatus, Language};
use crate::provider::{ProviderError, TranscriptionProvider};
use crate::sanitize;
use crate::store::JobStore;
use crate::validator::AudioValidator;

pub use progress::ProgressTicker;

/// Collaborators the scheduler needs.
pub struct SchedulerDeps {
    pub store: Arc<JobStore>,
    pub validator: AudioValidator,
    pub provider: Arc<dyn TranscriptionProvider>,
    pub content: Arc<dyn ContentStore>,
}

impl SchedulerDeps {
    /// Builds the validator from `config` so its size limit matches the file.
    pub fn from_config(
        config: &QueueConfig,
        store: Arc<JobStore>,
        provider: Arc<dyn TranscriptionProvider>,
        content: Arc<dyn ContentStore>,
    ) -> Self {
        Self {
            store,
            validator: AudioValidator::from_config(config),
            provider,
            content,
        }
    }
}

/// Why one attempt of a job failed.
#[derive(Debug)]
pub enum JobFailure {
    Validation(ValidationError),
    Provider(ProviderError),
    /// The transcript was produced but could not be saved.
    Persistence(ContentStoreError),
}

impl JobFailure {
    /// Only transient provider errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            JobFailure::Provider(e) => e.is_retryable(),
            JobFailure::Validation(_) | JobFailure::Persistence(_) => false,
        }
    }
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobFailure::Validation(e) => write!(f, "{}", e),
            JobFailure::Provider(e) => write!(f, "{}", e),
            JobFailure::Persistence(e) => write!(f, "Failed to save transcript: {}", e),
        }
    }
}

/// What a single [`JobScheduler::run_cycle`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No pending job was found.
    Idle,
    /// Another cycle already holds the in-flight slot.
    Busy,
    /// One attempt of the given job ran to a decision.
    Processed { job_id: String, status: JobStatus },
}

struct Settings {
    max_attempts: u32,
    initial_progress: u8,
    validated_progress: u8,
    progress_interval: Duration,
    progress_step: u8,
    progress_ceiling: u8,
    cycle_delay: Duration,
}

impl From<&QueueConfig> for Settings {
    fn from(config: &QueueConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_progress: config.initial_progress,
            validated_progress: config.validated_progress,
            progress_interval: config.progress_interval(),
            progress_step: config.progress_step,
            progress_ceiling: config.progress_ceiling,
            cycle_delay: config.cycle_delay(),
        }
    }
}

struct Inner {
    settings: Settings,
    store: Arc<JobStore>,
    validator: AudioValidator,
    provider: Arc<dyn TranscriptionProvider>,
    content: Arc<dyn ContentStore>,
    in_flight: Mutex<Option<String>>,
    wake: Notify,
    shutdown: AtomicBool,
}

impl Inner {
    fn in_flight(&self) -> MutexGuard<'_, Option<String>> {
        match self.in_flight.lock() {
            Ok(g) => g,
            Err(poisoned) => {
                warn!("In-flight guard lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

/// Clears the in-flight slot when the attempt ends, however it ends.
struct InFlightGuard<'a> {
    inner: &'a Inner,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        *self.inner.in_flight() = None;
    }
}

/// Cloneable handle to the transcription queue's worker.
#[derive(Clone)]
pub struct JobScheduler {
    inner: Arc<Inner>,
}

impl JobScheduler {
    pub fn new(config: &QueueConfig, deps: SchedulerDeps) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings: Settings::from(config),
                store: deps.store,
                validator: deps.validator,
                provider: deps.provider,
                content: deps.content,
                in_flight: Mutex::new(None),
                wake: Notify::new(),
                shutdown: AtomicBool::new(false),
            }),
        }
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.inner.store
    }

    /// Enqueues a job and wakes the worker. Never waits for processing.
    pub fn submit(
        &self,
        content_id: &str,
        file_path: impl Into<PathBuf>,
        language_hint: Language,
    ) -> Result<String, SchedulerError> {
        if self.inner.shutdown.load(Ordering::Acquire) {
            return Err(SchedulerError::ShutDown);
        }

        let job = Job::new(
            content_id,
            file_path.into(),
            language_hint,
            self.inner.settings.max_attempts,
        );
        let job = self.inner.store.insert(job);

        info!(
            job_id = %job.id,
            content_id = %job.content_id,
            file = %sanitize::redact_path(&job.file_path),
            pending = self.inner.store.count_with_status(JobStatus::Pending),
            "Added transcript job"
        );

        self.inner.wake.notify_one();
        Ok(job.id)
    }

    /// Spawns the worker task on the current tokio runtime.
    ///
    /// After an attempt the worker waits `cycleDelayMs` before looking for the
    /// next job; when the queue is empty it sleeps until the next submission.
    pub fn start(&self) -> JoinHandle<()> {
        let scheduler = self.clone();

        tokio::spawn(async move {
            info!(
                provider = scheduler.inner.provider.name(),
                max_file_size = scheduler.inner.validator.max_file_size(),
                "Transcription worker started"
            );

            loop {
                if scheduler.is_shut_down() {
                    break;
                }

                match scheduler.run_cycle().await {
                    CycleOutcome::Idle => scheduler.inner.wake.notified().await,
                    CycleOutcome::Busy | CycleOutcome::Processed { .. } => {
                        tokio::select! {
                            _ = tokio::time::sleep(scheduler.inner.settings.cycle_delay) => {}
                            _ = scheduler.wait_for_shutdown() => {}
                        }
                    }
                }
            }

            info!("Transcription worker stopped");
        })
    }

    /// Stops the worker after its current cycle and rejects new submissions.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::Release);
        self.inner.wake.notify_waiters();
        self.inner.wake.notify_one();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.load(Ordering::Acquire)
    }

    async fn wait_for_shutdown(&self) {
        while !self.is_shut_down() {
            self.inner.wake.notified().await;
        }
    }

    /// Runs one attempt of the next pending job, if the slot is free.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let inner = &*self.inner;

        let (job, _guard) = {
            let mut slot = inner.in_flight();
            if slot.is_some() {
                return CycleOutcome::Busy;
            }
            let Some(next) = inner.store.find_next_pending() else {
                return CycleOutcome::Idle;
            };

            let started = inner.store.update(&next.id, |job| {
                job.status = JobStatus::Processing;
                job.attempts += 1;
                job.progress = inner.settings.initial_progress;
            });
            let Some(job) = started else {
                return CycleOutcome::Idle;
            };

            *slot = Some(job.id.clone());
            (job, InFlightGuard { inner })
        };

        let span = info_span!(
            "transcription_job",
            job_id = %job.id,
            content_id = %job.content_id,
            file = %sanitize::redact_path(&job.file_path),
            attempt = job.attempts,
        );

        let status = self.process(&job).instrument(span).await;

        CycleOutcome::Processed {
            job_id: job.id,
            status,
        }
    }

    async fn process(&self, job: &Job) -> JobStatus {
        info!(
            "Processing transcript job (attempt {}/{})",
            job.attempts, job.max_attempts
        );

        match self.attempt(job).await {
            Ok(()) => {
                self.inner.store.update(&job.id, |j| {
                    j.status = JobStatus::Completed;
                    j.processed_at = Some(Utc::now());
                    j.progress = 100;
                    j.error = None;
                });
                info!("Transcript job completed");
                JobStatus::Completed
            }
            Err(failure) => self.handle_failure(job, failure).await,
        }
    }

    async fn attempt(&self, job: &Job) -> Result<(), JobFailure> {
        let inner = &*self.inner;

        let audio = inner
            .validator
            .validate(&job.file_path)
            .await
            .map_err(JobFailure::Validation)?;
        debug!(file_size = audio.file_size, "Audio file validated");

        let validated = inner.settings.validated_progress;
        inner.store.update(&job.id, |j| {
            j.progress = j.progress.max(validated);
        });

        let ticker = ProgressTicker::start(
            Arc::clone(&inner.store),
            job.id.clone(),
            inner.settings.progress_interval,
            inner.settings.progress_step,
            inner.settings.progress_ceiling,
        );

        let result = inner
            .provider
            .transcribe(&job.file_path, job.language_hint)
            .await;
        ticker.stop();

        let transcription = result.map_err(JobFailure::Provider)?;
        debug!(
            language = %transcription.language,
            processing_ms = transcription.processing_time.as_millis() as u64,
            "Transcription received"
        );

        inner
            .content
            .update_content_transcript(
                &job.content_id,
                &transcription.transcript,
                transcription.language,
            )
            .await
            .map_err(JobFailure::Persistence)?;

        Ok(())
    }

    async fn handle_failure(&self, job: &Job, failure: JobFailure) -> JobStatus {
        let inner = &*self.inner;
        let message = failure.to_string();
        let retry = failure.is_retryable() && job.has_attempts_left();

        error!(error = %message, retryable = failure.is_retryable(), "Transcript attempt failed");

        let status = if retry {
            JobStatus::Pending
        } else {
            JobStatus::Failed
        };
        inner.store.update(&job.id, |j| {
            j.error = Some(message);
            j.status = status;
        });

        if retry {
            info!(
                "Retrying transcript job (attempt {}/{})",
                job.attempts + 1,
                job.max_attempts
            );
            return status;
        }

        if let Err(e) = inner.content.mark_content_unprocessed(&job.content_id).await {
            error!(error = %e, "Failed to mark content unprocessed");
        }
        error!("Transcript job failed permanently");
        status
    }
}
