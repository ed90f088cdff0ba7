//! Test harness for isolated queue runs.
//!
//! The `TestHarness` struct owns a temporary upload directory and a queue
//! config tuned for millisecond timings, and wires a scheduler plus status
//! reporter around whichever provider and content store a test supplies.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use voxscribe::{
    ContentStore, JobScheduler, JobStatusView, JobStore, QueueConfig, SchedulerDeps,
    StatusReporter, TranscriptionProvider,
};

/// Isolated environment for one queue test.
pub struct TestHarness {
    temp_dir: TempDir,
    /// Directory audio fixtures are written into.
    pub upload_dir: PathBuf,
    pub config: QueueConfig,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let upload_dir = temp_dir.path().join("uploads");
        std::fs::create_dir_all(&upload_dir).expect("Failed to create upload dir");

        let config = QueueConfig {
            max_file_size_bytes: 64 * 1024,
            progress_interval_ms: 5,
            cycle_delay_ms: 5,
            ..QueueConfig::default()
        };

        Self {
            temp_dir,
            upload_dir,
            config,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes an audio file of `size` bytes and returns its path.
    pub fn write_audio(&self, name: &str, size: usize) -> PathBuf {
        let path = self.upload_dir.join(name);
        std::fs::write(&path, vec![0x49u8; size]).expect("Failed to write audio fixture");
        path
    }

    /// Builds a scheduler and a reporter sharing one job store.
    pub fn queue(
        &self,
        provider: Arc<dyn TranscriptionProvider>,
        content: Arc<dyn ContentStore>,
    ) -> (JobScheduler, StatusReporter) {
        let store = Arc::new(JobStore::new());
        let scheduler = JobScheduler::new(
            &self.config,
            SchedulerDeps::from_config(&self.config, Arc::clone(&store), provider, content),
        );
        (scheduler, StatusReporter::new(store))
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Polls until the job is completed or failed, panicking after `timeout`.
pub async fn wait_for_terminal(
    reporter: &StatusReporter,
    job_id: &str,
    timeout: Duration,
) -> JobStatusView {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(view) = reporter.get_status(job_id) {
            if view.status.is_terminal() {
                return view;
            }
        }
        if tokio::time::Instant::now() >= deadline {
            panic!(
                "job {} did not finish within {:?}: {:?}",
                job_id,
                timeout,
                reporter.get_status(job_id)
            );
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}
