//! Cosmetic progress advancement while a transcription call is outstanding.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::job::JobStatus;
use crate::store::JobStore;

/// Nudges a processing job's progress upward on a fixed interval.
///
/// Advances by `step` per tick and never past `ceiling`. The task stops by
/// itself once the job leaves `Processing`, and is aborted when the ticker
/// is dropped.
pub struct ProgressTicker {
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    pub fn start(
        store: Arc<JobStore>,
        job_id: String,
        interval: Duration,
        step: u8,
        ceiling: u8,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.tick().await; // first tick fires immediately

            loop {
                timer.tick().await;

                let mut still_processing = false;
                let updated = store.update(&job_id, |job| {
                    if job.status != JobStatus::Processing {
                        return;
                    }
                    still_processing = true;
                    if job.progress < ceiling {
                        job.progress = job.progress.saturating_add(step).min(ceiling);
                    }
                });

                if updated.is_none() || !still_processing {
                    break;
                }
            }
        });

        Self { handle }
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
