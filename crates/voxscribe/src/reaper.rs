//! Periodic removal of old terminal jobs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::config::QueueConfig;
use crate::store::JobStore;

/// Bounds job-store growth by dropping finished jobs past the retention window.
pub struct Reaper {
    store: Arc<JobStore>,
    retention: chrono::Duration,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
    stopped: Arc<Notify>,
}

impl Reaper {
    pub fn new(store: Arc<JobStore>, retention: chrono::Duration, interval: Duration) -> Self {
        Self {
            store,
            retention,
            interval,
            shutdown: Arc::new(AtomicBool::new(false)),
            stopped: Arc::new(Notify::new()),
        }
    }

    pub fn from_config(store: Arc<JobStore>, config: &QueueConfig) -> Self {
        Self::new(store, config.retention(), config.reap_interval())
    }

    /// Removes completed and failed jobs created more than `retention` before `now`.
    ///
    /// Pending and processing jobs are never touched, however old.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        sweep_store(&self.store, self.retention, now)
    }

    /// Runs [`sweep`](Self::sweep) every interval until [`stop`](Self::stop).
    pub fn start(&self) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let shutdown = Arc::clone(&self.shutdown);
        let stopped = Arc::clone(&self.stopped);
        let retention = self.retention;
        let interval = self.interval;

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.tick().await; // skip immediate first tick

            loop {
                if shutdown.load(Ordering::Acquire) {
                    break;
                }

                tokio::select! {
                    _ = timer.tick() => {}
                    _ = stopped.notified() => {}
                }

                if shutdown.load(Ordering::Acquire) {
                    break;
                }

                sweep_store(&store, retention, Utc::now());
            }
        })
    }

    /// Signals the sweep loop to stop.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.stopped.notify_one();
    }
}

fn sweep_store(store: &JobStore, retention: chrono::Duration, now: DateTime<Utc>) -> usize {
    let removed = store.remove_where(|job| job.is_finished() && now - job.created_at > retention);
    if removed > 0 {
        tracing::info!("Cleaned up {} old transcript jobs", removed);
    }
    removed
}
