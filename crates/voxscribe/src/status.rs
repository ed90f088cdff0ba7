//! Read-only views of jobs for polling clients.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::job::{Job, JobStatus};
use crate::store::JobStore;

/// Public projection of a job. The file path and language hint stay internal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusView {
    pub id: String,
    pub content_id: String,
    pub status: JobStatus,
    pub attempts: u32,
    pub max_attempts: u32,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Job> for JobStatusView {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            content_id: job.content_id,
            status: job.status,
            attempts: job.attempts,
            max_attempts: job.max_attempts,
            progress: job.progress,
            created_at: job.created_at,
            processed_at: job.processed_at,
            error: job.error,
        }
    }
}

#[derive(Clone)]
pub struct StatusReporter {
    store: Arc<JobStore>,
}

impl StatusReporter {
    pub fn new(store: Arc<JobStore>) -> Self {
        Self { store }
    }

    /// `None` for ids never issued or already reaped.
    pub fn get_status(&self, job_id: &str) -> Option<JobStatusView> {
        self.store.find_by_id(job_id).map(JobStatusView::from)
    }

    /// Every retained job for a content item, oldest first.
    pub fn jobs_for_content(&self, content_id: &str) -> Vec<JobStatusView> {
        self.store
            .find_by_content(content_id)
            .into_iter()
            .map(JobStatusView::from)
            .collect()
    }
}
