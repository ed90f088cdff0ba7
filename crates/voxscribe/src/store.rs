//! In-memory job store, the single source of truth for job lifecycle state.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::job::{Job, JobStatus};

#[derive(Default)]
struct Inner {
    jobs: HashMap<String, Job>,
    /// Insertion order of job ids, used for FIFO selection.
    order: Vec<String>,
}

/// Authoritative collection of submitted jobs, keyed by id.
///
/// Nothing is persisted: a process restart loses every job. Readers always
/// receive cloned snapshots, so they never observe a half-applied update.
#[derive(Default)]
pub struct JobStore {
    inner: RwLock<Inner>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        match self.inner.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("Job store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        match self.inner.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("Job store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Adds a job in its initial state. Returns the stored snapshot.
    pub fn insert(&self, mut job: Job) -> Job {
        job.status = JobStatus::Pending;
        job.attempts = 0;
        job.progress = 0;

        let mut inner = self.write();
        if inner.jobs.insert(job.id.clone(), job.clone()).is_none() {
            inner.order.push(job.id.clone());
        }
        job
    }

    pub fn find_by_id(&self, id: &str) -> Option<Job> {
        self.read().jobs.get(id).cloned()
    }

    /// Returns the earliest-inserted pending job.
    pub fn find_next_pending(&self) -> Option<Job> {
        let inner = self.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.jobs.get(id))
            .find(|job| job.status == JobStatus::Pending)
            .cloned()
    }

    /// Applies `f` to the job under the write lock and returns the result.
    pub fn update<F>(&self, id: &str, f: F) -> Option<Job>
    where
        F: FnOnce(&mut Job),
    {
        let mut inner = self.write();
        let job = inner.jobs.get_mut(id)?;
        f(job);
        Some(job.clone())
    }

    pub fn remove(&self, id: &str) -> Option<Job> {
        let mut inner = self.write();
        let removed = inner.jobs.remove(id)?;
        inner.order.retain(|existing| existing != id);
        Some(removed)
    }

    /// Removes every job matching `predicate`, returning how many went.
    pub fn remove_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&Job) -> bool,
    {
        let mut inner = self.write();
        let doomed: Vec<String> = inner
            .order
            .iter()
            .filter(|id| inner.jobs.get(*id).is_some_and(&predicate))
            .cloned()
            .collect();

        for id in &doomed {
            inner.jobs.remove(id);
        }
        inner.order.retain(|id| !doomed.contains(id));
        doomed.len()
    }

    /// All retained jobs for a content item, in submission order.
    pub fn find_by_content(&self, content_id: &str) -> Vec<Job> {
        let inner = self.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.jobs.get(id))
            .filter(|job| job.content_id == content_id)
            .cloned()
            .collect()
    }

    pub fn count_with_status(&self, status: JobStatus) -> usize {
        self.read()
            .jobs
            .values()
            .filter(|job| job.status == status)
            .count()
    }

    pub fn len(&self) -> usize {
        self.read().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
