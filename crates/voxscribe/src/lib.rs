//! In-process background transcription queue.
//!
//! Uploaded voice content is submitted as a [`Job`], processed one at a time
//! by the [`JobScheduler`] through a [`TranscriptionProvider`], and written
//! back through a [`ContentStore`]. Clients poll the [`StatusReporter`]; the
//! [`Reaper`] drops finished jobs once they age out.

pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod job;
pub mod logging;
pub mod provider;
pub mod reaper;
pub mod sanitize;
pub mod scheduler;
pub mod secrets;
pub mod status;
pub mod store;
pub mod validator;

pub use config::{load_config, load_config_from_str, QueueConfig};
pub use content::{ContentStore, SqliteContentStore};
pub use db::Database;
pub use error::{Result, VoxscribeError};
pub use job::{Job, JobStatus, Language};
pub use provider::{build_provider, ProviderError, Transcription, TranscriptionProvider};
pub use reaper::Reaper;
pub use scheduler::{CycleOutcome, JobFailure, JobScheduler, SchedulerDeps};
pub use status::{JobStatusView, StatusReporter};
pub use store::JobStore;
pub use validator::AudioValidator;
