use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Languages the transcription pipeline expects to see.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Language {
    #[default]
    English,
    Farsi,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "ENGLISH",
            Language::Farsi => "FARSI",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ENGLISH" | "EN" => Ok(Language::English),
            "FARSI" | "PERSIAN" | "FA" => Ok(Language::Farsi),
            other => Err(format!("unknown language '{}'", other)),
        }
    }
}

/// Lifecycle state of a transcription job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and failed jobs never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One queued transcription task tied to a content item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Unique job identifier, never reused.
    pub id: String,
    /// Content item the transcript belongs to.
    pub content_id: String,
    /// Source audio; owned by the caller, read-only here.
    pub file_path: PathBuf,
    /// Expected language. The detected one may differ.
    pub language_hint: Language,
    /// Attempts made so far, including the one in flight.
    pub attempts: u32,
    pub max_attempts: u32,
    pub status: JobStatus,
    /// Percentage 0-100, only meaningful while processing.
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    /// Last failure message, overwritten on each failed attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    pub fn new(
        content_id: &str,
        file_path: PathBuf,
        language_hint: Language,
        max_attempts: u32,
    ) -> Self {
        Self {
            id: format!("transcript_{}_{}", content_id, uuid::Uuid::new_v4().simple()),
            content_id: content_id.to_string(),
            file_path,
            language_hint,
            attempts: 0,
            max_attempts,
            status: JobStatus::Pending,
            progress: 0,
            created_at: Utc::now(),
            processed_at: None,
            error: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn has_attempts_left(&self) -> bool {
        self.attempts < self.max_attempts
    }
}
