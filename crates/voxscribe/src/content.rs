//! Content-storage collaborator the scheduler writes results through.

use async_trait::async_trait;

use crate::db::content_repo;
use crate::db::Database;
use crate::error::ContentStoreError;
use crate::job::Language;

/// Where transcription outcomes are persisted.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Saves the transcript and detected language, marking the content processed.
    async fn update_content_transcript(
        &self,
        content_id: &str,
        transcript: &str,
        language: Language,
    ) -> Result<(), ContentStoreError>;

    /// Marks the content as not processed and clears any transcript.
    async fn mark_content_unprocessed(&self, content_id: &str) -> Result<(), ContentStoreError>;
}

/// `ContentStore` backed by the SQLite `contents` table.
#[derive(Clone)]
pub struct SqliteContentStore {
    db: Database,
}

impl SqliteContentStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

// Statements are sub-millisecond, so they run inline rather than on the
// blocking pool.
#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn update_content_transcript(
        &self,
        content_id: &str,
        transcript: &str,
        language: Language,
    ) -> Result<(), ContentStoreError> {
        let changed = content_repo::set_transcript(&self.db, content_id, transcript, language.as_str())?;
        if changed == 0 {
            return Err(ContentStoreError::NotFound(content_id.to_string()));
        }
        Ok(())
    }

    async fn mark_content_unprocessed(&self, content_id: &str) -> Result<(), ContentStoreError> {
        let changed = content_repo::mark_unprocessed(&self.db, content_id)?;
        if changed == 0 {
            return Err(ContentStoreError::NotFound(content_id.to_string()));
        }
        Ok(())
    }
}
