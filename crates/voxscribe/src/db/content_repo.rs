//! Content repository: reads and transcript updates for the `contents` table.

use chrono::Utc;
use rusqlite::{params, Row};

use super::{Database, DatabaseError};

/// A raw content row from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub audio_url: String,
    pub language: String,
    pub transcript: Option<String>,
    pub edited_transcript: Option<String>,
    pub is_processed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl ContentRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            title: row.get("title")?,
            audio_url: row.get("audio_url")?,
            language: row.get("language")?,
            transcript: row.get("transcript")?,
            edited_transcript: row.get("edited_transcript")?,
            is_processed: row.get("is_processed")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Inserts a new content row.
pub fn insert(db: &Database, content: &ContentRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO contents (id, user_id, title, audio_url, language, transcript,
             edited_transcript, is_processed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                content.id,
                content.user_id,
                content.title,
                content.audio_url,
                content.language,
                content.transcript,
                content.edited_transcript,
                content.is_processed,
                content.created_at,
                content.updated_at,
            ],
        )?;
        Ok(())
    })
}

/// Finds a content item by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<ContentRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM contents WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], ContentRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Stores a finished transcript and marks the content processed.
/// The edited transcript starts as a copy of the raw one.
/// Returns the number of rows updated.
pub fn set_transcript(
    db: &Database,
    id: &str,
    transcript: &str,
    language: &str,
) -> Result<usize, DatabaseError> {
    let now = Utc::now().to_rfc3339();
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE contents SET transcript=?2, edited_transcript=?2, language=?3,
             is_processed=1, updated_at=?4 WHERE id=?1",
            params![id, transcript, language, now],
        )?;
        Ok(changed)
    })
}

/// Clears the transcript and marks the content unprocessed.
/// Returns the number of rows updated.
pub fn mark_unprocessed(db: &Database, id: &str) -> Result<usize, DatabaseError> {
    let now = Utc::now().to_rfc3339();
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE contents SET transcript=NULL, is_processed=0, updated_at=?2 WHERE id=?1",
            params![id, now],
        )?;
        Ok(changed)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str) -> ContentRow {
        ContentRow {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            title: "Morning notes".to_string(),
            audio_url: format!("/api/uploads/{}.webm", id),
            language: "ENGLISH".to_string(),
            transcript: None,
            edited_transcript: None,
            is_processed: false,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            updated_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_insert_and_find() {
        let db = Database::open_in_memory().unwrap();
        insert(&db, &sample("c1")).unwrap();

        let found = find_by_id(&db, "c1").unwrap().unwrap();
        assert_eq!(found, sample("c1"));
        assert!(find_by_id(&db, "missing").unwrap().is_none());
    }

    #[test]
    fn test_set_transcript() {
        let db = Database::open_in_memory().unwrap();
        insert(&db, &sample("c1")).unwrap();

        let changed = set_transcript(&db, "c1", "سلام", "FARSI").unwrap();
        assert_eq!(changed, 1);

        let row = find_by_id(&db, "c1").unwrap().unwrap();
        assert_eq!(row.transcript.as_deref(), Some("سلام"));
        assert_eq!(row.edited_transcript.as_deref(), Some("سلام"));
        assert_eq!(row.language, "FARSI");
        assert!(row.is_processed);
        assert_ne!(row.updated_at, row.created_at);
    }

    #[test]
    fn test_mark_unprocessed_clears_transcript() {
        let db = Database::open_in_memory().unwrap();
        insert(&db, &sample("c1")).unwrap();
        set_transcript(&db, "c1", "hello", "ENGLISH").unwrap();

        assert_eq!(mark_unprocessed(&db, "c1").unwrap(), 1);

        let row = find_by_id(&db, "c1").unwrap().unwrap();
        assert!(row.transcript.is_none());
        assert!(!row.is_processed);
    }

    #[test]
    fn test_updates_on_unknown_id_touch_nothing() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(set_transcript(&db, "nope", "x", "ENGLISH").unwrap(), 0);
        assert_eq!(mark_unprocessed(&db, "nope").unwrap(), 0);
    }
}
