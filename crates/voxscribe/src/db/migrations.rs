//! Versioned schema changes for the content database.
//!
//! Applied versions are recorded in `_migrations`; each pending migration
//! runs in its own transaction together with its bookkeeping row.

use rusqlite::{params, Connection};

use super::DatabaseError;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_contents_table",
        sql: include_str!("sql/001_create_contents.sql"),
    },
    Migration {
        version: 2,
        name: "index_contents_is_processed",
        sql: include_str!("sql/002_index_processed.sql"),
    },
];

const TRACKING_TABLE: &str = "CREATE TABLE IF NOT EXISTS _migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);";

/// Highest applied version, or 0 for a fresh database.
pub fn current_version(conn: &Connection) -> Result<u32, DatabaseError> {
    conn.execute_batch(TRACKING_TABLE)?;
    let version = conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |r| {
        r.get(0)
    })?;
    Ok(version)
}

/// Applies every migration newer than the current version.
/// Returns how many were applied.
pub fn run_all(conn: &Connection) -> Result<usize, DatabaseError> {
    let current = current_version(conn)?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();

    for migration in &pending {
        apply(conn, migration)?;
    }
    Ok(pending.len())
}

fn apply(conn: &Connection, migration: &Migration) -> Result<(), DatabaseError> {
    log::info!("Applying migration v{} ({})", migration.version, migration.name);

    let failed = |e: rusqlite::Error| DatabaseError::Migration {
        version: migration.version,
        reason: e.to_string(),
    };

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql).map_err(failed)?;
    tx.execute(
        "INSERT INTO _migrations (version, name) VALUES (?1, ?2)",
        params![migration.version, migration.name],
    )?;
    tx.commit().map_err(failed)?;
    Ok(())
}
