//! Database schema migrations.
//!
//! Version 1 creates the `notes` table; version 2 adds the `media` table
//! with its cascade-delete foreign key and `note_id` index. Migrations are
//! idempotent and never rewrite existing note rows, so a store created at
//! version 1 upgrades in place on open.

use rusqlite::Connection;
use tracing::info;

use jot_core::error::JotError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), JotError> {
    // Create the migrations tracking table first.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| JotError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| JotError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: notes");
    }

    if current_version < 2 {
        apply_v2(conn)?;
        info!("Applied migration v2: media");
    }

    Ok(())
}

/// Version 1: the notes table.
fn apply_v1(conn: &Connection) -> Result<(), JotError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS notes (
            id          TEXT PRIMARY KEY NOT NULL,
            content     TEXT NOT NULL DEFAULT '',
            timestamp   INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_notes_timestamp
            ON notes (timestamp DESC);

        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'notes');
        ",
    )
    .map_err(|e| JotError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}

/// Version 2: the media table and its note_id index.
fn apply_v2(conn: &Connection) -> Result<(), JotError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS media (
            id              TEXT PRIMARY KEY NOT NULL,
            note_id         TEXT NOT NULL,
            type            INTEGER NOT NULL,
            uri             TEXT,
            thumbnail_uri   TEXT,
            timestamp       INTEGER NOT NULL,
            FOREIGN KEY (note_id) REFERENCES notes(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_media_note_id
            ON media (note_id);

        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (2, 'media');
        ",
    )
    .map_err(|e| JotError::Storage(format!("Failed to apply migration v2: {}", e)))?;

    Ok(())
}
