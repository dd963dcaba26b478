//! Note repository: CRUD and substring search over the `notes` table.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use jot_core::error::JotError;
use jot_core::types::Note;

use crate::db::Database;
use crate::search;

/// Repository for note rows.
///
/// Unknown ids on update/delete are silent no-ops, matching the forgiving
/// contract of the presentation layer. Validation failures are rejected
/// before any SQL runs.
pub struct NoteRepository {
    db: Arc<Database>,
}

impl NoteRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Persist a new note.
    ///
    /// Uses REPLACE semantics: inserting the same id twice succeeds and the
    /// last write wins. Empty or whitespace-only content is rejected.
    pub fn insert(&self, note: &Note) -> Result<(), JotError> {
        if note.content.trim().is_empty() {
            return Err(JotError::EmptyContent);
        }

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO notes (id, content, timestamp) VALUES (?1, ?2, ?3)",
                rusqlite::params![
                    note.id.to_string(),
                    note.content,
                    note.timestamp.timestamp_millis(),
                ],
            )
            .map_err(|e| JotError::Storage(format!("Failed to insert note: {}", e)))?;
            Ok(())
        })
    }

    /// Overwrite content and timestamp for an existing note.
    ///
    /// A no-op if the id does not exist.
    pub fn update(&self, note: &Note) -> Result<(), JotError> {
        if note.content.trim().is_empty() {
            return Err(JotError::EmptyContent);
        }

        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE notes SET content = ?2, timestamp = ?3 WHERE id = ?1",
                rusqlite::params![
                    note.id.to_string(),
                    note.content,
                    note.timestamp.timestamp_millis(),
                ],
            )
            .map_err(|e| JotError::Storage(format!("Failed to update note: {}", e)))?;
            Ok(())
        })
    }

    /// Remove a note row. A no-op if the id does not exist.
    ///
    /// The media table's cascade removes dependent rows but not their
    /// files; callers that need file cleanup go through `NoteService`.
    pub fn delete(&self, note_id: Uuid) -> Result<(), JotError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM notes WHERE id = ?1",
                rusqlite::params![note_id.to_string()],
            )
            .map_err(|e| JotError::Storage(format!("Failed to delete note: {}", e)))?;
            Ok(())
        })
    }

    /// Remove every note row.
    pub fn delete_all(&self) -> Result<(), JotError> {
        self.db.with_conn(|conn| {
            conn.execute("DELETE FROM notes", [])
                .map_err(|e| JotError::Storage(format!("Failed to delete notes: {}", e)))?;
            Ok(())
        })
    }

    /// Find a note by id.
    pub fn get_by_id(&self, note_id: Uuid) -> Result<Option<Note>, JotError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, content, timestamp FROM notes WHERE id = ?1")
                .map_err(|e| JotError::Storage(e.to_string()))?;

            let result = stmt
                .query_row(rusqlite::params![note_id.to_string()], |row| {
                    Ok(row_to_note(row))
                })
                .optional()
                .map_err(|e| JotError::Storage(e.to_string()))?;

            match result {
                Some(note) => Ok(Some(note?)),
                None => Ok(None),
            }
        })
    }

    /// All notes, most recent first.
    ///
    /// An empty store returns an empty vec. Ties on timestamp are broken
    /// by id descending so the ordering is deterministic.
    pub fn get_all(&self) -> Result<Vec<Note>, JotError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, content, timestamp FROM notes
                     ORDER BY timestamp DESC, id DESC",
                )
                .map_err(|e| JotError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map([], |row| Ok(row_to_note(row)))
                .map_err(|e| JotError::Storage(e.to_string()))?;

            let mut notes = Vec::new();
            for row in rows {
                let note = row.map_err(|e| JotError::Storage(e.to_string()))??;
                notes.push(note);
            }
            Ok(notes)
        })
    }

    /// Notes whose content contains `query` as a case-insensitive
    /// substring, most recent first.
    ///
    /// An empty or whitespace-only query is equivalent to `get_all`.
    /// LIKE wildcards in the query are escaped, so matching is exact
    /// literal-substring and agrees with the in-memory `NoteFilter`.
    /// (SQLite's LIKE folds case for ASCII only; the in-memory filter
    /// folds full Unicode. The two agree on ASCII queries.)
    pub fn search(&self, query: &str) -> Result<Vec<Note>, JotError> {
        let query = query.trim();
        if query.is_empty() {
            return self.get_all();
        }

        let pattern = format!("%{}%", search::escape_like(query));

        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, content, timestamp FROM notes
                     WHERE content LIKE ?1 ESCAPE '\\'
                     ORDER BY timestamp DESC, id DESC",
                )
                .map_err(|e| JotError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![pattern], |row| Ok(row_to_note(row)))
                .map_err(|e| JotError::Storage(e.to_string()))?;

            let mut notes = Vec::new();
            for row in rows {
                let note = row.map_err(|e| JotError::Storage(e.to_string()))??;
                notes.push(note);
            }
            Ok(notes)
        })
    }

    /// Count total notes.
    pub fn count(&self) -> Result<u64, JotError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))
                .map_err(|e| JotError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }
}

fn row_to_note(row: &rusqlite::Row<'_>) -> Result<Note, JotError> {
    let id_str: String = row.get(0).map_err(|e| JotError::Storage(e.to_string()))?;
    let content: String = row.get(1).map_err(|e| JotError::Storage(e.to_string()))?;
    let timestamp_ms: i64 = row.get(2).map_err(|e| JotError::Storage(e.to_string()))?;

    Ok(Note {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| JotError::Storage(format!("Invalid UUID: {}", e)))?,
        content,
        timestamp: Utc
            .timestamp_millis_opt(timestamp_ms)
            .single()
            .unwrap_or_default(),
    })
}

/// Extension trait for rusqlite to support optional query results.
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_repo() -> NoteRepository {
        NoteRepository::new(Arc::new(Database::in_memory().unwrap()))
    }

    fn note_at(content: &str, offset_secs: i64) -> Note {
        let mut note = Note::new(content);
        note.timestamp = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
            + Duration::seconds(offset_secs);
        note
    }

    #[test]
    fn test_insert_and_get() {
        let repo = make_repo();
        let note = Note::new("Buy Milk");
        repo.insert(&note).unwrap();

        let found = repo.get_by_id(note.id).unwrap().unwrap();
        assert_eq!(found.id, note.id);
        assert_eq!(found.content, "Buy Milk");
    }

    #[test]
    fn test_insert_rejects_empty_content() {
        let repo = make_repo();
        let note = Note::new("");
        assert!(matches!(repo.insert(&note), Err(JotError::EmptyContent)));

        let note = Note::new("   \t");
        assert!(matches!(repo.insert(&note), Err(JotError::EmptyContent)));
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_same_id_replaces() {
        let repo = make_repo();
        let mut note = note_at("first", 0);
        repo.insert(&note).unwrap();

        note.content = "second".to_string();
        repo.insert(&note).unwrap();

        assert_eq!(repo.count().unwrap(), 1);
        let found = repo.get_by_id(note.id).unwrap().unwrap();
        assert_eq!(found.content, "second");
    }

    #[test]
    fn test_update_refreshes_content_and_timestamp() {
        let repo = make_repo();
        let mut note = note_at("before", 0);
        repo.insert(&note).unwrap();

        note.content = "after".to_string();
        note.timestamp = note.timestamp + Duration::seconds(60);
        repo.update(&note).unwrap();

        let found = repo.get_by_id(note.id).unwrap().unwrap();
        assert_eq!(found.content, "after");
        assert_eq!(found.timestamp, note.timestamp);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let repo = make_repo();
        let note = Note::new("ghost");
        repo.update(&note).unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let repo = make_repo();
        repo.delete(Uuid::new_v4()).unwrap();
    }

    #[test]
    fn test_get_all_orders_by_timestamp_desc() {
        let repo = make_repo();
        let oldest = note_at("oldest", 0);
        let middle = note_at("middle", 10);
        let newest = note_at("newest", 20);

        repo.insert(&middle).unwrap();
        repo.insert(&newest).unwrap();
        repo.insert(&oldest).unwrap();

        let all = repo.get_all().unwrap();
        let contents: Vec<_> = all.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, ["newest", "middle", "oldest"]);
    }

    #[test]
    fn test_get_all_empty_store() {
        let repo = make_repo();
        assert!(repo.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_search_case_insensitive_substring() {
        let repo = make_repo();
        repo.insert(&note_at("Buy Milk", 0)).unwrap();
        repo.insert(&note_at("Walk the dog", 10)).unwrap();

        for query in ["milk", "MILK", "y mi"] {
            let found = repo.search(query).unwrap();
            assert_eq!(found.len(), 1, "query {:?}", query);
            assert_eq!(found[0].content, "Buy Milk");
        }
    }

    #[test]
    fn test_search_empty_query_returns_all() {
        let repo = make_repo();
        repo.insert(&note_at("a", 0)).unwrap();
        repo.insert(&note_at("b", 10)).unwrap();

        assert_eq!(repo.search("").unwrap().len(), 2);
        assert_eq!(repo.search("   ").unwrap().len(), 2);
    }

    #[test]
    fn test_search_orders_by_timestamp_desc() {
        let repo = make_repo();
        repo.insert(&note_at("milk run", 0)).unwrap();
        repo.insert(&note_at("more milk", 10)).unwrap();

        let found = repo.search("milk").unwrap();
        let contents: Vec<_> = found.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, ["more milk", "milk run"]);
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let repo = make_repo();
        repo.insert(&note_at("progress: 100% done", 0)).unwrap();
        repo.insert(&note_at("progress: halfway", 10)).unwrap();

        let found = repo.search("100%").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].content, "progress: 100% done");

        // "_" must not match arbitrary characters.
        assert!(repo.search("100_").unwrap().is_empty());
    }

    #[test]
    fn test_delete_all() {
        let repo = make_repo();
        repo.insert(&note_at("a", 0)).unwrap();
        repo.insert(&note_at("b", 10)).unwrap();

        repo.delete_all().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }
}
