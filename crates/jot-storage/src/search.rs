//! Substring search and live filtering.
//!
//! One matching primitive, two entry points: the database `LIKE` query in
//! `NoteRepository::search` (refresh-triggered search) and the in-memory
//! `NoteFilter` here (per-keystroke filtering over an already-loaded list,
//! no round trip to the store). Both are case-insensitive literal-substring
//! matches over note content and agree on ASCII queries.

use jot_core::types::Note;

/// Case-insensitive substring match over note content.
///
/// An empty or whitespace-only query matches everything.
pub fn matches(content: &str, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    content.to_lowercase().contains(&query.to_lowercase())
}

/// Escape LIKE wildcards so a pattern matches the query literally.
///
/// Used with `LIKE ... ESCAPE '\'` to keep the database search equivalent
/// to the in-memory filter.
pub(crate) fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// In-memory filter over a previously loaded full note list.
///
/// Holds a cached copy of the notes (already ordered most-recent-first by
/// the repository) so typing in a search box never touches the store.
/// Callers replace the cache with `set_notes` after any write.
#[derive(Debug, Default)]
pub struct NoteFilter {
    notes: Vec<Note>,
}

impl NoteFilter {
    pub fn new(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    /// Replace the cached note list. Call after any insert/update/delete.
    pub fn set_notes(&mut self, notes: Vec<Note>) {
        self.notes = notes;
    }

    /// Notes matching the query, preserving the cached order.
    pub fn filter(&self, query: &str) -> Vec<Note> {
        self.notes
            .iter()
            .filter(|note| matches(&note.content, query))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
