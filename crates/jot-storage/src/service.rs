//! The service facade the presentation layer talks to.
//!
//! Bundles the note and media repositories behind one handle and owns the
//! flows that span both: deleting a note must remove its media files before
//! the row cascade, and attaching media to a draft note must create the
//! note first.

use std::io::Read;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use jot_core::error::JotError;
use jot_core::types::{Media, MediaKind, Note};

use crate::db::Database;
use crate::media::MediaRepository;
use crate::notes::NoteRepository;

pub struct NoteService {
    notes: NoteRepository,
    media: MediaRepository,
}

impl NoteService {
    /// Compose the facade from a shared database handle and a media
    /// repository (which carries the file store and thumbnailer).
    pub fn new(db: Arc<Database>, media: MediaRepository) -> Self {
        Self {
            notes: NoteRepository::new(db),
            media,
        }
    }

    /// Create and persist a new note. Rejects empty content.
    pub fn create_note(&self, content: &str) -> Result<Note, JotError> {
        let note = Note::new(content);
        self.notes.insert(&note)?;
        debug!("Created note {}", note.id);
        Ok(note)
    }

    /// Replace a note's content, refreshing its timestamp.
    ///
    /// An unknown id is a silent no-op.
    pub fn edit_note(&self, id: Uuid, new_content: &str) -> Result<(), JotError> {
        let note = Note {
            id,
            content: new_content.to_string(),
            timestamp: Utc::now(),
        };
        self.notes.update(&note)
    }

    /// Delete a note and everything it owns.
    ///
    /// Media files are removed before the note row goes away; the row
    /// cascade alone would strand them on disk. An unknown id is a no-op.
    pub fn delete_note(&self, id: Uuid) -> Result<(), JotError> {
        self.media.delete_all_for_note(id)?;
        self.notes.delete(id)
    }

    /// Delete every note, media files included.
    pub fn delete_all_notes(&self) -> Result<(), JotError> {
        for note in self.notes.get_all()? {
            self.media.delete_all_for_note(note.id)?;
        }
        self.notes.delete_all()
    }

    pub fn get_note(&self, id: Uuid) -> Result<Option<Note>, JotError> {
        self.notes.get_by_id(id)
    }

    /// All notes, most recent first.
    pub fn list_notes(&self) -> Result<Vec<Note>, JotError> {
        self.notes.get_all()
    }

    /// Notes matching a case-insensitive substring query, most recent
    /// first. An empty query lists everything.
    pub fn search_notes(&self, query: &str) -> Result<Vec<Note>, JotError> {
        self.notes.search(query)
    }

    /// Attach media to a note, copying the source into private storage.
    ///
    /// The note may be a draft that was never saved: it is inserted first
    /// in that case, so it materializes exactly once. The returned media
    /// entry carries the owned file path (and thumbnail path for videos
    /// when generation succeeded).
    pub fn attach_media(
        &self,
        note: &Note,
        source: &mut dyn Read,
        kind: MediaKind,
    ) -> Result<Media, JotError> {
        if self.notes.get_by_id(note.id)?.is_none() {
            debug!("Attach target {} not yet saved, creating it", note.id);
            self.notes.insert(note)?;
        }
        self.media.save_from_source(note.id, source, kind)
    }

    /// Delete a single media entry (file, thumbnail, row).
    ///
    /// An unknown id is a silent no-op.
    pub fn delete_media(&self, media_id: Uuid) -> Result<(), JotError> {
        self.media.delete_by_id(media_id)
    }

    /// All media for a note in attachment order (oldest first).
    pub fn list_media(&self, note_id: Uuid) -> Result<Vec<Media>, JotError> {
        self.media.get_for_note(note_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::store::MediaStore;

    struct Fixture {
        _dir: tempfile::TempDir,
        service: NoteService,
    }

    fn make_service() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::in_memory().unwrap());
        let media =
            MediaRepository::new(Arc::clone(&db), MediaStore::from_data_dir(dir.path()));
        Fixture {
            _dir: dir,
            service: NoteService::new(db, media),
        }
    }

    #[test]
    fn test_create_and_list() {
        let fx = make_service();
        let note = fx.service.create_note("Buy Milk").unwrap();

        let all = fx.service.list_notes().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, note.id);
    }

    #[test]
    fn test_create_rejects_empty_content() {
        let fx = make_service();
        assert!(matches!(
            fx.service.create_note("  "),
            Err(JotError::EmptyContent)
        ));
        assert!(fx.service.list_notes().unwrap().is_empty());
    }

    #[test]
    fn test_edit_note_changes_content() {
        let fx = make_service();
        let note = fx.service.create_note("before").unwrap();

        fx.service.edit_note(note.id, "after").unwrap();

        let found = fx.service.get_note(note.id).unwrap().unwrap();
        assert_eq!(found.content, "after");
        assert!(found.timestamp >= note.timestamp);
    }

    #[test]
    fn test_edit_unknown_note_is_noop() {
        let fx = make_service();
        fx.service.edit_note(Uuid::new_v4(), "ghost").unwrap();
        assert!(fx.service.list_notes().unwrap().is_empty());
    }

    #[test]
    fn test_list_reflects_surviving_notes() {
        let fx = make_service();
        let a = fx.service.create_note("a").unwrap();
        let b = fx.service.create_note("b").unwrap();
        let c = fx.service.create_note("c").unwrap();

        fx.service.edit_note(b.id, "b2").unwrap();
        fx.service.delete_note(a.id).unwrap();

        let surviving: Vec<Uuid> = fx.service.list_notes().unwrap().iter().map(|n| n.id).collect();
        assert_eq!(surviving.len(), 2);
        assert!(surviving.contains(&b.id));
        assert!(surviving.contains(&c.id));
    }

    #[test]
    fn test_search_empty_equals_list() {
        let fx = make_service();
        fx.service.create_note("one").unwrap();
        fx.service.create_note("two").unwrap();

        let listed = fx.service.list_notes().unwrap();
        let searched = fx.service.search_notes("").unwrap();
        assert_eq!(listed, searched);
    }

    #[test]
    fn test_search_case_insensitive() {
        let fx = make_service();
        fx.service.create_note("Buy Milk").unwrap();

        for query in ["milk", "MILK", "y mi"] {
            assert_eq!(fx.service.search_notes(query).unwrap().len(), 1, "{:?}", query);
        }
        assert!(fx.service.search_notes("bread").unwrap().is_empty());
    }

    #[test]
    fn test_attach_to_draft_creates_note_once() {
        let fx = make_service();
        let draft = Note::new("draft with photo");

        let mut source = Cursor::new(vec![1u8, 2, 3]);
        let media = fx
            .service
            .attach_media(&draft, &mut source, MediaKind::Image)
            .unwrap();

        let listed = fx.service.list_media(draft.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, media.id);

        let notes = fx.service.list_notes().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, draft.id);
    }

    #[test]
    fn test_attach_to_existing_note_does_not_overwrite() {
        let fx = make_service();
        let note = fx.service.create_note("saved").unwrap();
        fx.service.edit_note(note.id, "edited").unwrap();

        // Attaching with a stale copy of the note must not roll back the edit.
        let mut source = Cursor::new(vec![1u8, 2, 3]);
        fx.service
            .attach_media(&note, &mut source, MediaKind::Image)
            .unwrap();

        let found = fx.service.get_note(note.id).unwrap().unwrap();
        assert_eq!(found.content, "edited");
    }

    #[test]
    fn test_delete_note_removes_media_and_files() {
        let fx = make_service();
        let note = fx.service.create_note("Test").unwrap();

        let mut source = Cursor::new(vec![9u8; 32]);
        let media = fx
            .service
            .attach_media(&note, &mut source, MediaKind::Image)
            .unwrap();
        assert!(media.uri.exists());

        fx.service.delete_note(note.id).unwrap();

        assert!(fx.service.list_media(note.id).unwrap().is_empty());
        assert!(fx.service.list_notes().unwrap().is_empty());
        assert!(!media.uri.exists());
    }

    #[test]
    fn test_delete_media_individually() {
        let fx = make_service();
        let note = fx.service.create_note("holder").unwrap();

        let mut source = Cursor::new(vec![5u8; 8]);
        let media = fx
            .service
            .attach_media(&note, &mut source, MediaKind::Image)
            .unwrap();

        fx.service.delete_media(media.id).unwrap();

        assert!(!media.uri.exists());
        assert!(fx.service.list_media(note.id).unwrap().is_empty());
        // The note itself survives.
        assert_eq!(fx.service.list_notes().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_media_unknown_is_noop() {
        let fx = make_service();
        fx.service.delete_media(Uuid::new_v4()).unwrap();
    }

    #[test]
    fn test_empty_source_attach_leaves_nothing() {
        let fx = make_service();
        let note = fx.service.create_note("holder").unwrap();

        let mut source = Cursor::new(Vec::<u8>::new());
        let result = fx.service.attach_media(&note, &mut source, MediaKind::Image);

        assert!(result.is_err());
        assert!(fx.service.list_media(note.id).unwrap().is_empty());
    }

    #[test]
    fn test_delete_all_notes_clears_everything() {
        let fx = make_service();
        let a = fx.service.create_note("a").unwrap();
        fx.service.create_note("b").unwrap();

        let mut source = Cursor::new(vec![3u8; 16]);
        let media = fx
            .service
            .attach_media(&a, &mut source, MediaKind::Image)
            .unwrap();

        fx.service.delete_all_notes().unwrap();

        assert!(fx.service.list_notes().unwrap().is_empty());
        assert!(fx.service.list_media(a.id).unwrap().is_empty());
        assert!(!media.uri.exists());
    }
}
