//! Media repository: rows in the `media` table plus their backing files.
//!
//! Every operation that removes a row also removes the files it points at.
//! SQL cascade only guarantees row removal, so file cleanup lives here.

use std::io::Read;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use jot_core::error::JotError;
use jot_core::types::{Media, MediaKind};

use crate::db::Database;
use crate::notes::OptionalExt;
use crate::store::{MediaStore, NoThumbnailer, ThumbnailGenerator};

/// Repository for media rows and their files.
pub struct MediaRepository {
    db: Arc<Database>,
    store: MediaStore,
    thumbnailer: Box<dyn ThumbnailGenerator>,
    thumbnail_size: (u32, u32),
}

impl MediaRepository {
    /// Create a repository with no thumbnail generation configured.
    pub fn new(db: Arc<Database>, store: MediaStore) -> Self {
        Self {
            db,
            store,
            thumbnailer: Box::new(NoThumbnailer),
            thumbnail_size: (320, 240),
        }
    }

    /// Set the generator used for video thumbnails.
    pub fn with_thumbnailer(mut self, thumbnailer: Box<dyn ThumbnailGenerator>) -> Self {
        self.thumbnailer = thumbnailer;
        self
    }

    /// Set the requested thumbnail dimensions.
    pub fn with_thumbnail_size(mut self, width: u32, height: u32) -> Self {
        self.thumbnail_size = (width, height);
        self
    }

    pub fn store(&self) -> &MediaStore {
        &self.store
    }

    /// Copy a source stream into private storage and create the media row.
    ///
    /// For videos, thumbnail generation is attempted from the owned copy;
    /// its failure is non-fatal and the row is created without a
    /// thumbnail. If the row insert itself fails (say, the owning note was
    /// deleted out from under us), the copied file and any thumbnail are
    /// removed so nothing is orphaned.
    pub fn save_from_source(
        &self,
        note_id: Uuid,
        source: &mut dyn Read,
        kind: MediaKind,
    ) -> Result<Media, JotError> {
        let path = self.store.copy_from_source(source, kind)?;
        let mut media = Media::new(note_id, kind, &path);

        if kind == MediaKind::Video {
            let thumb_path = self.store.new_thumbnail_path()?;
            let (width, height) = self.thumbnail_size;
            match self
                .thumbnailer
                .generate(&path, &thumb_path, width, height)
            {
                Ok(()) => {
                    debug!("Saved thumbnail to {}", thumb_path.display());
                    media.thumbnail_uri = Some(thumb_path);
                }
                Err(e) => {
                    warn!("Thumbnail generation failed for {}: {}", path.display(), e);
                    // The generator may have written a partial file.
                    self.store.remove_file(&thumb_path);
                }
            }
        }

        if let Err(e) = self.insert(&media) {
            self.store.remove_file(&media.uri);
            if let Some(ref thumb) = media.thumbnail_uri {
                self.store.remove_file(thumb);
            }
            return Err(e);
        }

        Ok(media)
    }

    /// Persist a media row. REPLACE semantics on id conflict.
    ///
    /// Rejects entries with an empty uri before touching storage.
    pub fn insert(&self, media: &Media) -> Result<(), JotError> {
        if media.uri.as_os_str().is_empty() {
            return Err(JotError::MissingField("uri"));
        }

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO media (id, note_id, type, uri, thumbnail_uri, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    media.id.to_string(),
                    media.note_id.to_string(),
                    media.kind.as_db_value(),
                    media.uri.to_string_lossy().into_owned(),
                    media.thumbnail_uri.as_ref().map(|p| p.to_string_lossy().into_owned()),
                    media.timestamp.timestamp_millis(),
                ],
            )
            .map_err(|e| JotError::Storage(format!("Failed to insert media: {}", e)))?;
            Ok(())
        })
    }

    /// Overwrite an existing media row. A no-op if the id does not exist.
    pub fn update(&self, media: &Media) -> Result<(), JotError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE media SET note_id = ?2, type = ?3, uri = ?4, thumbnail_uri = ?5,
                        timestamp = ?6
                 WHERE id = ?1",
                rusqlite::params![
                    media.id.to_string(),
                    media.note_id.to_string(),
                    media.kind.as_db_value(),
                    media.uri.to_string_lossy().into_owned(),
                    media.thumbnail_uri.as_ref().map(|p| p.to_string_lossy().into_owned()),
                    media.timestamp.timestamp_millis(),
                ],
            )
            .map_err(|e| JotError::Storage(format!("Failed to update media: {}", e)))?;
            Ok(())
        })
    }

    /// Remove a media entry: backing file, thumbnail, then the row.
    ///
    /// Already-missing files are treated as success (logged only).
    pub fn delete(&self, media: &Media) -> Result<(), JotError> {
        self.store.remove_file(&media.uri);
        if let Some(ref thumb) = media.thumbnail_uri {
            self.store.remove_file(thumb);
        }

        self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM media WHERE id = ?1",
                rusqlite::params![media.id.to_string()],
            )
            .map_err(|e| JotError::Storage(format!("Failed to delete media: {}", e)))?;
            Ok(())
        })
    }

    /// Remove a media entry by id. A no-op if the id does not exist.
    pub fn delete_by_id(&self, media_id: Uuid) -> Result<(), JotError> {
        match self.get_by_id(media_id)? {
            Some(media) => self.delete(&media),
            None => Ok(()),
        }
    }

    /// Remove every media entry for a note, files included.
    ///
    /// Best-effort per item: file removal never blocks row removal, and
    /// the first row-level failure is reported only after the whole sweep,
    /// so a retry can finish the cleanup.
    pub fn delete_all_for_note(&self, note_id: Uuid) -> Result<(), JotError> {
        let mut first_err = None;

        for media in self.get_for_note(note_id)? {
            if let Err(e) = self.delete(&media) {
                warn!("Failed to delete media {}: {}", media.id, e);
                first_err.get_or_insert(e);
            }
        }

        // Sweep any rows the per-item pass missed.
        let swept = self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM media WHERE note_id = ?1",
                rusqlite::params![note_id.to_string()],
            )
            .map_err(|e| JotError::Storage(format!("Failed to delete media rows: {}", e)))
        });
        if let Err(e) = swept {
            first_err.get_or_insert(e);
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// All media for a note in attachment order (oldest first).
    ///
    /// Ties on timestamp are broken by id ascending for determinism.
    pub fn get_for_note(&self, note_id: Uuid) -> Result<Vec<Media>, JotError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, note_id, type, uri, thumbnail_uri, timestamp FROM media
                     WHERE note_id = ?1
                     ORDER BY timestamp ASC, id ASC",
                )
                .map_err(|e| JotError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![note_id.to_string()], |row| {
                    Ok(row_to_media(row))
                })
                .map_err(|e| JotError::Storage(e.to_string()))?;

            let mut items = Vec::new();
            for row in rows {
                let media = row.map_err(|e| JotError::Storage(e.to_string()))??;
                items.push(media);
            }
            Ok(items)
        })
    }

    /// Find a media entry by id.
    pub fn get_by_id(&self, media_id: Uuid) -> Result<Option<Media>, JotError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, note_id, type, uri, thumbnail_uri, timestamp FROM media
                     WHERE id = ?1",
                )
                .map_err(|e| JotError::Storage(e.to_string()))?;

            let result = stmt
                .query_row(rusqlite::params![media_id.to_string()], |row| {
                    Ok(row_to_media(row))
                })
                .optional()
                .map_err(|e| JotError::Storage(e.to_string()))?;

            match result {
                Some(media) => Ok(Some(media?)),
                None => Ok(None),
            }
        })
    }

    /// Check that a media row's backing file exists on disk.
    ///
    /// A row pointing at a missing file is a data-integrity warning, never
    /// a failure: the row is still served, the condition is just logged.
    pub fn verify(&self, media: &Media) -> bool {
        if media.uri.exists() {
            true
        } else {
            warn!(
                "Media {} points at missing file {}",
                media.id,
                media.uri.display()
            );
            false
        }
    }
}

fn row_to_media(row: &rusqlite::Row<'_>) -> Result<Media, JotError> {
    let id_str: String = row.get(0).map_err(|e| JotError::Storage(e.to_string()))?;
    let note_id_str: String = row.get(1).map_err(|e| JotError::Storage(e.to_string()))?;
    let kind_val: i64 = row.get(2).map_err(|e| JotError::Storage(e.to_string()))?;
    let uri: Option<String> = row.get(3).map_err(|e| JotError::Storage(e.to_string()))?;
    let thumbnail_uri: Option<String> = row.get(4).map_err(|e| JotError::Storage(e.to_string()))?;
    let timestamp_ms: i64 = row.get(5).map_err(|e| JotError::Storage(e.to_string()))?;

    Ok(Media {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| JotError::Storage(format!("Invalid UUID: {}", e)))?,
        note_id: Uuid::parse_str(&note_id_str)
            .map_err(|e| JotError::Storage(format!("Invalid UUID: {}", e)))?,
        kind: MediaKind::from_db_value(kind_val)
            .ok_or_else(|| JotError::Storage(format!("Invalid media type: {}", kind_val)))?,
        uri: uri.unwrap_or_default().into(),
        thumbnail_uri: thumbnail_uri.map(Into::into),
        timestamp: Utc
            .timestamp_millis_opt(timestamp_ms)
            .single()
            .unwrap_or_default(),
    })
}
