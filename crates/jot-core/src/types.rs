use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current time truncated to millisecond precision, matching the
/// resolution of the timestamp columns so values round-trip unchanged.
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    Utc.timestamp_millis_opt(now.timestamp_millis())
        .single()
        .unwrap_or(now)
}

/// The kind of media attached to a note.
///
/// Stored in the database as an integer column: 1 = image, 2 = video.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Integer value used in the `media.type` column.
    pub fn as_db_value(&self) -> i64 {
        match self {
            MediaKind::Image => 1,
            MediaKind::Video => 2,
        }
    }

    /// Parse the `media.type` column value. Unknown values are `None`.
    pub fn from_db_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(MediaKind::Image),
            2 => Some(MediaKind::Video),
            _ => None,
        }
    }

    /// Filename extension for an owned media copy of this kind.
    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
        }
    }
}

/// A user's text entry.
///
/// The id is generated at creation and never changes; the timestamp is
/// refreshed on every edit so lists stay ordered most-recent-first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Note {
    /// Create a new note with a fresh id and the current time.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            timestamp: now_millis(),
        }
    }
}

/// An image or video attached to a note.
///
/// `uri` points at the app-owned copy of the media bytes, not the original
/// source. `thumbnail_uri` is only ever populated for videos, and only when
/// thumbnail generation succeeded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: Uuid,
    pub note_id: Uuid,
    pub kind: MediaKind,
    pub uri: PathBuf,
    pub thumbnail_uri: Option<PathBuf>,
    pub timestamp: DateTime<Utc>,
}

impl Media {
    /// Create a new media entry with a fresh id and the current time.
    pub fn new(note_id: Uuid, kind: MediaKind, uri: impl Into<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            note_id,
            kind,
            uri: uri.into(),
            thumbnail_uri: None,
            timestamp: now_millis(),
        }
    }
}
