//! jot storage crate - SQLite persistence for notes and their media.
//!
//! Provides a WAL-mode SQLite database with migrations, repository
//! implementations for notes and media (including the media file store
//! and thumbnail seam), the substring search/filter primitives, and the
//! `NoteService` facade the presentation layer talks to.

pub mod db;
pub mod media;
pub mod migrations;
pub mod notes;
pub mod search;
pub mod service;
pub mod store;

pub use db::Database;
pub use media::MediaRepository;
pub use notes::NoteRepository;
pub use search::{matches, NoteFilter};
pub use service::NoteService;
pub use store::{CommandThumbnailer, MediaStore, NoThumbnailer, ThumbnailGenerator};
