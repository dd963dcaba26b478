//! CLI argument definitions for the jot application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use jot_core::types::MediaKind;

/// jot — a local note-taking core with media attachments.
#[derive(Parser, Debug)]
#[command(name = "jot", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Data directory for the SQLite database and media files.
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Emit lists as JSON instead of plain text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new note.
    Add {
        /// The note's text content.
        content: String,
    },
    /// Replace a note's content.
    Edit {
        id: Uuid,
        content: String,
    },
    /// Delete a note and all its media.
    Delete {
        id: Uuid,
    },
    /// List all notes, most recent first.
    List,
    /// List notes whose content contains the query (case-insensitive).
    Search {
        query: String,
    },
    /// Attach a media file to a note, copying it into private storage.
    Attach {
        note_id: Uuid,
        /// Source file to copy.
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = KindArg::Image)]
        kind: KindArg,
    },
    /// List a note's media in attachment order.
    Media {
        note_id: Uuid,
    },
    /// Delete a single media attachment.
    RmMedia {
        media_id: Uuid,
    },
    /// Delete every note and all media.
    Clear,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum KindArg {
    Image,
    Video,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Image => MediaKind::Image,
            KindArg::Video => MediaKind::Video,
        }
    }
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > JOT_CONFIG env var > ~/.jot/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("JOT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the data directory.
    ///
    /// Priority: --data-dir flag > config file value.
    /// Returns `None` if not overridden (use config default).
    pub fn resolve_data_dir(&self) -> Option<String> {
        self.data_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

/// Platform default config location (~/.jot/config.toml).
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".jot").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".jot").join("config.toml");
    }
    PathBuf::from("config.toml")
}
