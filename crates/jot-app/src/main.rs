//! jot application binary - composition root.
//!
//! Ties the workspace crates into a single executable:
//! 1. Parse CLI arguments
//! 2. Load configuration from TOML
//! 3. Open storage (SQLite + media file store)
//! 4. Run the requested command against the NoteService facade

mod cli;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use jot_core::config::JotConfig;
use jot_core::types::{Media, Note};
use jot_storage::{CommandThumbnailer, Database, MediaRepository, MediaStore, NoteService};

use cli::{CliArgs, Command};

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

fn print_note(note: &Note) {
    println!(
        "{}  {}  {}",
        note.id,
        note.timestamp.format("%Y-%m-%d %H:%M:%S"),
        note.content
    );
}

fn print_media(media: &Media) {
    let thumb = media
        .thumbnail_uri
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{}  {:?}  {}  {}",
        media.id, media.kind, media.uri.display(), thumb
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = JotConfig::load_or_default(&config_file);
    if let Some(data_dir) = args.resolve_data_dir() {
        config.general.data_dir = data_dir;
    }
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Storage.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let db_path = data_dir.join(&config.storage.database_file);
    let db = Arc::new(Database::open(&db_path)?);
    tracing::debug!(path = %db_path.display(), "SQLite database opened");

    let store = MediaStore::new(
        data_dir.join(&config.storage.media_dir),
        data_dir.join(&config.storage.thumbnails_dir),
    );
    let media_repo = MediaRepository::new(Arc::clone(&db), store)
        .with_thumbnailer(Box::new(CommandThumbnailer::default()))
        .with_thumbnail_size(
            config.storage.thumbnail_width,
            config.storage.thumbnail_height,
        );
    let service = NoteService::new(db, media_repo);

    match args.command {
        Command::Add { content } => {
            let note = service.create_note(&content)?;
            println!("{}", note.id);
        }
        Command::Edit { id, content } => {
            service.edit_note(id, &content)?;
        }
        Command::Delete { id } => {
            service.delete_note(id)?;
        }
        Command::List => {
            let notes = service.list_notes()?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&notes)?);
            } else {
                for note in &notes {
                    print_note(note);
                }
            }
        }
        Command::Search { query } => {
            let notes = service.search_notes(&query)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&notes)?);
            } else {
                for note in &notes {
                    print_note(note);
                }
            }
        }
        Command::Attach { note_id, file, kind } => {
            let note = service
                .get_note(note_id)?
                .ok_or_else(|| format!("No note with id {}", note_id))?;
            let mut source = File::open(&file)?;
            let media = service.attach_media(&note, &mut source, kind.into())?;
            println!("{}", media.id);
        }
        Command::Media { note_id } => {
            let items = service.list_media(note_id)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for media in &items {
                    print_media(media);
                }
            }
        }
        Command::RmMedia { media_id } => {
            service.delete_media(media_id)?;
        }
        Command::Clear => {
            service.delete_all_notes()?;
        }
    }

    Ok(())
}
