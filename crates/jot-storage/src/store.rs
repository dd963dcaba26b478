//! Media file store: owned copies, thumbnails, and cleanup.
//!
//! Media bytes are copied out of their source into app-private storage so
//! attachments survive the source going away. Originals live under
//! `media/`, video thumbnails under `thumbnails/`, with timestamp+uuid
//! filenames to avoid collisions. A failed or empty copy never leaves a
//! partial file behind.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use jot_core::error::JotError;
use jot_core::types::MediaKind;

/// Generates a still-image thumbnail for a video file.
///
/// Codec work is delegated to an external tool; only the resulting file is
/// consumed. Failure is always non-fatal for callers: a media entry is
/// still created, just without a thumbnail.
pub trait ThumbnailGenerator: Send + Sync {
    fn generate(&self, video: &Path, dest: &Path, width: u32, height: u32)
        -> Result<(), JotError>;
}

/// Thumbnail generator that shells out to an external program (ffmpeg by
/// default): extracts the first frame scaled to the requested size.
pub struct CommandThumbnailer {
    program: String,
}

impl CommandThumbnailer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for CommandThumbnailer {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl ThumbnailGenerator for CommandThumbnailer {
    fn generate(
        &self,
        video: &Path,
        dest: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), JotError> {
        let output = Command::new(&self.program)
            .arg("-y")
            .arg("-i")
            .arg(video)
            .args(["-frames:v", "1", "-s"])
            .arg(format!("{}x{}", width, height))
            .arg(dest)
            .output()
            .map_err(|e| JotError::Media(format!("Failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(JotError::Media(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }
        if !dest.exists() {
            return Err(JotError::Media(format!(
                "{} produced no output at {}",
                self.program,
                dest.display()
            )));
        }
        Ok(())
    }
}

/// Generator used when no external tool is available. Always fails, which
/// callers treat as "no thumbnail".
pub struct NoThumbnailer;

impl ThumbnailGenerator for NoThumbnailer {
    fn generate(&self, _: &Path, _: &Path, _: u32, _: u32) -> Result<(), JotError> {
        Err(JotError::Media(
            "no thumbnail generator configured".to_string(),
        ))
    }
}

/// Owns the private `media/` and `thumbnails/` directories and the file
/// half of every media operation.
pub struct MediaStore {
    media_dir: PathBuf,
    thumbnails_dir: PathBuf,
}

impl MediaStore {
    pub fn new(media_dir: impl Into<PathBuf>, thumbnails_dir: impl Into<PathBuf>) -> Self {
        Self {
            media_dir: media_dir.into(),
            thumbnails_dir: thumbnails_dir.into(),
        }
    }

    /// Conventional layout under a data directory: `media/` and
    /// `thumbnails/`.
    pub fn from_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("media"), data_dir.join("thumbnails"))
    }

    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    pub fn thumbnails_dir(&self) -> &Path {
        &self.thumbnails_dir
    }

    /// Copy a source stream into a fresh owned media file.
    ///
    /// Returns the new file's path. A zero-byte source or a mid-copy
    /// failure removes the partial file and fails: no orphan files.
    pub fn copy_from_source(
        &self,
        source: &mut dyn Read,
        kind: MediaKind,
    ) -> Result<PathBuf, JotError> {
        std::fs::create_dir_all(&self.media_dir)?;
        let path = self.media_dir.join(unique_name("MEDIA", kind.extension()));

        let mut file = File::create(&path)?;
        let copied = std::io::copy(source, &mut file).and_then(|n| {
            file.flush()?;
            Ok(n)
        });
        drop(file);

        match copied {
            Ok(0) => {
                self.remove_file(&path);
                Err(JotError::Media("source stream was empty".to_string()))
            }
            Ok(bytes) => {
                debug!("Copied {} bytes to {}", bytes, path.display());
                Ok(path)
            }
            Err(e) => {
                self.remove_file(&path);
                Err(JotError::Io(e))
            }
        }
    }

    /// Reserve a fresh thumbnail path (creating the directory if needed).
    pub fn new_thumbnail_path(&self) -> Result<PathBuf, JotError> {
        std::fs::create_dir_all(&self.thumbnails_dir)?;
        Ok(self.thumbnails_dir.join(unique_name("THUMB", "jpg")))
    }

    /// Remove a file, tolerating it being already gone.
    ///
    /// An already-missing file is success; any other failure is logged and
    /// swallowed so file cleanup never takes down a delete.
    pub fn remove_file(&self, path: &Path) {
        match std::fs::remove_file(path) {
            Ok(()) => debug!("Removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Already absent: {}", path.display());
            }
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }
}

/// `<PREFIX>_<yyyymmdd_hhmmss>_<uuid>.<ext>`
fn unique_name(prefix: &str, extension: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        prefix,
        Utc::now().format("%Y%m%d_%H%M%S"),
        Uuid::new_v4(),
        extension
    )
}
