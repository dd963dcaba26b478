use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{JotError, Result};

/// Top-level configuration for the jot application.
///
/// Loaded from `~/.jot/config.toml` by default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JotConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl JotConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: JotConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| JotError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the SQLite database and media files.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.jot".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Storage layout settings, relative to the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database filename.
    pub database_file: String,
    /// Directory for owned media copies.
    pub media_dir: String,
    /// Directory for generated video thumbnails.
    pub thumbnails_dir: String,
    /// Requested thumbnail dimensions.
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_file: "jot.db".to_string(),
            media_dir: "media".to_string(),
            thumbnails_dir: "thumbnails".to_string(),
            thumbnail_width: 320,
            thumbnail_height: 240,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = JotConfig::default();
        assert_eq!(config.general.data_dir, "~/.jot");
        assert_eq!(config.storage.database_file, "jot.db");
        assert_eq!(config.storage.thumbnail_width, 320);
        assert_eq!(config.storage.thumbnail_height, 240);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = JotConfig::default();
        config.general.log_level = "debug".to_string();
        config.storage.media_dir = "attachments".to_string();
        config.save(&path).unwrap();

        let loaded = JotConfig::load(&path).unwrap();
        assert_eq!(loaded.general.log_level, "debug");
        assert_eq!(loaded.storage.media_dir, "attachments");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = JotConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.data_dir, "~/.jot");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\nlog_level = \"trace\"\n").unwrap();

        let config = JotConfig::load(&path).unwrap();
        assert_eq!(config.general.log_level, "trace");
        assert_eq!(config.storage.database_file, "jot.db");
    }
}
