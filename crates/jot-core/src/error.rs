use thiserror::Error;

/// Top-level error type for the jot system.
///
/// Validation failures are rejected before reaching storage; storage and
/// file-system failures are recoverable values, never panics. Not-found on
/// update/delete is deliberately NOT an error: repositories treat it as a
/// silent no-op.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JotError {
    /// Note content was empty or whitespace-only at save time.
    #[error("Note content is empty")]
    EmptyContent,

    /// A required field was missing or empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Storage error: {0}")]
    Storage(String),

    /// Media file handling failed (copy, thumbnail, cleanup).
    #[error("Media error: {0}")]
    Media(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for JotError {
    fn from(err: toml::de::Error) -> Self {
        JotError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for JotError {
    fn from(err: toml::ser::Error) -> Self {
        JotError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for JotError {
    fn from(err: serde_json::Error) -> Self {
        JotError::Serialization(err.to_string())
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, JotError>;
