//! Error types for the record store.
//!
//! All fallible store operations return [`StoreError`]. Parse failures
//! during a directory scan never surface here: the scan drops the file and
//! moves on.

use std::path::PathBuf;

/// Errors that can occur in the record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A filesystem operation (open, read, write, rename, mkdir) failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The path being operated on.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A record or seed document could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No topic has the requested title or location.
    #[error("topic not found: {0}")]
    NotFound(String),

    /// A relative path resolves outside the store root.
    #[error("path escapes store root: {0}")]
    PathEscape(String),

    /// A relative path is empty or otherwise unusable.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A new topic would overwrite an existing file.
    #[error("location already taken: {0}")]
    Conflict(String),
}

impl StoreError {
    /// Attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means "there is no such record".
    ///
    /// Covers [`StoreError::NotFound`] as well as a missing backing file.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
