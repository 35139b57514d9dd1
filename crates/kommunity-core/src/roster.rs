//! Actor roster loading.
//!
//! The roster is a JSON array of [`Actor`] personas. The loop only reads it;
//! [`save_roster`] exists for tooling that edits personas and reuses the
//! store's atomic write so a half-written roster is never observed.

use std::path::Path;

use kommunity_store::{StoreError, write_json_atomic};
use kommunity_types::Actor;

/// Errors that can occur when loading or saving the roster.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// The roster file could not be read.
    #[error("failed to read roster {path}: {source}")]
    Io {
        /// Path of the roster file.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The roster file is not a JSON array of actors.
    #[error("failed to decode roster: {0}")]
    Decode(#[from] serde_json::Error),

    /// The roster parsed but lists no actors.
    #[error("roster is empty")]
    Empty,

    /// Writing the roster failed.
    #[error("failed to write roster: {0}")]
    Write(#[from] StoreError),
}

/// Load and validate the roster at `path`.
///
/// # Errors
///
/// Returns [`RosterError::Empty`] if the file holds an empty array.
pub fn load_roster(path: &Path) -> Result<Vec<Actor>, RosterError> {
    let raw = std::fs::read_to_string(path).map_err(|source| RosterError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let actors: Vec<Actor> = serde_json::from_str(&raw)?;
    if actors.is_empty() {
        return Err(RosterError::Empty);
    }
    Ok(actors)
}

/// Atomically write `actors` to `path` as pretty JSON.
pub fn save_roster(actors: &[Actor], path: &Path) -> Result<(), RosterError> {
    write_json_atomic(path, &actors)?;
    Ok(())
}
