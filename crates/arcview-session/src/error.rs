//! Error types for state persistence

use std::path::PathBuf;

use thiserror::Error;

/// Persistence errors
///
/// Only genuine I/O failures are errors: a missing state file is "no prior
/// state" and malformed content degrades field by field to defaults.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The state path exists but is not a regular file
    #[error("State file path is a directory, not a file: {0}")]
    NotAFile(PathBuf),

    /// The parent directory could not be created
    #[error("Unable to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// IO error while reading or writing the state file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error while producing the state document
    #[error("State serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for persistence operations
pub type SessionResult<T> = Result<T, SessionError>;
