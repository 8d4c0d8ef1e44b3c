//! Error types for the scene crate

use thiserror::Error;

/// Scene-related errors
#[derive(Debug, Error)]
pub enum SceneError {
    /// Keyframe path not found
    #[error("Camera path not found: {0}")]
    PathNotFound(u32),

    /// Grabber id is not registered
    #[error("Mouse grabber not found: {0}")]
    GrabberNotFound(usize),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;

/// Viewer-level errors
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Scene error
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// State persistence error
    #[error("State file error: {0}")]
    Session(#[from] arcview_session::SessionError),

    /// Snapshot encoding error
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for viewer operations
pub type ViewerResult<T> = Result<T, ViewerError>;
