//! Viewer state persistence
//!
//! Serializes the viewer configuration (display flags, colors, geometry,
//! camera and manipulated-frame states) to a versioned JSON document and
//! restores it defensively: every attribute has a hard-coded default, a
//! missing or malformed field warns and defaults, and only genuine I/O
//! failures surface as errors.

pub mod doc;
pub mod error;
pub mod io;
pub mod state;

pub use error::{SessionError, SessionResult};
pub use io::{restore_state_from_file, save_state_to_file};
pub use state::{CameraMode, CameraState, FrameState, Geometry, KeyFrameState, ViewerState};
