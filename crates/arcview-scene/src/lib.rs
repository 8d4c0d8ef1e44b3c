//! Interactive 3D viewer core
//!
//! This crate binds user input to camera/frame manipulation and keeps the
//! viewer's interaction state:
//!
//! - [`Viewer`] — the input dispatcher and per-frame glue
//! - [`Camera`] / [`ManipulatedFrame`] — the manipulable frames
//! - [`KeyFrameInterpolator`] — recorded camera paths
//! - [`GrabberRegistry`] / [`MouseGrabber`] — hover-activated pointer
//!   capture
//! - [`Selector`] — GL-selection-style picking
//! - [`OverlayFrame`] — the per-frame visual hint description
//! - [`BufferTextureCache`] — the z-buffer capture texture cache
//!
//! Scene drawing stays with the embedding application; the viewer only
//! decides *what* the input means and *what* must be overlaid.

pub mod camera;
pub mod capture;
pub mod error;
pub mod frame;
pub mod grabber;
pub mod hints;
pub mod keyframes;
pub mod keypath;
pub mod quat;
pub mod select;
pub mod snapshot;
pub mod viewer;

pub use camera::Camera;
pub use capture::BufferTextureCache;
pub use error::{SceneError, SceneResult, ViewerError, ViewerResult};
pub use frame::{
    AxisPlaneConstraint, Constraint, DriveMode, Frame, FramePose, ManipulatedFrame, ViewContext,
};
pub use grabber::{GrabberId, GrabberRegistry, MouseGrabber};
pub use hints::{FpsCounter, OverlayFrame, ScreenRect, TransientMessage, VisualHints};
pub use keyframes::{KeyFrame, KeyFrameInterpolator};
pub use keypath::PathController;
pub use quat::Quat;
pub use select::{PickRegion, SelectionHit, Selector};
pub use snapshot::{save_snapshot, SnapshotNamer};
pub use viewer::{FrameSetup, KeyResponse, Viewer, ViewerApp, ViewerCommand};

pub use arcview_input as input;
pub use arcview_session as session;
