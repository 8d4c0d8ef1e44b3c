//! Input vocabulary and binding tables for the arcview viewer
//!
//! This crate holds the pure, I/O-free part of the interaction layer:
//!
//! - [`ComboKey`] / [`ClickKey`] — modifier/button combinations used as
//!   binding-table keys
//! - [`MouseAction`], [`ClickAction`], [`MouseHandler`] — the semantic
//!   action vocabulary
//! - [`MouseBindings`] — drag, wheel and click binding tables with
//!   validation and help-text rendering
//! - [`PathShortcuts`] — camera-path shortcut keys with double-press
//!   disambiguation
//!
//! The dispatcher that feeds events through these tables lives in
//! `arcview-scene`.

pub mod action;
pub mod bindings;
pub mod combo;
pub mod pathkeys;
pub mod shortcuts;

pub use action::{ClickAction, MouseAction, MouseHandler};
pub use bindings::{MouseActionBinding, MouseBindings};
pub use combo::{ClickKey, ComboKey};
pub use pathkeys::{PathOp, PathShortcuts};
pub use shortcuts::{KeyCombo, KeyboardAction, KeyboardShortcuts};

pub use winit::keyboard::KeyCode;
