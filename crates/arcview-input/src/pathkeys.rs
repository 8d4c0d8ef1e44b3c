//! Camera path shortcut keys
//!
//! Numbered keys (F1..F12 by default) are associated with camera keyframe
//! paths. Pressed together with the "play" modifier combo they play or
//! rewind a path; with the "add keyframe" combo they record the current
//! camera position or, on a quick double press, delete the path.

use std::time::{Duration, Instant};

use ahash::AHashMap;
use winit::keyboard::KeyCode;

use crate::combo::ComboKey;

/// Operation resolved from a path shortcut key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOp {
    /// Start playing the path (stopping any other playing path first).
    Play(u32),
    /// Rewind the path's interpolation (double press on the play combo).
    Reset(u32),
    /// Append the current camera pose to the path.
    AddKeyFrame(u32),
    /// Delete the path (double press on the add combo).
    DeletePath(u32),
}

impl PathOp {
    /// The path index the operation targets.
    pub fn index(self) -> u32 {
        match self {
            PathOp::Play(i) | PathOp::Reset(i) | PathOp::AddKeyFrame(i) | PathOp::DeletePath(i) => i,
        }
    }
}

/// Key-to-path-index mapping with double-press disambiguation.
#[derive(Debug, Clone)]
pub struct PathShortcuts {
    index_by_key: AHashMap<KeyCode, u32>,
    play_modifiers: ComboKey,
    add_modifiers: ComboKey,
    double_press_window: Duration,
    last_press: Option<Instant>,
    previous_index: u32,
}

impl Default for PathShortcuts {
    fn default() -> Self {
        let mut shortcuts = Self {
            index_by_key: AHashMap::new(),
            play_modifiers: ComboKey::empty(),
            add_modifiers: ComboKey::ALT,
            double_press_window: Duration::from_millis(250),
            last_press: None,
            previous_index: 0,
        };

        let function_keys = [
            KeyCode::F1,
            KeyCode::F2,
            KeyCode::F3,
            KeyCode::F4,
            KeyCode::F5,
            KeyCode::F6,
            KeyCode::F7,
            KeyCode::F8,
            KeyCode::F9,
            KeyCode::F10,
            KeyCode::F11,
            KeyCode::F12,
        ];
        for (i, key) in function_keys.iter().enumerate() {
            shortcuts.set_path_key(*key, i as u32 + 1);
        }

        shortcuts
    }
}

impl PathShortcuts {
    /// Create the default mapping (F1..F12 → paths 1..12, play on the bare
    /// key, add on Alt).
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `key` with path `index`. Several keys may share an index.
    pub fn set_path_key(&mut self, key: KeyCode, index: u32) {
        self.index_by_key.insert(key, index);
    }

    /// Remove the binding of `key`, returning true if one existed.
    pub fn remove_path_key(&mut self, key: KeyCode) -> bool {
        self.index_by_key.remove(&key).is_some()
    }

    /// One key associated with `index`, if any.
    pub fn path_key(&self, index: u32) -> Option<KeyCode> {
        self.index_by_key
            .iter()
            .find(|(_, i)| **i == index)
            .map(|(key, _)| *key)
    }

    /// The path index bound to `key`, if any.
    pub fn path_index(&self, key: KeyCode) -> Option<u32> {
        self.index_by_key.get(&key).copied()
    }

    /// Modifier combo that plays (or, double-pressed, rewinds) a path.
    pub fn play_modifiers(&self) -> ComboKey {
        self.play_modifiers
    }

    /// Set the play modifier combo (modifier part only is kept).
    pub fn set_play_modifiers(&mut self, modifiers: ComboKey) {
        self.play_modifiers = modifiers.modifiers();
    }

    /// Modifier combo that records (or, double-pressed, deletes) a path.
    pub fn add_modifiers(&self) -> ComboKey {
        self.add_modifiers
    }

    /// Set the add-keyframe modifier combo (modifier part only is kept).
    pub fn set_add_modifiers(&mut self, modifiers: ComboKey) {
        self.add_modifiers = modifiers.modifiers();
    }

    /// Width of the double-press window. Default 250 ms.
    pub fn set_double_press_window(&mut self, window: Duration) {
        self.double_press_window = window;
    }

    /// Resolve a key press into a path operation.
    ///
    /// Returns `None` when `key` is not a path key or `modifiers` matches
    /// neither combo. The double-press clock restarts on every resolved
    /// press, whether or not it was a double press.
    pub fn resolve(&mut self, key: KeyCode, modifiers: ComboKey, now: Instant) -> Option<PathOp> {
        let index = self.path_index(key)?;
        let modifiers = modifiers.modifiers();

        let op = if modifiers == self.play_modifiers {
            if self.is_double_press(index, now) {
                PathOp::Reset(index)
            } else {
                PathOp::Play(index)
            }
        } else if modifiers == self.add_modifiers {
            if self.is_double_press(index, now) {
                PathOp::DeletePath(index)
            } else {
                PathOp::AddKeyFrame(index)
            }
        } else {
            return None;
        };

        self.last_press = Some(now);
        self.previous_index = index;
        Some(op)
    }

    fn is_double_press(&self, index: u32, now: Instant) -> bool {
        index == self.previous_index
            && self
                .last_press
                .is_some_and(|t| now.duration_since(t) < self.double_press_window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping() {
        let shortcuts = PathShortcuts::new();
        assert_eq!(shortcuts.path_index(KeyCode::F1), Some(1));
        assert_eq!(shortcuts.path_index(KeyCode::F12), Some(12));
        assert_eq!(shortcuts.path_index(KeyCode::KeyA), None);
        assert_eq!(shortcuts.path_key(3), Some(KeyCode::F3));
    }

    #[test]
    fn test_play_then_quick_replay_resets() {
        let mut shortcuts = PathShortcuts::new();
        let t0 = Instant::now();

        assert_eq!(
            shortcuts.resolve(KeyCode::F3, ComboKey::empty(), t0),
            Some(PathOp::Play(3))
        );
        assert_eq!(
            shortcuts.resolve(KeyCode::F3, ComboKey::empty(), t0 + Duration::from_millis(100)),
            Some(PathOp::Reset(3))
        );
    }

    #[test]
    fn test_slow_second_press_plays_again() {
        let mut shortcuts = PathShortcuts::new();
        let t0 = Instant::now();

        shortcuts.resolve(KeyCode::F3, ComboKey::empty(), t0);
        assert_eq!(
            shortcuts.resolve(KeyCode::F3, ComboKey::empty(), t0 + Duration::from_millis(500)),
            Some(PathOp::Play(3))
        );
    }

    #[test]
    fn test_add_then_quick_readd_deletes() {
        let mut shortcuts = PathShortcuts::new();
        let t0 = Instant::now();

        assert_eq!(
            shortcuts.resolve(KeyCode::F3, ComboKey::ALT, t0),
            Some(PathOp::AddKeyFrame(3))
        );
        assert_eq!(
            shortcuts.resolve(KeyCode::F3, ComboKey::ALT, t0 + Duration::from_millis(100)),
            Some(PathOp::DeletePath(3))
        );
        // The clock restarted at the delete; half a second later the press
        // is single again.
        assert_eq!(
            shortcuts.resolve(KeyCode::F3, ComboKey::ALT, t0 + Duration::from_millis(600)),
            Some(PathOp::AddKeyFrame(3))
        );
    }

    #[test]
    fn test_quick_press_on_other_index_is_not_double() {
        let mut shortcuts = PathShortcuts::new();
        let t0 = Instant::now();

        shortcuts.resolve(KeyCode::F3, ComboKey::ALT, t0);
        assert_eq!(
            shortcuts.resolve(KeyCode::F4, ComboKey::ALT, t0 + Duration::from_millis(100)),
            Some(PathOp::AddKeyFrame(4))
        );
    }

    #[test]
    fn test_unrelated_modifiers_do_not_resolve() {
        let mut shortcuts = PathShortcuts::new();
        assert_eq!(
            shortcuts.resolve(KeyCode::F3, ComboKey::CTRL | ComboKey::SHIFT, Instant::now()),
            None
        );
    }

    #[test]
    fn test_custom_combos() {
        let mut shortcuts = PathShortcuts::new();
        shortcuts.set_play_modifiers(ComboKey::SHIFT);
        shortcuts.set_add_modifiers(ComboKey::CTRL);

        assert_eq!(
            shortcuts.resolve(KeyCode::F1, ComboKey::SHIFT, Instant::now()),
            Some(PathOp::Play(1))
        );
        assert_eq!(
            shortcuts.resolve(KeyCode::F1, ComboKey::empty(), Instant::now()),
            None
        );
    }
}
