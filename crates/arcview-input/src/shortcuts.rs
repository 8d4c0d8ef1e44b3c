//! Keyboard shortcut table
//!
//! Maps viewer-level actions (toggle axis, toggle full screen, camera
//! moves, ...) to a key plus modifier combo. One shortcut per action; new
//! bindings replace previous ones; binding `None` disables the action.

use ahash::AHashMap;
use winit::keyboard::KeyCode;

use crate::combo::ComboKey;

/// Standard viewer keyboard actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyboardAction {
    ToggleAxis,
    ToggleGrid,
    ToggleFps,
    ToggleZBuffer,
    ToggleText,
    ExitViewer,
    SaveSnapshot,
    ToggleCameraMode,
    ToggleFullScreen,
    ToggleStereo,
    ToggleAnimation,
    Help,
    ToggleCameraEdit,
    MoveCameraLeft,
    MoveCameraRight,
    MoveCameraUp,
    MoveCameraDown,
    IncreaseFlySpeed,
    DecreaseFlySpeed,
}

impl KeyboardAction {
    /// Help-text description of the action.
    pub fn description(self) -> &'static str {
        match self {
            KeyboardAction::ToggleAxis => "Toggles the display of the world axis",
            KeyboardAction::ToggleGrid => "Toggles the display of the XY grid",
            KeyboardAction::ToggleFps => "Toggles the display of the FPS",
            KeyboardAction::ToggleZBuffer => "Toggles the display of the z-buffer",
            KeyboardAction::ToggleText => "Toggles the display of the text",
            KeyboardAction::ExitViewer => "Exits program",
            KeyboardAction::SaveSnapshot => "Saves a screenshot",
            KeyboardAction::ToggleCameraMode => "Changes camera mode (revolve or fly)",
            KeyboardAction::ToggleFullScreen => "Toggles full screen display",
            KeyboardAction::ToggleStereo => "Toggles stereo display",
            KeyboardAction::ToggleAnimation => "Starts/stops the animation",
            KeyboardAction::Help => "Opens the help window",
            KeyboardAction::ToggleCameraEdit => "Toggles camera paths display",
            KeyboardAction::MoveCameraLeft => "Moves camera left",
            KeyboardAction::MoveCameraRight => "Moves camera right",
            KeyboardAction::MoveCameraUp => "Moves camera up",
            KeyboardAction::MoveCameraDown => "Moves camera down",
            KeyboardAction::IncreaseFlySpeed => "Increases fly speed",
            KeyboardAction::DecreaseFlySpeed => "Decreases fly speed",
        }
    }

    const ALL: [KeyboardAction; 19] = [
        KeyboardAction::ToggleAxis,
        KeyboardAction::ToggleGrid,
        KeyboardAction::ToggleFps,
        KeyboardAction::ToggleZBuffer,
        KeyboardAction::ToggleText,
        KeyboardAction::ExitViewer,
        KeyboardAction::SaveSnapshot,
        KeyboardAction::ToggleCameraMode,
        KeyboardAction::ToggleFullScreen,
        KeyboardAction::ToggleStereo,
        KeyboardAction::ToggleAnimation,
        KeyboardAction::Help,
        KeyboardAction::ToggleCameraEdit,
        KeyboardAction::MoveCameraLeft,
        KeyboardAction::MoveCameraRight,
        KeyboardAction::MoveCameraUp,
        KeyboardAction::MoveCameraDown,
        KeyboardAction::IncreaseFlySpeed,
        KeyboardAction::DecreaseFlySpeed,
    ];
}

/// A key plus the modifiers that must be held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: KeyCode,
    pub modifiers: ComboKey,
}

impl KeyCombo {
    /// A bare key with no modifiers.
    pub fn bare(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: ComboKey::empty(),
        }
    }

    /// A key with modifiers (modifier part only is kept).
    pub fn with_modifiers(key: KeyCode, modifiers: ComboKey) -> Self {
        Self {
            key,
            modifiers: modifiers.modifiers(),
        }
    }

    /// Human readable label, e.g. `"Ctrl+KeyS"`.
    pub fn label(&self) -> String {
        format!("{}{:?}", self.modifiers.modifier_label(false), self.key)
    }
}

/// Keyboard action bindings plus user descriptions for the help display.
#[derive(Debug, Clone)]
pub struct KeyboardShortcuts {
    bindings: AHashMap<KeyboardAction, KeyCombo>,
    custom_descriptions: AHashMap<KeyCombo, String>,
}

impl Default for KeyboardShortcuts {
    fn default() -> Self {
        let mut shortcuts = Self {
            bindings: AHashMap::new(),
            custom_descriptions: AHashMap::new(),
        };

        shortcuts.set_shortcut(KeyboardAction::ToggleAxis, Some(KeyCombo::bare(KeyCode::KeyA)));
        shortcuts.set_shortcut(KeyboardAction::ToggleGrid, Some(KeyCombo::bare(KeyCode::KeyG)));
        shortcuts.set_shortcut(KeyboardAction::ToggleFps, Some(KeyCombo::bare(KeyCode::KeyF)));
        shortcuts.set_shortcut(KeyboardAction::ToggleZBuffer, Some(KeyCombo::bare(KeyCode::KeyZ)));
        shortcuts.set_shortcut(
            KeyboardAction::ToggleText,
            Some(KeyCombo::with_modifiers(KeyCode::Slash, ComboKey::SHIFT)),
        );
        shortcuts.set_shortcut(KeyboardAction::ExitViewer, Some(KeyCombo::bare(KeyCode::Escape)));
        shortcuts.set_shortcut(
            KeyboardAction::SaveSnapshot,
            Some(KeyCombo::with_modifiers(KeyCode::KeyS, ComboKey::CTRL)),
        );
        shortcuts.set_shortcut(KeyboardAction::ToggleCameraMode, Some(KeyCombo::bare(KeyCode::Space)));
        shortcuts.set_shortcut(
            KeyboardAction::ToggleFullScreen,
            Some(KeyCombo::with_modifiers(KeyCode::Enter, ComboKey::ALT)),
        );
        shortcuts.set_shortcut(KeyboardAction::ToggleStereo, Some(KeyCombo::bare(KeyCode::KeyS)));
        shortcuts.set_shortcut(KeyboardAction::ToggleAnimation, Some(KeyCombo::bare(KeyCode::Enter)));
        shortcuts.set_shortcut(KeyboardAction::Help, Some(KeyCombo::bare(KeyCode::KeyH)));
        shortcuts.set_shortcut(KeyboardAction::ToggleCameraEdit, Some(KeyCombo::bare(KeyCode::KeyC)));
        shortcuts.set_shortcut(
            KeyboardAction::MoveCameraLeft,
            Some(KeyCombo::bare(KeyCode::ArrowLeft)),
        );
        shortcuts.set_shortcut(
            KeyboardAction::MoveCameraRight,
            Some(KeyCombo::bare(KeyCode::ArrowRight)),
        );
        shortcuts.set_shortcut(KeyboardAction::MoveCameraUp, Some(KeyCombo::bare(KeyCode::ArrowUp)));
        shortcuts.set_shortcut(
            KeyboardAction::MoveCameraDown,
            Some(KeyCombo::bare(KeyCode::ArrowDown)),
        );
        shortcuts.set_shortcut(
            KeyboardAction::IncreaseFlySpeed,
            Some(KeyCombo::bare(KeyCode::Equal)),
        );
        shortcuts.set_shortcut(
            KeyboardAction::DecreaseFlySpeed,
            Some(KeyCombo::bare(KeyCode::Minus)),
        );

        shortcuts
    }
}

impl KeyboardShortcuts {
    /// Create the default shortcut table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind (or with `None`, disable) the shortcut of an action.
    pub fn set_shortcut(&mut self, action: KeyboardAction, combo: Option<KeyCombo>) {
        match combo {
            Some(combo) => {
                self.bindings.insert(action, combo);
            }
            None => {
                self.bindings.remove(&action);
            }
        }
    }

    /// The shortcut bound to an action, if any.
    pub fn shortcut(&self, action: KeyboardAction) -> Option<KeyCombo> {
        self.bindings.get(&action).copied()
    }

    /// Resolve a pressed key plus modifier state into an action.
    pub fn resolve(&self, key: KeyCode, modifiers: ComboKey) -> Option<KeyboardAction> {
        let pressed = KeyCombo::with_modifiers(key, modifiers);
        self.bindings
            .iter()
            .find(|(_, combo)| **combo == pressed)
            .map(|(action, _)| *action)
    }

    /// Set (or with an empty string, remove) a custom key description for
    /// the help display.
    pub fn set_key_description(&mut self, combo: KeyCombo, description: &str) {
        if description.is_empty() {
            self.custom_descriptions.remove(&combo);
        } else {
            self.custom_descriptions.insert(combo, description.to_string());
        }
    }

    /// Render the shortcut table as help text, custom descriptions first.
    pub fn keyboard_help(&self) -> String {
        let mut out = String::new();
        let mut custom: Vec<(&KeyCombo, &String)> = self.custom_descriptions.iter().collect();
        custom.sort_by_key(|(combo, _)| combo.label());
        for (combo, text) in custom {
            out.push_str(&format!("{}: {}\n", combo.label(), text));
        }

        let mut standard: Vec<(KeyCombo, &'static str)> = KeyboardAction::ALL
            .iter()
            .filter_map(|action| self.shortcut(*action).map(|c| (c, action.description())))
            .collect();
        standard.sort_by_key(|(combo, _)| combo.label());
        for (combo, text) in standard {
            out.push_str(&format!("{}: {}\n", combo.label(), text));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shortcuts_resolve() {
        let shortcuts = KeyboardShortcuts::new();
        assert_eq!(
            shortcuts.resolve(KeyCode::KeyA, ComboKey::empty()),
            Some(KeyboardAction::ToggleAxis)
        );
        assert_eq!(
            shortcuts.resolve(KeyCode::KeyS, ComboKey::CTRL),
            Some(KeyboardAction::SaveSnapshot)
        );
        assert_eq!(
            shortcuts.resolve(KeyCode::KeyS, ComboKey::empty()),
            Some(KeyboardAction::ToggleStereo)
        );
        assert_eq!(shortcuts.resolve(KeyCode::KeyQ, ComboKey::empty()), None);
    }

    #[test]
    fn test_rebind_and_disable() {
        let mut shortcuts = KeyboardShortcuts::new();
        shortcuts.set_shortcut(
            KeyboardAction::ExitViewer,
            Some(KeyCombo::bare(KeyCode::KeyQ)),
        );
        assert_eq!(
            shortcuts.resolve(KeyCode::KeyQ, ComboKey::empty()),
            Some(KeyboardAction::ExitViewer)
        );
        assert_eq!(shortcuts.resolve(KeyCode::Escape, ComboKey::empty()), None);

        shortcuts.set_shortcut(KeyboardAction::ExitViewer, None);
        assert_eq!(shortcuts.resolve(KeyCode::KeyQ, ComboKey::empty()), None);
    }

    #[test]
    fn test_keyboard_help_contains_descriptions() {
        let mut shortcuts = KeyboardShortcuts::new();
        shortcuts.set_key_description(KeyCombo::bare(KeyCode::KeyW), "Toggles wireframe display");
        let help = shortcuts.keyboard_help();
        assert!(help.contains("Toggles wireframe display"));
        assert!(help.contains("Toggles the display of the world axis"));
    }
}
