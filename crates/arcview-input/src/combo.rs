//! Modifier/button combinations
//!
//! Every mouse binding is keyed by a [`ComboKey`]: a bitset combining zero
//! or more modifier keys (Shift, Ctrl, Alt, Meta) with zero or more pointer
//! buttons (left, middle, right). A combo with no button set is only valid
//! for wheel bindings.

use bitflags::bitflags;
use winit::event::MouseButton;
use winit::keyboard::ModifiersState;

bitflags! {
    /// A combination of modifier keys and mouse buttons.
    ///
    /// Used as the lookup key for drag, wheel and click binding tables.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ComboKey: u8 {
        const SHIFT  = 1 << 0;
        const CTRL   = 1 << 1;
        const ALT    = 1 << 2;
        const META   = 1 << 3;
        const LEFT   = 1 << 4;
        const MIDDLE = 1 << 5;
        const RIGHT  = 1 << 6;
    }
}

impl ComboKey {
    /// Mask selecting the modifier-key part of a combo.
    pub const MODIFIER_MASK: ComboKey = ComboKey::SHIFT
        .union(ComboKey::CTRL)
        .union(ComboKey::ALT)
        .union(ComboKey::META);

    /// Mask selecting the mouse-button part of a combo.
    pub const BUTTON_MASK: ComboKey = ComboKey::LEFT
        .union(ComboKey::MIDDLE)
        .union(ComboKey::RIGHT);

    /// The modifier-key part of this combo.
    pub fn modifiers(self) -> ComboKey {
        self & Self::MODIFIER_MASK
    }

    /// The mouse-button part of this combo.
    pub fn buttons(self) -> ComboKey {
        self & Self::BUTTON_MASK
    }

    /// Whether at least one mouse button is part of this combo.
    pub fn has_button(self) -> bool {
        !self.buttons().is_empty()
    }

    /// Build the modifier part of a combo from a winit modifiers state.
    pub fn from_modifiers(modifiers: ModifiersState) -> ComboKey {
        let mut combo = ComboKey::empty();
        if modifiers.shift_key() {
            combo |= ComboKey::SHIFT;
        }
        if modifiers.control_key() {
            combo |= ComboKey::CTRL;
        }
        if modifiers.alt_key() {
            combo |= ComboKey::ALT;
        }
        if modifiers.super_key() {
            combo |= ComboKey::META;
        }
        combo
    }

    /// Build the button part of a combo from a winit mouse button.
    ///
    /// Buttons the viewer does not bind (back/forward/other) map to an
    /// empty combo, which no binding can match.
    pub fn from_button(button: MouseButton) -> ComboKey {
        match button {
            MouseButton::Left => ComboKey::LEFT,
            MouseButton::Middle => ComboKey::MIDDLE,
            MouseButton::Right => ComboKey::RIGHT,
            _ => ComboKey::empty(),
        }
    }

    /// Human readable label for the modifier part, e.g. `"Ctrl+Shift+"`.
    ///
    /// When `no_button` is true and the combo is empty, returns
    /// `"(no button)"` (used for wheel binding descriptions).
    pub fn modifier_label(self, no_button: bool) -> String {
        let mut out = String::new();
        if self.contains(ComboKey::CTRL) {
            out.push_str("Ctrl+");
        }
        if self.contains(ComboKey::ALT) {
            out.push_str("Alt+");
        }
        if self.contains(ComboKey::SHIFT) {
            out.push_str("Shift+");
        }
        if self.contains(ComboKey::META) {
            out.push_str("Meta+");
        }
        if no_button && self.is_empty() {
            out.push_str("(no button)");
        }
        out
    }

    /// Human readable label for the button part, e.g. `"Left & Middle"`.
    pub fn button_label(self) -> String {
        let mut out = String::new();
        let mut n = 0;
        if self.contains(ComboKey::LEFT) {
            out.push_str("Left");
            n += 1;
        }
        if self.contains(ComboKey::MIDDLE) {
            if n > 0 {
                out.push_str(" & ");
            }
            out.push_str("Middle");
            n += 1;
        }
        if self.contains(ComboKey::RIGHT) {
            if n > 0 {
                out.push_str(" & ");
            }
            out.push_str("Right");
        }
        out
    }
}

/// Key of the click binding table.
///
/// A click binding matches a button combo, a single/double click flag and
/// the set of buttons that were already held when the (double) click
/// happened. `button_before` is only meaningful for double clicks; the
/// table setter rejects it otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClickKey {
    /// Modifiers and freshly pressed button(s).
    pub combo: ComboKey,
    /// Whether the gesture is a double click.
    pub double_click: bool,
    /// Buttons held before the press (buttons only, no modifiers).
    pub button_before: ComboKey,
}

impl ClickKey {
    /// A plain single-click key: no double click, no prior button.
    pub fn plain(combo: ComboKey) -> Self {
        Self {
            combo,
            double_click: false,
            button_before: ComboKey::empty(),
        }
    }

    /// Full key constructor; `button_before` keeps its button part only.
    pub fn new(combo: ComboKey, double_click: bool, button_before: ComboKey) -> Self {
        Self {
            combo,
            double_click,
            button_before: button_before.buttons(),
        }
    }

    /// Whether this key is plain (single click, no prior button).
    pub fn is_plain(&self) -> bool {
        !self.double_click && self.button_before.is_empty()
    }

    /// Human readable gesture label, e.g.
    /// `"Shift+Left double click with Right pressed"`.
    pub fn label(&self) -> String {
        let mut out = self.combo.modifier_label(false) + &self.combo.button_label();
        if self.double_click {
            out.push_str(" double click");
        }
        if !self.combo.has_button() {
            out.push_str("Wheel");
        }
        if !self.button_before.is_empty() {
            out.push_str(" with ");
            out.push_str(&self.button_before.button_label());
            out.push_str(" pressed");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combo_parts() {
        let combo = ComboKey::CTRL | ComboKey::SHIFT | ComboKey::LEFT;
        assert_eq!(combo.modifiers(), ComboKey::CTRL | ComboKey::SHIFT);
        assert_eq!(combo.buttons(), ComboKey::LEFT);
        assert!(combo.has_button());
        assert!(!(ComboKey::CTRL | ComboKey::ALT).has_button());
    }

    #[test]
    fn test_from_winit_types() {
        let mods = ModifiersState::SHIFT | ModifiersState::CONTROL;
        assert_eq!(
            ComboKey::from_modifiers(mods),
            ComboKey::SHIFT | ComboKey::CTRL
        );
        assert_eq!(ComboKey::from_button(MouseButton::Middle), ComboKey::MIDDLE);
        assert_eq!(ComboKey::from_button(MouseButton::Back), ComboKey::empty());
    }

    #[test]
    fn test_labels() {
        let combo = ComboKey::CTRL | ComboKey::LEFT | ComboKey::MIDDLE;
        assert_eq!(combo.modifier_label(false), "Ctrl+");
        assert_eq!(combo.button_label(), "Left & Middle");
        assert_eq!(ComboKey::empty().modifier_label(true), "(no button)");
    }

    #[test]
    fn test_click_key_label() {
        let key = ClickKey::new(ComboKey::LEFT, true, ComboKey::RIGHT);
        assert_eq!(key.label(), "Left double click with Right pressed");
        assert!(!key.is_plain());
        assert!(ClickKey::plain(ComboKey::LEFT).is_plain());
    }

    #[test]
    fn test_button_before_keeps_buttons_only() {
        let key = ClickKey::new(ComboKey::LEFT, true, ComboKey::CTRL | ComboKey::RIGHT);
        assert_eq!(key.button_before, ComboKey::RIGHT);
    }
}
