//! Mouse binding tables
//!
//! [`MouseBindings`] maps modifier/button combinations to semantic actions
//! on four independent channels: drag actions, wheel actions, click actions
//! and free-text descriptions for the help display.
//!
//! Invalid binding requests are logged and ignored; they never fail.
//! A drag binding and a click binding on the same *plain* key (single
//! click, no prior button) are mutually exclusive: setting one removes the
//! other. Double-click and prior-button click keys are never removed by a
//! drag binding; help-text generation relies on exactly one table owning a
//! given plain key.

use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::action::{ClickAction, MouseAction, MouseHandler};
use crate::combo::{ClickKey, ComboKey};

/// A drag or wheel binding: which object moves, how, and whether the
/// frame's constraint is enforced during the motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseActionBinding {
    pub handler: MouseHandler,
    pub action: MouseAction,
    pub with_constraint: bool,
}

/// The viewer's four binding tables.
#[derive(Debug, Clone)]
pub struct MouseBindings {
    drag: AHashMap<ComboKey, MouseActionBinding>,
    wheel: AHashMap<ComboKey, MouseActionBinding>,
    click: AHashMap<ClickKey, ClickAction>,
    descriptions: AHashMap<ClickKey, String>,
}

impl Default for MouseBindings {
    fn default() -> Self {
        let mut bindings = Self::empty();
        bindings.set_default_bindings();
        bindings
    }
}

impl MouseBindings {
    /// Create a table with no bindings at all.
    pub fn empty() -> Self {
        Self {
            drag: AHashMap::new(),
            wheel: AHashMap::new(),
            click: AHashMap::new(),
            descriptions: AHashMap::new(),
        }
    }

    /// Install the standard bindings: camera on bare buttons, manipulated
    /// frame on Ctrl+buttons, Shift+Middle zoom-on-region, Shift+Left
    /// select, and the standard double-click set.
    pub fn set_default_bindings(&mut self) {
        let frame_state_key = ComboKey::CTRL;
        for handler in [MouseHandler::Camera, MouseHandler::Frame] {
            let state = match handler {
                MouseHandler::Camera => ComboKey::empty(),
                MouseHandler::Frame => frame_state_key,
            };

            self.set_mouse_binding(state | ComboKey::LEFT, handler, MouseAction::Rotate, true);
            self.set_mouse_binding(state | ComboKey::MIDDLE, handler, MouseAction::Zoom, true);
            self.set_mouse_binding(state | ComboKey::RIGHT, handler, MouseAction::Translate, true);

            self.set_mouse_binding(
                state | ComboKey::LEFT | ComboKey::MIDDLE,
                handler,
                MouseAction::ScreenRotate,
                true,
            );
            self.set_mouse_binding(
                state | ComboKey::RIGHT | ComboKey::MIDDLE,
                handler,
                MouseAction::ScreenTranslate,
                true,
            );

            self.set_wheel_binding(state, handler, MouseAction::Zoom, true);
        }

        self.set_mouse_binding(
            ComboKey::SHIFT | ComboKey::MIDDLE,
            MouseHandler::Camera,
            MouseAction::ZoomOnRegion,
            true,
        );

        self.set_click_binding(
            ComboKey::SHIFT | ComboKey::LEFT,
            ClickAction::Select,
            false,
            ComboKey::empty(),
        );

        self.set_click_binding(ComboKey::LEFT, ClickAction::AlignCamera, true, ComboKey::empty());
        self.set_click_binding(
            ComboKey::MIDDLE,
            ClickAction::ShowEntireScene,
            true,
            ComboKey::empty(),
        );
        self.set_click_binding(ComboKey::RIGHT, ClickAction::CenterScene, true, ComboKey::empty());

        self.set_click_binding(
            frame_state_key | ComboKey::LEFT,
            ClickAction::AlignFrame,
            true,
            ComboKey::empty(),
        );
        self.set_click_binding(
            frame_state_key | ComboKey::RIGHT,
            ClickAction::CenterFrame,
            true,
            ComboKey::empty(),
        );

        // Chained double clicks: hold one button, double click another.
        self.set_click_binding(ComboKey::LEFT, ClickAction::RapFromPixel, true, ComboKey::RIGHT);
        self.set_click_binding(ComboKey::RIGHT, ClickAction::RapIsCenter, true, ComboKey::LEFT);
        self.set_click_binding(ComboKey::LEFT, ClickAction::ZoomOnPixel, true, ComboKey::MIDDLE);
        self.set_click_binding(ComboKey::RIGHT, ClickAction::ZoomToFit, true, ComboKey::MIDDLE);
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Bind a drag action to a modifier/button combination.
    ///
    /// Rejected (warn, table unchanged) when `combo` carries no mouse
    /// button, or when a camera-only action is requested for the
    /// manipulated frame. Binding removes any *plain* click binding on the
    /// same combo. Binding [`MouseAction::NoAction`] removes the entry.
    pub fn set_mouse_binding(
        &mut self,
        combo: ComboKey,
        handler: MouseHandler,
        action: MouseAction,
        with_constraint: bool,
    ) {
        if handler == MouseHandler::Frame && action.is_camera_only() {
            log::warn!("cannot bind '{}' to the manipulated frame", action.label());
            return;
        }
        if !combo.has_button() {
            log::warn!("no mouse button specified in mouse binding");
            return;
        }

        if action == MouseAction::NoAction {
            self.drag.remove(&combo);
        } else {
            self.drag.insert(
                combo,
                MouseActionBinding {
                    handler,
                    action,
                    with_constraint,
                },
            );
        }

        // A plain click binding on the same combo would shadow the drag.
        self.click.remove(&ClickKey::plain(combo));
    }

    /// Bind a click action.
    ///
    /// `button_before` (buttons held before the press) is only meaningful
    /// for double clicks; the binding is rejected otherwise. Binding on a
    /// plain key removes any drag binding on the same combo. Binding
    /// [`ClickAction::NoClickAction`] removes the entry.
    pub fn set_click_binding(
        &mut self,
        combo: ComboKey,
        action: ClickAction,
        double_click: bool,
        button_before: ComboKey,
    ) {
        if !button_before.buttons().is_empty() && !double_click {
            log::warn!("a prior button is meaningful only for double-click bindings");
            return;
        }
        if !combo.has_button() {
            log::warn!("no mouse button specified in click binding");
            return;
        }

        let key = ClickKey::new(combo, double_click, button_before);
        if action == ClickAction::NoClickAction {
            self.click.remove(&key);
        } else {
            self.click.insert(key, action);
        }

        if key.is_plain() {
            self.drag.remove(&combo);
        }
    }

    /// Bind a wheel action to a modifier combination (no button required).
    ///
    /// The wheel only supports zoom and fly actions; the manipulated frame
    /// only supports zoom.
    pub fn set_wheel_binding(
        &mut self,
        combo: ComboKey,
        handler: MouseHandler,
        action: MouseAction,
        with_constraint: bool,
    ) {
        if !action.is_wheel_action() {
            log::warn!("cannot bind '{}' to the wheel", action.label());
            return;
        }
        if handler == MouseHandler::Frame
            && action != MouseAction::Zoom
            && action != MouseAction::NoAction
        {
            log::warn!("cannot bind '{}' to the manipulated frame wheel", action.label());
            return;
        }

        if action == MouseAction::NoAction {
            self.wheel.remove(&combo);
        } else {
            self.wheel.insert(
                combo,
                MouseActionBinding {
                    handler,
                    action,
                    with_constraint,
                },
            );
        }
    }

    /// Set (or with an empty string, remove) a custom gesture description
    /// shown first in the help table.
    pub fn set_mouse_binding_description(
        &mut self,
        combo: ComboKey,
        description: &str,
        double_click: bool,
    ) {
        let key = ClickKey::new(combo, double_click, ComboKey::empty());
        if description.is_empty() {
            self.descriptions.remove(&key);
        } else {
            self.descriptions.insert(key, description.to_string());
        }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// The full drag binding for a combo, if any.
    pub fn mouse_binding(&self, combo: ComboKey) -> Option<MouseActionBinding> {
        self.drag.get(&combo).copied()
    }

    /// The drag action for a combo, [`MouseAction::NoAction`] when unbound.
    pub fn mouse_action(&self, combo: ComboKey) -> MouseAction {
        self.drag.get(&combo).map_or(MouseAction::NoAction, |b| b.action)
    }

    /// The drag handler for a combo, `None` when unbound.
    pub fn mouse_handler(&self, combo: ComboKey) -> Option<MouseHandler> {
        self.drag.get(&combo).map(|b| b.handler)
    }

    /// The full wheel binding for a modifier combo, if any.
    pub fn wheel_binding(&self, combo: ComboKey) -> Option<MouseActionBinding> {
        self.wheel.get(&combo).copied()
    }

    /// The wheel action for a combo, [`MouseAction::NoAction`] when unbound.
    pub fn wheel_action(&self, combo: ComboKey) -> MouseAction {
        self.wheel.get(&combo).map_or(MouseAction::NoAction, |b| b.action)
    }

    /// The click action for a key, [`ClickAction::NoClickAction`] when
    /// unbound.
    pub fn click_action(
        &self,
        combo: ComboKey,
        double_click: bool,
        button_before: ComboKey,
    ) -> ClickAction {
        self.click
            .get(&ClickKey::new(combo, double_click, button_before))
            .copied()
            .unwrap_or(ClickAction::NoClickAction)
    }

    /// Reverse lookup: the combo that triggers `action` on `handler` with
    /// the given constraint flag, if any.
    pub fn mouse_combo(
        &self,
        handler: MouseHandler,
        action: MouseAction,
        with_constraint: bool,
    ) -> Option<ComboKey> {
        self.drag
            .iter()
            .find(|(_, b)| {
                b.handler == handler && b.action == action && b.with_constraint == with_constraint
            })
            .map(|(combo, _)| *combo)
    }

    /// Reverse lookup for wheel bindings.
    pub fn wheel_combo(
        &self,
        handler: MouseHandler,
        action: MouseAction,
        with_constraint: bool,
    ) -> Option<ComboKey> {
        self.wheel
            .iter()
            .find(|(_, b)| {
                b.handler == handler && b.action == action && b.with_constraint == with_constraint
            })
            .map(|(combo, _)| *combo)
    }

    /// Reverse lookup: the gesture bound to a click action, if any.
    pub fn click_key(&self, action: ClickAction) -> Option<ClickKey> {
        self.click
            .iter()
            .find(|(_, a)| **a == action)
            .map(|(key, _)| *key)
    }

    /// Iterate drag bindings whose handler is `handler`, matching by the
    /// button part of the combo.
    pub fn drag_binding_for_buttons(
        &self,
        handler: MouseHandler,
        buttons: ComboKey,
    ) -> Option<MouseActionBinding> {
        self.drag
            .iter()
            .find(|(combo, b)| b.handler == handler && combo.buttons() == buttons.buttons())
            .map(|(_, b)| *b)
    }

    /// First wheel binding targeting `handler`, regardless of modifiers.
    pub fn wheel_binding_for_handler(&self, handler: MouseHandler) -> Option<MouseActionBinding> {
        self.wheel
            .values()
            .find(|b| b.handler == handler)
            .copied()
    }

    // =========================================================================
    // Camera mode
    // =========================================================================

    /// True when some combo rotates the camera: the crude but reliable way
    /// of telling the revolve mode from the fly mode.
    pub fn camera_in_revolve_mode(&self) -> bool {
        self.mouse_combo(MouseHandler::Camera, MouseAction::Rotate, true)
            .is_some()
    }

    /// Swap between the revolve (trackball) and fly (walkthrough) camera
    /// binding sets, preserving whatever modifier state key was used for
    /// the camera.
    pub fn toggle_camera_mode(&mut self) {
        let revolve_mode = self.camera_in_revolve_mode();
        let combo = if revolve_mode {
            self.mouse_combo(MouseHandler::Camera, MouseAction::Rotate, true)
        } else {
            self.mouse_combo(MouseHandler::Camera, MouseAction::MoveForward, true)
        };
        let state = combo.unwrap_or(ComboKey::empty()).modifiers();

        if revolve_mode {
            self.set_mouse_binding(
                state | ComboKey::LEFT,
                MouseHandler::Camera,
                MouseAction::MoveForward,
                true,
            );
            self.set_mouse_binding(
                state | ComboKey::MIDDLE,
                MouseHandler::Camera,
                MouseAction::LookAround,
                true,
            );
            self.set_mouse_binding(
                state | ComboKey::RIGHT,
                MouseHandler::Camera,
                MouseAction::MoveBackward,
                true,
            );
            self.set_mouse_binding(
                state | ComboKey::LEFT | ComboKey::MIDDLE,
                MouseHandler::Camera,
                MouseAction::Roll,
                true,
            );
            self.set_mouse_binding(
                state | ComboKey::RIGHT | ComboKey::MIDDLE,
                MouseHandler::Camera,
                MouseAction::ScreenTranslate,
                true,
            );

            self.set_click_binding(ComboKey::LEFT, ClickAction::NoClickAction, true, ComboKey::empty());
            self.set_click_binding(ComboKey::MIDDLE, ClickAction::NoClickAction, true, ComboKey::empty());
            self.set_click_binding(ComboKey::RIGHT, ClickAction::NoClickAction, true, ComboKey::empty());

            self.set_wheel_binding(state, MouseHandler::Camera, MouseAction::MoveForward, true);
        } else {
            self.set_mouse_binding(
                state | ComboKey::LEFT,
                MouseHandler::Camera,
                MouseAction::Rotate,
                true,
            );
            self.set_mouse_binding(
                state | ComboKey::MIDDLE,
                MouseHandler::Camera,
                MouseAction::Zoom,
                true,
            );
            self.set_mouse_binding(
                state | ComboKey::RIGHT,
                MouseHandler::Camera,
                MouseAction::Translate,
                true,
            );
            self.set_mouse_binding(
                state | ComboKey::LEFT | ComboKey::MIDDLE,
                MouseHandler::Camera,
                MouseAction::ScreenRotate,
                true,
            );
            self.set_mouse_binding(
                state | ComboKey::RIGHT | ComboKey::MIDDLE,
                MouseHandler::Camera,
                MouseAction::ScreenTranslate,
                true,
            );

            self.set_click_binding(ComboKey::LEFT, ClickAction::AlignCamera, true, ComboKey::empty());
            self.set_click_binding(
                ComboKey::MIDDLE,
                ClickAction::ShowEntireScene,
                true,
                ComboKey::empty(),
            );
            self.set_click_binding(ComboKey::RIGHT, ClickAction::CenterScene, true, ComboKey::empty());

            self.set_wheel_binding(state, MouseHandler::Camera, MouseAction::Zoom, true);
        }
    }

    /// Re-key every binding of `handler` onto a new modifier set.
    ///
    /// All drag and wheel bindings of the handler (zoom-on-region
    /// excepted, it keeps its own gesture) move to `state | buttons`, and
    /// the handler's characteristic click actions follow. Previous
    /// bindings on the target combos are overwritten.
    pub fn set_handler_state_key(&mut self, handler: MouseHandler, state: ComboKey) {
        let state = state.modifiers();

        let mut new_drag = AHashMap::new();
        for (combo, binding) in &self.drag {
            if binding.handler != handler || binding.action == MouseAction::ZoomOnRegion {
                new_drag.insert(*combo, *binding);
            }
        }
        for (combo, binding) in &self.drag {
            if binding.handler == handler && binding.action != MouseAction::ZoomOnRegion {
                new_drag.insert(state | combo.buttons(), *binding);
            }
        }

        let mut new_wheel = AHashMap::new();
        for (combo, binding) in &self.wheel {
            if binding.handler != handler {
                new_wheel.insert(*combo, *binding);
            }
        }
        for (combo, binding) in &self.wheel {
            if binding.handler == handler {
                new_wheel.insert(state | combo.buttons(), *binding);
            }
        }

        let mut new_click = AHashMap::new();
        for (key, action) in &self.click {
            let follows = match handler {
                MouseHandler::Camera => {
                    matches!(action, ClickAction::CenterScene | ClickAction::AlignCamera)
                }
                MouseHandler::Frame => {
                    matches!(action, ClickAction::CenterFrame | ClickAction::AlignFrame)
                }
            };
            if follows {
                let moved = ClickKey::new(state | key.combo.buttons(), key.double_click, key.button_before);
                new_click.insert(moved, *action);
            } else {
                new_click.insert(*key, *action);
            }
        }

        self.drag = new_drag;
        self.wheel = new_wheel;
        self.click = new_click;
    }

    // =========================================================================
    // Help text
    // =========================================================================

    /// Render the binding tables as help text, one `gesture: description`
    /// line per binding. Custom descriptions come first; standard bindings
    /// follow in dispatch-priority order (wheel, drag, click).
    pub fn mouse_help(&self) -> String {
        let mut out = String::new();

        let mut custom: BTreeMap<ClickKey, &str> = BTreeMap::new();
        for (key, text) in &self.descriptions {
            custom.insert(*key, text.as_str());
        }
        for (key, text) in &custom {
            out.push_str(&format!("{}: {}\n", key.label(), text));
        }

        let mut standard: BTreeMap<ClickKey, String> = BTreeMap::new();
        for (combo, binding) in &self.wheel {
            let mut text = binding.action.label().to_string();
            if !text.is_empty() {
                text.push(' ');
                text.push_str(binding.handler.label());
                if !binding.with_constraint {
                    text.push('*');
                }
            }
            standard.insert(ClickKey::plain(*combo), text);
        }
        for (combo, binding) in &self.drag {
            let mut text = binding.action.label().to_string();
            if !text.is_empty() {
                text.push(' ');
                text.push_str(binding.handler.label());
                if !binding.with_constraint {
                    text.push('*');
                }
            }
            standard.insert(ClickKey::plain(*combo), text);
        }
        for (key, action) in &self.click {
            standard.insert(*key, action.label().to_string());
        }

        for (key, text) in &standard {
            if text.is_empty() {
                continue;
            }
            out.push_str(&format!("{}: {}\n", key.label(), text));
        }

        out
    }
}
