//! Semantic input actions
//!
//! [`MouseAction`] is a continuous action spanning a press/move/release
//! drag, [`ClickAction`] a one-shot action triggered by a (possibly double)
//! click, and [`MouseHandler`] selects which object receives a drag: the
//! camera frame or the application's manipulated frame.

/// Receiver of a drag or wheel action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseHandler {
    /// The camera's own frame.
    Camera,
    /// The application-provided manipulated frame ("free target").
    Frame,
}

impl MouseHandler {
    /// Help-text suffix, e.g. `"Rotates camera"`.
    pub fn label(self) -> &'static str {
        match self {
            MouseHandler::Camera => "camera",
            MouseHandler::Frame => "manipulated frame",
        }
    }
}

/// Continuous action mapped to a pointer drag (or a wheel step).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseAction {
    /// No action; unbinds a combo.
    #[default]
    NoAction,
    /// Rotate around the revolve point (camera) or the frame origin.
    Rotate,
    /// Zoom in/out.
    Zoom,
    /// Translate in the screen plane.
    Translate,
    /// Fly forward at the camera fly speed. Camera only.
    MoveForward,
    /// Rotate the camera around its position. Camera only.
    LookAround,
    /// Fly backward at the camera fly speed. Camera only.
    MoveBackward,
    /// Rotate around the view axis.
    ScreenRotate,
    /// Roll around the view axis. Camera only.
    Roll,
    /// Translate constrained to the dominant screen direction.
    ScreenTranslate,
    /// Drag a rectangle, zoom on it at release. Camera only.
    ZoomOnRegion,
}

impl MouseAction {
    /// Whether this action can only be performed by the camera handler.
    pub fn is_camera_only(self) -> bool {
        matches!(
            self,
            MouseAction::MoveForward
                | MouseAction::MoveBackward
                | MouseAction::Roll
                | MouseAction::LookAround
                | MouseAction::ZoomOnRegion
        )
    }

    /// Whether this action may be bound to the wheel.
    pub fn is_wheel_action(self) -> bool {
        matches!(
            self,
            MouseAction::Zoom
                | MouseAction::MoveForward
                | MouseAction::MoveBackward
                | MouseAction::NoAction
        )
    }

    /// Help-text verb, empty for [`MouseAction::NoAction`].
    pub fn label(self) -> &'static str {
        match self {
            MouseAction::NoAction => "",
            MouseAction::Rotate => "Rotates",
            MouseAction::Zoom => "Zooms",
            MouseAction::Translate => "Translates",
            MouseAction::MoveForward => "Moves forward",
            MouseAction::LookAround => "Looks around",
            MouseAction::MoveBackward => "Moves backward",
            MouseAction::ScreenRotate => "Screen rotates",
            MouseAction::Roll => "Rolls",
            MouseAction::ScreenTranslate => "Screen translates",
            MouseAction::ZoomOnRegion => "Zooms on region for",
        }
    }
}

/// One-shot action triggered by a click or double click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClickAction {
    /// No action; unbinds a key.
    #[default]
    NoClickAction,
    /// Interpolate the camera so the clicked pixel fills the view.
    ZoomOnPixel,
    /// Interpolate the camera to fit the whole scene.
    ZoomToFit,
    /// Run the selection protocol at the clicked pixel.
    Select,
    /// Set the revolve point from the point under the pixel.
    RapFromPixel,
    /// Reset the revolve point to the scene center.
    RapIsCenter,
    /// Project the manipulated frame onto the camera view line.
    CenterFrame,
    /// Re-center the scene in the view.
    CenterScene,
    /// Move the camera so the entire scene is visible.
    ShowEntireScene,
    /// Align the manipulated frame axes with the camera frame.
    AlignFrame,
    /// Align the camera axes with the world frame.
    AlignCamera,
}

impl ClickAction {
    /// Help-text verb, empty for [`ClickAction::NoClickAction`].
    pub fn label(self) -> &'static str {
        match self {
            ClickAction::NoClickAction => "",
            ClickAction::ZoomOnPixel => "Zooms on pixel",
            ClickAction::ZoomToFit => "Zooms to fit scene",
            ClickAction::Select => "Selects",
            ClickAction::RapFromPixel => "Sets revolve around point",
            ClickAction::RapIsCenter => "Resets revolve around point",
            ClickAction::CenterFrame => "Centers frame",
            ClickAction::CenterScene => "Centers scene",
            ClickAction::ShowEntireScene => "Shows entire scene",
            ClickAction::AlignFrame => "Aligns frame",
            ClickAction::AlignCamera => "Aligns camera",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_only_actions() {
        assert!(MouseAction::MoveForward.is_camera_only());
        assert!(MouseAction::ZoomOnRegion.is_camera_only());
        assert!(!MouseAction::Rotate.is_camera_only());
        assert!(!MouseAction::ScreenTranslate.is_camera_only());
    }

    #[test]
    fn test_wheel_actions() {
        assert!(MouseAction::Zoom.is_wheel_action());
        assert!(MouseAction::NoAction.is_wheel_action());
        assert!(!MouseAction::Rotate.is_wheel_action());
        assert!(!MouseAction::ZoomOnRegion.is_wheel_action());
    }
}
