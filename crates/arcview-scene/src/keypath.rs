//! Keyframe-path shortcut execution
//!
//! `arcview-input` resolves a path key press into a [`PathOp`]; the
//! [`PathController`] applies the operation to the camera's paths and
//! produces the status message shown to the user. Paths that become
//! non-empty are registered for redraw notification, deleted paths are
//! deregistered; the embedding loop reads the registration set to know
//! which interpolators can mark the view dirty.

use std::time::Instant;

use ahash::AHashSet;
use winit::keyboard::KeyCode;

use arcview_input::{ComboKey, PathOp, PathShortcuts};

use crate::camera::Camera;

/// Executes path shortcuts against a camera.
#[derive(Debug, Default)]
pub struct PathController {
    shortcuts: PathShortcuts,
    /// Paths wired for redraw notification (non-empty paths).
    notified: AHashSet<u32>,
}

impl PathController {
    pub fn new() -> Self {
        Self {
            shortcuts: PathShortcuts::new(),
            notified: AHashSet::new(),
        }
    }

    pub fn shortcuts(&self) -> &PathShortcuts {
        &self.shortcuts
    }

    pub fn shortcuts_mut(&mut self) -> &mut PathShortcuts {
        &mut self.shortcuts
    }

    /// Whether path `index` is currently wired for redraw notification.
    pub fn is_notified(&self, index: u32) -> bool {
        self.notified.contains(&index)
    }

    /// Handle a key press.
    ///
    /// Returns the status message to display when the key matched a path
    /// operation, `None` when the key is not a path shortcut.
    pub fn handle_key(
        &mut self,
        key: KeyCode,
        modifiers: ComboKey,
        now: Instant,
        camera: &mut Camera,
    ) -> Option<String> {
        let op = self.shortcuts.resolve(key, modifiers, now)?;
        Some(self.execute(op, camera))
    }

    /// Apply a resolved path operation and describe the outcome.
    pub fn execute(&mut self, op: PathOp, camera: &mut Camera) -> String {
        match op {
            PathOp::Play(index) => {
                camera.stop_other_paths(index);
                camera.play_path(index);
                match camera.keyframe_interpolator(index) {
                    Some(path) if !path.is_empty() => format!("Path {index} started"),
                    _ => format!("Path {index} is empty"),
                }
            }
            PathOp::Reset(index) => {
                camera.reset_path(index);
                format!("Path {index} reset")
            }
            PathOp::AddKeyFrame(index) => {
                let was_absent = camera.keyframe_interpolator(index).is_none();
                camera.add_keyframe_to_path(index);
                if was_absent {
                    self.notified.insert(index);
                }
                let count = camera
                    .keyframe_interpolator(index)
                    .map_or(0, |p| p.number_of_keyframes());
                if count == 1 {
                    format!("Position {index} saved")
                } else {
                    format!("Path {index}, position {count} saved")
                }
            }
            PathOp::DeletePath(index) => {
                let keyframes = camera
                    .keyframe_interpolator(index)
                    .map(|p| p.number_of_keyframes());
                match keyframes {
                    None => String::new(),
                    Some(count) => {
                        self.notified.remove(&index);
                        camera.delete_path(index);
                        if count > 1 {
                            format!("Path {index} deleted")
                        } else {
                            format!("Position {index} deleted")
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_add_keyframes_then_quick_double_press_deletes() {
        let mut controller = PathController::new();
        let mut camera = Camera::new();
        let t0 = Instant::now();

        let msg = controller
            .handle_key(KeyCode::F3, ComboKey::ALT, t0, &mut camera)
            .unwrap();
        assert_eq!(msg, "Position 3 saved");
        assert!(controller.is_notified(3));

        let msg = controller
            .handle_key(
                KeyCode::F3,
                ComboKey::ALT,
                t0 + Duration::from_millis(500),
                &mut camera,
            )
            .unwrap();
        assert_eq!(msg, "Path 3, position 2 saved");

        // Quick second press deletes the path (>1 keyframe -> "Path").
        let msg = controller
            .handle_key(
                KeyCode::F3,
                ComboKey::ALT,
                t0 + Duration::from_millis(700),
                &mut camera,
            )
            .unwrap();
        assert_eq!(msg, "Path 3 deleted");
        assert!(camera.keyframe_interpolator(3).is_none());
        assert!(!controller.is_notified(3));
    }

    #[test]
    fn test_slow_presses_keep_adding() {
        let mut controller = PathController::new();
        let mut camera = Camera::new();
        let t0 = Instant::now();

        controller.handle_key(KeyCode::F3, ComboKey::ALT, t0, &mut camera);
        controller.handle_key(
            KeyCode::F3,
            ComboKey::ALT,
            t0 + Duration::from_millis(500),
            &mut camera,
        );
        assert_eq!(
            camera.keyframe_interpolator(3).unwrap().number_of_keyframes(),
            2
        );
    }

    #[test]
    fn test_double_press_delete_on_missing_path_is_noop() {
        let mut controller = PathController::new();
        let mut camera = Camera::new();

        let msg = controller.execute(PathOp::DeletePath(5), &mut camera);
        assert!(msg.is_empty());
        assert!(camera.keyframe_interpolator(5).is_none());
    }

    #[test]
    fn test_single_position_delete_wording() {
        let mut controller = PathController::new();
        let mut camera = Camera::new();

        controller.execute(PathOp::AddKeyFrame(2), &mut camera);
        let msg = controller.execute(PathOp::DeletePath(2), &mut camera);
        assert_eq!(msg, "Position 2 deleted");
    }

    #[test]
    fn test_play_stops_other_paths() {
        let mut controller = PathController::new();
        let mut camera = Camera::new();

        controller.execute(PathOp::AddKeyFrame(1), &mut camera);
        controller.execute(PathOp::AddKeyFrame(1), &mut camera);
        controller.execute(PathOp::AddKeyFrame(2), &mut camera);
        controller.execute(PathOp::AddKeyFrame(2), &mut camera);

        controller.execute(PathOp::Play(1), &mut camera);
        assert!(camera.keyframe_interpolator(1).unwrap().interpolation_started());

        controller.execute(PathOp::Play(2), &mut camera);
        assert!(!camera.keyframe_interpolator(1).unwrap().interpolation_started());
        assert!(camera.keyframe_interpolator(2).unwrap().interpolation_started());
    }

    #[test]
    fn test_nonpath_key_is_ignored() {
        let mut controller = PathController::new();
        let mut camera = Camera::new();
        assert!(controller
            .handle_key(KeyCode::KeyQ, ComboKey::empty(), Instant::now(), &mut camera)
            .is_none());
    }
}
