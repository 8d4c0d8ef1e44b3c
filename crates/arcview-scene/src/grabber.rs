//! Mouse grabbers
//!
//! A grabber claims exclusive pointer handling when the pointer is near
//! it, independently of the binding tables. Grabbers live in an explicit
//! [`GrabberRegistry`] owned by the viewer; at most one grabber is active
//! at a time, and a disabled grabber is skipped when polling.

use winit::event::MouseButton;

use crate::camera::Camera;
use crate::frame::ManipulatedFrame;

/// An object that can capture pointer focus.
///
/// `check_if_grabs_mouse` updates the grabber's internal `grabs_mouse`
/// state from the pointer position (typically a distance test against its
/// projection on screen). The event handlers are only called while the
/// grabber is active.
pub trait MouseGrabber {
    /// Update the grab state for the pointer at `(x, y)`.
    fn check_if_grabs_mouse(&mut self, x: f32, y: f32, camera: &Camera);

    /// Whether the grabber currently claims the pointer.
    fn grabs_mouse(&self) -> bool;

    fn mouse_press(&mut self, _x: f32, _y: f32, _button: MouseButton, _camera: &Camera) {}

    fn mouse_move(&mut self, _x: f32, _y: f32, _camera: &Camera) {}

    fn mouse_release(&mut self, _x: f32, _y: f32, _button: MouseButton, _camera: &Camera) {}

    fn mouse_double_click(&mut self, _x: f32, _y: f32, _button: MouseButton, _camera: &Camera) {}

    fn wheel(&mut self, _delta: f32, _camera: &Camera) {}

    /// The grabber's manipulated frame, when it is frame-like.
    ///
    /// A grabber exposing a frame is dragged directly through the frame
    /// binding table (modifiers ignored) instead of receiving raw events.
    fn frame_mut(&mut self) -> Option<&mut ManipulatedFrame> {
        None
    }
}

/// Identifier of a registered grabber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GrabberId(usize);

struct GrabberEntry {
    grabber: Box<dyn MouseGrabber>,
    enabled: bool,
}

/// Registry of the grabbers a viewer polls.
#[derive(Default)]
pub struct GrabberRegistry {
    entries: Vec<GrabberEntry>,
}

impl GrabberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a grabber, enabled by default.
    pub fn register(&mut self, grabber: Box<dyn MouseGrabber>) -> GrabberId {
        self.entries.push(GrabberEntry {
            grabber,
            enabled: true,
        });
        GrabberId(self.entries.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Enable or disable a grabber. A disabled grabber is never polled
    /// and cannot become active.
    pub fn set_enabled(&mut self, id: GrabberId, enabled: bool) {
        if let Some(entry) = self.entries.get_mut(id.0) {
            entry.enabled = enabled;
        } else {
            log::warn!("unknown mouse grabber id {}", id.0);
        }
    }

    pub fn is_enabled(&self, id: GrabberId) -> bool {
        self.entries.get(id.0).is_some_and(|e| e.enabled)
    }

    pub fn get_mut(&mut self, id: GrabberId) -> Option<&mut (dyn MouseGrabber + 'static)> {
        self.entries.get_mut(id.0).map(|e| &mut *e.grabber)
    }

    /// Poll the registered, enabled grabbers in registration order and
    /// return the first one claiming the pointer.
    pub fn find_grabbing(&mut self, x: f32, y: f32, camera: &Camera) -> Option<GrabberId> {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            if !entry.enabled {
                continue;
            }
            entry.grabber.check_if_grabs_mouse(x, y, camera);
            if entry.grabber.grabs_mouse() {
                return Some(GrabberId(i));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Grabs the pointer inside a screen-space square.
    struct SquareGrabber {
        center: (f32, f32),
        half_size: f32,
        grabs: bool,
        presses: usize,
    }

    impl SquareGrabber {
        fn new(center: (f32, f32)) -> Self {
            Self {
                center,
                half_size: 10.0,
                grabs: false,
                presses: 0,
            }
        }
    }

    impl MouseGrabber for SquareGrabber {
        fn check_if_grabs_mouse(&mut self, x: f32, y: f32, _camera: &Camera) {
            self.grabs = (x - self.center.0).abs() < self.half_size
                && (y - self.center.1).abs() < self.half_size;
        }

        fn grabs_mouse(&self) -> bool {
            self.grabs
        }

        fn mouse_press(&mut self, _x: f32, _y: f32, _button: MouseButton, _camera: &Camera) {
            self.presses += 1;
        }
    }

    #[test]
    fn test_polling_order_and_enable_flag() {
        let camera = Camera::new();
        let mut registry = GrabberRegistry::new();
        let first = registry.register(Box::new(SquareGrabber::new((100.0, 100.0))));
        let second = registry.register(Box::new(SquareGrabber::new((100.0, 100.0))));

        // Both cover the point; the first registered wins.
        assert_eq!(registry.find_grabbing(100.0, 100.0, &camera), Some(first));

        registry.set_enabled(first, false);
        assert_eq!(registry.find_grabbing(100.0, 100.0, &camera), Some(second));

        registry.set_enabled(second, false);
        assert_eq!(registry.find_grabbing(100.0, 100.0, &camera), None);
    }

    #[test]
    fn test_miss_does_not_grab() {
        let camera = Camera::new();
        let mut registry = GrabberRegistry::new();
        registry.register(Box::new(SquareGrabber::new((100.0, 100.0))));
        assert_eq!(registry.find_grabbing(500.0, 500.0, &camera), None);
    }

    #[test]
    fn test_event_forwarding() {
        let camera = Camera::new();
        let mut registry = GrabberRegistry::new();
        let id = registry.register(Box::new(SquareGrabber::new((100.0, 100.0))));

        let grabber = registry.get_mut(id).unwrap();
        grabber.mouse_press(100.0, 100.0, MouseButton::Left, &camera);
        // No panic; the default handlers are no-ops for the others.
        grabber.mouse_move(101.0, 100.0, &camera);
        grabber.wheel(1.0, &camera);
    }
}
