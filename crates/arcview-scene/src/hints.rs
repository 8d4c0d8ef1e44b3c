//! Visual hints and overlay assembly
//!
//! The overlay is described as plain data: once per frame the viewer
//! assembles an [`OverlayFrame`] listing what must be drawn on top of the
//! scene, in order. The embedder renders it inside its own saved/restored
//! render-state scope, so overlay drawing can never leak state into the
//! next frame.

use std::time::{Duration, Instant};

use serde::Serialize;

/// Transient hint state: the revolve-point crosshair is shown for a short
/// delay after the revolve point changes.
#[derive(Debug, Clone)]
pub struct VisualHints {
    revolve_point_until: Option<Instant>,
    delay: Duration,
}

impl Default for VisualHints {
    fn default() -> Self {
        Self {
            revolve_point_until: None,
            delay: Duration::from_secs(2),
        }
    }
}

impl VisualHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// How long an armed hint stays visible (default 2 s).
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Arm the revolve-point crosshair.
    pub fn arm_revolve_point(&mut self, now: Instant) {
        self.revolve_point_until = Some(now + self.delay);
    }

    /// Whether the crosshair is still visible. Expiry is a plain deadline
    /// check, so a stale wake-up after the hint was re-armed or cleared is
    /// a no-op.
    pub fn revolve_point_visible(&self, now: Instant) -> bool {
        self.revolve_point_until.is_some_and(|until| now < until)
    }

    /// Clear all hints.
    pub fn reset(&mut self) {
        self.revolve_point_until = None;
    }
}

/// Number of frames between two FPS estimations.
const FPS_WINDOW: u32 = 20;

/// Frame-rate estimation over a fixed frame window.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    counter: u32,
    window_start: Option<Instant>,
    fps: f32,
    display: String,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self {
            counter: 0,
            window_start: None,
            fps: 0.0,
            display: "?Hz".to_string(),
        }
    }
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one drawn frame; every [`FPS_WINDOW`] frames the estimate
    /// and its display string are recomputed from elapsed wall time.
    pub fn frame_tick(&mut self, now: Instant) {
        let Some(start) = self.window_start else {
            self.window_start = Some(now);
            return;
        };

        self.counter += 1;
        if self.counter == FPS_WINDOW {
            let elapsed = now.duration_since(start).as_secs_f32();
            if elapsed > 0.0 {
                self.fps = FPS_WINDOW as f32 / elapsed;
                self.display = Self::format(self.fps);
            }
            self.counter = 0;
            self.window_start = Some(now);
        }
    }

    /// Current estimate in frames per second.
    pub fn current_fps(&self) -> f32 {
        self.fps
    }

    /// The display string, `"?Hz"` before the first full window.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Format a rate the way the overlay shows it: one decimal below
    /// 10 Hz, none above.
    pub fn format(fps: f32) -> String {
        if fps < 10.0 {
            format!("{fps:.1}Hz")
        } else {
            format!("{fps:.0}Hz")
        }
    }
}

/// A transient user-facing message.
#[derive(Debug, Clone)]
pub struct TransientMessage {
    pub text: String,
    until: Instant,
}

impl TransientMessage {
    pub fn new(text: String, now: Instant, delay: Duration) -> Self {
        Self {
            text,
            until: now + delay,
        }
    }

    /// Deadline check; a message queried after expiry simply reports
    /// itself invisible.
    pub fn is_visible(&self, now: Instant) -> bool {
        now < self.until
    }
}

/// An axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenRect {
    pub min: (f32, f32),
    pub max: (f32, f32),
}

impl ScreenRect {
    /// Rectangle spanned by two corners in any order.
    pub fn from_corners(a: (f32, f32), b: (f32, f32)) -> Self {
        Self {
            min: (a.0.min(b.0), a.1.min(b.1)),
            max: (a.0.max(b.0), a.1.max(b.1)),
        }
    }
}

/// Everything drawn on top of the scene this frame, in draw order.
///
/// All coordinates are pixels (origin upper left) except the camera-path
/// polylines and the axis/grid, which are world-space and drawn with the
/// scene matrices.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OverlayFrame {
    /// Sampled polylines of the edited camera paths (camera-edit mode).
    pub camera_paths: Vec<Vec<[f32; 3]>>,
    /// Crosshair marking a freshly changed revolve point.
    pub revolve_point_cross: Option<(f32, f32)>,
    /// Guide line from the rotation pivot to the pointer during a
    /// screen-rotate drag.
    pub screen_rotate_line: Option<((f32, f32), (f32, f32))>,
    /// Rubber-band rectangle of a zoom-on-region drag.
    pub zoom_region: Option<ScreenRect>,
    /// Draw the world grid (world space, scaled by `scene_radius`).
    pub grid: bool,
    /// Draw the world axis (world space, scaled by `scene_radius`).
    pub axis: bool,
    /// Scale for the grid and axis.
    pub scene_radius: f32,
    /// FPS string, upper left corner.
    pub fps: Option<String>,
    /// Transient message, lower left corner.
    pub message: Option<String>,
    /// Show the captured depth buffer over the scene.
    pub z_buffer: bool,
}
