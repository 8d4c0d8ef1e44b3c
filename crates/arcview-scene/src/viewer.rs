//! The viewer: input dispatch and per-frame glue
//!
//! [`Viewer`] binds raw pointer/keyboard input to the camera frame, the
//! application's manipulated frame and the registered mouse grabbers,
//! following a fixed resolution order on press: active grabber first, then
//! click bindings, then drag bindings. It also owns the display flags,
//! transient messages, the animation clock, selection sequencing, the
//! full-screen state machine and state persistence.
//!
//! The viewer draws nothing itself. The embedding loop:
//!
//! 1. feeds decoded window events in (`mouse_press`, `wheel`, ...),
//! 2. calls [`Viewer::update`] on every animation tick,
//! 3. draws the scene (`fast_draw` while [`Viewer::camera_is_manipulated`]),
//! 4. calls [`Viewer::post_draw`] and renders the returned overlay,
//! 5. drains [`Viewer::take_redraw_request`] to decide whether to redraw.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use lin_alg::f32::{Mat4, Vec3};
use winit::event::MouseButton;
use winit::keyboard::{KeyCode, ModifiersState};

use arcview_input::{
    ClickAction, ComboKey, KeyboardAction, KeyboardShortcuts, MouseAction, MouseBindings,
    MouseHandler,
};
use arcview_session::{
    CameraMode, CameraState, FrameState, Geometry, KeyFrameState, ViewerState,
};

use crate::camera::Camera;
use crate::capture::BufferTextureCache;
use crate::error::ViewerResult;
use crate::frame::{DriveMode, FramePose, ManipulatedFrame};
use crate::grabber::{GrabberId, GrabberRegistry};
use crate::hints::{FpsCounter, OverlayFrame, ScreenRect, TransientMessage, VisualHints};
use crate::keyframes::KeyFrameInterpolator;
use crate::keypath::PathController;
use crate::quat::Quat;
use crate::select::{PickRegion, Selector};
use crate::snapshot::SnapshotNamer;

/// Application-side hooks the viewer calls back into.
///
/// Scene drawing stays outside the viewer; only selection and
/// pixel-probing need an application callback during event dispatch.
pub trait ViewerApp {
    /// Draw the selectable objects restricted to `region`, reporting each
    /// candidate with [`Selector::push_hit`]. Default: nothing to select.
    fn draw_with_names(&mut self, _region: &PickRegion, _selector: &mut Selector) {}

    /// The world point under a pixel, if any (typically a depth-buffer
    /// read-back). Used by zoom-on-pixel and revolve-point-from-pixel.
    fn point_under_pixel(&mut self, _x: f32, _y: f32) -> Option<Vec3> {
        None
    }

    /// Called after each selection with the resolved id.
    fn post_selection(&mut self, _x: f32, _y: f32, _selected: Option<u32>) {}
}

/// Actions the embedder must perform on the viewer's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerCommand {
    /// Read back the framebuffer and save it through the snapshot namer.
    SaveSnapshot,
    /// Close the application (state was already saved).
    Exit,
    /// Show the help text ([`Viewer::help_text`]).
    ShowHelp,
}

/// Outcome of a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    /// Not bound; propagate the event.
    Unhandled,
    /// Consumed by the viewer.
    Handled,
    /// Consumed; the embedder must perform a command.
    Command(ViewerCommand),
}

/// What the embedder loads before drawing the scene.
#[derive(Debug, Clone)]
pub struct FrameSetup {
    /// World-to-camera matrix.
    pub view: Mat4,
    /// Perspective projection matrix.
    pub projection: Mat4,
    /// Clear color.
    pub background: [u8; 3],
    /// Hint color for overlays.
    pub foreground: [u8; 3],
}

/// Default lifetime of a transient message.
const MESSAGE_DELAY: Duration = Duration::from_secs(2);

/// Alignment threshold shared by the align-frame/align-camera actions.
const ALIGN_THRESHOLD: f32 = 0.85;

/// The interactive viewer core.
pub struct Viewer {
    camera: Camera,
    manipulated_frame: Option<ManipulatedFrame>,

    bindings: MouseBindings,
    keyboard: KeyboardShortcuts,
    paths: PathController,

    grabbers: GrabberRegistry,
    active_grabber: Option<GrabberId>,
    mouse_tracking: bool,

    selector: Selector,
    hints: VisualHints,
    fps: FpsCounter,
    message: Option<TransientMessage>,

    // Display flags
    axis_is_drawn: bool,
    grid_is_drawn: bool,
    fps_is_displayed: bool,
    z_buffer_is_displayed: bool,
    text_is_enabled: bool,
    camera_is_edited: bool,
    previous_clipping_coefficient: f32,

    foreground_color: [u8; 3],
    background_color: [u8; 3],
    stereo: bool,

    // Window geometry, reported by the embedder
    window_size: (u32, u32),
    window_pos: (i32, i32),
    full_screen: bool,
    full_screen_request: Option<bool>,
    prev_pos: (i32, i32),

    // Animation
    animation_started: bool,
    animation_period: Duration,
    last_update: Option<Instant>,

    // Input state
    modifiers: ComboKey,
    buttons_held: ComboKey,

    capture: BufferTextureCache,
    snapshots: SnapshotNamer,

    state_file: Option<PathBuf>,
    needs_redraw: bool,
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewer {
    pub fn new() -> Self {
        let camera = Camera::new();
        let previous_clipping_coefficient = camera.z_clipping_coefficient();
        Self {
            camera,
            manipulated_frame: None,
            bindings: MouseBindings::default(),
            keyboard: KeyboardShortcuts::default(),
            paths: PathController::new(),
            grabbers: GrabberRegistry::new(),
            active_grabber: None,
            mouse_tracking: false,
            selector: Selector::new(),
            hints: VisualHints::new(),
            fps: FpsCounter::new(),
            message: None,
            axis_is_drawn: false,
            grid_is_drawn: false,
            fps_is_displayed: false,
            z_buffer_is_displayed: false,
            text_is_enabled: true,
            camera_is_edited: false,
            previous_clipping_coefficient,
            foreground_color: [180, 180, 180],
            background_color: [51, 51, 51],
            stereo: false,
            window_size: (600, 400),
            window_pos: (0, 0),
            full_screen: false,
            full_screen_request: None,
            prev_pos: (0, 0),
            animation_started: false,
            animation_period: Duration::from_millis(40),
            last_update: None,
            modifiers: ComboKey::empty(),
            buttons_held: ComboKey::empty(),
            capture: BufferTextureCache::new(),
            snapshots: SnapshotNamer::new(),
            state_file: Some(PathBuf::from(".arcview.json")),
            needs_redraw: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Install (or with `None`, remove) the free manipulated target.
    pub fn set_manipulated_frame(&mut self, frame: Option<ManipulatedFrame>) {
        if let Some(old) = self.manipulated_frame.as_mut() {
            old.stop_spinning();
        }
        self.manipulated_frame = frame;
    }

    pub fn manipulated_frame(&self) -> Option<&ManipulatedFrame> {
        self.manipulated_frame.as_ref()
    }

    pub fn manipulated_frame_mut(&mut self) -> Option<&mut ManipulatedFrame> {
        self.manipulated_frame.as_mut()
    }

    pub fn bindings(&self) -> &MouseBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut MouseBindings {
        &mut self.bindings
    }

    pub fn keyboard(&self) -> &KeyboardShortcuts {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut KeyboardShortcuts {
        &mut self.keyboard
    }

    pub fn path_controller(&self) -> &PathController {
        &self.paths
    }

    pub fn path_controller_mut(&mut self) -> &mut PathController {
        &mut self.paths
    }

    pub fn grabbers(&self) -> &GrabberRegistry {
        &self.grabbers
    }

    pub fn grabbers_mut(&mut self) -> &mut GrabberRegistry {
        &mut self.grabbers
    }

    /// The active grabber, if one currently claims the pointer.
    pub fn active_grabber(&self) -> Option<GrabberId> {
        self.active_grabber
    }

    /// Directly set the active grabber, bypassing the hover test. A
    /// disabled grabber is refused.
    pub fn set_active_grabber(&mut self, id: Option<GrabberId>) {
        match id {
            Some(id) if !self.grabbers.is_enabled(id) => {
                log::warn!("refusing to activate a disabled mouse grabber");
            }
            _ => self.active_grabber = id,
        }
    }

    /// Enable polling the grabber registry on idle pointer motion.
    pub fn set_mouse_tracking(&mut self, tracking: bool) {
        self.mouse_tracking = tracking;
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> &mut Selector {
        &mut self.selector
    }

    pub fn snapshot_namer_mut(&mut self) -> &mut SnapshotNamer {
        &mut self.snapshots
    }

    /// The capture texture for the current viewport (z-buffer overlay).
    pub fn capture_buffer_texture(
        &mut self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> &wgpu::Texture {
        self.capture.texture_for(device, self.window_size, format)
    }

    pub fn buffer_texture_cache(&self) -> &BufferTextureCache {
        &self.capture
    }

    // =========================================================================
    // Display flags, colors, messages
    // =========================================================================

    pub fn axis_is_drawn(&self) -> bool {
        self.axis_is_drawn
    }

    pub fn set_axis_is_drawn(&mut self, drawn: bool) {
        self.axis_is_drawn = drawn;
        self.needs_redraw = true;
    }

    pub fn grid_is_drawn(&self) -> bool {
        self.grid_is_drawn
    }

    pub fn set_grid_is_drawn(&mut self, drawn: bool) {
        self.grid_is_drawn = drawn;
        self.needs_redraw = true;
    }

    pub fn fps_is_displayed(&self) -> bool {
        self.fps_is_displayed
    }

    pub fn set_fps_is_displayed(&mut self, displayed: bool) {
        self.fps_is_displayed = displayed;
        self.needs_redraw = true;
    }

    pub fn z_buffer_is_displayed(&self) -> bool {
        self.z_buffer_is_displayed
    }

    pub fn set_z_buffer_is_displayed(&mut self, displayed: bool) {
        self.z_buffer_is_displayed = displayed;
        self.needs_redraw = true;
    }

    pub fn text_is_enabled(&self) -> bool {
        self.text_is_enabled
    }

    pub fn set_text_is_enabled(&mut self, enabled: bool) {
        self.text_is_enabled = enabled;
        self.needs_redraw = true;
    }

    pub fn camera_is_edited(&self) -> bool {
        self.camera_is_edited
    }

    /// Toggle camera-path edit mode.
    ///
    /// Editing widens the camera clipping coefficient to 5.0 so the
    /// displayed paths are not clipped; the user's value is restored when
    /// leaving edit mode (and is the one that gets persisted).
    pub fn set_camera_is_edited(&mut self, edited: bool) {
        if edited == self.camera_is_edited {
            return;
        }
        self.camera_is_edited = edited;
        if edited {
            self.previous_clipping_coefficient = self.camera.z_clipping_coefficient();
            self.camera.set_z_clipping_coefficient(5.0);
        } else {
            self.camera
                .set_z_clipping_coefficient(self.previous_clipping_coefficient);
        }
        self.needs_redraw = true;
    }

    pub fn foreground_color(&self) -> [u8; 3] {
        self.foreground_color
    }

    pub fn set_foreground_color(&mut self, color: [u8; 3]) {
        self.foreground_color = color;
        self.needs_redraw = true;
    }

    pub fn background_color(&self) -> [u8; 3] {
        self.background_color
    }

    pub fn set_background_color(&mut self, color: [u8; 3]) {
        self.background_color = color;
        self.needs_redraw = true;
    }

    pub fn displays_in_stereo(&self) -> bool {
        self.stereo
    }

    pub fn set_stereo_display(&mut self, stereo: bool) {
        self.stereo = stereo;
        self.needs_redraw = true;
    }

    /// Briefly display a message in the lower left corner.
    ///
    /// A new message replaces the previous one. Messages only show while
    /// text display is enabled.
    pub fn display_message(&mut self, message: &str, now: Instant) {
        self.display_message_for(message, MESSAGE_DELAY, now);
    }

    pub fn display_message_for(&mut self, message: &str, delay: Duration, now: Instant) {
        self.message = Some(TransientMessage::new(message.to_string(), now, delay));
        if self.text_is_enabled {
            self.needs_redraw = true;
        }
    }

    // =========================================================================
    // Geometry and full screen
    // =========================================================================

    /// Report the top-level window geometry (embedder calls this on
    /// resize/move events).
    pub fn set_window_geometry(&mut self, width: u32, height: u32, pos: (i32, i32)) {
        self.window_size = (width.max(1), height.max(1));
        self.window_pos = pos;
        self.camera
            .set_screen_width_and_height(self.window_size.0, self.window_size.1);
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    pub fn window_position(&self) -> (i32, i32) {
        self.window_pos
    }

    pub fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    /// Request a full-screen change; applied by the embedder after the
    /// next frame (two-phase, so the change never races the render
    /// pipeline).
    pub fn request_full_screen(&mut self, full: bool) {
        if full == self.full_screen && self.full_screen_request.is_none() {
            return;
        }
        self.full_screen_request = Some(full);
        self.needs_redraw = true;
    }

    /// The pending full-screen change, taken by the embedder post-render.
    /// Entering full screen records the position to restore later.
    pub fn take_full_screen_request(&mut self) -> Option<bool> {
        let request = self.full_screen_request.take()?;
        if request && !self.full_screen {
            self.prev_pos = self.window_pos;
        }
        Some(request)
    }

    /// The embedder confirms the window actually changed state.
    pub fn confirm_full_screen(&mut self, full: bool) {
        self.full_screen = full;
    }

    /// The position to restore when leaving full screen.
    pub fn restore_position(&self) -> (i32, i32) {
        self.prev_pos
    }

    // =========================================================================
    // Animation
    // =========================================================================

    pub fn animation_is_started(&self) -> bool {
        self.animation_started
    }

    pub fn start_animation(&mut self) {
        self.animation_started = true;
    }

    pub fn stop_animation(&mut self) {
        self.animation_started = false;
    }

    /// Animation tick period (default 40 ms, 25 Hz).
    pub fn animation_period(&self) -> Duration {
        self.animation_period
    }

    pub fn set_animation_period(&mut self, period: Duration) {
        self.animation_period = period;
    }

    /// Advance every time-driven state: camera transitions, keyframe path
    /// playback, spinning frames and fly motion. Returns true when
    /// something moved (a redraw was requested).
    pub fn update(&mut self, now: Instant) -> bool {
        let dt = match self.last_update {
            Some(prev) => now.saturating_duration_since(prev).as_secs_f32(),
            None => 0.0,
        };
        self.last_update = Some(now);

        let mut moved = self.camera.update(dt);
        if let Some(frame) = self.manipulated_frame.as_mut() {
            if frame.is_spinning() {
                moved |= frame.update_spin();
            }
        }

        if moved {
            self.needs_redraw = true;
        }
        moved
    }

    /// Whether the embedder should redraw; reading clears the flag.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::replace(&mut self.needs_redraw, false)
    }

    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// True while the camera frame is being dragged; the embedder may
    /// substitute its simplified `fast_draw` for the full scene.
    pub fn camera_is_manipulated(&self) -> bool {
        self.camera.is_manipulated()
    }

    // =========================================================================
    // Input dispatch
    // =========================================================================

    /// Track the keyboard modifier state (winit delivers it separately).
    pub fn set_modifiers(&mut self, modifiers: ModifiersState) {
        self.modifiers = ComboKey::from_modifiers(modifiers);
    }

    /// Dispatch a pointer press.
    ///
    /// Resolution order: active grabber, then click bindings, then drag
    /// bindings. Returns false when no binding matched (the embedder may
    /// propagate the event).
    pub fn mouse_press(
        &mut self,
        app: &mut dyn ViewerApp,
        x: f32,
        y: f32,
        button: MouseButton,
        now: Instant,
    ) -> bool {
        let button_combo = ComboKey::from_button(button);
        let buttons_before = self.buttons_held;
        self.buttons_held |= button_combo;

        if let Some(id) = self.active_grabber {
            if let Some(grabber) = self.grabbers.get_mut(id) {
                if grabber.frame_mut().is_some() {
                    // Direct manipulation: resolve by buttons only, the
                    // modifier keys are deliberately ignored.
                    let binding = self
                        .bindings
                        .drag_binding_for_buttons(MouseHandler::Frame, self.buttons_held);
                    if let (Some(binding), Some(frame)) = (binding, grabber.frame_mut()) {
                        frame.start_action(binding.action, binding.with_constraint, DriveMode::AsObject);
                        frame.mouse_press(x, y);
                    }
                } else {
                    grabber.mouse_press(x, y, button, &self.camera);
                }
                self.needs_redraw = true;
                return true;
            }
            self.active_grabber = None;
        }

        // One-shot click actions win over drags on the same gesture.
        let click_combo = self.modifiers | button_combo;
        let click_action = self
            .bindings
            .click_action(click_combo, false, buttons_before.buttons());
        if click_action != ClickAction::NoClickAction {
            self.perform_click_action(app, click_action, x, y, now);
            return true;
        }

        let drag_combo = self.modifiers | self.buttons_held;
        if let Some(binding) = self.bindings.mouse_binding(drag_combo) {
            match binding.handler {
                MouseHandler::Camera => {
                    self.camera.start_action(binding.action, binding.with_constraint);
                    self.camera.frame_mut().mouse_press(x, y);
                }
                MouseHandler::Frame => {
                    if let Some(frame) = self.manipulated_frame.as_mut() {
                        // A camera-like free target is still driven with
                        // plain frame semantics.
                        frame.start_action(
                            binding.action,
                            binding.with_constraint,
                            DriveMode::AsObject,
                        );
                        frame.mouse_press(x, y);
                    }
                }
            }
            if binding.action == MouseAction::ScreenRotate {
                // The guide line must appear immediately.
                self.needs_redraw = true;
            }
            return true;
        }

        false
    }

    /// Dispatch pointer motion.
    pub fn mouse_move(&mut self, x: f32, y: f32) {
        if let Some(id) = self.active_grabber {
            let mut deactivated = false;
            if let Some(grabber) = self.grabbers.get_mut(id) {
                grabber.check_if_grabs_mouse(x, y, &self.camera);
                if grabber.grabs_mouse() {
                    if grabber.frame_mut().is_some() {
                        let ctx = self.camera.view_context();
                        if let Some(frame) = grabber.frame_mut() {
                            frame.mouse_move(x, y, &ctx);
                        }
                    } else {
                        grabber.mouse_move(x, y, &self.camera);
                    }
                } else {
                    deactivated = true;
                }
            } else {
                deactivated = true;
            }
            if deactivated {
                self.active_grabber = None;
            }
            self.needs_redraw = true;
        }

        // A grabber released mid-motion falls through to the dragging
        // logic within the same event.
        if self.active_grabber.is_none() {
            if self.camera.is_manipulated() {
                let ctx = self.camera.view_context();
                self.camera.frame_mut().mouse_move(x, y, &ctx);
                self.needs_redraw = true;
            } else if self
                .manipulated_frame
                .as_ref()
                .is_some_and(|f| f.is_manipulated())
            {
                let ctx = self.camera.view_context();
                if let Some(frame) = self.manipulated_frame.as_mut() {
                    frame.mouse_move(x, y, &ctx);
                }
                self.needs_redraw = true;
            } else if self.mouse_tracking {
                if let Some(id) = self.grabbers.find_grabbing(x, y, &self.camera) {
                    self.active_grabber = Some(id);
                    self.needs_redraw = true;
                }
            }
        }
    }

    /// Dispatch a pointer release. Always requests a redraw.
    pub fn mouse_release(&mut self, x: f32, y: f32, button: MouseButton) {
        self.buttons_held.remove(ComboKey::from_button(button));

        if let Some(id) = self.active_grabber {
            let mut release_grab = false;
            if let Some(grabber) = self.grabbers.get_mut(id) {
                if grabber.frame_mut().is_some() {
                    let ctx = self.camera.view_context();
                    if let Some(frame) = grabber.frame_mut() {
                        frame.mouse_release(x, y, &ctx);
                    }
                } else {
                    grabber.mouse_release(x, y, button, &self.camera);
                }
                grabber.check_if_grabs_mouse(x, y, &self.camera);
                release_grab = !grabber.grabs_mouse();
            }
            if release_grab {
                self.active_grabber = None;
            }
        } else if self.camera.is_manipulated() {
            let ctx = self.camera.view_context();
            let ended = self.camera.frame_mut().mouse_release(x, y, &ctx);
            if ended == MouseAction::ZoomOnRegion {
                let press = self.camera.frame().press_position();
                let prev = self.camera.frame().prev_position();
                self.camera.fit_screen_region(press, prev);
            }
        } else if let Some(frame) = self.manipulated_frame.as_mut() {
            if frame.is_manipulated() {
                let ctx = self.camera.view_context();
                frame.mouse_release(x, y, &ctx);
            }
        }

        self.needs_redraw = true;
    }

    /// Dispatch a wheel step (scroll lines, positive away from the user).
    pub fn wheel(&mut self, delta: f32) -> bool {
        if let Some(id) = self.active_grabber {
            if let Some(grabber) = self.grabbers.get_mut(id) {
                if grabber.frame_mut().is_some() {
                    let binding = self.bindings.wheel_binding_for_handler(MouseHandler::Frame);
                    if let (Some(binding), Some(frame)) = (binding, grabber.frame_mut()) {
                        let ctx = self.camera.view_context();
                        frame.start_action(binding.action, binding.with_constraint, DriveMode::AsObject);
                        frame.wheel_event(delta, &ctx);
                    }
                } else {
                    grabber.wheel(delta, &self.camera);
                }
                self.needs_redraw = true;
                return true;
            }
            self.active_grabber = None;
        }

        match self.bindings.wheel_binding(self.modifiers) {
            Some(binding) => {
                match binding.handler {
                    MouseHandler::Camera => {
                        self.camera.start_action(binding.action, binding.with_constraint);
                        let ctx = self.camera.view_context();
                        self.camera.frame_mut().wheel_event(delta, &ctx);
                    }
                    MouseHandler::Frame => {
                        if let Some(frame) = self.manipulated_frame.as_mut() {
                            let ctx = self.camera.view_context();
                            frame.start_action(
                                binding.action,
                                binding.with_constraint,
                                DriveMode::AsObject,
                            );
                            frame.wheel_event(delta, &ctx);
                        }
                    }
                }
                self.needs_redraw = true;
                true
            }
            None => false,
        }
    }

    /// Dispatch a double click (embedder-detected). Unmatched double
    /// clicks propagate.
    pub fn mouse_double_click(
        &mut self,
        app: &mut dyn ViewerApp,
        x: f32,
        y: f32,
        button: MouseButton,
        now: Instant,
    ) -> bool {
        if let Some(id) = self.active_grabber {
            if let Some(grabber) = self.grabbers.get_mut(id) {
                grabber.mouse_double_click(x, y, button, &self.camera);
                self.needs_redraw = true;
                return true;
            }
            self.active_grabber = None;
        }

        let combo = self.modifiers | ComboKey::from_button(button);
        let action = self
            .bindings
            .click_action(combo, true, self.buttons_held.buttons());
        if action == ClickAction::NoClickAction {
            return false;
        }
        self.perform_click_action(app, action, x, y, now);
        true
    }

    fn perform_click_action(
        &mut self,
        app: &mut dyn ViewerApp,
        action: ClickAction,
        x: f32,
        y: f32,
        now: Instant,
    ) {
        match action {
            ClickAction::NoClickAction => {}
            ClickAction::ZoomOnPixel => {
                let point = app.point_under_pixel(x, y);
                self.camera.interpolate_to_zoom_on_pixel(point);
                self.needs_redraw = true;
            }
            ClickAction::ZoomToFit => {
                self.camera.interpolate_to_fit_scene();
                self.needs_redraw = true;
            }
            ClickAction::Select => {
                self.select(app, x, y);
            }
            ClickAction::RapFromPixel => {
                let point = app.point_under_pixel(x, y);
                if self.camera.set_revolve_around_point_from_pixel(point) {
                    self.hints.arm_revolve_point(now);
                    self.needs_redraw = true;
                }
            }
            ClickAction::RapIsCenter => {
                let center = self.camera.scene_center();
                self.camera.set_revolve_around_point(center);
                self.hints.arm_revolve_point(now);
                self.needs_redraw = true;
            }
            ClickAction::CenterFrame => {
                let position = self.camera.position();
                let direction = self.camera.view_direction();
                if let Some(frame) = self.manipulated_frame.as_mut() {
                    frame.frame_mut().project_on_line(position, direction);
                    self.needs_redraw = true;
                }
            }
            ClickAction::CenterScene => {
                self.camera.center_scene();
                self.needs_redraw = true;
            }
            ClickAction::ShowEntireScene => {
                self.camera.show_entire_scene();
                self.needs_redraw = true;
            }
            ClickAction::AlignFrame => {
                let reference = self.camera.reference_frame().clone();
                if let Some(frame) = self.manipulated_frame.as_mut() {
                    frame
                        .frame_mut()
                        .align_with_frame(Some(&reference), ALIGN_THRESHOLD);
                    self.needs_redraw = true;
                }
            }
            ClickAction::AlignCamera => {
                self.camera.align_with_world();
                self.needs_redraw = true;
            }
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Run the three-phase selection protocol at a pixel.
    pub fn select(&mut self, app: &mut dyn ViewerApp, x: f32, y: f32) -> Option<u32> {
        let region = self.selector.begin_selection((x, y));
        app.draw_with_names(&region, &mut self.selector);
        let selected = self.selector.end_selection();
        app.post_selection(x, y, selected);
        self.needs_redraw = true;
        selected
    }

    /// The id resolved by the last selection.
    pub fn selected_id(&self) -> Option<u32> {
        self.selector.selected_id()
    }

    // =========================================================================
    // Keyboard
    // =========================================================================

    /// Dispatch a key press: viewer shortcuts first, then camera path
    /// keys.
    pub fn key_press(&mut self, key: KeyCode, now: Instant) -> KeyResponse {
        if let Some(action) = self.keyboard.resolve(key, self.modifiers) {
            return self.handle_keyboard_action(action, now);
        }

        let modifiers = self.modifiers;
        if let Some(message) = self.paths.handle_key(key, modifiers, now, &mut self.camera) {
            if !message.is_empty() {
                self.display_message(&message, now);
            }
            self.needs_redraw = true;
            return KeyResponse::Handled;
        }

        KeyResponse::Unhandled
    }

    fn handle_keyboard_action(&mut self, action: KeyboardAction, now: Instant) -> KeyResponse {
        match action {
            KeyboardAction::ToggleAxis => self.set_axis_is_drawn(!self.axis_is_drawn),
            KeyboardAction::ToggleGrid => self.set_grid_is_drawn(!self.grid_is_drawn),
            KeyboardAction::ToggleFps => self.set_fps_is_displayed(!self.fps_is_displayed),
            KeyboardAction::ToggleZBuffer => {
                self.set_z_buffer_is_displayed(!self.z_buffer_is_displayed)
            }
            KeyboardAction::ToggleText => self.set_text_is_enabled(!self.text_is_enabled),
            KeyboardAction::ToggleCameraEdit => self.set_camera_is_edited(!self.camera_is_edited),
            KeyboardAction::ToggleStereo => self.set_stereo_display(!self.stereo),
            KeyboardAction::ToggleFullScreen => {
                let target = self
                    .full_screen_request
                    .map_or(!self.full_screen, |pending| !pending);
                self.request_full_screen(target);
            }
            KeyboardAction::ToggleAnimation => {
                if self.animation_started {
                    self.stop_animation();
                } else {
                    self.start_animation();
                }
            }
            KeyboardAction::ToggleCameraMode => {
                self.bindings.toggle_camera_mode();
                let message = if self.bindings.camera_in_revolve_mode() {
                    "Camera in revolve around mode"
                } else {
                    "Camera in fly mode"
                };
                self.display_message(message, now);
                self.needs_redraw = true;
            }
            KeyboardAction::MoveCameraLeft => self.nudge_camera(Vec3::new(-1.0, 0.0, 0.0)),
            KeyboardAction::MoveCameraRight => self.nudge_camera(Vec3::new(1.0, 0.0, 0.0)),
            KeyboardAction::MoveCameraUp => self.nudge_camera(Vec3::new(0.0, 1.0, 0.0)),
            KeyboardAction::MoveCameraDown => self.nudge_camera(Vec3::new(0.0, -1.0, 0.0)),
            KeyboardAction::IncreaseFlySpeed => {
                let speed = self.camera.fly_speed() * 1.5;
                self.camera.set_fly_speed(speed);
            }
            KeyboardAction::DecreaseFlySpeed => {
                let speed = self.camera.fly_speed() / 1.5;
                self.camera.set_fly_speed(speed);
            }
            KeyboardAction::Help => return KeyResponse::Command(ViewerCommand::ShowHelp),
            KeyboardAction::SaveSnapshot => {
                return KeyResponse::Command(ViewerCommand::SaveSnapshot)
            }
            KeyboardAction::ExitViewer => {
                if let Err(err) = self.save_state_to_file() {
                    log::warn!("could not save viewer state on exit: {err}");
                }
                return KeyResponse::Command(ViewerCommand::Exit);
            }
        }
        KeyResponse::Handled
    }

    fn nudge_camera(&mut self, direction: Vec3) {
        let step = direction * (10.0 * self.camera.fly_speed());
        let t = self.camera.frame().frame().inverse_transform_of(step);
        self.camera.frame_mut().frame_mut().translate(t);
        self.needs_redraw = true;
    }

    // =========================================================================
    // Per-frame hooks
    // =========================================================================

    /// Matrices and colors to load before drawing the scene.
    pub fn pre_draw(&self) -> FrameSetup {
        FrameSetup {
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(),
            background: self.background_color,
            foreground: self.foreground_color,
        }
    }

    /// Stereo variant of [`Self::pre_draw`]: the view matrix is shifted
    /// for one eye. Call once per eye when
    /// [`Viewer::displays_in_stereo`].
    pub fn pre_draw_stereo(&self, left_eye: bool) -> FrameSetup {
        FrameSetup {
            view: self.camera.view_matrix_stereo(left_eye),
            projection: self.camera.projection_matrix(),
            background: self.background_color,
            foreground: self.foreground_color,
        }
    }

    /// Assemble the overlay for this frame and advance the FPS counter.
    ///
    /// The embedder renders the overlay inside its own push/pop render
    /// state scope, after the scene. Assembly never mutates the display
    /// flags.
    pub fn post_draw(&mut self, now: Instant) -> OverlayFrame {
        self.fps.frame_tick(now);

        let mut overlay = OverlayFrame {
            scene_radius: self.camera.scene_radius(),
            ..OverlayFrame::default()
        };

        if self.camera_is_edited {
            overlay.camera_paths = self.sampled_camera_paths();
        }

        if self.hints.revolve_point_visible(now) {
            overlay.revolve_point_cross = Some(
                self.camera
                    .projected_coordinates_of(self.camera.revolve_around_point()),
            );
        }

        if self.camera.frame().current_action() == MouseAction::ScreenRotate {
            let pivot = self
                .camera
                .projected_coordinates_of(self.camera.revolve_around_point());
            overlay.screen_rotate_line = Some((pivot, self.camera.frame().prev_position()));
        } else if let Some(frame) = &self.manipulated_frame {
            if frame.current_action() == MouseAction::ScreenRotate {
                let pivot = self.camera.projected_coordinates_of(frame.frame().position());
                overlay.screen_rotate_line = Some((pivot, frame.prev_position()));
            }
        }

        if self.camera.frame().current_action() == MouseAction::ZoomOnRegion {
            overlay.zoom_region = Some(ScreenRect::from_corners(
                self.camera.frame().press_position(),
                self.camera.frame().prev_position(),
            ));
        }

        overlay.grid = self.grid_is_drawn;
        overlay.axis = self.axis_is_drawn;

        if self.fps_is_displayed {
            overlay.fps = Some(self.fps.display().to_string());
        }

        if self.text_is_enabled {
            if let Some(message) = &self.message {
                if message.is_visible(now) {
                    overlay.message = Some(message.text.clone());
                }
            }
        }

        overlay.z_buffer = self.z_buffer_is_displayed;
        overlay
    }

    fn sampled_camera_paths(&self) -> Vec<Vec<[f32; 3]>> {
        const SAMPLES_PER_SEGMENT: usize = 8;

        let mut indices: Vec<u32> = self.camera.path_indices().collect();
        indices.sort_unstable();

        let mut polylines = Vec::new();
        for index in indices {
            let Some(path) = self.camera.keyframe_interpolator(index) else {
                continue;
            };
            if path.number_of_keyframes() < 2 {
                continue;
            }
            let steps = (path.number_of_keyframes() - 1) * SAMPLES_PER_SEGMENT;
            let start = path.first_time();
            let duration = path.duration();
            let mut polyline = Vec::with_capacity(steps + 1);
            for i in 0..=steps {
                let t = start + duration * i as f32 / steps as f32;
                let pose = path.pose_at(t);
                polyline.push([pose.position.x, pose.position.y, pose.position.z]);
            }
            polylines.push(polyline);
        }
        polylines
    }

    // =========================================================================
    // Help
    // =========================================================================

    /// Plain-text description of every binding, for the embedder's help
    /// display.
    pub fn help_text(&self) -> String {
        let mut out = String::from("Keyboard\n--------\n");
        out.push_str(&self.keyboard.keyboard_help());
        out.push_str("\nCamera paths\n------------\n");
        let play = self.paths.shortcuts().play_modifiers().modifier_label(false);
        let add = self.paths.shortcuts().add_modifiers().modifier_label(false);
        out.push_str(&format!("{play}Fx: Plays path (double press resets)\n"));
        out.push_str(&format!("{add}Fx: Adds a key frame (double press deletes the path)\n"));
        out.push_str("\nMouse\n-----\n");
        out.push_str(&self.bindings.mouse_help());
        out
    }

    // =========================================================================
    // State persistence
    // =========================================================================

    /// Name of the state file (default `.arcview.json`); `None` disables
    /// saving and restoring.
    pub fn state_file_name(&self) -> Option<&Path> {
        self.state_file.as_deref()
    }

    pub fn set_state_file_name(&mut self, path: Option<PathBuf>) {
        self.state_file = path;
    }

    /// Capture the current viewer configuration.
    ///
    /// While camera-edit mode is active, the persisted clipping
    /// coefficient is the user's pre-edit value, not the widened one.
    pub fn viewer_state(&self) -> ViewerState {
        let z_clipping_coefficient = if self.camera_is_edited {
            self.previous_clipping_coefficient
        } else {
            self.camera.z_clipping_coefficient()
        };

        let mut indices: Vec<u32> = self.camera.path_indices().collect();
        indices.sort_unstable();
        let paths = indices
            .into_iter()
            .filter_map(|index| {
                self.camera.keyframe_interpolator(index).map(|path| {
                    let keyframes = path
                        .keyframes()
                        .map(|kf| KeyFrameState {
                            time: kf.time,
                            frame: pose_to_state(&kf.pose),
                        })
                        .collect();
                    (index, keyframes)
                })
            })
            .collect();

        ViewerState {
            foreground_color: self.foreground_color,
            background_color: self.background_color,
            stereo: self.stereo,
            camera_mode: if self.bindings.camera_in_revolve_mode() {
                CameraMode::Revolve
            } else {
                CameraMode::Fly
            },
            axis_is_drawn: self.axis_is_drawn,
            grid_is_drawn: self.grid_is_drawn,
            fps_is_displayed: self.fps_is_displayed,
            camera_is_edited: self.camera_is_edited,
            z_buffer_is_displayed: self.z_buffer_is_displayed,
            geometry: if self.full_screen {
                Geometry::FullScreen {
                    prev_pos: self.prev_pos,
                }
            } else {
                Geometry::Windowed {
                    width: self.window_size.0,
                    height: self.window_size.1,
                    pos: self.window_pos,
                }
            },
            camera: CameraState {
                frame: pose_to_state(&self.camera.pose()),
                field_of_view: self.camera.field_of_view(),
                scene_radius: self.camera.scene_radius(),
                scene_center: vec3_to_state(&self.camera.scene_center()),
                revolve_point: vec3_to_state(&self.camera.revolve_around_point()),
                fly_speed: self.camera.fly_speed(),
                z_clipping_coefficient,
                paths,
            },
            manipulated_frame: self
                .manipulated_frame
                .as_ref()
                .map(|frame| pose_to_state(&frame.frame().pose())),
        }
    }

    /// Apply a restored configuration.
    ///
    /// The manipulated frame pointer is not created here: its pose is
    /// only restored when a frame is already installed.
    pub fn apply_state(&mut self, state: &ViewerState) {
        self.foreground_color = state.foreground_color;
        self.background_color = state.background_color;
        self.stereo = state.stereo;

        self.axis_is_drawn = state.axis_is_drawn;
        self.grid_is_drawn = state.grid_is_drawn;
        self.fps_is_displayed = state.fps_is_displayed;
        self.z_buffer_is_displayed = state.z_buffer_is_displayed;

        if (state.camera_mode == CameraMode::Fly) == self.bindings.camera_in_revolve_mode() {
            self.bindings.toggle_camera_mode();
        }

        match state.geometry {
            Geometry::FullScreen { prev_pos } => {
                self.prev_pos = prev_pos;
                self.full_screen_request = Some(true);
            }
            Geometry::Windowed { width, height, pos } => {
                self.window_size = (width, height);
                self.window_pos = pos;
                self.camera.set_screen_width_and_height(width, height);
                if self.full_screen {
                    self.full_screen_request = Some(false);
                }
            }
        }

        // Camera parameters. The radius comes first so the fly speed it
        // derives is overwritten by the persisted one.
        self.camera.set_scene_radius(state.camera.scene_radius);
        self.camera.set_scene_center(vec3_from_state(&state.camera.scene_center));
        self.camera
            .set_revolve_around_point(vec3_from_state(&state.camera.revolve_point));
        self.camera.set_field_of_view(state.camera.field_of_view);
        self.camera.set_fly_speed(state.camera.fly_speed);
        self.camera.set_pose(&pose_from_state(&state.camera.frame));
        self.camera
            .set_z_clipping_coefficient(state.camera.z_clipping_coefficient);

        self.camera.clear_paths();
        for (index, keyframes) in &state.camera.paths {
            let mut path = KeyFrameInterpolator::new();
            for kf in keyframes {
                path.add_keyframe_at(pose_from_state(&kf.frame), kf.time);
            }
            self.camera.insert_path(*index, path);
        }

        // Camera-edit mode last: entering it stashes the just-restored
        // clipping coefficient and widens the live one.
        self.camera_is_edited = false;
        self.previous_clipping_coefficient = self.camera.z_clipping_coefficient();
        if state.camera_is_edited {
            self.set_camera_is_edited(true);
        }

        if let (Some(frame), Some(frame_state)) =
            (self.manipulated_frame.as_mut(), state.manipulated_frame)
        {
            frame.frame_mut().set_pose(&pose_from_state(&frame_state));
        }

        self.needs_redraw = true;
    }

    /// Save the viewer state to the state file. A `None` file name
    /// silently disables saving.
    pub fn save_state_to_file(&self) -> ViewerResult<()> {
        let Some(path) = &self.state_file else {
            return Ok(());
        };
        arcview_session::save_state_to_file(path, &self.viewer_state())?;
        Ok(())
    }

    /// Restore the viewer state from the state file.
    ///
    /// Returns false when no state file exists yet (first start) or the
    /// file name is disabled; the current state is then unchanged.
    pub fn restore_state_from_file(&mut self) -> ViewerResult<bool> {
        let Some(path) = self.state_file.clone() else {
            return Ok(false);
        };
        match arcview_session::restore_state_from_file(&path)? {
            Some(state) => {
                self.apply_state(&state);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn vec3_to_state(v: &Vec3) -> [f32; 3] {
    [v.x, v.y, v.z]
}

fn vec3_from_state(v: &[f32; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

fn pose_to_state(pose: &FramePose) -> FrameState {
    FrameState {
        position: vec3_to_state(&pose.position),
        orientation: [
            pose.orientation.w,
            pose.orientation.x,
            pose.orientation.y,
            pose.orientation.z,
        ],
    }
}

fn pose_from_state(state: &FrameState) -> FramePose {
    FramePose {
        position: vec3_from_state(&state.position),
        orientation: Quat::new(
            state.orientation[0],
            state.orientation[1],
            state.orientation[2],
            state.orientation[3],
        )
        .normalized(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grabber::MouseGrabber;

    #[derive(Default)]
    struct TestApp {
        hits: Vec<(u32, f32)>,
        point: Option<Vec3>,
        last_selection: Option<Option<u32>>,
        draw_calls: usize,
    }

    impl ViewerApp for TestApp {
        fn draw_with_names(&mut self, _region: &PickRegion, selector: &mut Selector) {
            self.draw_calls += 1;
            for (id, depth) in &self.hits {
                selector.push_hit(*id, *depth);
            }
        }

        fn point_under_pixel(&mut self, _x: f32, _y: f32) -> Option<Vec3> {
            self.point.clone()
        }

        fn post_selection(&mut self, _x: f32, _y: f32, selected: Option<u32>) {
            self.last_selection = Some(selected);
        }
    }

    struct AlwaysGrabs {
        grabs: bool,
        presses: usize,
    }

    impl AlwaysGrabs {
        fn new() -> Self {
            Self {
                grabs: false,
                presses: 0,
            }
        }
    }

    impl MouseGrabber for AlwaysGrabs {
        fn check_if_grabs_mouse(&mut self, _x: f32, _y: f32, _camera: &Camera) {
            self.grabs = true;
        }

        fn grabs_mouse(&self) -> bool {
            self.grabs
        }

        fn mouse_press(&mut self, _x: f32, _y: f32, _button: MouseButton, _camera: &Camera) {
            self.presses += 1;
        }
    }

    fn shifted(viewer: &mut Viewer) {
        viewer.set_modifiers(ModifiersState::SHIFT);
    }

    #[test]
    fn test_plain_left_press_starts_camera_rotation() {
        let mut viewer = Viewer::new();
        let mut app = TestApp::default();

        let handled = viewer.mouse_press(&mut app, 100.0, 100.0, MouseButton::Left, Instant::now());
        assert!(handled);
        assert!(viewer.camera_is_manipulated());
        assert_eq!(viewer.camera().frame().current_action(), MouseAction::Rotate);

        viewer.mouse_release(100.0, 100.0, MouseButton::Left);
        assert!(!viewer.camera_is_manipulated());
        assert!(viewer.take_redraw_request(), "release always redraws");
    }

    #[test]
    fn test_unbound_combo_propagates() {
        let mut viewer = Viewer::new();
        let mut app = TestApp::default();
        viewer.set_modifiers(ModifiersState::SUPER);

        let handled = viewer.mouse_press(&mut app, 0.0, 0.0, MouseButton::Left, Instant::now());
        assert!(!handled);
        assert!(!viewer.camera_is_manipulated());
    }

    #[test]
    fn test_shift_left_click_selects() {
        let mut viewer = Viewer::new();
        let mut app = TestApp {
            hits: vec![(5, 10.0), (7, 3.0)],
            ..TestApp::default()
        };
        shifted(&mut viewer);

        let handled = viewer.mouse_press(&mut app, 50.0, 60.0, MouseButton::Left, Instant::now());
        assert!(handled);
        assert_eq!(app.draw_calls, 1);
        assert_eq!(viewer.selected_id(), Some(7), "closest hit wins");
        assert_eq!(app.last_selection, Some(Some(7)));
        assert!(!viewer.camera_is_manipulated(), "click actions never drag");
    }

    #[test]
    fn test_click_binding_wins_over_drag_binding() {
        // Shift+Middle is zoom-on-region (drag); bind a click on the same
        // gesture and the click must win while the drag disappears (the
        // tables are mutually exclusive for plain keys).
        let mut viewer = Viewer::new();
        let mut app = TestApp::default();
        viewer.bindings_mut().set_click_binding(
            ComboKey::SHIFT | ComboKey::MIDDLE,
            ClickAction::CenterScene,
            false,
            ComboKey::empty(),
        );
        shifted(&mut viewer);

        let handled = viewer.mouse_press(&mut app, 10.0, 10.0, MouseButton::Middle, Instant::now());
        assert!(handled);
        assert!(!viewer.camera_is_manipulated());
    }

    #[test]
    fn test_chained_double_click_uses_prior_button() {
        let mut viewer = Viewer::new();
        let mut app = TestApp {
            point: Some(Vec3::new(0.1, 0.2, 0.3)),
            ..TestApp::default()
        };
        let now = Instant::now();

        // Hold right, double click left: revolve point from pixel.
        viewer.mouse_press(&mut app, 10.0, 10.0, MouseButton::Right, now);
        let handled = viewer.mouse_double_click(&mut app, 10.0, 10.0, MouseButton::Left, now);
        assert!(handled);

        let rap = viewer.camera().revolve_around_point();
        assert!((rap.x - 0.1).abs() < 1e-6);
        assert!((rap.y - 0.2).abs() < 1e-6);

        // The crosshair hint is armed.
        let overlay = viewer.post_draw(now);
        assert!(overlay.revolve_point_cross.is_some());
    }

    #[test]
    fn test_unmatched_double_click_propagates() {
        let mut viewer = Viewer::new();
        let mut app = TestApp::default();
        viewer.set_modifiers(ModifiersState::SUPER);
        assert!(!viewer.mouse_double_click(
            &mut app,
            0.0,
            0.0,
            MouseButton::Left,
            Instant::now()
        ));
    }

    #[test]
    fn test_grabber_takes_priority_over_bindings() {
        let mut viewer = Viewer::new();
        let mut app = TestApp::default();
        viewer.set_mouse_tracking(true);
        let id = viewer.grabbers_mut().register(Box::new(AlwaysGrabs::new()));

        // Idle motion activates the grabber.
        viewer.mouse_move(10.0, 10.0);
        assert_eq!(viewer.active_grabber(), Some(id));

        // The press now goes to the grabber, not the camera.
        let handled = viewer.mouse_press(&mut app, 10.0, 10.0, MouseButton::Left, Instant::now());
        assert!(handled);
        assert!(!viewer.camera_is_manipulated());
    }

    #[test]
    fn test_disabled_grabber_is_not_activated() {
        let mut viewer = Viewer::new();
        viewer.set_mouse_tracking(true);
        let id = viewer.grabbers_mut().register(Box::new(AlwaysGrabs::new()));
        viewer.grabbers_mut().set_enabled(id, false);

        viewer.mouse_move(10.0, 10.0);
        assert_eq!(viewer.active_grabber(), None);
    }

    #[test]
    fn test_wheel_zooms_camera() {
        let mut viewer = Viewer::new();
        let before = viewer.camera().position();
        assert!(viewer.wheel(1.0));
        let after = viewer.camera().position();
        assert!((after - before).magnitude() > 1e-6);
        assert!(!viewer.camera_is_manipulated(), "wheel actions are one-shot");
    }

    #[test]
    fn test_wheel_with_unbound_modifiers_propagates() {
        let mut viewer = Viewer::new();
        viewer.set_modifiers(ModifiersState::SUPER);
        assert!(!viewer.wheel(1.0));
    }

    #[test]
    fn test_zoom_on_region_release_moves_camera_closer() {
        let mut viewer = Viewer::new();
        let mut app = TestApp::default();
        shifted(&mut viewer);

        let before = (viewer.camera().position() - viewer.camera().revolve_around_point()).magnitude();
        viewer.mouse_press(&mut app, 200.0, 150.0, MouseButton::Middle, Instant::now());
        assert_eq!(
            viewer.camera().frame().current_action(),
            MouseAction::ZoomOnRegion
        );

        viewer.mouse_move(400.0, 250.0);
        viewer.mouse_release(400.0, 250.0, MouseButton::Middle);

        let after = (viewer.camera().position() - viewer.camera().revolve_around_point()).magnitude();
        assert!(after < before);
    }

    #[test]
    fn test_overlay_shows_zoom_region_during_drag() {
        let mut viewer = Viewer::new();
        let mut app = TestApp::default();
        shifted(&mut viewer);

        viewer.mouse_press(&mut app, 200.0, 150.0, MouseButton::Middle, Instant::now());
        viewer.mouse_move(300.0, 250.0);

        let overlay = viewer.post_draw(Instant::now());
        let region = overlay.zoom_region.expect("rectangle while dragging");
        assert_eq!(region.min, (200.0, 150.0));
        assert_eq!(region.max, (300.0, 250.0));
    }

    #[test]
    fn test_overlay_screen_rotate_line() {
        let mut viewer = Viewer::new();
        let mut app = TestApp::default();
        let now = Instant::now();

        // Left+Middle is the default camera screen-rotate gesture.
        viewer.mouse_press(&mut app, 100.0, 100.0, MouseButton::Left, now);
        viewer.mouse_release(100.0, 100.0, MouseButton::Left);
        viewer.take_redraw_request();

        viewer.mouse_press(&mut app, 100.0, 100.0, MouseButton::Left, now);
        let handled = viewer.mouse_press(&mut app, 100.0, 100.0, MouseButton::Middle, now);
        assert!(handled);
        assert_eq!(
            viewer.camera().frame().current_action(),
            MouseAction::ScreenRotate
        );
        assert!(viewer.take_redraw_request(), "guide line forces a redraw");

        let overlay = viewer.post_draw(now);
        assert!(overlay.screen_rotate_line.is_some());
    }

    #[test]
    fn test_key_toggles_axis() {
        let mut viewer = Viewer::new();
        assert!(!viewer.axis_is_drawn());
        assert_eq!(
            viewer.key_press(KeyCode::KeyA, Instant::now()),
            KeyResponse::Handled
        );
        assert!(viewer.axis_is_drawn());
    }

    #[test]
    fn test_snapshot_shortcut_returns_command() {
        let mut viewer = Viewer::new();
        viewer.set_modifiers(ModifiersState::CONTROL);
        assert_eq!(
            viewer.key_press(KeyCode::KeyS, Instant::now()),
            KeyResponse::Command(ViewerCommand::SaveSnapshot)
        );
    }

    #[test]
    fn test_unbound_key_propagates() {
        let mut viewer = Viewer::new();
        assert_eq!(
            viewer.key_press(KeyCode::KeyQ, Instant::now()),
            KeyResponse::Unhandled
        );
    }

    #[test]
    fn test_path_key_adds_keyframe_and_messages() {
        let mut viewer = Viewer::new();
        let now = Instant::now();
        viewer.set_modifiers(ModifiersState::ALT);

        assert_eq!(viewer.key_press(KeyCode::F2, now), KeyResponse::Handled);
        assert_eq!(
            viewer
                .camera()
                .keyframe_interpolator(2)
                .map(|p| p.number_of_keyframes()),
            Some(1)
        );

        let overlay = viewer.post_draw(now);
        assert_eq!(overlay.message.as_deref(), Some("Position 2 saved"));
    }

    #[test]
    fn test_camera_mode_toggle_message_and_bindings() {
        let mut viewer = Viewer::new();
        let now = Instant::now();
        assert!(viewer.bindings().camera_in_revolve_mode());

        viewer.key_press(KeyCode::Space, now);
        assert!(!viewer.bindings().camera_in_revolve_mode());
        let overlay = viewer.post_draw(now);
        assert_eq!(overlay.message.as_deref(), Some("Camera in fly mode"));
    }

    #[test]
    fn test_camera_edit_swaps_clipping_coefficient() {
        let mut viewer = Viewer::new();
        let user_value = viewer.camera().z_clipping_coefficient();

        viewer.set_camera_is_edited(true);
        assert_eq!(viewer.camera().z_clipping_coefficient(), 5.0);

        // The persisted state carries the user's value, not 5.0.
        let state = viewer.viewer_state();
        assert!((state.camera.z_clipping_coefficient - user_value).abs() < 1e-6);
        assert!(state.camera_is_edited);

        viewer.set_camera_is_edited(false);
        assert!((viewer.camera().z_clipping_coefficient() - user_value).abs() < 1e-6);
    }

    #[test]
    fn test_full_screen_two_phase() {
        let mut viewer = Viewer::new();
        viewer.set_window_geometry(800, 600, (15, 30));
        assert!(!viewer.is_full_screen());

        viewer.request_full_screen(true);
        assert!(!viewer.is_full_screen(), "not applied before post-render");

        let request = viewer.take_full_screen_request();
        assert_eq!(request, Some(true));
        assert_eq!(viewer.restore_position(), (15, 30));
        viewer.confirm_full_screen(true);
        assert!(viewer.is_full_screen());

        assert_eq!(viewer.take_full_screen_request(), None, "request consumed");
    }

    #[test]
    fn test_message_expires() {
        let mut viewer = Viewer::new();
        let t0 = Instant::now();
        viewer.display_message("hello", t0);

        let overlay = viewer.post_draw(t0 + Duration::from_millis(500));
        assert_eq!(overlay.message.as_deref(), Some("hello"));

        let overlay = viewer.post_draw(t0 + Duration::from_secs(3));
        assert_eq!(overlay.message, None);
    }

    #[test]
    fn test_text_disabled_hides_messages() {
        let mut viewer = Viewer::new();
        let t0 = Instant::now();
        viewer.set_text_is_enabled(false);
        viewer.display_message("hidden", t0);
        let overlay = viewer.post_draw(t0);
        assert_eq!(overlay.message, None);
    }

    #[test]
    fn test_viewer_state_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut viewer = Viewer::new();
        viewer.set_state_file_name(Some(path.clone()));
        viewer.set_axis_is_drawn(true);
        viewer.set_grid_is_drawn(true);
        viewer.set_window_geometry(800, 600, (10, 20));
        viewer.camera_mut().set_scene_radius(7.0);
        viewer.save_state_to_file().unwrap();

        let mut restored = Viewer::new();
        restored.set_state_file_name(Some(path));
        assert!(restored.restore_state_from_file().unwrap());
        assert!(restored.axis_is_drawn());
        assert!(restored.grid_is_drawn());
        assert!(!restored.fps_is_displayed());
        assert_eq!(restored.window_size(), (800, 600));
        assert_eq!(restored.window_position(), (10, 20));
        assert!((restored.camera().scene_radius() - 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_restore_without_file_is_first_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut viewer = Viewer::new();
        viewer.set_state_file_name(Some(dir.path().join("absent.json")));
        assert!(!viewer.restore_state_from_file().unwrap());
    }

    #[test]
    fn test_update_advances_path_playback() {
        let mut viewer = Viewer::new();
        let t0 = Instant::now();
        viewer.set_modifiers(ModifiersState::ALT);
        viewer.key_press(KeyCode::F1, t0);

        viewer
            .camera_mut()
            .set_position(Vec3::new(5.0, 0.0, 0.0));
        viewer.key_press(KeyCode::F1, t0 + Duration::from_secs(1));

        viewer.set_modifiers(ModifiersState::empty());
        viewer.key_press(KeyCode::F1, t0 + Duration::from_secs(2));
        assert!(viewer.camera().any_path_playing());

        viewer.update(t0 + Duration::from_secs(2));
        assert!(viewer.update(t0 + Duration::from_millis(2500)));
        assert!(viewer.take_redraw_request());
    }

    #[test]
    fn test_help_text_mentions_all_channels() {
        let viewer = Viewer::new();
        let help = viewer.help_text();
        assert!(help.contains("Keyboard"));
        assert!(help.contains("Camera paths"));
        assert!(help.contains("Rotates camera"));
        assert!(help.contains("Toggles the display of the world axis"));
    }
}
