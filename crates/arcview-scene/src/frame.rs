//! Frames and mouse manipulation
//!
//! A [`Frame`] is a position plus an orientation. A [`ManipulatedFrame`]
//! wraps a frame with the drag-action state machine: the input dispatcher
//! starts an action on it, feeds it pointer motion and ends the action on
//! release. The same machine drives both the camera frame and the
//! application's free target; [`DriveMode`] selects between the camera
//! flavor of each action (revolving around the pivot, flying) and the
//! object flavor (moving the frame itself in front of the camera).

use lin_alg::f32::Vec3;

use arcview_input::MouseAction;

use crate::quat::Quat;

/// Position and orientation, the unit of keyframe recording.
#[derive(Debug, Clone)]
pub struct FramePose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for FramePose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 0.0),
            orientation: Quat::identity(),
        }
    }
}

/// Translation or rotation filter applied while a constrained action is
/// active.
#[derive(Debug, Clone, Default)]
pub enum AxisPlaneConstraint {
    /// No filtering.
    #[default]
    Free,
    /// The component is entirely forbidden.
    Forbidden,
    /// Motion restricted to a world-space axis.
    Axis(Vec3),
    /// Translation restricted to the plane orthogonal to a world normal.
    /// Meaningless for rotations, where it behaves like [`Self::Free`].
    Plane(Vec3),
}

/// Per-frame constraint: independent filters for translation and rotation.
#[derive(Debug, Clone, Default)]
pub struct Constraint {
    pub translation: AxisPlaneConstraint,
    pub rotation: AxisPlaneConstraint,
}

impl Constraint {
    fn constrain_translation(&self, t: Vec3) -> Vec3 {
        match &self.translation {
            AxisPlaneConstraint::Free => t,
            AxisPlaneConstraint::Forbidden => Vec3::new(0.0, 0.0, 0.0),
            AxisPlaneConstraint::Axis(axis) => {
                let norm = axis.magnitude();
                if norm < 1e-8 {
                    return Vec3::new(0.0, 0.0, 0.0);
                }
                let a = axis.clone() * (1.0 / norm);
                a.clone() * t.dot(a)
            }
            AxisPlaneConstraint::Plane(normal) => {
                let norm = normal.magnitude();
                if norm < 1e-8 {
                    return t;
                }
                let n = normal.clone() * (1.0 / norm);
                t.clone() - n.clone() * t.dot(n)
            }
        }
    }

    fn constrain_rotation(&self, q: Quat) -> Quat {
        match &self.rotation {
            AxisPlaneConstraint::Free | AxisPlaneConstraint::Plane(_) => q,
            AxisPlaneConstraint::Forbidden => Quat::identity(),
            AxisPlaneConstraint::Axis(axis) => {
                // Twist extraction: keep the rotation component around the
                // constraint axis.
                let norm = axis.magnitude();
                if norm < 1e-8 {
                    return Quat::identity();
                }
                let a = axis.clone() * (1.0 / norm);
                let proj = a.clone() * q.axis().dot(a);
                Quat::new(q.w, proj.x, proj.y, proj.z).normalized()
            }
        }
    }
}

/// A coordinate frame: position and orientation in world space.
#[derive(Debug, Clone)]
pub struct Frame {
    position: Vec3,
    orientation: Quat,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 0.0),
            orientation: Quat::identity(),
        }
    }
}

impl Frame {
    /// A frame at the world origin with identity orientation.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vec3 {
        self.position.clone()
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation.normalized();
    }

    /// The frame's pose (for keyframe recording).
    pub fn pose(&self) -> FramePose {
        FramePose {
            position: self.position.clone(),
            orientation: self.orientation,
        }
    }

    pub fn set_pose(&mut self, pose: &FramePose) {
        self.position = pose.position.clone();
        self.orientation = pose.orientation.normalized();
    }

    /// Translate by a world-space vector.
    pub fn translate(&mut self, t: Vec3) {
        self.position = self.position.clone() + t;
    }

    /// Rotate in the local frame (around the frame origin).
    pub fn rotate(&mut self, q: Quat) {
        self.orientation = (self.orientation * q).normalized();
    }

    /// Rotate by a world-space quaternion around a world-space point.
    pub fn rotate_around_point(&mut self, q_world: Quat, point: Vec3) {
        self.position = point.clone() + q_world.rotate(self.position.clone() - point);
        self.orientation = (q_world * self.orientation).normalized();
    }

    /// Express a local vector in world coordinates (direction only).
    pub fn inverse_transform_of(&self, local: Vec3) -> Vec3 {
        self.orientation.rotate(local)
    }

    /// Express a world vector in local coordinates (direction only).
    pub fn transform_of(&self, world: Vec3) -> Vec3 {
        self.orientation.conjugate().rotate(world)
    }

    /// World coordinates of a point given in local coordinates.
    pub fn world_coordinates_of(&self, local: Vec3) -> Vec3 {
        self.position.clone() + self.orientation.rotate(local)
    }

    /// Local coordinates of a point given in world coordinates.
    pub fn coordinates_of(&self, world: Vec3) -> Vec3 {
        self.orientation.conjugate().rotate(world - self.position.clone())
    }

    pub fn x_axis(&self) -> Vec3 {
        self.inverse_transform_of(Vec3::new(1.0, 0.0, 0.0))
    }

    pub fn y_axis(&self) -> Vec3 {
        self.inverse_transform_of(Vec3::new(0.0, 1.0, 0.0))
    }

    pub fn z_axis(&self) -> Vec3 {
        self.inverse_transform_of(Vec3::new(0.0, 0.0, 1.0))
    }

    /// Move the position onto the line through `origin` along `direction`.
    pub fn project_on_line(&mut self, origin: Vec3, direction: Vec3) {
        let norm = direction.magnitude();
        if norm < 1e-8 {
            return;
        }
        let d = direction * (1.0 / norm);
        let shift = d.clone() * (self.position.clone() - origin.clone()).dot(d);
        self.position = origin + shift;
    }

    /// Snap the orientation so the frame axes align with the closest axes
    /// of `reference` (the world frame when `None`).
    ///
    /// Two alignment passes are performed; an axis pair is only snapped
    /// when the absolute dot product of the two directions reaches
    /// `threshold`.
    pub fn align_with_frame(&mut self, reference: Option<&Frame>, threshold: f32) {
        let world = Frame::new();
        let reference = reference.unwrap_or(&world);
        let ref_axes = [reference.x_axis(), reference.y_axis(), reference.z_axis()];

        let mut used_own: Option<usize> = None;
        let mut used_ref: Option<usize> = None;

        for _pass in 0..2 {
            let own_axes = [self.x_axis(), self.y_axis(), self.z_axis()];

            let mut best = threshold;
            let mut best_pair: Option<(usize, usize, f32)> = None;
            for (i, ref_axis) in ref_axes.iter().enumerate() {
                if used_ref == Some(i) {
                    continue;
                }
                for (j, own_axis) in own_axes.iter().enumerate() {
                    if used_own == Some(j) {
                        continue;
                    }
                    let dot = ref_axis.dot(own_axis.clone());
                    if dot.abs() >= best {
                        best = dot.abs();
                        best_pair = Some((i, j, dot));
                    }
                }
            }

            let Some((i, j, dot)) = best_pair else {
                return;
            };
            let sign = if dot < 0.0 { -1.0 } else { 1.0 };
            let target = ref_axes[i].clone() * sign;
            let arc = Quat::rotation_arc(own_axes[j].clone(), target);
            self.orientation = (arc * self.orientation).normalized();
            used_own = Some(j);
            used_ref = Some(i);
        }
    }
}

/// Which flavor of the drag actions a manipulated frame performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriveMode {
    /// The frame is an object moved in front of the camera.
    #[default]
    AsObject,
    /// The frame *is* the camera: rotations revolve around the pivot,
    /// translations move the viewpoint, fly actions apply.
    AsCamera,
}

/// Camera data a frame needs to interpret pointer motion.
///
/// Captured from the camera before dispatching an event, so the camera's
/// own frame can be driven without aliasing the camera borrow.
#[derive(Debug, Clone)]
pub struct ViewContext {
    pub screen_width: f32,
    pub screen_height: f32,
    pub camera_position: Vec3,
    pub camera_orientation: Quat,
    /// World-space pivot of revolve-style camera rotations.
    pub revolve_point: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub scene_radius: f32,
    pub fly_speed: f32,
}

impl ViewContext {
    /// View direction in world space (camera looks down its local -z).
    pub fn view_direction(&self) -> Vec3 {
        self.camera_orientation.rotate(Vec3::new(0.0, 0.0, -1.0))
    }

    /// Up direction in world space.
    pub fn up_vector(&self) -> Vec3 {
        self.camera_orientation.rotate(Vec3::new(0.0, 1.0, 0.0))
    }

    /// Project a world point to pixel coordinates (origin upper left).
    ///
    /// Points behind the camera project to the screen center.
    pub fn project(&self, point: Vec3) -> (f32, f32) {
        let cam = self
            .camera_orientation
            .conjugate()
            .rotate(point - self.camera_position.clone());
        if cam.z > -1e-6 {
            return (self.screen_width / 2.0, self.screen_height / 2.0);
        }
        let half_fov_tan = (self.fov / 2.0).tan();
        let aspect = self.screen_width / self.screen_height.max(1.0);
        let ndc_x = cam.x / (-cam.z * half_fov_tan * aspect);
        let ndc_y = cam.y / (-cam.z * half_fov_tan);
        (
            (ndc_x + 1.0) / 2.0 * self.screen_width,
            (1.0 - ndc_y) / 2.0 * self.screen_height,
        )
    }
}

// Trackball sphere mapping: inside the ball a sphere, outside a hyperbola.
fn project_on_ball(x: f32, y: f32) -> f32 {
    const SIZE: f32 = 1.0;
    const SIZE2: f32 = SIZE * SIZE;
    const SIZE_LIMIT: f32 = SIZE2 * 0.5;

    let d = x * x + y * y;
    if d < SIZE_LIMIT {
        (SIZE2 - d).sqrt()
    } else {
        SIZE_LIMIT / d.sqrt()
    }
}

/// Minimum incremental rotation angle (radians) that keeps a frame
/// spinning after the rotating drag is released.
const SPIN_ANGLE_THRESHOLD: f32 = 0.015;

/// A frame reacting to the drag-action protocol.
#[derive(Debug)]
pub struct ManipulatedFrame {
    frame: Frame,
    constraint: Constraint,

    action: MouseAction,
    with_constraint: bool,
    drive: DriveMode,

    press_pos: (f32, f32),
    prev_pos: (f32, f32),
    /// Dominant direction lock for screen-translate, chosen on the first
    /// significant motion of a drag.
    fixed_dir_horizontal: Option<bool>,

    rotate_sensitivity: f32,
    translate_sensitivity: f32,
    wheel_sensitivity: f32,

    spinning: bool,
    spin_rotation: Quat,
    spin_pivot: Option<Vec3>,
}

impl Default for ManipulatedFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl ManipulatedFrame {
    pub fn new() -> Self {
        Self {
            frame: Frame::new(),
            constraint: Constraint::default(),
            action: MouseAction::NoAction,
            with_constraint: true,
            drive: DriveMode::AsObject,
            press_pos: (0.0, 0.0),
            prev_pos: (0.0, 0.0),
            fixed_dir_horizontal: None,
            rotate_sensitivity: 1.0,
            translate_sensitivity: 1.0,
            wheel_sensitivity: 1.0,
            spinning: false,
            spin_rotation: Quat::identity(),
            spin_pivot: None,
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    pub fn set_constraint(&mut self, constraint: Constraint) {
        self.constraint = constraint;
    }

    pub fn rotate_sensitivity(&self) -> f32 {
        self.rotate_sensitivity
    }

    pub fn set_rotate_sensitivity(&mut self, sensitivity: f32) {
        self.rotate_sensitivity = sensitivity;
    }

    pub fn set_translate_sensitivity(&mut self, sensitivity: f32) {
        self.translate_sensitivity = sensitivity;
    }

    pub fn set_wheel_sensitivity(&mut self, sensitivity: f32) {
        self.wheel_sensitivity = sensitivity;
    }

    /// The action currently being performed, [`MouseAction::NoAction`]
    /// when idle.
    pub fn current_action(&self) -> MouseAction {
        self.action
    }

    /// Whether a drag action is in progress.
    pub fn is_manipulated(&self) -> bool {
        self.action != MouseAction::NoAction
    }

    /// Pixel position of the initial press of the current drag.
    pub fn press_position(&self) -> (f32, f32) {
        self.press_pos
    }

    /// Pixel position of the last processed motion.
    pub fn prev_position(&self) -> (f32, f32) {
        self.prev_pos
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    pub fn stop_spinning(&mut self) {
        self.spinning = false;
    }

    /// Begin a drag action. Any spin in progress stops.
    pub fn start_action(&mut self, action: MouseAction, with_constraint: bool, drive: DriveMode) {
        self.action = action;
        self.with_constraint = with_constraint;
        self.drive = drive;
        self.fixed_dir_horizontal = None;
        self.stop_spinning();
        if action == MouseAction::Rotate {
            self.spin_rotation = Quat::identity();
        }
    }

    /// Record the press position of the starting drag.
    pub fn mouse_press(&mut self, x: f32, y: f32) {
        self.press_pos = (x, y);
        self.prev_pos = (x, y);
    }

    /// Apply pointer motion to the current action.
    ///
    /// Returns true when the frame was actually manipulated (callers use
    /// it as a redraw hint).
    pub fn mouse_move(&mut self, x: f32, y: f32, ctx: &ViewContext) -> bool {
        let dx = x - self.prev_pos.0;
        let dy = y - self.prev_pos.1;
        let manipulated = match self.action {
            MouseAction::NoAction => false,
            MouseAction::Rotate => {
                self.apply_rotate(x, y, ctx);
                true
            }
            MouseAction::Zoom => {
                self.apply_zoom(dy, ctx);
                true
            }
            MouseAction::Translate => {
                self.apply_translate(dx, dy, ctx);
                true
            }
            MouseAction::ScreenRotate => {
                self.apply_screen_rotate(x, y, ctx);
                true
            }
            MouseAction::ScreenTranslate => {
                self.apply_screen_translate(dx, dy, ctx);
                true
            }
            MouseAction::Roll => {
                self.apply_roll(dx, ctx);
                true
            }
            MouseAction::MoveForward | MouseAction::MoveBackward | MouseAction::LookAround => {
                self.apply_pitch_yaw(dx, dy, ctx);
                true
            }
            // The rectangle is drawn from press/prev positions; the camera
            // is only moved at release.
            MouseAction::ZoomOnRegion => true,
        };

        self.prev_pos = (x, y);
        manipulated
    }

    /// End the current drag.
    ///
    /// Returns the action that was in progress. A rotating drag whose last
    /// increment was fast enough leaves the frame spinning.
    pub fn mouse_release(&mut self, x: f32, y: f32, ctx: &ViewContext) -> MouseAction {
        let ended = self.action;
        self.prev_pos = (x, y);

        if ended == MouseAction::Rotate && self.spin_rotation.angle() > SPIN_ANGLE_THRESHOLD {
            self.spinning = true;
            self.spin_pivot = match self.drive {
                DriveMode::AsCamera => Some(ctx.revolve_point.clone()),
                DriveMode::AsObject => None,
            };
        }

        self.action = MouseAction::NoAction;
        ended
    }

    /// Apply a wheel step. The implicit action ends immediately.
    ///
    /// `delta` is in scroll lines, positive away from the user.
    pub fn wheel_event(&mut self, delta: f32, ctx: &ViewContext) -> bool {
        let manipulated = match self.action {
            MouseAction::Zoom => {
                match self.drive {
                    DriveMode::AsCamera => {
                        let dist = (ctx.revolve_point.clone() - self.frame.position()).magnitude();
                        let coef = dist.max(0.2 * ctx.scene_radius);
                        let t = self.frame.inverse_transform_of(Vec3::new(
                            0.0,
                            0.0,
                            coef * delta * self.wheel_sensitivity * 0.1,
                        ));
                        self.translate_constrained(t);
                    }
                    DriveMode::AsObject => {
                        let dist = (ctx.camera_position.clone() - self.frame.position()).magnitude();
                        let t = ctx.camera_orientation.rotate(Vec3::new(
                            0.0,
                            0.0,
                            -delta * self.wheel_sensitivity * 0.1 * dist,
                        ));
                        self.translate_constrained(t);
                    }
                }
                true
            }
            MouseAction::MoveForward => {
                self.translate_constrained(
                    self.frame
                        .inverse_transform_of(Vec3::new(0.0, 0.0, -ctx.fly_speed * delta * 20.0)),
                );
                true
            }
            MouseAction::MoveBackward => {
                self.translate_constrained(
                    self.frame
                        .inverse_transform_of(Vec3::new(0.0, 0.0, ctx.fly_speed * delta * 20.0)),
                );
                true
            }
            _ => false,
        };

        self.action = MouseAction::NoAction;
        manipulated
    }

    /// Advance an active spin by one animation tick.
    pub fn update_spin(&mut self) -> bool {
        if !self.spinning {
            return false;
        }
        let pivot = match &self.spin_pivot {
            Some(pivot) => pivot.clone(),
            None => self.frame.position(),
        };
        self.frame.rotate_around_point(self.spin_rotation, pivot);
        true
    }

    /// Advance an active fly action by one animation tick.
    pub fn update_fly(&mut self, ctx: &ViewContext) -> bool {
        let step = match self.action {
            MouseAction::MoveForward => -ctx.fly_speed,
            MouseAction::MoveBackward => ctx.fly_speed,
            _ => return false,
        };
        let t = self.frame.inverse_transform_of(Vec3::new(0.0, 0.0, step));
        self.translate_constrained(t);
        true
    }

    // =========================================================================
    // Action math
    // =========================================================================

    fn translate_constrained(&mut self, t: Vec3) {
        let t = if self.with_constraint {
            self.constraint.constrain_translation(t)
        } else {
            t
        };
        self.frame.translate(t);
    }

    fn rotate_world_constrained(&mut self, q: Quat, pivot: Vec3) {
        let q = if self.with_constraint {
            self.constraint.constrain_rotation(q)
        } else {
            q
        };
        self.frame.rotate_around_point(q, pivot);
    }

    fn apply_rotate(&mut self, x: f32, y: f32, ctx: &ViewContext) {
        let (pivot, pivot_screen) = match self.drive {
            DriveMode::AsCamera => {
                let p = ctx.revolve_point.clone();
                let s = ctx.project(p.clone());
                (p, s)
            }
            DriveMode::AsObject => {
                let p = self.frame.position();
                let s = ctx.project(p.clone());
                (p, s)
            }
        };

        let q_cam = self.deformed_ball_quaternion(x, y, pivot_screen.0, pivot_screen.1, ctx);
        // The trackball quaternion lives in camera coordinates; conjugate
        // it into world space.
        let q_world = ctx.camera_orientation * q_cam * ctx.camera_orientation.conjugate();

        let q_applied = match self.drive {
            // The camera moves opposite to the dragged scene.
            DriveMode::AsCamera => q_world.conjugate(),
            DriveMode::AsObject => q_world,
        };

        self.spin_rotation = q_applied;
        self.rotate_world_constrained(q_applied, pivot);
    }

    fn deformed_ball_quaternion(
        &self,
        x: f32,
        y: f32,
        cx: f32,
        cy: f32,
        ctx: &ViewContext,
    ) -> Quat {
        let sw = ctx.screen_width.max(1.0);
        let sh = ctx.screen_height.max(1.0);

        let px = self.rotate_sensitivity * (self.prev_pos.0 - cx) / sw;
        let py = self.rotate_sensitivity * (cy - self.prev_pos.1) / sh;
        let dx = self.rotate_sensitivity * (x - cx) / sw;
        let dy = self.rotate_sensitivity * (cy - y) / sh;

        let p1 = Vec3::new(px, py, project_on_ball(px, py));
        let p2 = Vec3::new(dx, dy, project_on_ball(dx, dy));

        let axis = p2.cross(p1.clone());
        let axis_norm = axis.magnitude();
        let p1_norm = p1.magnitude();
        let p2_norm = p2.magnitude();
        if axis_norm < 1e-8 || p1_norm < 1e-8 || p2_norm < 1e-8 {
            return Quat::identity();
        }
        let angle = 2.0 * (axis_norm / (p1_norm * p2_norm)).clamp(-1.0, 1.0).asin();
        Quat::from_axis_angle(axis, angle)
    }

    fn apply_zoom(&mut self, dy: f32, ctx: &ViewContext) {
        let sh = ctx.screen_height.max(1.0);
        match self.drive {
            DriveMode::AsCamera => {
                // Zoom speed follows the distance to the pivot, floored so
                // the camera never gets stuck on it.
                let dist = (ctx.revolve_point.clone() - self.frame.position()).magnitude();
                let coef = dist.max(0.2 * ctx.scene_radius);
                let t = self
                    .frame
                    .inverse_transform_of(Vec3::new(0.0, 0.0, -coef * dy / sh));
                self.translate_constrained(t);
            }
            DriveMode::AsObject => {
                let dist = (ctx.camera_position.clone() - self.frame.position()).magnitude();
                let t = ctx
                    .camera_orientation
                    .rotate(Vec3::new(0.0, 0.0, dist * dy / sh));
                self.translate_constrained(t);
            }
        }
    }

    fn apply_translate(&mut self, dx: f32, dy: f32, ctx: &ViewContext) {
        let sh = ctx.screen_height.max(1.0);
        let half_fov_tan = (ctx.fov / 2.0).tan();

        let (screen, depth) = match self.drive {
            DriveMode::AsCamera => {
                let z = self
                    .frame
                    .coordinates_of(ctx.revolve_point.clone())
                    .z
                    .abs();
                (Vec3::new(-dx, dy, 0.0), z)
            }
            DriveMode::AsObject => {
                let cam = ctx.camera_orientation.conjugate();
                let z = cam
                    .rotate(self.frame.position() - ctx.camera_position.clone())
                    .z
                    .abs();
                (Vec3::new(dx, -dy, 0.0), z)
            }
        };

        let scale = 2.0 * half_fov_tan * depth.max(1e-4) / sh;
        let t_cam = screen * (scale * self.translate_sensitivity);
        let t_world = match self.drive {
            DriveMode::AsCamera => self.frame.inverse_transform_of(t_cam),
            DriveMode::AsObject => ctx.camera_orientation.rotate(t_cam),
        };
        self.translate_constrained(t_world);
    }

    fn apply_screen_rotate(&mut self, x: f32, y: f32, ctx: &ViewContext) {
        let (pivot, pivot_screen) = match self.drive {
            DriveMode::AsCamera => {
                let p = ctx.revolve_point.clone();
                let s = ctx.project(p.clone());
                (p, s)
            }
            DriveMode::AsObject => {
                let p = self.frame.position();
                let s = ctx.project(p.clone());
                (p, s)
            }
        };

        let prev_angle = (self.prev_pos.1 - pivot_screen.1).atan2(self.prev_pos.0 - pivot_screen.0);
        let angle = (y - pivot_screen.1).atan2(x - pivot_screen.0);
        let view_axis = ctx.view_direction();

        let q = match self.drive {
            DriveMode::AsCamera => Quat::from_axis_angle(view_axis, angle - prev_angle),
            DriveMode::AsObject => Quat::from_axis_angle(view_axis, prev_angle - angle),
        };
        self.spin_rotation = q;
        self.rotate_world_constrained(q, pivot);
    }

    fn apply_screen_translate(&mut self, dx: f32, dy: f32, ctx: &ViewContext) {
        if self.fixed_dir_horizontal.is_none() && (dx.abs() + dy.abs()) > 1e-3 {
            self.fixed_dir_horizontal = Some(dx.abs() > dy.abs());
        }
        match self.fixed_dir_horizontal {
            Some(true) => self.apply_translate(dx, 0.0, ctx),
            Some(false) => self.apply_translate(0.0, dy, ctx),
            None => {}
        }
    }

    fn apply_roll(&mut self, dx: f32, ctx: &ViewContext) {
        let angle = std::f32::consts::PI * dx / ctx.screen_width.max(1.0);
        let axis = self.frame.z_axis();
        let q = Quat::from_axis_angle(axis, angle);
        self.spin_rotation = q;
        let position = self.frame.position();
        self.rotate_world_constrained(q, position);
    }

    fn apply_pitch_yaw(&mut self, dx: f32, dy: f32, ctx: &ViewContext) {
        let yaw = Quat::from_axis_angle(
            self.frame.y_axis(),
            -self.rotate_sensitivity * dx / ctx.screen_width.max(1.0),
        );
        let pitch = Quat::from_axis_angle(
            self.frame.x_axis(),
            -self.rotate_sensitivity * dy / ctx.screen_height.max(1.0),
        );
        let position = self.frame.position();
        self.rotate_world_constrained(yaw * pitch, position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ctx() -> ViewContext {
        ViewContext {
            screen_width: 800.0,
            screen_height: 600.0,
            camera_position: Vec3::new(0.0, 0.0, 10.0),
            camera_orientation: Quat::identity(),
            revolve_point: Vec3::new(0.0, 0.0, 0.0),
            fov: std::f32::consts::FRAC_PI_4,
            scene_radius: 1.0,
            fly_speed: 0.01,
        }
    }

    #[test]
    fn test_frame_translate_rotate() {
        let mut frame = Frame::new();
        frame.translate(Vec3::new(1.0, 0.0, 0.0));
        assert!((frame.position().x - 1.0).abs() < 1e-6);

        frame.rotate(Quat::from_axis_angle(
            Vec3::new(0.0, 0.0, 1.0),
            std::f32::consts::FRAC_PI_2,
        ));
        let x = frame.x_axis();
        assert!((x.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotate_around_point_keeps_distance() {
        let mut frame = Frame::new();
        frame.set_position(Vec3::new(2.0, 0.0, 0.0));
        let pivot = Vec3::new(1.0, 0.0, 0.0);
        frame.rotate_around_point(
            Quat::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), std::f32::consts::FRAC_PI_2),
            pivot.clone(),
        );
        let dist = (frame.position() - pivot).magnitude();
        assert!((dist - 1.0).abs() < 1e-5);
        assert!((frame.position().y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_project_on_line() {
        let mut frame = Frame::new();
        frame.set_position(Vec3::new(3.0, 4.0, 0.0));
        frame.project_on_line(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!((frame.position().x - 3.0).abs() < 1e-5);
        assert!(frame.position().y.abs() < 1e-5);
    }

    #[test]
    fn test_align_with_world_snaps_small_rotation() {
        let mut frame = Frame::new();
        frame.rotate(Quat::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), 0.1));
        frame.align_with_frame(None, 0.85);

        let x = frame.x_axis();
        assert!((x.x - 1.0).abs() < 1e-4);
        assert!(x.y.abs() < 1e-4);
    }

    #[test]
    fn test_constraint_forbidden_translation() {
        let mut mf = ManipulatedFrame::new();
        mf.set_constraint(Constraint {
            translation: AxisPlaneConstraint::Forbidden,
            rotation: AxisPlaneConstraint::Free,
        });
        let ctx = test_ctx();
        mf.start_action(MouseAction::Translate, true, DriveMode::AsObject);
        mf.mouse_press(100.0, 100.0);
        mf.mouse_move(150.0, 130.0, &ctx);
        let p = mf.frame().position();
        assert!(p.x.abs() < 1e-6 && p.y.abs() < 1e-6 && p.z.abs() < 1e-6);
    }

    #[test]
    fn test_constraint_axis_translation() {
        let mut mf = ManipulatedFrame::new();
        mf.frame_mut().set_position(Vec3::new(0.0, 0.0, 5.0));
        mf.set_constraint(Constraint {
            translation: AxisPlaneConstraint::Axis(Vec3::new(1.0, 0.0, 0.0)),
            rotation: AxisPlaneConstraint::Free,
        });
        let ctx = test_ctx();
        mf.start_action(MouseAction::Translate, true, DriveMode::AsObject);
        mf.mouse_press(100.0, 100.0);
        mf.mouse_move(150.0, 130.0, &ctx);
        let p = mf.frame().position();
        assert!(p.x.abs() > 1e-6, "motion along the allowed axis");
        assert!(p.y.abs() < 1e-6, "no motion off the axis");
    }

    #[test]
    fn test_object_translate_follows_mouse() {
        let mut mf = ManipulatedFrame::new();
        let ctx = test_ctx();
        mf.start_action(MouseAction::Translate, true, DriveMode::AsObject);
        mf.mouse_press(400.0, 300.0);
        mf.mouse_move(450.0, 300.0, &ctx);

        // Dragging right moves the object toward +x.
        assert!(mf.frame().position().x > 0.0);
        assert!(mf.frame().position().y.abs() < 1e-5);
    }

    #[test]
    fn test_camera_zoom_direction() {
        let mut mf = ManipulatedFrame::new();
        mf.frame_mut().set_position(Vec3::new(0.0, 0.0, 10.0));
        let ctx = test_ctx();

        mf.start_action(MouseAction::Zoom, true, DriveMode::AsCamera);
        mf.mouse_press(400.0, 300.0);
        // Dragging down moves the camera forward, closer to the pivot.
        mf.mouse_move(400.0, 350.0, &ctx);
        assert!(mf.frame().position().z < 10.0);
    }

    #[test]
    fn test_camera_rotate_preserves_pivot_distance() {
        let mut mf = ManipulatedFrame::new();
        mf.frame_mut().set_position(Vec3::new(0.0, 0.0, 10.0));
        let ctx = test_ctx();

        mf.start_action(MouseAction::Rotate, true, DriveMode::AsCamera);
        mf.mouse_press(400.0, 300.0);
        mf.mouse_move(440.0, 310.0, &ctx);

        let dist = (mf.frame().position() - ctx.revolve_point.clone()).magnitude();
        assert!((dist - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_release_reports_action_and_clears_state() {
        let mut mf = ManipulatedFrame::new();
        let ctx = test_ctx();
        mf.start_action(MouseAction::ZoomOnRegion, true, DriveMode::AsCamera);
        mf.mouse_press(100.0, 100.0);
        mf.mouse_move(300.0, 250.0, &ctx);

        assert!(mf.is_manipulated());
        assert_eq!(mf.press_position(), (100.0, 100.0));
        assert_eq!(mf.prev_position(), (300.0, 250.0));

        let ended = mf.mouse_release(300.0, 250.0, &ctx);
        assert_eq!(ended, MouseAction::ZoomOnRegion);
        assert!(!mf.is_manipulated());
    }

    #[test]
    fn test_fast_rotation_release_spins() {
        let mut mf = ManipulatedFrame::new();
        mf.frame_mut().set_position(Vec3::new(0.0, 0.0, 10.0));
        let ctx = test_ctx();

        mf.start_action(MouseAction::Rotate, true, DriveMode::AsCamera);
        mf.mouse_press(400.0, 300.0);
        mf.mouse_move(480.0, 340.0, &ctx);
        mf.mouse_release(480.0, 340.0, &ctx);

        assert!(mf.is_spinning());
        let before = mf.frame().position();
        assert!(mf.update_spin());
        let after = mf.frame().position();
        let moved = (after - before).magnitude();
        assert!(moved > 1e-5, "spin keeps revolving the camera");

        mf.stop_spinning();
        assert!(!mf.is_spinning());
    }

    #[test]
    fn test_wheel_zoom_ends_action() {
        let mut mf = ManipulatedFrame::new();
        mf.frame_mut().set_position(Vec3::new(0.0, 0.0, 10.0));
        let ctx = test_ctx();

        mf.start_action(MouseAction::Zoom, true, DriveMode::AsCamera);
        mf.wheel_event(1.0, &ctx);
        assert!(!mf.is_manipulated());
        assert!(mf.frame().position().z > 10.0, "wheel away backs off");
    }

    #[test]
    fn test_fly_update_moves_forward() {
        let mut mf = ManipulatedFrame::new();
        mf.frame_mut().set_position(Vec3::new(0.0, 0.0, 10.0));
        let ctx = test_ctx();

        mf.start_action(MouseAction::MoveForward, true, DriveMode::AsCamera);
        mf.mouse_press(400.0, 300.0);
        assert!(mf.update_fly(&ctx));
        assert!(mf.frame().position().z < 10.0);

        mf.mouse_release(400.0, 300.0, &ctx);
        assert!(!mf.update_fly(&ctx));
    }

    #[test]
    fn test_screen_translate_locks_dominant_direction() {
        let mut mf = ManipulatedFrame::new();
        let ctx = test_ctx();
        mf.start_action(MouseAction::ScreenTranslate, true, DriveMode::AsObject);
        mf.mouse_press(400.0, 300.0);
        mf.mouse_move(450.0, 310.0, &ctx); // mostly horizontal
        mf.mouse_move(450.0, 400.0, &ctx); // now vertical, but locked

        let p = mf.frame().position();
        assert!(p.x.abs() > 1e-6);
        assert!(p.y.abs() < 1e-6, "vertical motion filtered by the lock");
    }
}
