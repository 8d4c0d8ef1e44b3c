//! Interactive camera
//!
//! [`Camera`] owns a camera-driven [`ManipulatedFrame`], the projection
//! parameters, the revolve point and the indexed keyframe paths. It knows
//! nothing about events: the viewer starts actions on its frame and calls
//! [`Camera::update`] from the animation tick to advance spinning, flying
//! and path playback.

use ahash::AHashMap;
use lin_alg::f32::{Mat4, Vec3};

use crate::frame::{DriveMode, Frame, FramePose, ManipulatedFrame, ViewContext};
use crate::keyframes::KeyFrameInterpolator;
use crate::quat::Quat;

/// Duration of the zoom-on-pixel / zoom-to-fit transitions, in seconds.
const INTERPOLATION_DURATION: f32 = 0.5;

/// The viewer's camera.
#[derive(Debug)]
pub struct Camera {
    frame: ManipulatedFrame,

    screen_width: u32,
    screen_height: u32,
    /// Vertical field of view in radians.
    fov: f32,

    scene_center: Vec3,
    scene_radius: f32,
    revolve_point: Vec3,
    fly_speed: f32,

    z_near_coefficient: f32,
    z_clipping_coefficient: f32,

    /// Physical inter-eye distance factor for stereo projections,
    /// relative to the scene radius.
    stereo_eye_separation: f32,

    paths: AHashMap<u32, KeyFrameInterpolator>,
    /// Transition interpolator for zoom-on-pixel / zoom-to-fit.
    transition: KeyFrameInterpolator,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// A camera observing a unit scene at the origin.
    pub fn new() -> Self {
        let mut camera = Self {
            frame: ManipulatedFrame::new(),
            screen_width: 600,
            screen_height: 400,
            fov: std::f32::consts::FRAC_PI_4,
            scene_center: Vec3::new(0.0, 0.0, 0.0),
            scene_radius: 1.0,
            revolve_point: Vec3::new(0.0, 0.0, 0.0),
            fly_speed: 0.01,
            z_near_coefficient: 0.005,
            z_clipping_coefficient: 3.0_f32.sqrt(),
            stereo_eye_separation: 0.01,
            paths: AHashMap::new(),
            transition: KeyFrameInterpolator::new(),
        };
        camera.show_entire_scene();
        camera
    }

    // =========================================================================
    // Frame and pose
    // =========================================================================

    pub fn frame(&self) -> &ManipulatedFrame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut ManipulatedFrame {
        &mut self.frame
    }

    pub fn position(&self) -> Vec3 {
        self.frame.frame().position()
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.frame.frame_mut().set_position(position);
    }

    pub fn orientation(&self) -> Quat {
        self.frame.frame().orientation()
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.frame.frame_mut().set_orientation(orientation);
    }

    pub fn pose(&self) -> FramePose {
        self.frame.frame().pose()
    }

    pub fn set_pose(&mut self, pose: &FramePose) {
        self.frame.frame_mut().set_pose(pose);
    }

    /// The camera looks down its local -z.
    pub fn view_direction(&self) -> Vec3 {
        self.frame.frame().inverse_transform_of(Vec3::new(0.0, 0.0, -1.0))
    }

    pub fn up_vector(&self) -> Vec3 {
        self.frame.frame().y_axis()
    }

    pub fn right_vector(&self) -> Vec3 {
        self.frame.frame().x_axis()
    }

    /// Whether a drag action is being performed on the camera frame.
    pub fn is_manipulated(&self) -> bool {
        self.frame.is_manipulated()
    }

    // =========================================================================
    // Screen and projection
    // =========================================================================

    pub fn set_screen_width_and_height(&mut self, width: u32, height: u32) {
        self.screen_width = width.max(1);
        self.screen_height = height.max(1);
    }

    pub fn screen_width(&self) -> u32 {
        self.screen_width
    }

    pub fn screen_height(&self) -> u32 {
        self.screen_height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.screen_width as f32 / self.screen_height as f32
    }

    /// Vertical field of view in radians.
    pub fn field_of_view(&self) -> f32 {
        self.fov
    }

    pub fn set_field_of_view(&mut self, fov: f32) {
        self.fov = fov.clamp(0.01, std::f32::consts::PI - 0.01);
    }

    /// Distance to the near clipping plane.
    ///
    /// Derived from the distance to the scene so the whole sphere stays
    /// visible; floored at a fraction of the scene radius to keep depth
    /// precision.
    pub fn z_near(&self) -> f32 {
        let dist = (self.position() - self.scene_center.clone()).magnitude();
        let z_near = dist - self.z_clipping_coefficient * self.scene_radius;
        let floor = self.z_near_coefficient * self.z_clipping_coefficient * self.scene_radius;
        z_near.max(floor)
    }

    /// Distance to the far clipping plane.
    pub fn z_far(&self) -> f32 {
        let dist = (self.position() - self.scene_center.clone()).magnitude();
        dist + self.z_clipping_coefficient * self.scene_radius
    }

    pub fn z_clipping_coefficient(&self) -> f32 {
        self.z_clipping_coefficient
    }

    /// Override the clipping coefficient (camera-path edit mode widens it
    /// so the paths are not clipped away).
    pub fn set_z_clipping_coefficient(&mut self, coefficient: f32) {
        self.z_clipping_coefficient = coefficient;
    }

    /// World-to-camera matrix.
    pub fn view_matrix(&self) -> Mat4 {
        let rotation = self.orientation().conjugate().to_mat4();
        let translation = Mat4::new_translation(-self.position());
        rotation * translation
    }

    /// Stereo view matrix: the eye is shifted half the eye separation
    /// along the right vector.
    pub fn view_matrix_stereo(&self, left_eye: bool) -> Mat4 {
        let shift = self.stereo_eye_separation * self.scene_radius / 2.0;
        let sign = if left_eye { -1.0 } else { 1.0 };
        let eye = self.position() + self.right_vector() * (sign * shift);
        let rotation = self.orientation().conjugate().to_mat4();
        let translation = Mat4::new_translation(-eye);
        rotation * translation
    }

    /// Perspective projection matrix for the current screen and clipping.
    pub fn projection_matrix(&self) -> Mat4 {
        let f = 1.0 / (self.fov / 2.0).tan();
        let aspect = self.aspect_ratio();
        let z_near = self.z_near();
        let z_far = self.z_far();

        let mut m = Mat4::new_identity();
        m.data[0] = f / aspect;
        m.data[5] = f;
        m.data[10] = (z_near + z_far) / (z_near - z_far);
        m.data[11] = -1.0;
        m.data[14] = 2.0 * z_near * z_far / (z_near - z_far);
        m.data[15] = 0.0;
        m
    }

    pub fn stereo_eye_separation(&self) -> f32 {
        self.stereo_eye_separation
    }

    pub fn set_stereo_eye_separation(&mut self, separation: f32) {
        self.stereo_eye_separation = separation.max(0.0);
    }

    /// Project a world point to pixel coordinates (origin upper left).
    pub fn projected_coordinates_of(&self, point: Vec3) -> (f32, f32) {
        self.view_context().project(point)
    }

    /// Snapshot of the camera data frames need to interpret motion.
    pub fn view_context(&self) -> ViewContext {
        ViewContext {
            screen_width: self.screen_width as f32,
            screen_height: self.screen_height as f32,
            camera_position: self.position(),
            camera_orientation: self.orientation(),
            revolve_point: self.revolve_point.clone(),
            fov: self.fov,
            scene_radius: self.scene_radius,
            fly_speed: self.fly_speed,
        }
    }

    // =========================================================================
    // Scene
    // =========================================================================

    pub fn scene_center(&self) -> Vec3 {
        self.scene_center.clone()
    }

    pub fn set_scene_center(&mut self, center: Vec3) {
        self.scene_center = center;
    }

    pub fn scene_radius(&self) -> f32 {
        self.scene_radius
    }

    /// Set the scene radius; the fly speed follows at 1% of it.
    pub fn set_scene_radius(&mut self, radius: f32) {
        if radius <= 0.0 {
            log::warn!("scene radius must be positive, ignoring {radius}");
            return;
        }
        self.scene_radius = radius;
        self.fly_speed = 0.01 * radius;
    }

    pub fn revolve_around_point(&self) -> Vec3 {
        self.revolve_point.clone()
    }

    pub fn set_revolve_around_point(&mut self, point: Vec3) {
        self.revolve_point = point;
    }

    /// Set the revolve point from the point under a pixel, when the
    /// application found one. Returns whether the point changed.
    pub fn set_revolve_around_point_from_pixel(&mut self, point: Option<Vec3>) -> bool {
        match point {
            Some(point) => {
                self.revolve_point = point;
                true
            }
            None => false,
        }
    }

    pub fn fly_speed(&self) -> f32 {
        self.fly_speed
    }

    pub fn set_fly_speed(&mut self, speed: f32) {
        self.fly_speed = speed;
    }

    /// Move back so the sphere (center, radius) entirely fits the view.
    pub fn fit_sphere(&mut self, center: Vec3, radius: f32) {
        let distance = radius / (self.fov / 2.0).sin();
        let direction = self.view_direction();
        self.frame
            .frame_mut()
            .set_position(center - direction * distance);
    }

    /// Fit the whole scene sphere in the view.
    pub fn show_entire_scene(&mut self) {
        let center = self.scene_center.clone();
        self.fit_sphere(center, self.scene_radius);
    }

    /// Translate so the scene center projects to the view center, without
    /// changing the orientation or the distance.
    pub fn center_scene(&mut self) {
        let offset = self.frame.frame().coordinates_of(self.scene_center.clone());
        let correction = self
            .frame
            .frame()
            .inverse_transform_of(Vec3::new(offset.x, offset.y, 0.0));
        self.frame.frame_mut().translate(correction);
    }

    /// Move closer so the screen rectangle (in pixels) roughly fills the
    /// view. The rectangle center is brought to the view center first.
    pub fn fit_screen_region(&mut self, corner_a: (f32, f32), corner_b: (f32, f32)) {
        let sw = self.screen_width as f32;
        let sh = self.screen_height as f32;
        let w = (corner_a.0 - corner_b.0).abs();
        let h = (corner_a.1 - corner_b.1).abs();
        if w < 1.0 || h < 1.0 {
            return;
        }

        let center = ((corner_a.0 + corner_b.0) / 2.0, (corner_a.1 + corner_b.1) / 2.0);
        let depth = self
            .frame
            .frame()
            .coordinates_of(self.revolve_point.clone())
            .z
            .abs()
            .max(1e-4);

        // Lateral shift bringing the region center onto the view axis.
        let half_fov_tan = (self.fov / 2.0).tan();
        let dx = (center.0 - sw / 2.0) / sh * 2.0 * half_fov_tan * depth;
        let dy = (sh / 2.0 - center.1) / sh * 2.0 * half_fov_tan * depth;
        let shift = self
            .frame
            .frame()
            .inverse_transform_of(Vec3::new(dx, dy, 0.0));
        self.frame.frame_mut().translate(shift);

        // Pull forward by the region/screen ratio.
        let ratio = (w / sw).max(h / sh).min(1.0);
        let forward = self.view_direction() * (depth * (1.0 - ratio));
        self.frame.frame_mut().translate(forward);
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    fn interpolate_to(&mut self, target: FramePose) {
        self.transition = KeyFrameInterpolator::new();
        self.transition.add_keyframe_at(self.pose(), 0.0);
        self.transition.add_keyframe_at(target, INTERPOLATION_DURATION);
        self.transition.start_interpolation();
    }

    /// Smoothly move the camera toward the point under a pixel.
    ///
    /// The point becomes the revolve point and the camera covers 60% of
    /// the distance. Without a point (nothing under the pixel), the
    /// transition is skipped.
    pub fn interpolate_to_zoom_on_pixel(&mut self, point: Option<Vec3>) -> bool {
        let Some(point) = point else {
            return false;
        };
        self.revolve_point = point.clone();
        let target = FramePose {
            position: point.clone() + (self.position() - point) * 0.4,
            orientation: self.orientation(),
        };
        self.interpolate_to(target);
        true
    }

    /// Smoothly move the camera to the entire-scene view.
    pub fn interpolate_to_fit_scene(&mut self) {
        let distance = self.scene_radius / (self.fov / 2.0).sin();
        let target = FramePose {
            position: self.scene_center.clone() - self.view_direction() * distance,
            orientation: self.orientation(),
        };
        self.interpolate_to(target);
    }

    /// Whether a zoom transition is in flight.
    pub fn is_interpolating(&self) -> bool {
        self.transition.interpolation_started()
    }

    // =========================================================================
    // Keyframe paths
    // =========================================================================

    /// The interpolator of path `index`, if it exists.
    pub fn keyframe_interpolator(&self, index: u32) -> Option<&KeyFrameInterpolator> {
        self.paths.get(&index)
    }

    pub fn keyframe_interpolator_mut(&mut self, index: u32) -> Option<&mut KeyFrameInterpolator> {
        self.paths.get_mut(&index)
    }

    /// Indices of the existing paths, unordered.
    pub fn path_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.paths.keys().copied()
    }

    /// Install a whole path, replacing any existing one (state restore).
    pub fn insert_path(&mut self, index: u32, path: KeyFrameInterpolator) {
        self.paths.insert(index, path);
    }

    /// Remove every path (state restore starts from a clean slate).
    pub fn clear_paths(&mut self) {
        self.paths.clear();
    }

    /// Append the current camera pose to path `index`, creating the path
    /// on first use.
    pub fn add_keyframe_to_path(&mut self, index: u32) {
        let pose = self.pose();
        self.paths
            .entry(index)
            .or_insert_with(KeyFrameInterpolator::new)
            .add_keyframe(pose);
    }

    /// Start playing path `index`. Does nothing for an unknown path.
    pub fn play_path(&mut self, index: u32) {
        if let Some(path) = self.paths.get_mut(&index) {
            path.start_interpolation();
        }
    }

    /// Rewind path `index`. Does nothing for an unknown path.
    pub fn reset_path(&mut self, index: u32) {
        if let Some(path) = self.paths.get_mut(&index) {
            path.reset_interpolation();
        }
    }

    /// Delete path `index`, returning whether it existed.
    pub fn delete_path(&mut self, index: u32) -> bool {
        self.paths.remove(&index).is_some()
    }

    /// Stop any playing path other than `index`.
    pub fn stop_other_paths(&mut self, index: u32) {
        for (i, path) in self.paths.iter_mut() {
            if *i != index && path.interpolation_started() {
                path.reset_interpolation();
            }
        }
    }

    /// Whether any path is currently playing.
    pub fn any_path_playing(&self) -> bool {
        self.paths.values().any(|p| p.interpolation_started())
    }

    // =========================================================================
    // Animation
    // =========================================================================

    /// Advance transitions, path playback, spinning and flying by `dt`
    /// seconds. Returns true when the camera moved.
    pub fn update(&mut self, dt: f32) -> bool {
        let mut moved = false;

        if let Some(pose) = self.transition.update(dt) {
            self.set_pose(&pose);
            moved = true;
        }

        let mut playing_pose = None;
        for path in self.paths.values_mut() {
            if let Some(pose) = path.update(dt) {
                playing_pose = Some(pose);
            }
        }
        if let Some(pose) = playing_pose {
            self.set_pose(&pose);
            moved = true;
        }

        if self.frame.is_spinning() {
            moved |= self.frame.update_spin();
        }

        let ctx = self.view_context();
        moved |= self.frame.update_fly(&ctx);

        moved
    }

    /// Start a camera drag action (camera drive).
    pub fn start_action(&mut self, action: arcview_input::MouseAction, with_constraint: bool) {
        self.frame.start_action(action, with_constraint, DriveMode::AsCamera);
    }

    /// Align the camera axes with the nearest world axes.
    pub fn align_with_world(&mut self) {
        self.frame.frame_mut().align_with_frame(None, 0.85);
    }

    /// Reference to the underlying plain frame (for alignment of other
    /// frames against the camera).
    pub fn reference_frame(&self) -> &Frame {
        self.frame.frame()
    }
}
