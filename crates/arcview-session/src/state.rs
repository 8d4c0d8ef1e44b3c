//! Persisted viewer state
//!
//! [`ViewerState`] is the snapshot written to and read from the state
//! file: display flags, colors, window geometry and the nested camera and
//! manipulated-frame states. The document keeps one named section per
//! concern (`State`, `Display`, `Geometry`, `Camera`, `ManipulatedFrame`)
//! under a versioned root; sections are read independently so a partial
//! document restores whatever it carries and defaults the rest.

use serde_json::{json, Map, Value};

use crate::doc;

/// Document version written to the root element.
pub const FORMAT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Camera interaction mode persisted with the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// Trackball observation around the revolve point.
    #[default]
    Revolve,
    /// Walkthrough / flying camera.
    Fly,
}

impl CameraMode {
    fn as_str(self) -> &'static str {
        match self {
            CameraMode::Revolve => "revolve",
            CameraMode::Fly => "fly",
        }
    }

    fn from_str(s: &str) -> Self {
        if s == "fly" {
            CameraMode::Fly
        } else {
            CameraMode::Revolve
        }
    }
}

/// Window geometry: either full screen (with the position to restore when
/// leaving full screen) or an explicit size and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    FullScreen { prev_pos: (i32, i32) },
    Windowed { width: u32, height: u32, pos: (i32, i32) },
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry::Windowed {
            width: 600,
            height: 400,
            pos: (0, 0),
        }
    }
}

/// Position and orientation of a frame.
///
/// The orientation is a unit quaternion stored as `[w, x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub position: [f32; 3],
    pub orientation: [f32; 4],
}

impl Default for FrameState {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            orientation: [1.0, 0.0, 0.0, 0.0],
        }
    }
}

impl FrameState {
    fn to_value(self) -> Value {
        json!({
            "position": {"x": self.position[0], "y": self.position[1], "z": self.position[2]},
            "orientation": {
                "q0": self.orientation[0],
                "q1": self.orientation[1],
                "q2": self.orientation[2],
                "q3": self.orientation[3],
            },
        })
    }

    fn from_value(e: &Value) -> Self {
        let default = Self::default();
        Self {
            position: doc::vec3_attr(e, "position", default.position),
            orientation: doc::quat_attr(e, "orientation", default.orientation),
        }
    }
}

/// One recorded keyframe of a camera path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyFrameState {
    pub time: f32,
    pub frame: FrameState,
}

/// Persisted camera state: pose, projection parameters and keyframe paths.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    pub frame: FrameState,
    /// Vertical field of view in radians.
    pub field_of_view: f32,
    pub scene_radius: f32,
    pub scene_center: [f32; 3],
    pub revolve_point: [f32; 3],
    pub fly_speed: f32,
    pub z_clipping_coefficient: f32,
    /// Keyframe paths by index, in index order.
    pub paths: Vec<(u32, Vec<KeyFrameState>)>,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            frame: FrameState::default(),
            field_of_view: std::f32::consts::FRAC_PI_4,
            scene_radius: 1.0,
            scene_center: [0.0; 3],
            revolve_point: [0.0; 3],
            fly_speed: 0.01,
            z_clipping_coefficient: 3.0_f32.sqrt(),
            paths: Vec::new(),
        }
    }
}

impl CameraState {
    fn to_value(&self) -> Value {
        let mut value = self.frame.to_value();
        let obj = value.as_object_mut().expect("frame state is an object");
        obj.insert("fieldOfView".into(), json!(self.field_of_view));
        obj.insert("sceneRadius".into(), json!(self.scene_radius));
        obj.insert(
            "sceneCenter".into(),
            json!({"x": self.scene_center[0], "y": self.scene_center[1], "z": self.scene_center[2]}),
        );
        obj.insert(
            "revolveAroundPoint".into(),
            json!({"x": self.revolve_point[0], "y": self.revolve_point[1], "z": self.revolve_point[2]}),
        );
        obj.insert("flySpeed".into(), json!(self.fly_speed));
        obj.insert("zClippingCoefficient".into(), json!(self.z_clipping_coefficient));

        let mut paths = Map::new();
        for (index, keyframes) in &self.paths {
            let frames: Vec<Value> = keyframes
                .iter()
                .map(|kf| {
                    let mut v = kf.frame.to_value();
                    v.as_object_mut()
                        .expect("frame state is an object")
                        .insert("time".into(), json!(kf.time));
                    v
                })
                .collect();
            paths.insert(index.to_string(), Value::Array(frames));
        }
        obj.insert("paths".into(), Value::Object(paths));

        value
    }

    fn from_value(e: &Value) -> Self {
        let default = Self::default();
        let mut state = Self {
            frame: FrameState::from_value(e),
            field_of_view: doc::f32_attr(e, "fieldOfView", default.field_of_view),
            scene_radius: doc::f32_attr(e, "sceneRadius", default.scene_radius),
            scene_center: doc::vec3_attr(e, "sceneCenter", default.scene_center),
            revolve_point: doc::vec3_attr(e, "revolveAroundPoint", default.revolve_point),
            fly_speed: doc::f32_attr(e, "flySpeed", default.fly_speed),
            z_clipping_coefficient: doc::f32_attr(
                e,
                "zClippingCoefficient",
                default.z_clipping_coefficient,
            ),
            paths: Vec::new(),
        };

        if let Some(paths) = doc::section(e, "paths") {
            let map = paths.as_object().expect("section is an object");
            for (key, frames) in map {
                let Ok(index) = key.parse::<u32>() else {
                    log::warn!("ignoring camera path with non-numeric index \"{key}\"");
                    continue;
                };
                let Some(frames) = frames.as_array() else {
                    log::warn!("ignoring malformed camera path {index}");
                    continue;
                };
                let keyframes = frames
                    .iter()
                    .map(|kf| KeyFrameState {
                        time: doc::f32_attr(kf, "time", 0.0),
                        frame: FrameState::from_value(kf),
                    })
                    .collect();
                state.paths.push((index, keyframes));
            }
            state.paths.sort_by_key(|(index, _)| *index);
        }

        state
    }
}

/// The complete persisted viewer snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    pub foreground_color: [u8; 3],
    pub background_color: [u8; 3],
    pub stereo: bool,
    pub camera_mode: CameraMode,
    pub axis_is_drawn: bool,
    pub grid_is_drawn: bool,
    pub fps_is_displayed: bool,
    pub camera_is_edited: bool,
    pub z_buffer_is_displayed: bool,
    pub geometry: Geometry,
    pub camera: CameraState,
    pub manipulated_frame: Option<FrameState>,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            foreground_color: [180, 180, 180],
            background_color: [51, 51, 51],
            stereo: false,
            camera_mode: CameraMode::Revolve,
            axis_is_drawn: false,
            grid_is_drawn: false,
            fps_is_displayed: false,
            camera_is_edited: false,
            z_buffer_is_displayed: false,
            geometry: Geometry::default(),
            camera: CameraState::default(),
            manipulated_frame: None,
        }
    }
}

impl ViewerState {
    /// Build the state document.
    pub fn to_document(&self) -> Value {
        let fg = self.foreground_color;
        let bg = self.background_color;
        let mut root = json!({
            "version": FORMAT_VERSION,
            "State": {
                "foregroundColor": {"red": fg[0], "green": fg[1], "blue": fg[2]},
                "backgroundColor": {"red": bg[0], "green": bg[1], "blue": bg[2]},
                "stereo": self.stereo,
                "cameraMode": self.camera_mode.as_str(),
            },
            "Display": {
                "axisIsDrawn": self.axis_is_drawn,
                "gridIsDrawn": self.grid_is_drawn,
                "FPSIsDisplayed": self.fps_is_displayed,
                "cameraIsEdited": self.camera_is_edited,
                "zBufferIsDisplayed": self.z_buffer_is_displayed,
            },
            "Camera": self.camera.to_value(),
        });
        let obj = root.as_object_mut().expect("document root is an object");

        let geometry = match self.geometry {
            Geometry::FullScreen { prev_pos } => json!({
                "fullScreen": true,
                "prevPosX": prev_pos.0,
                "prevPosY": prev_pos.1,
            }),
            Geometry::Windowed { width, height, pos } => json!({
                "fullScreen": false,
                "width": width,
                "height": height,
                "posX": pos.0,
                "posY": pos.1,
            }),
        };
        obj.insert("Geometry".into(), geometry);

        if let Some(frame) = self.manipulated_frame {
            obj.insert("ManipulatedFrame".into(), frame.to_value());
        }

        root
    }

    /// Restore a state from a document.
    ///
    /// Every section is optional; every attribute defaults with a warning.
    /// A version mismatch is logged but never blocks loading. Unknown
    /// sections are ignored.
    pub fn from_document(root: &Value) -> Self {
        let version = doc::str_attr(root, "version", FORMAT_VERSION);
        if version != FORMAT_VERSION {
            log::warn!(
                "state file created with version {version}, current version is {FORMAT_VERSION}"
            );
        }

        let mut state = Self::default();

        if let Some(e) = doc::section(root, "State") {
            state.foreground_color = doc::color_attr(e, "foregroundColor", state.foreground_color);
            state.background_color = doc::color_attr(e, "backgroundColor", state.background_color);
            state.stereo = doc::bool_attr(e, "stereo", false);
            state.camera_mode = CameraMode::from_str(&doc::str_attr(e, "cameraMode", "revolve"));
        }

        if let Some(e) = doc::section(root, "Display") {
            state.axis_is_drawn = doc::bool_attr(e, "axisIsDrawn", false);
            state.grid_is_drawn = doc::bool_attr(e, "gridIsDrawn", false);
            state.fps_is_displayed = doc::bool_attr(e, "FPSIsDisplayed", false);
            state.camera_is_edited = doc::bool_attr(e, "cameraIsEdited", false);
            state.z_buffer_is_displayed = doc::bool_attr(e, "zBufferIsDisplayed", false);
        }

        if let Some(e) = doc::section(root, "Geometry") {
            // Full screen implies maximal size: only the restore position
            // is meaningful, explicit width/height otherwise.
            if doc::bool_attr(e, "fullScreen", false) {
                state.geometry = Geometry::FullScreen {
                    prev_pos: (
                        doc::i64_attr(e, "prevPosX", 0) as i32,
                        doc::i64_attr(e, "prevPosY", 0) as i32,
                    ),
                };
            } else {
                state.geometry = Geometry::Windowed {
                    width: doc::i64_attr(e, "width", 600).max(1) as u32,
                    height: doc::i64_attr(e, "height", 400).max(1) as u32,
                    pos: (
                        doc::i64_attr(e, "posX", 0) as i32,
                        doc::i64_attr(e, "posY", 0) as i32,
                    ),
                };
            }
        }

        if let Some(e) = doc::section(root, "Camera") {
            state.camera = CameraState::from_value(e);
        }

        if let Some(e) = doc::section(root, "ManipulatedFrame") {
            state.manipulated_frame = Some(FrameState::from_value(e));
        }

        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(state: &ViewerState) -> ViewerState {
        ViewerState::from_document(&state.to_document())
    }

    #[test]
    fn test_roundtrip_default_state() {
        let state = ViewerState::default();
        assert_eq!(roundtrip(&state), state);
    }

    #[test]
    fn test_roundtrip_all_flags_set_fullscreen() {
        let state = ViewerState {
            stereo: true,
            camera_mode: CameraMode::Fly,
            axis_is_drawn: true,
            grid_is_drawn: true,
            fps_is_displayed: true,
            camera_is_edited: true,
            z_buffer_is_displayed: true,
            geometry: Geometry::FullScreen { prev_pos: (42, -7) },
            ..ViewerState::default()
        };
        assert_eq!(roundtrip(&state), state);
    }

    #[test]
    fn test_roundtrip_mixed_flags_explicit_geometry() {
        let state = ViewerState {
            axis_is_drawn: true,
            fps_is_displayed: true,
            geometry: Geometry::Windowed {
                width: 800,
                height: 600,
                pos: (10, 20),
            },
            foreground_color: [255, 0, 0],
            background_color: [0, 0, 0],
            ..ViewerState::default()
        };
        assert_eq!(roundtrip(&state), state);
    }

    #[test]
    fn test_roundtrip_camera_and_frame() {
        let state = ViewerState {
            camera: CameraState {
                frame: FrameState {
                    position: [1.0, 2.0, 3.0],
                    orientation: [0.5, 0.5, 0.5, 0.5],
                },
                field_of_view: 0.9,
                scene_radius: 12.5,
                scene_center: [1.0, 0.0, -1.0],
                revolve_point: [0.5, 0.5, 0.5],
                fly_speed: 0.125,
                z_clipping_coefficient: 5.0,
                paths: vec![(
                    3,
                    vec![
                        KeyFrameState {
                            time: 0.0,
                            frame: FrameState::default(),
                        },
                        KeyFrameState {
                            time: 1.0,
                            frame: FrameState {
                                position: [4.0, 5.0, 6.0],
                                orientation: [1.0, 0.0, 0.0, 0.0],
                            },
                        },
                    ],
                )],
            },
            manipulated_frame: Some(FrameState {
                position: [-1.0, -2.0, -3.0],
                orientation: [1.0, 0.0, 0.0, 0.0],
            }),
            ..ViewerState::default()
        };
        assert_eq!(roundtrip(&state), state);
    }

    #[test]
    fn test_missing_sections_leave_defaults() {
        let root = serde_json::json!({"version": FORMAT_VERSION});
        let state = ViewerState::from_document(&root);
        assert_eq!(state, ViewerState::default());
    }

    #[test]
    fn test_unknown_section_is_ignored() {
        let root = serde_json::json!({
            "version": FORMAT_VERSION,
            "Display": {"axisIsDrawn": true},
            "Light": {"state": "on"},
        });
        let state = ViewerState::from_document(&root);
        assert!(state.axis_is_drawn);
        assert!(!state.grid_is_drawn);
    }

    #[test]
    fn test_malformed_attributes_default() {
        let root = serde_json::json!({
            "Display": {"axisIsDrawn": "maybe", "gridIsDrawn": true},
            "Geometry": {"fullScreen": false, "width": "wide"},
        });
        let state = ViewerState::from_document(&root);
        assert!(!state.axis_is_drawn);
        assert!(state.grid_is_drawn);
        assert_eq!(
            state.geometry,
            Geometry::Windowed {
                width: 600,
                height: 400,
                pos: (0, 0)
            }
        );
    }

    #[test]
    fn test_version_mismatch_still_loads() {
        let root = serde_json::json!({
            "version": "0.0.1",
            "Display": {"axisIsDrawn": true},
        });
        let state = ViewerState::from_document(&root);
        assert!(state.axis_is_drawn);
    }
}
