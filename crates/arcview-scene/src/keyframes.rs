//! Keyframe interpolation for camera paths
//!
//! A [`KeyFrameInterpolator`] stores an ordered sequence of timed frame
//! poses and replays them: position interpolates linearly, orientation by
//! SLERP. Playback is driven by the viewer's animation tick through
//! [`KeyFrameInterpolator::update`].

use crate::frame::FramePose;

/// One recorded pose on a path.
#[derive(Debug, Clone)]
pub struct KeyFrame {
    pub pose: FramePose,
    /// Time of this keyframe on the path, in seconds.
    pub time: f32,
}

/// Interval between two appended keyframes, in seconds.
const KEYFRAME_INTERVAL: f32 = 1.0;

/// An indexed camera path: recorded poses plus playback state.
#[derive(Debug, Clone, Default)]
pub struct KeyFrameInterpolator {
    keyframes: Vec<KeyFrame>,
    interpolation_time: f32,
    interpolation_speed: f32,
    started: bool,
}

impl KeyFrameInterpolator {
    pub fn new() -> Self {
        Self {
            keyframes: Vec::new(),
            interpolation_time: 0.0,
            interpolation_speed: 1.0,
            started: false,
        }
    }

    /// Number of recorded keyframes.
    pub fn number_of_keyframes(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// The keyframe at `index`, if any.
    pub fn keyframe(&self, index: usize) -> Option<&KeyFrame> {
        self.keyframes.get(index)
    }

    /// Iterate the recorded keyframes in time order.
    pub fn keyframes(&self) -> impl Iterator<Item = &KeyFrame> {
        self.keyframes.iter()
    }

    /// Append a pose one interval after the last keyframe.
    pub fn add_keyframe(&mut self, pose: FramePose) {
        let time = self
            .keyframes
            .last()
            .map_or(0.0, |kf| kf.time + KEYFRAME_INTERVAL);
        self.add_keyframe_at(pose, time);
    }

    /// Append a pose at an explicit time.
    ///
    /// A time that does not increase is pushed one interval after the
    /// last keyframe instead, with a warning.
    pub fn add_keyframe_at(&mut self, pose: FramePose, time: f32) {
        let time = match self.keyframes.last() {
            Some(last) if time <= last.time && !self.keyframes.is_empty() => {
                log::warn!(
                    "keyframe time {time} does not increase; appending at {}",
                    last.time + KEYFRAME_INTERVAL
                );
                last.time + KEYFRAME_INTERVAL
            }
            _ => time,
        };
        self.keyframes.push(KeyFrame { pose, time });
    }

    /// Total duration of the path in seconds (0 for 0 or 1 keyframes).
    pub fn duration(&self) -> f32 {
        match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    pub fn first_time(&self) -> f32 {
        self.keyframes.first().map_or(0.0, |kf| kf.time)
    }

    /// Playback speed multiplier (1.0 = recorded speed).
    pub fn set_interpolation_speed(&mut self, speed: f32) {
        self.interpolation_speed = speed;
    }

    pub fn interpolation_time(&self) -> f32 {
        self.interpolation_time
    }

    pub fn interpolation_started(&self) -> bool {
        self.started
    }

    /// Start playback from the current interpolation time.
    ///
    /// Does nothing on an empty path. Playback past the end restarts from
    /// the beginning.
    pub fn start_interpolation(&mut self) {
        if self.keyframes.is_empty() {
            return;
        }
        if self.interpolation_time >= self.first_time() + self.duration() {
            self.interpolation_time = self.first_time();
        }
        self.started = true;
    }

    /// Pause playback, keeping the current time.
    pub fn stop_interpolation(&mut self) {
        self.started = false;
    }

    /// Stop playback and rewind to the first keyframe.
    pub fn reset_interpolation(&mut self) {
        self.started = false;
        self.interpolation_time = self.first_time();
    }

    /// Advance playback by `dt` seconds.
    ///
    /// Returns the pose to apply, or `None` when not playing. Reaching the
    /// end yields the final pose and stops playback.
    pub fn update(&mut self, dt: f32) -> Option<FramePose> {
        if !self.started {
            return None;
        }
        self.interpolation_time += dt * self.interpolation_speed;

        let end = self.first_time() + self.duration();
        if self.interpolation_time >= end {
            self.interpolation_time = end;
            self.started = false;
        }
        Some(self.pose_at(self.interpolation_time))
    }

    /// The interpolated pose at time `t`, clamped to the path extent.
    pub fn pose_at(&self, t: f32) -> FramePose {
        match self.keyframes.len() {
            0 => FramePose::default(),
            1 => self.keyframes[0].pose.clone(),
            _ => {
                let first = &self.keyframes[0];
                let last = &self.keyframes[self.keyframes.len() - 1];
                if t <= first.time {
                    return first.pose.clone();
                }
                if t >= last.time {
                    return last.pose.clone();
                }

                let after = self
                    .keyframes
                    .iter()
                    .position(|kf| kf.time > t)
                    .unwrap_or(self.keyframes.len() - 1);
                let a = &self.keyframes[after - 1];
                let b = &self.keyframes[after];
                let span = (b.time - a.time).max(1e-6);
                let alpha = (t - a.time) / span;

                FramePose {
                    position: a.pose.position.clone()
                        + (b.pose.position.clone() - a.pose.position.clone()) * alpha,
                    orientation: a.pose.orientation.slerp(&b.pose.orientation, alpha),
                }
            }
        }
    }
}
