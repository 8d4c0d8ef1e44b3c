//! Quaternion math for frame orientations
//!
//! Provides the unit quaternion type used by frames and keyframe
//! interpolation: axis-angle construction, composition, vector rotation,
//! shortest-arc construction and SLERP.

use lin_alg::f32::{Mat4, Vec3};

/// A unit quaternion representing a rotation.
///
/// Stored as (w, x, y, z) where w is the scalar part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quat {
    /// Create a new quaternion
    pub fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// Identity quaternion (no rotation)
    pub fn identity() -> Self {
        Self {
            w: 1.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotation of `angle` radians around `axis`.
    ///
    /// A zero axis yields the identity.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let norm = axis.magnitude();
        if norm < 1e-8 {
            return Self::identity();
        }
        let half = angle * 0.5;
        let s = half.sin() / norm;
        Self {
            w: half.cos(),
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
        }
    }

    /// Shortest-arc rotation mapping `from` onto `to`.
    pub fn rotation_arc(from: Vec3, to: Vec3) -> Self {
        let from_norm = from.magnitude();
        let to_norm = to.magnitude();
        if from_norm < 1e-8 || to_norm < 1e-8 {
            return Self::identity();
        }
        let f = from * (1.0 / from_norm);
        let t = to * (1.0 / to_norm);
        let cos = f.dot(t).clamp(-1.0, 1.0);

        if cos < -0.999_999 {
            // Opposite vectors: rotate half a turn around any orthogonal.
            let mut ortho = f.cross(Vec3::new(1.0, 0.0, 0.0));
            if ortho.magnitude() < 1e-6 {
                ortho = f.cross(Vec3::new(0.0, 1.0, 0.0));
            }
            return Self::from_axis_angle(ortho, std::f32::consts::PI);
        }

        let axis = f.cross(t);
        Self::from_axis_angle(axis, cos.acos())
    }

    /// The rotation angle in [0, 2π).
    pub fn angle(&self) -> f32 {
        2.0 * self.w.clamp(-1.0, 1.0).acos()
    }

    /// The (not normalized) rotation axis; near-zero for the identity.
    pub fn axis(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Quaternion norm.
    pub fn norm(&self) -> f32 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Renormalized copy; identity when degenerate.
    pub fn normalized(&self) -> Self {
        let n = self.norm();
        if n < 1e-8 {
            return Self::identity();
        }
        Self {
            w: self.w / n,
            x: self.x / n,
            y: self.y / n,
            z: self.z / n,
        }
    }

    /// The inverse rotation (conjugate, assuming unit norm).
    pub fn conjugate(&self) -> Self {
        Self {
            w: self.w,
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    /// Quaternion dot product.
    pub fn dot(&self, other: &Quat) -> f32 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Rotate a vector by this quaternion.
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        // v' = v + 2*q_xyz × (q_xyz × v + w*v)
        let q = Vec3::new(self.x, self.y, self.z);
        let t = q.cross(v.clone()) * 2.0;
        let rotated = v + t.clone() * self.w + q.cross(t);
        rotated
    }

    /// Spherical linear interpolation from `self` to `other`.
    ///
    /// Takes the shortest path; falls back to normalized linear
    /// interpolation for nearly-parallel quaternions.
    pub fn slerp(&self, other: &Quat, t: f32) -> Self {
        let mut cos = self.dot(other);
        let mut end = *other;
        if cos < 0.0 {
            cos = -cos;
            end = Quat::new(-other.w, -other.x, -other.y, -other.z);
        }

        if cos > 0.9995 {
            return Quat::new(
                self.w + (end.w - self.w) * t,
                self.x + (end.x - self.x) * t,
                self.y + (end.y - self.y) * t,
                self.z + (end.z - self.z) * t,
            )
            .normalized();
        }

        let theta = cos.clamp(-1.0, 1.0).acos();
        let sin_theta = theta.sin();
        let a = ((1.0 - t) * theta).sin() / sin_theta;
        let b = (t * theta).sin() / sin_theta;
        Quat::new(
            a * self.w + b * end.w,
            a * self.x + b * end.x,
            a * self.y + b * end.y,
            a * self.z + b * end.z,
        )
        .normalized()
    }

    /// Convert this quaternion to a 4x4 rotation matrix (column-major).
    pub fn to_mat4(&self) -> Mat4 {
        let Quat { w, x, y, z } = *self;

        let x2 = x + x;
        let y2 = y + y;
        let z2 = z + z;
        let xx = x * x2;
        let xy = x * y2;
        let xz = x * z2;
        let yy = y * y2;
        let yz = y * z2;
        let zz = z * z2;
        let wx = w * x2;
        let wy = w * y2;
        let wz = w * z2;

        let mut m = Mat4::new_identity();
        m.data[0] = 1.0 - (yy + zz);
        m.data[1] = xy + wz;
        m.data[2] = xz - wy;

        m.data[4] = xy - wz;
        m.data[5] = 1.0 - (xx + zz);
        m.data[6] = yz + wx;

        m.data[8] = xz + wy;
        m.data[9] = yz - wx;
        m.data[10] = 1.0 - (xx + yy);
        m
    }
}

impl std::ops::Mul for Quat {
    type Output = Quat;

    fn mul(self, rhs: Quat) -> Quat {
        Quat {
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        }
    }
}
