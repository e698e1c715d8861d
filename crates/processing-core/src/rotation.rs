//! Minimal vector and quaternion math for camera orientation.
//!
//! Only what the capture engine needs: axis-angle construction,
//! look-rotation from a forward/up pair, composition, and applying a
//! rotation to a vector.

use serde::{Deserialize, Serialize};

/// A 3-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const X: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    pub const Y: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    pub const Z: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy. Zero-length input is returned unchanged.
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len <= f32::EPSILON {
            return self;
        }
        Vec3::new(self.x / len, self.y / len, self.z / len)
    }

    pub fn scaled(self, s: f32) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Component-wise comparison within `eps`.
    pub fn approx_eq(self, other: Vec3, eps: f32) -> bool {
        (self.x - other.x).abs() <= eps
            && (self.y - other.y).abs() <= eps
            && (self.z - other.z).abs() <= eps
    }
}

/// A unit quaternion rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Rotation of `angle_deg` degrees about `axis`.
    pub fn from_axis_angle(axis: Vec3, angle_deg: f32) -> Quat {
        let axis = axis.normalized();
        let half = angle_deg.to_radians() * 0.5;
        let (sin, cos) = half.sin_cos();
        Quat {
            x: axis.x * sin,
            y: axis.y * sin,
            z: axis.z * sin,
            w: cos,
        }
    }

    /// Rotation that maps `Vec3::Z` onto `forward`, keeping `up` in the
    /// forward/up plane.
    pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
        let f = forward.normalized();
        let mut r = up.cross(f);
        if r.length() <= f32::EPSILON {
            // Degenerate up: pick any axis orthogonal to forward.
            let fallback = if f.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
            r = fallback.cross(f);
        }
        let r = r.normalized();
        let u = f.cross(r);
        Quat::from_basis(r, u, f)
    }

    /// Quaternion from an orthonormal basis (images of X, Y, Z).
    fn from_basis(r: Vec3, u: Vec3, f: Vec3) -> Quat {
        let (m00, m01, m02) = (r.x, u.x, f.x);
        let (m10, m11, m12) = (r.y, u.y, f.y);
        let (m20, m21, m22) = (r.z, u.z, f.z);

        let trace = m00 + m11 + m22;
        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Quat {
                w: 0.25 * s,
                x: (m21 - m12) / s,
                y: (m02 - m20) / s,
                z: (m10 - m01) / s,
            }
        } else if m00 > m11 && m00 > m22 {
            let s = (1.0 + m00 - m11 - m22).sqrt() * 2.0;
            Quat {
                w: (m21 - m12) / s,
                x: 0.25 * s,
                y: (m01 + m10) / s,
                z: (m02 + m20) / s,
            }
        } else if m11 > m22 {
            let s = (1.0 + m11 - m00 - m22).sqrt() * 2.0;
            Quat {
                w: (m02 - m20) / s,
                x: (m01 + m10) / s,
                y: 0.25 * s,
                z: (m12 + m21) / s,
            }
        } else {
            let s = (1.0 + m22 - m00 - m11).sqrt() * 2.0;
            Quat {
                w: (m10 - m01) / s,
                x: (m02 + m20) / s,
                y: (m12 + m21) / s,
                z: 0.25 * s,
            }
        };
        q.normalized()
    }

    /// Hamilton product: applying `self.mul(other)` rotates by `other`
    /// first, then by `self`.
    pub fn mul(self, other: Quat) -> Quat {
        Quat {
            w: self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
            x: self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            y: self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            z: self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
        }
    }

    /// Inverse of a unit quaternion.
    pub fn conjugate(self) -> Quat {
        Quat {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    pub fn normalized(self) -> Quat {
        let len = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if len <= f32::EPSILON {
            return Quat::IDENTITY;
        }
        Quat {
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
            w: self.w / len,
        }
    }

    /// Apply this rotation to a vector.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let qv = Vec3::new(self.x, self.y, self.z);
        let t = qv.cross(v).scaled(2.0);
        v.add(t.scaled(self.w)).add(qv.cross(t))
    }

    /// Absolute angle of rotation between two orientations, in degrees.
    pub fn angle_to(self, other: Quat) -> f32 {
        let dot = (self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w)
            .abs()
            .min(1.0);
        2.0 * dot.acos().to_degrees()
    }

    /// Whether two quaternions represent the same rotation (q and -q are
    /// the same orientation).
    pub fn approx_eq(self, other: Quat, eps_deg: f32) -> bool {
        self.angle_to(other) <= eps_deg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn identity_rotation_is_a_no_op() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert!(Quat::IDENTITY.rotate(v).approx_eq(v, EPS));
    }

    #[test]
    fn axis_angle_quarter_turn() {
        let q = Quat::from_axis_angle(Vec3::Y, 90.0);
        // Rotating +Z by 90 degrees about +Y yields +X.
        assert!(q.rotate(Vec3::Z).approx_eq(Vec3::X, EPS));
    }

    #[test]
    fn look_rotation_maps_forward_axis() {
        let forward = Vec3::new(0.0, 0.0, -1.0);
        let q = Quat::look_rotation(forward, Vec3::Y);
        assert!(q.rotate(Vec3::Z).approx_eq(forward, EPS));
    }

    #[test]
    fn look_rotation_handles_colinear_up() {
        let q = Quat::look_rotation(Vec3::Y, Vec3::Y);
        assert!(q.rotate(Vec3::Z).approx_eq(Vec3::Y, EPS));
    }

    #[test]
    fn half_turn_composition_cancels() {
        let half = Quat::from_axis_angle(Vec3::Y, 180.0);
        let full = half.mul(half);
        assert!(full.approx_eq(Quat::IDENTITY, 1e-2));
    }

    #[test]
    fn conjugate_inverts_rotation() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0), 73.0);
        let v = Vec3::new(0.2, -0.7, 1.3);
        let round_trip = q.conjugate().rotate(q.rotate(v));
        assert!(round_trip.approx_eq(v, EPS));
    }

    #[test]
    fn angle_between_distinct_orientations() {
        let a = Quat::IDENTITY;
        let b = Quat::from_axis_angle(Vec3::X, 180.0);
        assert!((a.angle_to(b) - 180.0).abs() < 1e-2);
    }
}
