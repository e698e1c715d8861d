//! Axis-convention bridge between the source and destination engines.
//!
//! Source convention: Y-up, Z-forward, left-handed.
//! Destination convention: Z-up, Y-forward, right-handed.
//!
//! This is a one-way bridge. Round-trip identity is only documented for
//! direction vectors; do not assume the Euler mapping is invertible.

use crate::rotation::Vec3;

/// Map a direction vector from the source convention to the destination
/// convention: `(x, y, z) -> (x, z, -y)`.
pub const fn map_direction(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, -v.y)
}

/// Map a rotation's Euler-angle decomposition (degrees) across the same
/// axis remap: `(rx, ry, rz) -> (rx, rz, -ry)`.
pub const fn map_euler_deg(euler: [f32; 3]) -> [f32; 3] {
    [euler[0], euler[2], -euler[1]]
}
