//! The six cube faces and their camera orientations.

use cubecap_processing_core::{map_direction, Quat, Vec3};
use cubecap_storage_index::FACE_NAMES;

/// One cube face: name, view direction, and up vector, in the source
/// engine's convention.
#[derive(Debug, Clone, Copy)]
pub struct FaceDescriptor {
    pub name: &'static str,
    pub direction: Vec3,
    pub up: Vec3,
}

impl FaceDescriptor {
    /// Top and Bottom need an extra half-turn to resolve the up-vector
    /// ambiguity at the poles.
    pub fn is_pole(&self) -> bool {
        self.name == "Top" || self.name == "Bottom"
    }
}

/// The canonical face set. All face iteration, file naming, and test
/// expectations rely on this fixed order.
pub const FACES: [FaceDescriptor; 6] = [
    FaceDescriptor {
        name: FACE_NAMES[0],
        direction: Vec3::new(-1.0, 0.0, 0.0),
        up: Vec3::new(0.0, -1.0, 0.0),
    },
    FaceDescriptor {
        name: FACE_NAMES[1],
        direction: Vec3::new(1.0, 0.0, 0.0),
        up: Vec3::new(0.0, -1.0, 0.0),
    },
    FaceDescriptor {
        name: FACE_NAMES[2],
        direction: Vec3::new(0.0, 1.0, 0.0),
        up: Vec3::new(0.0, 0.0, 1.0),
    },
    FaceDescriptor {
        name: FACE_NAMES[3],
        direction: Vec3::new(0.0, -1.0, 0.0),
        up: Vec3::new(0.0, 0.0, -1.0),
    },
    FaceDescriptor {
        name: FACE_NAMES[4],
        direction: Vec3::new(0.0, 0.0, 1.0),
        up: Vec3::new(0.0, -1.0, 0.0),
    },
    FaceDescriptor {
        name: FACE_NAMES[5],
        direction: Vec3::new(0.0, 0.0, -1.0),
        up: Vec3::new(0.0, -1.0, 0.0),
    },
];

/// Tilt applied to all six cameras after the per-face orientation, so the
/// capture lines up with the destination engine's horizon.
pub fn global_tilt() -> Quat {
    Quat::from_axis_angle(Vec3::X, -90.0)
}

/// Half-turn applied to exactly the pole faces.
pub fn pole_twist() -> Quat {
    Quat::from_axis_angle(Vec3::Y, 180.0)
}

/// Full camera orientation for a face: direction and up mapped into the
/// destination convention, look-rotation from the pair, the pole twist
/// where needed, then the shared global tilt.
pub fn camera_orientation(face: &FaceDescriptor) -> Quat {
    let direction = map_direction(face.direction);
    let up = map_direction(face.up);
    let mut rotation = Quat::look_rotation(direction, up);
    if face.is_pole() {
        rotation = rotation.mul(pole_twist());
    }
    global_tilt().mul(rotation)
}
