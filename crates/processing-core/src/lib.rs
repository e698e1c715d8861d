//! CubeCap Processing Core
//!
//! Pure data processing shared by the capture engine:
//! - **Coords:** the one-way mapping from the source engine's axis
//!   convention into the destination engine's convention
//! - **Rotation:** minimal vector/quaternion math used to orient the six
//!   capture cameras
//! - **Pixels:** raw RGBA buffer operations (vertical flip, RGB conversion)

pub mod coords;
pub mod pixels;
pub mod rotation;

pub use coords::*;
pub use pixels::*;
pub use rotation::*;
