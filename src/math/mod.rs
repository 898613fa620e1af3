//! Mathematical utilities and data structures

pub mod plane;
pub mod aabb;
pub mod ray;
pub mod morton;
pub mod frustum;

pub use plane::{Plane, PointSide, EPSILON};
pub use aabb::Aabb;
pub use ray::Ray;
pub use morton::MortonCoder;
pub use frustum::Frustum;

use crate::core::types::Vec3;

/// Half-extent of the editable world along each axis
pub const WORLD_EXTENT: f32 = 4096.0;

/// Fixed world bounds.
///
/// The Morton coder quantizes against this box, and a brush whose clipped
/// faces still reach outside it is treated as unbounded.
pub const WORLD_BOUNDS: Aabb = Aabb {
    min: Vec3::new(-WORLD_EXTENT, -WORLD_EXTENT, -WORLD_EXTENT),
    max: Vec3::new(WORLD_EXTENT, WORLD_EXTENT, WORLD_EXTENT),
};
