//! Pick results

use crate::brush::{BrushId, FaceId};
use crate::core::types::Vec3;

/// Non-owning handle to one face of one brush.
///
/// `brush_slot` is the position in the brush list the index was built from;
/// the ids guard against the list changing shape under a stale index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceRef {
    pub brush_slot: u32,
    pub brush: BrushId,
    pub face: FaceId,
}

/// A confirmed ray-face intersection
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickHit {
    pub brush: BrushId,
    pub face: FaceId,
    /// World-space intersection point
    pub position: Vec3,
    /// Ray parameter of the intersection
    pub distance: f32,
}
