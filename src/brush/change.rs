//! Change notification for the document/undo layer
//!
//! Mutations never notify through callbacks; they append events to a queue
//! the document layer drains after each edit, and bump the brush's geometry
//! version so dependents can detect staleness on read.

use super::{BrushId, FaceId};

/// What an edit changed.
///
/// Geometry events require re-derivation of polygons, bounds and the pick
/// index; flags events only touch texture metadata and are cheap to apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeEvent {
    /// Defining points changed; `face` is `None` for whole-brush edits such
    /// as translation or face addition/removal
    Geometry {
        brush: BrushId,
        face: Option<FaceId>,
    },
    /// Texture name, offsets, rotation or scale changed
    Flags { brush: BrushId, face: FaceId },
}

impl ChangeEvent {
    /// True for events that invalidate derived geometry
    pub fn is_geometry(&self) -> bool {
        matches!(self, ChangeEvent::Geometry { .. })
    }
}
