//! Convex brush geometry
//!
//! A brush is the intersection of the inside half-spaces of its faces. Faces
//! derive their polygons by clipping against their siblings; the brush
//! derives its bounds from the surviving polygons and tracks validity.

pub mod polygon;
pub mod alignment;
pub mod face;
pub mod brush;
pub mod change;

pub use polygon::Polygon;
pub use alignment::TextureAlignment;
pub use face::{Face, FaceDef, RenderVertex};
pub use brush::Brush;
pub use change::ChangeEvent;

/// Identifies a brush across the document
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BrushId(pub u64);

/// Identifies a face within its brush; stable across sibling removal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(pub u32);
