//! Ray picking and frustum culling over a static primitive set
//!
//! Face primitives are flattened into a bulk-built bounding-volume
//! hierarchy; pointer picks walk the tree front-to-back and delegate the
//! narrow test to the face itself. The tree is immutable between rebuilds
//! and a rebuild swaps in a whole new structure.

pub mod aabb_tree;
pub mod hit;
pub mod index;

pub use aabb_tree::AabbTree;
pub use hit::{FaceRef, PickHit};
pub use index::{PickIndex, SharedPickIndex};
