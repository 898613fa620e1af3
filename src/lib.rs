//! Brushwork - brush geometry kernel and spatial picking index
//!
//! Derives the surface representation of convex solids ("brushes") from their
//! bounding half-spaces and answers ray picks and frustum-culling queries
//! through a bulk-built bounding-volume hierarchy. The editor shell (document
//! model, undo stack, map parsing, rendering, UI) lives outside this crate
//! and talks to it through `FaceDef` inputs, change events, and pick results.

pub mod core;
pub mod math;
pub mod brush;
pub mod pick;
