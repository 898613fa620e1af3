//! Error types for the brush kernel
//!
//! These are non-fatal statuses: a degenerate face or invalid brush is
//! flagged and excluded from rendering/picking, never torn down. The
//! document layer reads them through [`crate::brush::Brush::status`].

use thiserror::Error;

use crate::brush::{BrushId, FaceId};

/// Main error type for the kernel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("degenerate face {face:?} of brush {brush:?}: {reason}")]
    DegenerateFace {
        brush: BrushId,
        face: FaceId,
        reason: DegenerateReason,
    },

    #[error("invalid brush {brush:?}: {reason}")]
    InvalidBrush {
        brush: BrushId,
        reason: InvalidBrushReason,
    },
}

/// Why a face carries no usable polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateReason {
    /// The three defining points are colinear and span no plane.
    ColinearPoints,
    /// Fewer than 3 vertices survived clipping against the sibling faces.
    ClippedAway,
}

/// Why a brush is excluded from rendering and picking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidBrushReason {
    /// Fewer than 4 valid faces remain; the half-spaces cannot close a solid.
    TooFewFaces,
    /// The intersection of the half-spaces is empty.
    EmptyIntersection,
    /// The intersection escapes the world bounds and is not a closed solid.
    Unbounded,
}

impl std::fmt::Display for DegenerateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ColinearPoints => write!(f, "defining points are colinear"),
            Self::ClippedAway => write!(f, "polygon clipped away by sibling faces"),
        }
    }
}

impl std::fmt::Display for InvalidBrushReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewFaces => write!(f, "fewer than 4 valid faces"),
            Self::EmptyIntersection => write!(f, "half-spaces have an empty intersection"),
            Self::Unbounded => write!(f, "half-spaces do not close a bounded solid"),
        }
    }
}
