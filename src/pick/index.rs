//! The scene-level pick index
//!
//! Flattens a brush list into one tree leaf per valid face. The index is
//! rebuilt whenever the document layer signals a structural change and is
//! otherwise immutable; [`SharedPickIndex`] lets concurrent pointer picks
//! keep querying an old snapshot while a rebuild publishes a new one.

use std::sync::{Arc, Mutex};

use log::debug;

use crate::brush::{Brush, BrushId};
use crate::math::{Frustum, Ray};

use super::aabb_tree::AabbTree;
use super::hit::{FaceRef, PickHit};

/// Static pick index over a brush list.
///
/// Queries take the same brush list the index was built from; the single
/// writer rebuilds before the list changes shape, and [`is_current`] lets
/// dependents verify that by version counter instead of notifications.
///
/// [`is_current`]: Self::is_current
pub struct PickIndex {
    tree: AabbTree<FaceRef>,
    versions: Vec<(BrushId, u64)>,
}

impl PickIndex {
    /// Index every valid face of every valid brush
    pub fn build(brushes: &[Brush]) -> Self {
        let mut items = Vec::new();
        for (slot, brush) in brushes.iter().enumerate() {
            if !brush.is_valid() {
                continue;
            }
            for face in brush.faces() {
                if let Some(polygon) = face.polygon() {
                    items.push((
                        polygon.bounds(),
                        FaceRef {
                            brush_slot: slot as u32,
                            brush: brush.id(),
                            face: face.id(),
                        },
                    ));
                }
            }
        }
        debug!(
            "pick index rebuilt: {} faces over {} brushes",
            items.len(),
            brushes.len()
        );
        Self {
            tree: AabbTree::build(items),
            versions: brushes
                .iter()
                .map(|b| (b.id(), b.geometry_version()))
                .collect(),
        }
    }

    /// Number of indexed faces
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// True while the brush list still matches what this index was built
    /// from, by identity and geometry version
    pub fn is_current(&self, brushes: &[Brush]) -> bool {
        brushes.len() == self.versions.len()
            && brushes
                .iter()
                .zip(&self.versions)
                .all(|(b, (id, version))| b.id() == *id && b.geometry_version() == *version)
    }

    /// Nearest face hit along `ray`, or a definite no-hit.
    ///
    /// The tree narrows candidates; each candidate face runs its own
    /// polygon-containment test. An empty index answers no-hit.
    pub fn pick(&self, ray: &Ray, brushes: &[Brush]) -> Option<PickHit> {
        self.tree
            .pick(ray, |face_ref| {
                let brush = brushes.get(face_ref.brush_slot as usize)?;
                if brush.id() != face_ref.brush {
                    return None;
                }
                let face = brush.face(face_ref.face)?;
                let (t, position) = face.pick(ray)?;
                Some((
                    t,
                    PickHit {
                        brush: brush.id(),
                        face: face.id(),
                        position,
                        distance: t,
                    },
                ))
            })
            .map(|(_, hit)| hit)
    }

    /// Faces whose bounds intersect the view frustum, for the rendering
    /// layer's culling pass
    pub fn visible_faces(&self, frustum: &Frustum) -> Vec<FaceRef> {
        self.tree
            .collect_visible(frustum)
            .into_iter()
            .copied()
            .collect()
    }
}

/// Snapshot-swap wrapper for the read/rebuild exclusion.
///
/// Readers clone the current `Arc` under a brief lock and query it without
/// holding anything; the writer publishes a freshly built index as a whole.
/// In-flight queries keep their snapshot alive until they finish.
pub struct SharedPickIndex {
    current: Mutex<Arc<PickIndex>>,
}

impl SharedPickIndex {
    pub fn new(index: PickIndex) -> Self {
        Self {
            current: Mutex::new(Arc::new(index)),
        }
    }

    /// The current index snapshot
    pub fn snapshot(&self) -> Arc<PickIndex> {
        self.current
            .lock()
            .expect("pick index lock poisoned")
            .clone()
    }

    /// Replace the index wholesale after a rebuild
    pub fn publish(&self, index: PickIndex) {
        *self.current.lock().expect("pick index lock poisoned") = Arc::new(index);
    }
}
