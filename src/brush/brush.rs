//! Brush: an ordered face set forming one convex solid

use log::{debug, warn};

use crate::core::error::{Error, InvalidBrushReason};
use crate::core::types::{Result, Vec3};
use crate::math::{Aabb, Ray, WORLD_BOUNDS};

use super::change::ChangeEvent;
use super::face::{Face, FaceDef};
use super::polygon::Polygon;
use super::{BrushId, FaceId};

/// Slack around the world bounds before a clipped face counts as escaped
const WORLD_SLACK: f32 = 1.0;

/// A convex solid: the intersection of its faces' inside half-spaces.
///
/// The brush exclusively owns its faces. Every mutation re-derives the
/// affected geometry synchronously, bumps the geometry version, and queues a
/// change event for the document layer to drain; nothing mutates silently.
/// An invalid brush (open, empty or starved of faces) stays editable - it is
/// only excluded from rendering and picking until corrected.
#[derive(Clone, Debug)]
pub struct Brush {
    id: BrushId,
    faces: Vec<Face>,
    next_face_id: u32,
    bounds: Aabb,
    invalid: Option<InvalidBrushReason>,
    geometry_version: u64,
    pending: Vec<ChangeEvent>,
}

impl Brush {
    /// Build a brush from parsed face definitions and derive its geometry
    pub fn from_defs(id: BrushId, defs: impl IntoIterator<Item = FaceDef>) -> Self {
        let mut brush = Self {
            id,
            faces: Vec::new(),
            next_face_id: 0,
            bounds: Aabb::empty(),
            invalid: None,
            geometry_version: 0,
            pending: Vec::new(),
        };
        for def in defs {
            let face_id = brush.alloc_face_id();
            brush.faces.push(Face::new(face_id, def));
        }
        brush.rebuild_geometry();
        brush
    }

    /// The six axis-aligned faces of `bounds`, all wearing `texture`
    pub fn cuboid(id: BrushId, bounds: Aabb, texture: &str) -> Self {
        let (lo, hi) = (bounds.min, bounds.max);
        let defs = [
            // +Z
            [
                Vec3::new(lo.x, hi.y, hi.z),
                Vec3::new(hi.x, hi.y, hi.z),
                Vec3::new(hi.x, lo.y, hi.z),
            ],
            // -Z
            [
                Vec3::new(lo.x, lo.y, lo.z),
                Vec3::new(hi.x, lo.y, lo.z),
                Vec3::new(hi.x, hi.y, lo.z),
            ],
            // +X
            [
                Vec3::new(hi.x, lo.y, lo.z),
                Vec3::new(hi.x, lo.y, hi.z),
                Vec3::new(hi.x, hi.y, hi.z),
            ],
            // -X
            [
                Vec3::new(lo.x, lo.y, lo.z),
                Vec3::new(lo.x, hi.y, lo.z),
                Vec3::new(lo.x, hi.y, hi.z),
            ],
            // +Y
            [
                Vec3::new(lo.x, hi.y, lo.z),
                Vec3::new(hi.x, hi.y, lo.z),
                Vec3::new(hi.x, hi.y, hi.z),
            ],
            // -Y
            [
                Vec3::new(lo.x, lo.y, lo.z),
                Vec3::new(lo.x, lo.y, hi.z),
                Vec3::new(hi.x, lo.y, hi.z),
            ],
        ]
        .map(|[p1, p2, p3]| FaceDef::new(p1, p2, p3, texture));
        Self::from_defs(id, defs)
    }

    pub fn id(&self) -> BrushId {
        self.id
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.iter().find(|f| f.id() == id)
    }

    /// Union of all valid faces' vertex bounds; empty when no face survived
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Centroid of the bounds
    pub fn center(&self) -> Vec3 {
        self.bounds.center()
    }

    /// False when the half-spaces do not currently close a renderable solid
    pub fn is_valid(&self) -> bool {
        self.invalid.is_none()
    }

    /// Non-fatal validity status for the document layer
    pub fn status(&self) -> Result<()> {
        match self.invalid {
            Some(reason) => Err(Error::InvalidBrush {
                brush: self.id,
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Per-face degeneracy statuses, for surfacing alongside [`status`]
    ///
    /// [`status`]: Self::status
    pub fn face_errors(&self) -> Vec<Error> {
        self.faces
            .iter()
            .filter_map(|f| {
                f.degenerate_reason().map(|reason| Error::DegenerateFace {
                    brush: self.id,
                    face: f.id(),
                    reason,
                })
            })
            .collect()
    }

    /// Bumped on every geometry-changing mutation; dependents compare this
    /// on read instead of subscribing to callbacks
    pub fn geometry_version(&self) -> u64 {
        self.geometry_version
    }

    /// Take the queued change events since the last drain
    pub fn drain_events(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Clockwise vertex loops of all valid faces, for the rendering layer
    pub fn vertices(&self) -> impl Iterator<Item = (FaceId, &[Vec3])> {
        self.faces
            .iter()
            .filter_map(|f| f.polygon().map(|p| (f.id(), p.vertices())))
    }

    /// Nearest ray hit over this brush's valid faces.
    ///
    /// Invalid brushes never report hits.
    pub fn pick(&self, ray: &Ray) -> Option<(FaceId, f32, Vec3)> {
        if !self.is_valid() {
            return None;
        }
        let mut best: Option<(FaceId, f32, Vec3)> = None;
        for face in &self.faces {
            if let Some((t, point)) = face.pick(ray) {
                if best.is_none_or(|(_, best_t, _)| t < best_t) {
                    best = Some((face.id(), t, point));
                }
            }
        }
        best
    }

    // --- mutation ---

    /// Replace a face's defining points. Returns false for an unknown face.
    pub fn set_face_points(&mut self, face: FaceId, points: [Vec3; 3]) -> bool {
        let Some(f) = self.face_mut(face) else {
            return false;
        };
        f.set_points(points);
        self.touch_geometry(Some(face));
        true
    }

    /// Move the whole brush by `delta`
    pub fn translate_by(&mut self, delta: Vec3) {
        for face in &mut self.faces {
            face.translate(delta);
        }
        self.touch_geometry(None);
    }

    /// Append a new face and re-derive. Returns the new face's id.
    pub fn add_face(&mut self, def: FaceDef) -> FaceId {
        let face_id = self.alloc_face_id();
        self.faces.push(Face::new(face_id, def));
        self.touch_geometry(None);
        face_id
    }

    /// Remove a face and re-derive. Returns false for an unknown face.
    pub fn remove_face(&mut self, face: FaceId) -> bool {
        let before = self.faces.len();
        self.faces.retain(|f| f.id() != face);
        if self.faces.len() == before {
            return false;
        }
        self.touch_geometry(None);
        true
    }

    pub fn set_face_texture(&mut self, face: FaceId, texture: impl Into<String>) -> bool {
        let Some(f) = self.face_mut(face) else {
            return false;
        };
        f.set_texture(texture.into());
        self.touch_flags(face);
        true
    }

    pub fn set_face_x_offset(&mut self, face: FaceId, offset: i32) -> bool {
        let Some(f) = self.face_mut(face) else {
            return false;
        };
        f.set_x_offset(offset);
        self.touch_flags(face);
        true
    }

    pub fn set_face_y_offset(&mut self, face: FaceId, offset: i32) -> bool {
        let Some(f) = self.face_mut(face) else {
            return false;
        };
        f.set_y_offset(offset);
        self.touch_flags(face);
        true
    }

    /// Shift both texture offsets, e.g. while dragging a texture across a face
    pub fn translate_face_offsets(&mut self, face: FaceId, dx: i32, dy: i32) -> bool {
        let Some(f) = self.face_mut(face) else {
            return false;
        };
        f.translate_offsets(dx, dy);
        self.touch_flags(face);
        true
    }

    pub fn set_face_rotation(&mut self, face: FaceId, rotation: f32) -> bool {
        let Some(f) = self.face_mut(face) else {
            return false;
        };
        f.set_rotation(rotation);
        self.touch_flags(face);
        true
    }

    pub fn set_face_x_scale(&mut self, face: FaceId, scale: f32) -> bool {
        let Some(f) = self.face_mut(face) else {
            return false;
        };
        f.set_x_scale(scale);
        self.touch_flags(face);
        true
    }

    pub fn set_face_y_scale(&mut self, face: FaceId, scale: f32) -> bool {
        let Some(f) = self.face_mut(face) else {
            return false;
        };
        f.set_y_scale(scale);
        self.touch_flags(face);
        true
    }

    // --- derivation ---

    /// Re-derive every face polygon, the bounds and the validity flag.
    ///
    /// O(faces^2): each face's base polygon is clipped against every sibling
    /// half-space. Runs synchronously on the caller.
    fn rebuild_geometry(&mut self) {
        let planes: Vec<_> = self.faces.iter().map(|f| f.plane().copied()).collect();

        for i in 0..self.faces.len() {
            let Some(plane) = planes[i] else {
                // Colinear defining points; the face keeps its degenerate mark
                continue;
            };
            let anchor = self.faces[i].points()[0];
            let mut polygon = Some(Polygon::base(&plane, anchor));
            for (j, sibling) in planes.iter().enumerate() {
                if i == j {
                    continue;
                }
                let Some(sibling) = sibling else {
                    continue;
                };
                polygon = match polygon {
                    Some(current) => current.clip(sibling),
                    None => break,
                };
            }
            if polygon.is_none() {
                debug!(
                    "face {:?} of brush {:?} clipped away by its siblings",
                    self.faces[i].id(),
                    self.id
                );
            }
            self.faces[i].set_polygon(polygon);
        }

        let limit = Aabb::new(
            WORLD_BOUNDS.min - Vec3::splat(WORLD_SLACK),
            WORLD_BOUNDS.max + Vec3::splat(WORLD_SLACK),
        );
        let mut bounds = Aabb::empty();
        let mut valid_faces = 0;
        let mut escaped = false;
        for face in &self.faces {
            if let Some(polygon) = face.polygon() {
                valid_faces += 1;
                let face_bounds = polygon.bounds();
                if !limit.contains(&face_bounds) {
                    escaped = true;
                }
                bounds = bounds.union(&face_bounds);
            }
        }
        self.bounds = bounds;

        self.invalid = if valid_faces == 0 {
            Some(InvalidBrushReason::EmptyIntersection)
        } else if escaped {
            Some(InvalidBrushReason::Unbounded)
        } else if valid_faces < 4 {
            Some(InvalidBrushReason::TooFewFaces)
        } else {
            None
        };
        if let Some(reason) = self.invalid {
            warn!("brush {:?} is invalid: {}", self.id, reason);
        }
    }

    fn alloc_face_id(&mut self) -> FaceId {
        let id = FaceId(self.next_face_id);
        self.next_face_id += 1;
        id
    }

    fn face_mut(&mut self, id: FaceId) -> Option<&mut Face> {
        self.faces.iter_mut().find(|f| f.id() == id)
    }

    fn touch_geometry(&mut self, face: Option<FaceId>) {
        self.rebuild_geometry();
        self.geometry_version += 1;
        self.pending.push(ChangeEvent::Geometry {
            brush: self.id,
            face,
        });
    }

    fn touch_flags(&mut self, face: FaceId) {
        self.pending.push(ChangeEvent::Flags {
            brush: self.id,
            face,
        });
    }
}
