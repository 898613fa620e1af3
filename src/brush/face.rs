//! A single bounding half-space of a brush

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::core::error::DegenerateReason;
use crate::core::types::{Vec2, Vec3};
use crate::math::{Plane, Ray};

use super::alignment::TextureAlignment;
use super::polygon::Polygon;
use super::FaceId;

/// A face definition as parsed from a map file by the document layer:
/// three defining points winding clockwise seen from outside the brush,
/// plus texture metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceDef {
    pub points: [Vec3; 3],
    pub texture: String,
    #[serde(default)]
    pub x_offset: i32,
    #[serde(default)]
    pub y_offset: i32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "default_scale")]
    pub x_scale: f32,
    #[serde(default = "default_scale")]
    pub y_scale: f32,
}

fn default_scale() -> f32 {
    1.0
}

impl FaceDef {
    /// Definition with neutral texture metadata
    pub fn new(p1: Vec3, p2: Vec3, p3: Vec3, texture: impl Into<String>) -> Self {
        Self {
            points: [p1, p2, p3],
            texture: texture.into(),
            x_offset: 0,
            y_offset: 0,
            rotation: 0.0,
            x_scale: 1.0,
            y_scale: 1.0,
        }
    }
}

/// Vertex layout handed to the rendering layer for buffer upload
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct RenderVertex {
    pub position: Vec3,
    pub tex: Vec2,
}

/// One bounding half-space of a brush.
///
/// The plane and texture frame derive from the face's own data; the polygon
/// is derived by the owning brush, which clips this face against its
/// siblings. A face holds no reference back to its brush: it is addressed by
/// `(BrushId, FaceId)` from outside.
#[derive(Clone, Debug)]
pub struct Face {
    id: FaceId,
    points: [Vec3; 3],
    texture: String,
    x_offset: i32,
    y_offset: i32,
    rotation: f32,
    x_scale: f32,
    y_scale: f32,

    plane: Option<Plane>,
    alignment: Option<TextureAlignment>,
    polygon: Option<Polygon>,
    degenerate: Option<DegenerateReason>,
}

impl Face {
    pub fn new(id: FaceId, def: FaceDef) -> Self {
        let mut face = Self {
            id,
            points: def.points,
            texture: def.texture,
            x_offset: def.x_offset,
            y_offset: def.y_offset,
            rotation: def.rotation,
            x_scale: def.x_scale,
            y_scale: def.y_scale,
            plane: None,
            alignment: None,
            polygon: None,
            degenerate: None,
        };
        face.derive_plane();
        face
    }

    pub fn id(&self) -> FaceId {
        self.id
    }

    pub fn points(&self) -> &[Vec3; 3] {
        &self.points
    }

    pub fn texture(&self) -> &str {
        &self.texture
    }

    pub fn x_offset(&self) -> i32 {
        self.x_offset
    }

    pub fn y_offset(&self) -> i32 {
        self.y_offset
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn x_scale(&self) -> f32 {
        self.x_scale
    }

    pub fn y_scale(&self) -> f32 {
        self.y_scale
    }

    /// The face plane; `None` when the defining points are colinear
    pub fn plane(&self) -> Option<&Plane> {
        self.plane.as_ref()
    }

    pub fn normal(&self) -> Option<Vec3> {
        self.plane.map(|p| p.normal)
    }

    /// The derived polygon, if the face survived clipping
    pub fn polygon(&self) -> Option<&Polygon> {
        self.polygon.as_ref()
    }

    pub fn alignment(&self) -> Option<&TextureAlignment> {
        self.alignment.as_ref()
    }

    /// True when the face contributes geometry to its brush
    pub fn is_valid(&self) -> bool {
        self.polygon.is_some()
    }

    /// Why the face carries no polygon, if it doesn't
    pub fn degenerate_reason(&self) -> Option<DegenerateReason> {
        self.degenerate
    }

    /// Vertex average of the derived polygon
    pub fn center(&self) -> Option<Vec3> {
        self.polygon.as_ref().map(|p| p.center())
    }

    /// Clockwise vertex loop with derived texture coordinates, ready for
    /// triangulation and buffer upload
    pub fn render_vertices(&self) -> Vec<RenderVertex> {
        let (Some(polygon), Some(alignment)) = (&self.polygon, &self.alignment) else {
            return Vec::new();
        };
        polygon
            .vertices()
            .iter()
            .map(|&position| RenderVertex {
                position,
                tex: alignment.tex_coords(position),
            })
            .collect()
    }

    /// Texture coordinates of a world-space point
    pub fn tex_coords(&self, point: Vec3) -> Option<Vec2> {
        self.alignment.as_ref().map(|a| a.tex_coords(point))
    }

    /// World-space point on the face plane with the given texture coordinates
    pub fn world_coords_of(&self, uv: Vec2) -> Option<Vec3> {
        match (&self.alignment, &self.plane) {
            (Some(alignment), Some(plane)) => Some(alignment.world_coords_of(uv, plane)),
            _ => None,
        }
    }

    /// Ray-face intersection.
    ///
    /// No hit when the ray parallels the plane within epsilon, intersects
    /// behind its origin, or lands outside the polygon. Pure: no caches are
    /// touched.
    pub fn pick(&self, ray: &Ray) -> Option<(f32, Vec3)> {
        let plane = self.plane.as_ref()?;
        let polygon = self.polygon.as_ref()?;
        let t = plane.intersect_ray(ray.origin, ray.direction)?;
        let point = ray.at(t);
        polygon
            .contains_point(plane.normal, point)
            .then_some((t, point))
    }

    fn derive_plane(&mut self) {
        self.plane = Plane::from_points(self.points[0], self.points[1], self.points[2]);
        if self.plane.is_some() {
            self.degenerate = None;
            self.derive_alignment();
        } else {
            self.degenerate = Some(DegenerateReason::ColinearPoints);
            self.alignment = None;
            self.polygon = None;
        }
    }

    fn derive_alignment(&mut self) {
        self.alignment = self.plane.map(|p| {
            TextureAlignment::new(
                p.normal,
                self.rotation,
                self.x_scale,
                self.y_scale,
                self.x_offset,
                self.y_offset,
            )
        });
    }

    /// Replace the derived polygon. `None` marks the face clipped away.
    pub(super) fn set_polygon(&mut self, polygon: Option<Polygon>) {
        if polygon.is_none() && self.plane.is_some() {
            self.degenerate = Some(DegenerateReason::ClippedAway);
        } else if polygon.is_some() {
            self.degenerate = None;
        }
        self.polygon = polygon;
    }

    pub(super) fn set_points(&mut self, points: [Vec3; 3]) {
        self.points = points;
        self.polygon = None;
        self.derive_plane();
    }

    pub(super) fn translate(&mut self, delta: Vec3) {
        self.set_points([
            self.points[0] + delta,
            self.points[1] + delta,
            self.points[2] + delta,
        ]);
    }

    pub(super) fn set_texture(&mut self, texture: String) {
        self.texture = texture;
    }

    pub(super) fn set_x_offset(&mut self, offset: i32) {
        self.x_offset = offset;
        self.derive_alignment();
    }

    pub(super) fn set_y_offset(&mut self, offset: i32) {
        self.y_offset = offset;
        self.derive_alignment();
    }

    pub(super) fn translate_offsets(&mut self, dx: i32, dy: i32) {
        self.x_offset += dx;
        self.y_offset += dy;
        self.derive_alignment();
    }

    pub(super) fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
        self.derive_alignment();
    }

    pub(super) fn set_x_scale(&mut self, scale: f32) {
        self.x_scale = scale;
        self.derive_alignment();
    }

    pub(super) fn set_y_scale(&mut self, scale: f32) {
        self.y_scale = scale;
        self.derive_alignment();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::EPSILON;

    fn z_face() -> Face {
        // +Z face at z = 0.5, clockwise from above
        Face::new(
            FaceId(0),
            FaceDef::new(
                Vec3::new(-0.5, 0.5, 0.5),
                Vec3::new(0.5, 0.5, 0.5),
                Vec3::new(0.5, -0.5, 0.5),
                "base/metal1",
            ),
        )
    }

    fn z_face_with_polygon() -> Face {
        let mut face = z_face();
        face.set_polygon(Some(Polygon::new(vec![
            Vec3::new(-0.5, 0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(0.5, -0.5, 0.5),
            Vec3::new(-0.5, -0.5, 0.5),
        ])));
        face
    }

    #[test]
    fn test_colinear_points_are_degenerate() {
        let face = Face::new(
            FaceId(1),
            FaceDef::new(
                Vec3::ZERO,
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                "base/metal1",
            ),
        );
        assert!(face.plane().is_none());
        assert!(!face.is_valid());
        assert_eq!(
            face.degenerate_reason(),
            Some(DegenerateReason::ColinearPoints)
        );
    }

    #[test]
    fn test_pick_hits_inside_polygon() {
        let face = z_face_with_polygon();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let (t, point) = face.pick(&ray).unwrap();
        assert!((t - 4.5).abs() < EPSILON);
        assert!((point - Vec3::new(0.0, 0.0, 0.5)).length() < EPSILON);
    }

    #[test]
    fn test_pick_misses_outside_polygon() {
        let face = z_face_with_polygon();
        let ray = Ray::new(Vec3::new(2.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(face.pick(&ray).is_none());
    }

    #[test]
    fn test_pick_ignores_parallel_ray() {
        let face = z_face_with_polygon();
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.5), Vec3::X);
        assert!(face.pick(&ray).is_none());
    }

    #[test]
    fn test_pick_ignores_hit_behind_origin() {
        let face = z_face_with_polygon();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::NEG_Z);
        assert!(face.pick(&ray).is_none());
    }

    #[test]
    fn test_render_vertices_carry_tex_coords() {
        let face = z_face_with_polygon();
        let vertices = face.render_vertices();
        assert_eq!(vertices.len(), 4);
        for v in &vertices {
            let uv = face.tex_coords(v.position).unwrap();
            assert!((uv - v.tex).length() < 1e-6);
        }
    }

    #[test]
    fn test_facedef_defaults_from_json() {
        let def: FaceDef = serde_json::from_str(
            r#"{
                "points": [[0.0, 0.0, 0.0], [0.0, 32.0, 0.0], [32.0, 32.0, 0.0]],
                "texture": "base/slime"
            }"#,
        )
        .unwrap();
        assert_eq!(def.x_offset, 0);
        assert_eq!(def.x_scale, 1.0);
        assert_eq!(def.texture, "base/slime");
    }
}
