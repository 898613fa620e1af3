//! View frustum for culling

use crate::core::types::{Mat4, Vec3};
use super::aabb::Aabb;
use super::plane::Plane;

/// View frustum with 6 planes (Near, Far, Left, Right, Top, Bottom).
///
/// Plane normals point into the frustum, so a point is inside when it is in
/// front of all six planes.
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let m = vp.to_cols_array_2d();

        // Gribb-Hartmann extraction: each plane is a sum/difference of the
        // fourth row with another row of the matrix.
        let left = Self::normalize_plane(
            m[0][3] + m[0][0],
            m[1][3] + m[1][0],
            m[2][3] + m[2][0],
            m[3][3] + m[3][0],
        );
        let right = Self::normalize_plane(
            m[0][3] - m[0][0],
            m[1][3] - m[1][0],
            m[2][3] - m[2][0],
            m[3][3] - m[3][0],
        );
        let bottom = Self::normalize_plane(
            m[0][3] + m[0][1],
            m[1][3] + m[1][1],
            m[2][3] + m[2][1],
            m[3][3] + m[3][1],
        );
        let top = Self::normalize_plane(
            m[0][3] - m[0][1],
            m[1][3] - m[1][1],
            m[2][3] - m[2][1],
            m[3][3] - m[3][1],
        );
        let near = Self::normalize_plane(
            m[0][3] + m[0][2],
            m[1][3] + m[1][2],
            m[2][3] + m[2][2],
            m[3][3] + m[3][2],
        );
        let far = Self::normalize_plane(
            m[0][3] - m[0][2],
            m[1][3] - m[1][2],
            m[2][3] - m[2][2],
            m[3][3] - m[3][2],
        );

        Self {
            planes: [near, far, left, right, top, bottom],
        }
    }

    fn normalize_plane(x: f32, y: f32, z: f32, w: f32) -> Plane {
        let normal = Vec3::new(x, y, z);
        let len = normal.length();
        Plane::new(normal / len, w / len)
    }

    /// Check if point is inside the frustum
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| p.signed_distance(point) >= 0.0)
    }

    /// Check if AABB intersects the frustum (conservative test)
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            // The corner most aligned with the plane normal (p-vertex); if
            // even that corner is outside, the whole box is outside.
            let p = Vec3::new(
                if plane.normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if plane.normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if plane.normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );
            if plane.signed_distance(p) < 0.0 {
                return false;
            }
        }
        true
    }
}
