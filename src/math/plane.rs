//! Plane and half-space classification

use crate::core::types::Vec3;

/// Distance tolerance for all plane comparisons in the kernel.
///
/// Plane classification, polygon clipping and ray picking must all use this
/// one constant; mixing tolerances between those call sites produces
/// inconsistent tie-breaks on shared faces. Points within `EPSILON` of a
/// plane are treated as on it, and clipping keeps on-plane vertices.
pub const EPSILON: f32 = 0.01;

/// Which side of a plane a point lies on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointSide {
    /// In front of the plane (the side the normal points into)
    Front,
    /// Behind the plane
    Back,
    /// Within [`EPSILON`] of the plane
    On,
}

/// A plane defined by unit normal and distance, as `normal . p + distance = 0`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    /// Create a plane from an already-normalized normal and distance
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Create a plane through `point` with the given normal
    pub fn from_point_and_normal(point: Vec3, normal: Vec3) -> Self {
        Self {
            normal,
            distance: -normal.dot(point),
        }
    }

    /// Create a plane from three points winding clockwise as seen from the
    /// front (the side the normal points into).
    ///
    /// Returns `None` if the points are colinear within [`EPSILON`].
    pub fn from_points(p1: Vec3, p2: Vec3, p3: Vec3) -> Option<Self> {
        let cross = (p3 - p1).cross(p2 - p1);
        let len = cross.length();
        if len < EPSILON {
            return None;
        }
        let normal = cross / len;
        Some(Self::from_point_and_normal(p1, normal))
    }

    /// Signed distance from point to plane (positive = in front)
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    /// Classify a point against the plane using [`EPSILON`]
    pub fn classify(&self, point: Vec3) -> PointSide {
        let dist = self.signed_distance(point);
        if dist > EPSILON {
            PointSide::Front
        } else if dist < -EPSILON {
            PointSide::Back
        } else {
            PointSide::On
        }
    }

    /// Closest point on the plane to `point`
    pub fn project_point(&self, point: Vec3) -> Vec3 {
        point - self.normal * self.signed_distance(point)
    }

    /// The same plane facing the other way
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            distance: -self.distance,
        }
    }

    /// Intersect the segment `start..end` with the plane.
    ///
    /// Returns the intersection point. `None` if the segment is parallel to
    /// the plane within [`EPSILON`]. The caller is expected to have
    /// classified the endpoints to opposite sides; the returned point is the
    /// linear interpolation at the crossing and stays on the segment even
    /// for slightly out-of-range `t`.
    pub fn intersect_segment(&self, start: Vec3, end: Vec3) -> Option<Vec3> {
        let direction = end - start;
        let denom = self.normal.dot(direction);
        if denom.abs() < f32::EPSILON {
            return None;
        }
        let t = (-self.distance - self.normal.dot(start)) / denom;
        Some(start + direction * t.clamp(0.0, 1.0))
    }

    /// Ray-plane intersection parameter.
    ///
    /// Returns `None` when the ray is parallel to the plane within
    /// [`EPSILON`] or the intersection lies behind the origin.
    pub fn intersect_ray(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let denom = self.normal.dot(direction);
        if denom.abs() < EPSILON {
            return None;
        }
        let t = -(self.normal.dot(origin) + self.distance) / denom;
        if t < 0.0 {
            return None;
        }
        Some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_clockwise_winding() {
        // +Z face of a unit cube: points clockwise seen from above
        let plane = Plane::from_points(
            Vec3::new(-0.5, 0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(0.5, -0.5, 0.5),
        )
        .unwrap();
        assert!((plane.normal - Vec3::Z).length() < 1e-6);
        assert!((plane.distance + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_from_points_colinear() {
        let p = Plane::from_points(
            Vec3::ZERO,
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(2.0, 2.0, 2.0),
        );
        assert!(p.is_none());
    }

    #[test]
    fn test_classify() {
        let plane = Plane::from_point_and_normal(Vec3::ZERO, Vec3::Y);
        assert_eq!(plane.classify(Vec3::new(0.0, 1.0, 0.0)), PointSide::Front);
        assert_eq!(plane.classify(Vec3::new(0.0, -1.0, 0.0)), PointSide::Back);
        assert_eq!(plane.classify(Vec3::new(3.0, 0.001, -2.0)), PointSide::On);
    }

    #[test]
    fn test_intersect_segment() {
        let plane = Plane::from_point_and_normal(Vec3::ZERO, Vec3::X);
        let hit = plane
            .intersect_segment(Vec3::new(-1.0, 2.0, 0.0), Vec3::new(1.0, 2.0, 0.0))
            .unwrap();
        assert!((hit - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-6);

        // Parallel segment
        assert!(plane
            .intersect_segment(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 5.0, 0.0))
            .is_none());
    }

    #[test]
    fn test_intersect_ray() {
        let plane = Plane::from_point_and_normal(Vec3::new(0.0, 0.0, 0.5), Vec3::Z);
        let t = plane.intersect_ray(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z).unwrap();
        assert!((t - 4.5).abs() < EPSILON);

        // Behind the origin
        assert!(plane.intersect_ray(Vec3::new(0.0, 0.0, -5.0), Vec3::NEG_Z).is_none());
    }

    #[test]
    fn test_project_point() {
        let plane = Plane::from_point_and_normal(Vec3::ZERO, Vec3::Z);
        let p = plane.project_point(Vec3::new(1.0, 2.0, 3.0));
        assert!((p - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);
    }
}
