//! Texture projection frames
//!
//! A face projects world points into texture space through one of six
//! canonical paraxial frames, picked by whichever principal half-axis is
//! most parallel to the face normal. Rotation, scale and offset are folded
//! into a surface->world matrix and its analytic inverse.

use crate::core::types::{Mat4, Vec2, Vec3};
use glam::{Quat, Vec4};

use crate::math::{Plane, EPSILON};

/// Canonical projection frames: (projection axis, texture X axis, texture Y
/// axis) per principal half-axis, in the order the engine searches them.
/// First match wins on ties.
const BASE_AXES: [[Vec3; 3]; 6] = [
    [Vec3::Z, Vec3::X, Vec3::NEG_Y],
    [Vec3::NEG_Z, Vec3::X, Vec3::NEG_Y],
    [Vec3::X, Vec3::Y, Vec3::NEG_Z],
    [Vec3::NEG_X, Vec3::Y, Vec3::NEG_Z],
    [Vec3::Y, Vec3::X, Vec3::NEG_Z],
    [Vec3::NEG_Y, Vec3::X, Vec3::NEG_Z],
];

/// Index of the best projection axis for `normal` in [`BASE_AXES`]
pub fn best_axis(normal: Vec3) -> usize {
    let mut best = 0;
    let mut best_dot = f32::NEG_INFINITY;
    for (i, axes) in BASE_AXES.iter().enumerate() {
        let dot = normal.dot(axes[0]);
        if dot > best_dot {
            best_dot = dot;
            best = i;
        }
    }
    best
}

/// A face's derived texture frame.
///
/// `surface_matrix` maps surface (texture) coordinates to world space;
/// `world_matrix` is its analytic inverse. The two are built independently
/// from the same factors, so `world_matrix * surface_matrix` is the identity
/// up to floating-point rounding.
#[derive(Clone, Debug)]
pub struct TextureAlignment {
    best_axis: usize,
    axis_x: Vec3,
    axis_y: Vec3,
    projection_axis: Vec3,
    surface_matrix: Mat4,
    world_matrix: Mat4,
}

impl TextureAlignment {
    /// Derive the frame for a face normal and its texture metadata.
    ///
    /// `rotation` is in degrees about the projection axis; zero scale factors
    /// are treated as 1, matching common map-format conventions.
    pub fn new(
        normal: Vec3,
        rotation: f32,
        x_scale: f32,
        y_scale: f32,
        x_offset: i32,
        y_offset: i32,
    ) -> Self {
        let best = best_axis(normal);
        let [projection_axis, base_x, base_y] = BASE_AXES[best];

        let spin = Quat::from_axis_angle(projection_axis, rotation.to_radians());
        let axis_x = spin * base_x;
        let axis_y = spin * base_y;

        let x_scale = sanitize_scale(x_scale);
        let y_scale = sanitize_scale(y_scale);
        let offset = Vec3::new(x_offset as f32, y_offset as f32, 0.0);

        // Rotation part of surface->world: columns are the rotated frame
        let basis = Mat4::from_cols(
            axis_x.extend(0.0),
            axis_y.extend(0.0),
            projection_axis.extend(0.0),
            Vec4::W,
        );

        let surface_matrix = basis
            * Mat4::from_scale(Vec3::new(x_scale, y_scale, 1.0))
            * Mat4::from_translation(-offset);
        let world_matrix = Mat4::from_translation(offset)
            * Mat4::from_scale(Vec3::new(1.0 / x_scale, 1.0 / y_scale, 1.0))
            * basis.transpose();

        Self {
            best_axis: best,
            axis_x,
            axis_y,
            projection_axis,
            surface_matrix,
            world_matrix,
        }
    }

    pub fn best_axis(&self) -> usize {
        self.best_axis
    }

    pub fn axis_x(&self) -> Vec3 {
        self.axis_x
    }

    pub fn axis_y(&self) -> Vec3 {
        self.axis_y
    }

    pub fn projection_axis(&self) -> Vec3 {
        self.projection_axis
    }

    pub fn surface_matrix(&self) -> &Mat4 {
        &self.surface_matrix
    }

    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    /// Texture coordinates of a world-space point
    pub fn tex_coords(&self, point: Vec3) -> Vec2 {
        self.world_matrix.transform_point3(point).truncate()
    }

    /// Full surface-space coordinates of a world-space point; z is the
    /// distance along the projection axis and is dropped by [`tex_coords`]
    ///
    /// [`tex_coords`]: Self::tex_coords
    pub fn surface_coords_of(&self, point: Vec3) -> Vec3 {
        self.world_matrix.transform_point3(point)
    }

    /// World-space point on `plane` with the given texture coordinates.
    ///
    /// Maps the surface point back to world space and slides it along the
    /// projection axis onto the plane; the slide cannot change the texture
    /// coordinates because the axis projects to pure surface z.
    pub fn world_coords_of(&self, uv: Vec2, plane: &Plane) -> Vec3 {
        let p = self.surface_matrix.transform_point3(uv.extend(0.0));
        let denom = plane.normal.dot(self.projection_axis);
        // The best axis is never near-orthogonal to the face normal
        debug_assert!(denom.abs() > EPSILON);
        let t = -plane.signed_distance(p) / denom;
        p + self.projection_axis * t
    }
}

fn sanitize_scale(scale: f32) -> f32 {
    if scale.abs() < EPSILON { 1.0 } else { scale }
}
