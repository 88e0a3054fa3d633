// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Camera contract consumed by raycasting and drag handlers.

use diorama_scene::{CoordinateId, Scene};
use glam::{Mat4, Vec3};

/// What the raycaster needs from a camera.
///
/// The camera is placed by a coordinate in the scene and looks down its local `-Z` axis.
/// Projections use OpenGL clip conventions (NDC depth in `-1.0..=1.0`).
pub trait CameraView {
    /// Coordinate providing the camera's world placement.
    fn coordinate(&self) -> CoordinateId;

    /// Projection matrix from camera space to clip space.
    fn projection_matrix(&self) -> Mat4;

    /// Inverse of [`CameraView::projection_matrix`].
    fn projection_matrix_inverse(&self) -> Mat4 {
        self.projection_matrix().inverse()
    }

    /// World-to-clip matrix.
    fn view_projection(&self, scene: &Scene) -> Mat4 {
        self.projection_matrix() * scene.from_world(self.coordinate())
    }

    /// Project a world point to normalized device coordinates.
    fn project(&self, scene: &Scene, world: Vec3) -> Vec3 {
        self.view_projection(scene).project_point3(world)
    }
}

/// Projection type for the camera.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Projection {
    /// Perspective projection
    Perspective {
        /// Vertical field of view in radians.
        fov_y: f32,
        /// Width over height.
        aspect: f32,
        /// Near clip distance.
        near: f32,
        /// Far clip distance.
        far: f32,
    },
    /// Orthographic projection
    Orthographic {
        /// Half of the view height in world units.
        half_height: f32,
        /// Width over height.
        aspect: f32,
        /// Near clip distance.
        near: f32,
        /// Far clip distance.
        far: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Self::Perspective {
            fov_y: 45.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// A camera placed by a scene coordinate.
#[derive(Copy, Clone, Debug)]
pub struct Camera {
    coordinate: CoordinateId,
    /// Projection settings
    pub projection: Projection,
}

impl Camera {
    /// Create a perspective camera with default settings at `coordinate`.
    pub fn new(coordinate: CoordinateId) -> Self {
        Self {
            coordinate,
            projection: Projection::default(),
        }
    }

    /// Create a camera with an explicit projection.
    pub fn with_projection(coordinate: CoordinateId, projection: Projection) -> Self {
        Self {
            coordinate,
            projection,
        }
    }

    /// Update the aspect ratio, e.g. after a viewport resize.
    pub fn set_aspect(&mut self, aspect: f32) {
        match &mut self.projection {
            Projection::Perspective { aspect: a, .. }
            | Projection::Orthographic { aspect: a, .. } => {
                *a = aspect;
            }
        }
    }
}

impl CameraView for Camera {
    fn coordinate(&self) -> CoordinateId {
        self.coordinate
    }

    fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh_gl(fov_y, aspect, near, far),
            Projection::Orthographic {
                half_height,
                aspect,
                near,
                far,
            } => {
                let half_width = half_height * aspect;
                Mat4::orthographic_rh_gl(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    near,
                    far,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_points_in_front_of_camera_to_center() {
        let mut scene = Scene::new();
        let eye = scene.insert();
        scene.set_position(eye, Vec3::new(0.0, 0.0, 10.0));
        let camera = Camera::new(eye);
        let p = camera.project(&scene, Vec3::ZERO);
        assert!(p.x.abs() < 1e-6 && p.y.abs() < 1e-6, "{p}");
        assert!(p.z > -1.0 && p.z < 1.0, "point lies between clip planes");
    }

    #[test]
    fn set_aspect_updates_both_projections() {
        let mut scene = Scene::new();
        let eye = scene.insert();
        let mut camera = Camera::with_projection(
            eye,
            Projection::Orthographic {
                half_height: 5.0,
                aspect: 1.0,
                near: 0.1,
                far: 100.0,
            },
        );
        camera.set_aspect(2.0);
        let m = camera.projection_matrix();
        // Half width doubles, so x scale halves.
        assert!((m.x_axis.x - 0.1).abs() < 1e-6);
        assert!((camera.projection_matrix_inverse() * m).abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }
}
