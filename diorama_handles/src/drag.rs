// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen-delta to world-delta conversion shared by the move handlers.

use glam::{Vec2, Vec3};

use diorama_collide::CameraView;
use diorama_scene::{CoordinateId, Scene};

/// World offset produced by one normalized unit of pointer motion, at a fixed depth.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DragBasis {
    /// World offset for `+1.0` along normalized x.
    pub right: Vec3,
    /// World offset for `+1.0` along normalized y.
    pub up: Vec3,
}

impl DragBasis {
    /// Basis at the depth of `world_point` as seen by `camera`.
    ///
    /// Unprojects the point's NDC position and its unit neighbors, so perspective and
    /// orthographic cameras are handled alike. Degenerate projections give a zero basis.
    pub fn at(scene: &Scene, camera: &dyn CameraView, world_point: Vec3) -> Self {
        let view_projection = camera.view_projection(scene);
        if view_projection.determinant().abs() < f32::EPSILON {
            return Self::default();
        }
        let inverse = view_projection.inverse();
        let ndc = view_projection.project_point3(world_point);
        let origin = inverse.project_point3(ndc);
        Self {
            right: inverse.project_point3(ndc + Vec3::X) - origin,
            up: inverse.project_point3(ndc + Vec3::Y) - origin,
        }
    }

    /// World offset for a normalized pointer delta.
    pub fn world_delta(&self, delta: Vec2) -> Vec3 {
        self.right * delta.x + self.up * delta.y
    }
}

/// Keep only the components of `delta` along `axes`.
///
/// Axes are normalized here; pass orthogonal axes for a plane.
pub fn constrain(delta: Vec3, axes: &[Vec3]) -> Vec3 {
    axes.iter()
        .map(|a| a.normalize_or_zero())
        .map(|a| a * delta.dot(a))
        .sum()
}

/// Writes positions to a target coordinate, skipping repeated values.
#[derive(Copy, Clone, Debug)]
pub struct PositionWriter {
    target: CoordinateId,
    last: Option<Vec3>,
}

impl PositionWriter {
    /// A writer for `target`.
    pub fn new(target: CoordinateId) -> Self {
        Self { target, last: None }
    }

    /// The written coordinate.
    pub fn target(&self) -> CoordinateId {
        self.target
    }

    /// Forget the last written value, e.g. at gesture start.
    pub fn reset(&mut self, current: Vec3) {
        self.last = Some(current);
    }

    /// Move the target's origin to `world` unless that was the last value written.
    ///
    /// Returns true if the scene was updated.
    pub fn write(&mut self, scene: &mut Scene, world: Vec3) -> bool {
        if self.last == Some(world) {
            return false;
        }
        self.last = Some(world);
        scene.set_global_position(self.target, world);
        true
    }
}
