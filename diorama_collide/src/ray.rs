// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! World-space rays and raycast tuning.

use glam::{Vec2, Vec3};
use kurbo::Point;

/// A half-line with a unit direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    /// Start of the ray.
    pub origin: Vec3,
    /// Unit direction. Zero if constructed from a zero vector.
    pub direction: Vec3,
}

impl Ray {
    /// Construct a ray, normalizing `direction`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at signed distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Tuning shared by colliders and raycasters.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RaycastConfig {
    /// NDC depth of the ray origin when unprojecting a pointer (`-1.0` is the near plane).
    pub near_ndc: f32,
    /// NDC depth of the second unprojected point used for the ray direction.
    pub far_ndc: f32,
    /// Rays whose direction has a smaller dot product with a plane normal are parallel to it.
    pub parallel_epsilon: f32,
    /// Distance reported by [`ColliderShape::Infinite`](crate::ColliderShape::Infinite).
    pub infinite_distance: f32,
}

impl Default for RaycastConfig {
    fn default() -> Self {
        Self {
            near_ndc: -1.0,
            far_ndc: 0.5,
            parallel_epsilon: 1e-5,
            infinite_distance: 1e-3,
        }
    }
}

/// Narrow a normalized pointer position (`x`, `y` in `-1.0..=1.0`, `y` up) to glam.
pub fn ndc(point: Point) -> Vec2 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Normalized pointer coordinates fit comfortably in f32."
    )]
    Vec2::new(point.x as f32, point.y as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_is_normalized() {
        let r = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(r.direction, Vec3::NEG_Z);
        assert_eq!(r.at(2.5), Vec3::new(0.0, 0.0, -2.5));
        assert_eq!(Ray::new(Vec3::ONE, Vec3::ZERO).direction, Vec3::ZERO);
    }
}
