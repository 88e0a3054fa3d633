// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: coordinate identifiers and local transform state.

use glam::{Mat4, Vec3};

/// Identifier for a coordinate in a [`Scene`](crate::Scene).
///
/// This is a small, copyable handle that stays stable across updates but becomes
/// invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed and every id issued for it goes stale.
/// - Reusing a freed slot bumps its generation, so the new id never equals an old one.
///
/// [`Scene::is_alive`](crate::Scene::is_alive) tells whether an id still names a live coordinate.
/// Side tables (render objects, colliders) key on this id rather than holding the coordinate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct CoordinateId(pub(crate) u32, pub(crate) u32);

impl CoordinateId {
    pub(crate) const fn new(slot: u32, stamp: u32) -> Self {
        Self(slot, stamp)
    }

    pub(crate) const fn slot(self) -> usize {
        self.0 as usize
    }

    /// Slot index, for use as a dense side-table key.
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Generation of the slot when this id was issued.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

/// Local transform state of a coordinate.
///
/// The effective local matrix is `scale * mirror * local`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTransform {
    /// Rotation and translation.
    pub local: Mat4,
    /// Scale, kept apart from `local` so rotations never shear.
    pub scale: Mat4,
    /// Axis reflections.
    pub mirror: Mat4,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            local: Mat4::IDENTITY,
            scale: Mat4::IDENTITY,
            mirror: Mat4::IDENTITY,
        }
    }
}

impl LocalTransform {
    /// The composed matrix `scale * mirror * local`.
    pub fn effective(&self) -> Mat4 {
        self.scale * self.mirror * self.local
    }

    /// Translation part of `local`.
    pub fn translation(&self) -> Vec3 {
        self.local.w_axis.truncate()
    }

    /// Scale factors of the scale matrix.
    pub fn scale_factors(&self) -> Vec3 {
        Vec3::new(self.scale.x_axis.x, self.scale.y_axis.y, self.scale.z_axis.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_is_scale_mirror_local() {
        let t = LocalTransform {
            local: Mat4::from_rotation_y(0.3) * Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            scale: Mat4::from_scale(Vec3::new(2.0, 1.0, 0.5)),
            mirror: Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0)),
        };
        assert_eq!(t.effective(), t.scale * t.mirror * t.local);
        assert_eq!(t.scale_factors(), Vec3::new(2.0, 1.0, 0.5));
    }
}
