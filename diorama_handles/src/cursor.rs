// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cursor modifiers: turn an accumulated raw drag offset into an aligned position.

use alloc::vec::Vec;
use glam::Vec3;

use diorama_collide::{ColliderId, ColliderSet, Ray, Raycaster};
use diorama_scene::Scene;

/// How a [`CursorModifier`] aligns positions.
#[derive(Clone, Debug, Default)]
pub enum Alignment {
    /// Origin plus the raw offset.
    #[default]
    None,
    /// Origin plus the raw offset, rounded per axis to multiples of `resolution`.
    Grid {
        /// Grid spacing in world units. Non-positive values disable snapping.
        resolution: f32,
    },
    /// The nearest hit of `raycaster` along the pointer ray, skipping `ignored` colliders.
    /// Falls back to origin plus the raw offset when nothing is hit.
    Collider {
        /// Raycaster whose targets are the snapping surfaces.
        raycaster: Raycaster,
        /// Colliders never snapped to, typically those of the dragged object itself.
        ignored: Vec<ColliderId>,
    },
}

/// Drag position state: an origin snapped at gesture start plus accumulated offsets.
#[derive(Clone, Debug, Default)]
pub struct CursorModifier {
    alignment: Alignment,
    origin: Vec3,
    offset: Vec3,
    snapped: Option<Vec3>,
}

impl CursorModifier {
    /// A modifier with the given alignment.
    pub fn new(alignment: Alignment) -> Self {
        Self {
            alignment,
            ..Self::default()
        }
    }

    /// Raw positions.
    pub fn none() -> Self {
        Self::new(Alignment::None)
    }

    /// Grid snapping.
    pub fn grid(resolution: f32) -> Self {
        Self::new(Alignment::Grid { resolution })
    }

    /// Snapping to raycast hits.
    pub fn collider(raycaster: Raycaster, ignored: Vec<ColliderId>) -> Self {
        Self::new(Alignment::Collider { raycaster, ignored })
    }

    /// The alignment strategy.
    pub fn alignment(&self) -> &Alignment {
        &self.alignment
    }

    /// Start a new gesture at `origin`.
    pub fn reset(&mut self, origin: Vec3) {
        self.origin = origin;
        self.offset = Vec3::ZERO;
        self.snapped = None;
    }

    /// Accumulate a raw world offset.
    pub fn add(&mut self, delta: Vec3) {
        self.offset += delta;
    }

    /// Re-cast the snapping raycaster along `ray`. No-op for other alignments.
    pub fn track(&mut self, scene: &Scene, colliders: &ColliderSet, ray: &Ray) {
        let Alignment::Collider { raycaster, ignored } = &mut self.alignment else {
            return;
        };
        let hits = raycaster.check_ray(scene, colliders, ray);
        self.snapped = hits
            .iter()
            .find(|h| !ignored.contains(&h.collider))
            .map(|h| h.position);
    }

    /// Raw position: origin plus accumulated offset.
    pub fn raw_position(&self) -> Vec3 {
        self.origin + self.offset
    }

    /// Position after alignment.
    pub fn aligned_position(&self) -> Vec3 {
        let raw = self.raw_position();
        match &self.alignment {
            Alignment::None => raw,
            Alignment::Grid { resolution } if *resolution > 0.0 => {
                (raw / *resolution).round() * *resolution
            }
            Alignment::Grid { .. } => raw,
            Alignment::Collider { .. } => self.snapped.unwrap_or(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diorama_collide::Collider;

    #[test]
    fn grid_rounds_each_axis() {
        let mut c = CursorModifier::grid(0.5);
        c.reset(Vec3::new(1.0, 0.0, -1.0));
        c.add(Vec3::new(0.2, 0.0, 0.0));
        assert_eq!(c.aligned_position(), Vec3::new(1.0, 0.0, -1.0));
        c.add(Vec3::new(0.1, 0.3, -0.3));
        assert_eq!(c.aligned_position(), Vec3::new(1.5, 0.5, -1.5));
        assert!(c.raw_position().abs_diff_eq(Vec3::new(1.3, 0.3, -1.3), 1e-6));
        c.reset(Vec3::ZERO);
        assert_eq!(c.aligned_position(), Vec3::ZERO);
    }

    #[test]
    fn collider_snaps_to_nearest_unignored_hit() {
        let mut scene = Scene::new();
        let mut set = ColliderSet::new();
        let ground = scene.insert();
        let lid = scene.insert();
        scene.set_y(lid, 2.0);
        let ground_id = set.insert(Collider::plane(ground, Vec3::Y));
        let lid_id = set.insert(Collider::plane(lid, Vec3::Y));
        let mut rc = Raycaster::new();
        rc.add_target(ground_id);
        rc.add_target(lid_id);

        let mut c = CursorModifier::collider(rc, alloc::vec![lid_id]);
        c.reset(Vec3::new(9.0, 9.0, 9.0));
        let down = Ray::new(Vec3::new(1.0, 5.0, 1.0), Vec3::NEG_Y);
        c.track(&scene, &set, &down);
        assert!(c.aligned_position().abs_diff_eq(Vec3::new(1.0, 0.0, 1.0), 1e-5));
        let away = Ray::new(Vec3::new(1.0, 5.0, 1.0), Vec3::Y);
        c.track(&scene, &set, &away);
        assert_eq!(c.aligned_position(), Vec3::new(9.0, 9.0, 9.0), "falls back to raw");
    }
}
