// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen-to-world raycasting and hit resolution.

use alloc::vec::Vec;
use glam::{Vec2, Vec3};

use diorama_scene::Scene;

use crate::camera::CameraView;
use crate::ray::{Ray, RaycastConfig};
use crate::set::{ColliderId, ColliderSet};

/// World-space ray through a normalized pointer position (`-1.0..=1.0`, `y` up).
///
/// Two points at NDC depths `near_ndc` and `far_ndc` are unprojected through the camera's
/// inverse projection and placed by the camera's world matrix. The ray starts at the first.
pub fn pointer_ray(
    scene: &Scene,
    camera: &dyn CameraView,
    ndc: Vec2,
    config: &RaycastConfig,
) -> Ray {
    let inv = camera.projection_matrix_inverse();
    let world = scene.to_world(camera.coordinate());
    let near = world.transform_point3(inv.project_point3(ndc.extend(config.near_ndc)));
    let far = world.transform_point3(inv.project_point3(ndc.extend(config.far_ndc)));
    Ray::new(near, far - near)
}

/// One collider hit by the latest check.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RaycastHit {
    /// Collider that was hit.
    pub collider: ColliderId,
    /// Non-negative distance along the ray.
    pub distance: f32,
    /// World-space hit point.
    pub position: Vec3,
}

/// Resolves which registered colliders a pointer ray intersects.
///
/// Hits are a snapshot of the latest [`Raycaster::check`] and are replaced by the next one.
#[derive(Clone, Debug, Default)]
pub struct Raycaster {
    targets: Vec<ColliderId>,
    hits: Vec<RaycastHit>,
    last_ray: Option<Ray>,
    /// Tuning for unprojection and shape tests.
    pub config: RaycastConfig,
}

impl Raycaster {
    /// Create a raycaster with no targets and the default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a raycaster with an explicit config.
    pub fn with_config(config: RaycastConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Register a target. Returns false if it was already registered.
    pub fn add_target(&mut self, id: ColliderId) -> bool {
        if self.targets.contains(&id) {
            return false;
        }
        self.targets.push(id);
        true
    }

    /// Unregister a target. Returns false if it was not registered.
    pub fn remove_target(&mut self, id: ColliderId) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| *t != id);
        self.hits.retain(|h| h.collider != id);
        self.targets.len() != before
    }

    /// Returns true if `id` is a registered target.
    pub fn contains_target(&self, id: ColliderId) -> bool {
        self.targets.contains(&id)
    }

    /// Registered targets in registration order.
    pub fn targets(&self) -> &[ColliderId] {
        &self.targets
    }

    /// World-space ray through a normalized pointer position, using this raycaster's config.
    pub fn ray(&self, scene: &Scene, camera: &dyn CameraView, ndc: Vec2) -> Ray {
        pointer_ray(scene, camera, ndc, &self.config)
    }

    /// Cast the pointer ray and record the hits, nearest first.
    pub fn check(
        &mut self,
        scene: &Scene,
        colliders: &ColliderSet,
        camera: &dyn CameraView,
        ndc: Vec2,
    ) -> &[RaycastHit] {
        let ray = self.ray(scene, camera, ndc);
        self.check_ray(scene, colliders, &ray)
    }

    /// Test an explicit ray against every enabled target and record the hits, nearest first.
    ///
    /// Stale targets and hits behind the ray origin are skipped.
    pub fn check_ray(
        &mut self,
        scene: &Scene,
        colliders: &ColliderSet,
        ray: &Ray,
    ) -> &[RaycastHit] {
        self.hits.clear();
        for &id in &self.targets {
            let Some(collider) = colliders.get(id) else {
                continue;
            };
            if !collider.is_enabled() {
                continue;
            }
            let Some(distance) = collider.check_ray_with(scene, ray, &self.config) else {
                continue;
            };
            if distance < 0.0 {
                continue;
            }
            self.hits.push(RaycastHit {
                collider: id,
                distance,
                position: ray.at(distance),
            });
        }
        self.hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        self.last_ray = Some(*ray);
        tracing::trace!(targets = self.targets.len(), hits = self.hits.len(), "raycast");
        &self.hits
    }

    /// Drop the recorded hits.
    pub fn clear(&mut self) {
        self.hits.clear();
        self.last_ray = None;
    }

    /// Ray used by the latest check, if any.
    pub fn last_ray(&self) -> Option<Ray> {
        self.last_ray
    }

    /// Returns true if the latest check hit anything.
    pub fn has_collided(&self) -> bool {
        !self.hits.is_empty()
    }

    /// Hits of the latest check, nearest first.
    pub fn collided_details(&self) -> &[RaycastHit] {
        &self.hits
    }

    /// Colliders hit by the latest check, nearest first.
    pub fn collided_colliders(&self) -> impl Iterator<Item = ColliderId> + '_ {
        self.hits.iter().map(|h| h.collider)
    }

    /// Nearest hit of the latest check.
    pub fn nearest(&self) -> Option<&RaycastHit> {
        self.hits.first()
    }

    /// Hit record for `id` in the latest check.
    pub fn hit(&self, id: ColliderId) -> Option<&RaycastHit> {
        self.hits.iter().find(|h| h.collider == id)
    }

    /// Returns true if `id` was hit by the latest check.
    pub fn is_collided(&self, id: ColliderId) -> bool {
        self.hit(id).is_some()
    }

    /// Returns true if any recorded hit is on a non-transparent collider.
    pub fn blocks(&self, colliders: &ColliderSet) -> bool {
        self.hits
            .iter()
            .any(|h| colliders.get(h.collider).is_some_and(|c| !c.is_transparent()))
    }
}

/// Index of a raycaster inside a [`Raycasters`] chain.
pub type RaycasterIndex = usize;

/// An ordered chain of raycasters with an opacity policy.
///
/// [`Raycasters::check`] runs raycasters in priority order. Once one of them records a hit on a
/// non-transparent collider, every later raycaster is cleared instead of checked for that call.
#[derive(Clone, Debug, Default)]
pub struct Raycasters {
    chain: Vec<Raycaster>,
}

impl Raycasters {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raycaster with the lowest priority so far.
    pub fn push(&mut self, raycaster: Raycaster) -> RaycasterIndex {
        self.chain.push(raycaster);
        self.chain.len() - 1
    }

    /// Raycaster at `index`.
    pub fn get(&self, index: RaycasterIndex) -> Option<&Raycaster> {
        self.chain.get(index)
    }

    /// Raycaster at `index`, mutably.
    pub fn get_mut(&mut self, index: RaycasterIndex) -> Option<&mut Raycaster> {
        self.chain.get_mut(index)
    }

    /// Raycasters in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Raycaster> + '_ {
        self.chain.iter()
    }

    /// Number of raycasters.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Returns true if the chain holds no raycaster.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Check every raycaster in order, applying the blocking policy.
    pub fn check(
        &mut self,
        scene: &Scene,
        colliders: &ColliderSet,
        camera: &dyn CameraView,
        ndc: Vec2,
    ) {
        let mut blocked_by = None;
        for (index, raycaster) in self.chain.iter_mut().enumerate() {
            if blocked_by.is_some() {
                raycaster.clear();
                continue;
            }
            raycaster.check(scene, colliders, camera, ndc);
            if raycaster.blocks(colliders) {
                blocked_by = Some(index);
            }
        }
        if let Some(index) = blocked_by
            && index + 1 < self.chain.len()
        {
            tracing::debug!(
                blocker = index,
                suppressed = self.chain.len() - index - 1,
                "raycasters blocked"
            );
        }
    }

    /// Clear every raycaster.
    pub fn clear(&mut self) {
        for r in &mut self.chain {
            r.clear();
        }
    }

    /// Returns true if any raycaster recorded a hit.
    pub fn has_collided(&self) -> bool {
        self.chain.iter().any(Raycaster::has_collided)
    }

    /// All hits across the chain, in chain order then distance order.
    pub fn hits(&self) -> impl Iterator<Item = &RaycastHit> + '_ {
        self.chain.iter().flat_map(Raycaster::collided_details)
    }

    /// All colliders hit across the chain.
    pub fn collided_colliders(&self) -> impl Iterator<Item = ColliderId> + '_ {
        self.hits().map(|h| h.collider)
    }

    /// Hit record for `id` anywhere in the chain.
    pub fn hit(&self, id: ColliderId) -> Option<&RaycastHit> {
        self.hits().find(|h| h.collider == id)
    }

    /// Returns true if `id` was hit by any raycaster.
    pub fn is_collided(&self, id: ColliderId) -> bool {
        self.hit(id).is_some()
    }

    /// Nearest hit across the chain.
    pub fn nearest(&self) -> Option<&RaycastHit> {
        self.hits().min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Ray used by the first raycaster that ran in the latest check.
    pub fn last_ray(&self) -> Option<Ray> {
        self.chain.iter().find_map(Raycaster::last_ray)
    }
}
