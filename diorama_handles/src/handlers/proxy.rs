// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::vec::Vec;

use diorama_collide::ColliderId;
use diorama_scene::CoordinateId;

use crate::types::{HandleContext, Handler};

/// Forwards to an inner handler, starting only when the nearest hit is one of its colliders.
///
/// Stacked or overlapping colliders register the same handle; the proxy lets the one in front
/// win instead of any collider in the hit set.
pub struct ProxyHandler {
    bound: Vec<ColliderId>,
    inner: Box<dyn Handler>,
}

impl core::fmt::Debug for ProxyHandler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProxyHandler")
            .field("bound", &self.bound)
            .field("started", &self.inner.is_start())
            .finish_non_exhaustive()
    }
}

impl ProxyHandler {
    /// Wrap `inner`, bound to `colliders`.
    pub fn new(colliders: impl IntoIterator<Item = ColliderId>, inner: Box<dyn Handler>) -> Self {
        Self {
            bound: colliders.into_iter().collect(),
            inner,
        }
    }

    /// The bound colliders.
    pub fn colliders(&self) -> &[ColliderId] {
        &self.bound
    }
}

impl Handler for ProxyHandler {
    fn is_start(&self) -> bool {
        self.inner.is_start()
    }

    fn start(&mut self, ctx: &mut HandleContext<'_>) -> bool {
        let nearest = ctx.hits.nearest().map(|h| h.collider);
        if !nearest.is_some_and(|c| self.bound.contains(&c)) {
            tracing::trace!(?nearest, "proxy skipped: nearest hit not bound");
            return false;
        }
        self.inner.start(ctx)
    }

    fn move_to(&mut self, ctx: &mut HandleContext<'_>) {
        self.inner.move_to(ctx);
    }

    fn end(&mut self, ctx: &mut HandleContext<'_>) {
        self.inner.end(ctx);
    }

    fn wheel(&mut self, ctx: &mut HandleContext<'_>, delta: f32) {
        self.inner.wheel(ctx, delta);
    }

    fn driven_coordinate(&self) -> Option<CoordinateId> {
        self.inner.driven_coordinate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::DirectionalMoveHandler;
    use crate::{CursorModifier, HandlesConfig, MouseControlHandles};
    use alloc::rc::Rc;
    use core::cell::RefCell;
    use diorama_collide::{Camera, Collider, ColliderSet, Raycaster, Raycasters};
    use diorama_scene::Scene;
    use glam::Vec3;
    use kurbo::Point;

    #[test]
    fn nearest_unbound_hit_does_not_start() {
        let mut scene = Scene::new();
        let eye = scene.insert();
        scene.set_position(eye, Vec3::new(0.0, 0.0, 10.0));
        let camera = Camera::new(eye);
        let plain = scene.insert();
        let proxied = scene.insert();
        let mut colliders = ColliderSet::new();
        let plain_id = colliders.insert(Collider::cuboid(plain, Vec3::ONE));
        let proxied_id = colliders.insert(Collider::cuboid(proxied, Vec3::ONE));

        // Only the plain target is raycast; the proxy is bound to the other box.
        let mut rc = Raycaster::new();
        rc.add_target(plain_id);
        let mut chain = Raycasters::new();
        chain.push(rc);
        let mut m = MouseControlHandles::new(chain, HandlesConfig::default());

        let inner = DirectionalMoveHandler::new(proxied, Vec3::X, CursorModifier::none());
        let proxy = Rc::new(RefCell::new(ProxyHandler::new([proxied_id], Box::new(inner))));
        m.add(plain_id, proxy.clone());

        let started = m.mouse_down(&mut scene, &mut colliders, &camera, Point::ZERO);
        assert!(started.is_empty());
        assert!(!proxy.borrow().is_start());

        // Raycasting the bound collider in front lets it through.
        if let Some(rc) = m.raycasters_mut().get_mut(0) {
            rc.add_target(proxied_id);
        }
        scene.set_z(proxied, 1.0);
        let started = m.mouse_down(&mut scene, &mut colliders, &camera, Point::ZERO);
        assert_eq!(started.len(), 1);
        assert!(proxy.borrow().is_start());
    }
}
