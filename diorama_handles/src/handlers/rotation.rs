// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;
use core::cell::RefCell;
use glam::Vec3;

use diorama_collide::{Ray, RaycastConfig};
use diorama_scene::math::signed_angle;
use diorama_scene::{Color, CoordinateId, DebugSink};

use super::world_axis;
use crate::types::{HandleContext, Handler, HandlerState};

const MARKER: Color = Color::rgb(255, 200, 0);

/// Rotates a coordinate about one of its local axes by following the pointer around it.
///
/// The pointer ray is intersected with the plane through the target orthogonal to the axis.
/// The first intersection fixes a reference direction; each move applies the change in signed
/// angle since the previous move.
pub struct RotationHandler {
    state: HandlerState,
    target: CoordinateId,
    axis: Vec3,
    config: RaycastConfig,
    debug: Option<Rc<RefCell<dyn DebugSink>>>,
    center: Vec3,
    world_axis: Vec3,
    reference: Vec3,
    angle: f32,
}

impl core::fmt::Debug for RotationHandler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RotationHandler")
            .field("state", &self.state)
            .field("target", &self.target)
            .field("axis", &self.axis)
            .field("angle", &self.angle)
            .finish_non_exhaustive()
    }
}

impl RotationHandler {
    /// Rotate `target` about its local `axis`.
    pub fn new(target: CoordinateId, axis: Vec3) -> Self {
        Self {
            state: HandlerState::new(),
            target,
            axis,
            config: RaycastConfig::default(),
            debug: None,
            center: Vec3::ZERO,
            world_axis: Vec3::ZERO,
            reference: Vec3::ZERO,
            angle: 0.0,
        }
    }

    /// Draw construction-plane hits on `sink`.
    pub fn with_debug(mut self, sink: Rc<RefCell<dyn DebugSink>>) -> Self {
        self.debug = Some(sink);
        self
    }

    /// Started flag, guards, and lifecycle observers.
    pub fn state(&self) -> &HandlerState {
        &self.state
    }

    /// Mutable access for registering guards and observers.
    pub fn state_mut(&mut self) -> &mut HandlerState {
        &mut self.state
    }

    /// Total angle applied during the current gesture, in radians.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let denom = ray.direction.dot(self.world_axis);
        if denom.abs() < self.config.parallel_epsilon {
            return None;
        }
        let t = (self.center - ray.origin).dot(self.world_axis) / denom;
        (t >= 0.0).then(|| ray.at(t))
    }

    fn mark(&self, at: Vec3) {
        if let Some(sink) = &self.debug {
            sink.borrow_mut().point(at, MARKER);
        }
    }
}

impl Handler for RotationHandler {
    fn is_start(&self) -> bool {
        self.state.is_started()
    }

    fn start(&mut self, ctx: &mut HandleContext<'_>) -> bool {
        if !self.state.guards_pass() {
            return false;
        }
        self.center = ctx.scene.world_origin(self.target);
        self.world_axis = world_axis(ctx, self.target, self.axis);
        let Some(hit) = self.intersect(&ctx.ray) else {
            tracing::debug!(
                coordinate = ?self.target,
                "rotation refused: ray parallel to rotation plane"
            );
            return false;
        };
        let reference = hit - self.center;
        if reference.length_squared() < f32::EPSILON {
            return false;
        }
        self.reference = reference;
        self.angle = 0.0;
        self.mark(hit);
        self.state.begin(ctx.scene);
        true
    }

    fn move_to(&mut self, ctx: &mut HandleContext<'_>) {
        let Some(hit) = self.intersect(&ctx.ray) else {
            return;
        };
        self.mark(hit);
        let current = hit - self.center;
        let angle = signed_angle(self.reference, current, self.world_axis);
        let delta = angle - self.angle;
        if delta != 0.0 {
            self.angle = angle;
            ctx.scene.rotate(self.target, self.axis, delta);
        }
    }

    fn end(&mut self, ctx: &mut HandleContext<'_>) {
        self.state.finish(ctx.scene);
    }

    fn driven_coordinate(&self) -> Option<CoordinateId> {
        Some(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HandlesConfig, MouseControlHandles};
    use alloc::vec::Vec;
    use diorama_collide::{Camera, Collider, ColliderSet, Raycaster, Raycasters};
    use diorama_scene::Scene;
    use kurbo::Point;

    #[derive(Default)]
    struct Points(Vec<Vec3>);

    impl DebugSink for Points {
        fn point(&mut self, position: Vec3, _color: Color) {
            self.0.push(position);
        }
    }

    #[test]
    fn reference_follows_pointer() {
        let mut scene = Scene::new();
        let eye = scene.insert();
        scene.set_position(eye, Vec3::new(0.0, 0.0, 10.0));
        let camera = Camera::new(eye);
        let target = scene.insert();
        let mut colliders = ColliderSet::new();
        let disc = colliders.insert(Collider::plane(target, Vec3::Z));
        let mut rc = Raycaster::new();
        rc.add_target(disc);
        let mut chain = Raycasters::new();
        chain.push(rc);
        let mut m = MouseControlHandles::new(chain, HandlesConfig::default());
        let sink = Rc::new(RefCell::new(Points::default()));
        let h = RotationHandler::new(target, Vec3::Z).with_debug(sink.clone());
        let h = Rc::new(RefCell::new(h));
        m.add(disc, h.clone());

        let started = m.mouse_down(&mut scene, &mut colliders, &camera, Point::new(0.5, 0.0));
        assert_eq!(started.len(), 1);
        // A quarter turn counter-clockwise, in two steps.
        let _ = m.mouse_move(&mut scene, &mut colliders, &camera, Point::new(0.5, 0.5));
        let _ = m.mouse_move(&mut scene, &mut colliders, &camera, Point::new(0.0, 0.5));
        let _ = m.mouse_up(&mut scene, &mut colliders, &camera, Point::new(0.0, 0.5));

        let x = scene.to_world(target).transform_vector3(Vec3::X);
        assert!(x.abs_diff_eq(Vec3::Y, 1e-4), "local X now points up: {x}");
        assert!((h.borrow().angle() - core::f32::consts::FRAC_PI_2).abs() < 1e-4);
        assert_eq!(sink.borrow().0.len(), 3);
    }
}
