// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use glam::Vec3;

use diorama_scene::CoordinateId;

use super::{Drag, world_axis};
use crate::cursor::CursorModifier;
use crate::types::{HandleContext, Handler, HandlerState};

/// Moves a coordinate along one of its local axes.
#[derive(Debug)]
pub struct DirectionalMoveHandler {
    state: HandlerState,
    drag: Drag,
    axis: Vec3,
    world: Vec3,
}

impl DirectionalMoveHandler {
    /// Move `target` along its local `axis`.
    pub fn new(target: CoordinateId, axis: Vec3, cursor: CursorModifier) -> Self {
        Self {
            state: HandlerState::new(),
            drag: Drag::new(target, cursor),
            axis,
            world: Vec3::ZERO,
        }
    }

    /// Started flag, guards, and lifecycle observers.
    pub fn state(&self) -> &HandlerState {
        &self.state
    }

    /// Mutable access for registering guards and observers.
    pub fn state_mut(&mut self) -> &mut HandlerState {
        &mut self.state
    }

    /// The cursor modifier.
    pub fn cursor(&self) -> &CursorModifier {
        &self.drag.cursor
    }
}

impl Handler for DirectionalMoveHandler {
    fn is_start(&self) -> bool {
        self.state.is_started()
    }

    fn start(&mut self, ctx: &mut HandleContext<'_>) -> bool {
        if !self.state.guards_pass() {
            return false;
        }
        self.world = world_axis(ctx, self.drag.target(), self.axis);
        self.drag.begin(ctx);
        self.state.begin(ctx.scene);
        true
    }

    fn move_to(&mut self, ctx: &mut HandleContext<'_>) {
        self.drag.step(ctx, Some(&[self.world]));
    }

    fn end(&mut self, ctx: &mut HandleContext<'_>) {
        self.state.finish(ctx.scene);
    }

    fn driven_coordinate(&self) -> Option<CoordinateId> {
        Some(self.drag.target())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HandlesConfig, MouseControlHandles};
    use alloc::rc::Rc;
    use core::cell::RefCell;
    use diorama_collide::{Camera, Collider, ColliderSet, Raycaster, Raycasters};
    use diorama_scene::Scene;
    use kurbo::Point;

    #[test]
    fn drag_stays_on_axis() {
        let mut scene = Scene::new();
        let eye = scene.insert();
        scene.set_position(eye, Vec3::new(0.0, 0.0, 10.0));
        let camera = Camera::new(eye);
        let target = scene.insert();
        let mut colliders = ColliderSet::new();
        let id = colliders.insert(Collider::cuboid(target, Vec3::ONE));
        let mut rc = Raycaster::new();
        rc.add_target(id);
        let mut chain = Raycasters::new();
        chain.push(rc);
        let mut m = MouseControlHandles::new(chain, HandlesConfig::default());
        let h = Rc::new(RefCell::new(DirectionalMoveHandler::new(
            target,
            Vec3::X,
            CursorModifier::none(),
        )));
        m.add(id, h.clone());

        assert_eq!(m.mouse_down(&mut scene, &mut colliders, &camera, Point::ZERO).len(), 1);
        let _ = m.mouse_move(&mut scene, &mut colliders, &camera, Point::new(0.1, 0.2));
        let p = scene.world_origin(target);
        assert!(p.x > 0.0, "moved right: {p}");
        assert_eq!((p.y, p.z), (0.0, 0.0));
        let _ = m.mouse_up(&mut scene, &mut colliders, &camera, Point::new(0.1, 0.2));
        assert!(!h.borrow().is_start());
    }
}
