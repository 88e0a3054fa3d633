// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use diorama_collide::{ColliderId, Raycaster};
use diorama_scene::CoordinateId;

use super::Drag;
use crate::cursor::CursorModifier;
use crate::types::{HandleContext, Handler, HandlerState};

/// Moves a coordinate onto whatever surface its own raycaster finds under the pointer.
///
/// Off every surface, the coordinate follows the pointer in the camera plane.
#[derive(Debug)]
pub struct RaycastMoveHandler {
    state: HandlerState,
    drag: Drag,
}

impl RaycastMoveHandler {
    /// Snap `target` to hits of `surfaces`, never to `ignored` colliders.
    pub fn new(target: CoordinateId, surfaces: Raycaster, ignored: Vec<ColliderId>) -> Self {
        Self {
            state: HandlerState::new(),
            drag: Drag::new(target, CursorModifier::collider(surfaces, ignored)),
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

impl Handler for RaycastMoveHandler {
    fn is_start(&self) -> bool {
        self.state.is_started()
    }

    fn start(&mut self, ctx: &mut HandleContext<'_>) -> bool {
        if !self.state.guards_pass() {
            return false;
        }
        self.drag.begin(ctx);
        self.state.begin(ctx.scene);
        true
    }

    fn move_to(&mut self, ctx: &mut HandleContext<'_>) {
        self.drag.step(ctx, None);
    }

    fn end(&mut self, ctx: &mut HandleContext<'_>) {
        self.state.finish(ctx.scene);
    }

    fn driven_coordinate(&self) -> Option<CoordinateId> {
        Some(self.drag.target())
    }
}
