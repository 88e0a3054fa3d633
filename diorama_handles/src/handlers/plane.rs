// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use glam::Vec3;

use diorama_scene::CoordinateId;

use super::{Drag, world_axis};
use crate::cursor::CursorModifier;
use crate::types::{HandleContext, Handler, HandlerState};

/// Moves a coordinate within the plane through it with a given local normal.
#[derive(Debug)]
pub struct PlaneMoveHandler {
    state: HandlerState,
    drag: Drag,
    normal: Vec3,
    axes: [Vec3; 2],
}

impl PlaneMoveHandler {
    /// Move `target` in the plane orthogonal to its local `normal`.
    pub fn new(target: CoordinateId, normal: Vec3, cursor: CursorModifier) -> Self {
        Self {
            state: HandlerState::new(),
            drag: Drag::new(target, cursor),
            normal,
            axes: [Vec3::ZERO; 2],
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

impl Handler for PlaneMoveHandler {
    fn is_start(&self) -> bool {
        self.state.is_started()
    }

    fn start(&mut self, ctx: &mut HandleContext<'_>) -> bool {
        if !self.state.guards_pass() {
            return false;
        }
        let normal = world_axis(ctx, self.drag.target(), self.normal);
        if normal == Vec3::ZERO {
            return false;
        }
        let (a, b) = normal.any_orthonormal_pair();
        self.axes = [a, b];
        self.drag.begin(ctx);
        self.state.begin(ctx.scene);
        true
    }

    fn move_to(&mut self, ctx: &mut HandleContext<'_>) {
        self.drag.step(ctx, Some(&self.axes));
    }

    fn end(&mut self, ctx: &mut HandleContext<'_>) {
        self.state.finish(ctx.scene);
    }

    fn driven_coordinate(&self) -> Option<CoordinateId> {
        Some(self.drag.target())
    }
}
