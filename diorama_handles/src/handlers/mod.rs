// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in handlers.
//!
//! The move handlers share one drag pattern: on `start` the target's world origin seeds the
//! cursor modifier and a screen-to-world basis is taken at that depth; on each move the pointer
//! delta is converted, constrained, accumulated, aligned, and written back if it changed.

mod directional;
mod joint;
mod plane;
mod proxy;
mod raycast;
mod rotation;

pub use directional::DirectionalMoveHandler;
pub use joint::{Connectables, DetachPredicate, JointHandler};
pub use plane::PlaneMoveHandler;
pub use proxy::ProxyHandler;
pub use raycast::RaycastMoveHandler;
pub use rotation::RotationHandler;

use glam::Vec3;

use diorama_scene::CoordinateId;

use crate::cursor::CursorModifier;
use crate::drag::{DragBasis, PositionWriter, constrain};
use crate::types::HandleContext;

/// Drag state shared by the move handlers.
#[derive(Clone, Debug)]
struct Drag {
    writer: PositionWriter,
    cursor: CursorModifier,
    basis: DragBasis,
}

impl Drag {
    fn new(target: CoordinateId, cursor: CursorModifier) -> Self {
        Self {
            writer: PositionWriter::new(target),
            cursor,
            basis: DragBasis::default(),
        }
    }

    fn target(&self) -> CoordinateId {
        self.writer.target()
    }

    fn begin(&mut self, ctx: &HandleContext<'_>) {
        let origin = ctx.scene.world_origin(self.target());
        self.cursor.reset(origin);
        self.writer.reset(origin);
        self.basis = DragBasis::at(ctx.scene, ctx.camera, origin);
    }

    /// Apply one pointer step. `axes` of `None` leaves the delta unconstrained.
    fn step(&mut self, ctx: &mut HandleContext<'_>, axes: Option<&[Vec3]>) -> bool {
        let world = self.basis.world_delta(ctx.delta);
        let world = axes.map_or(world, |axes| constrain(world, axes));
        self.cursor.add(world);
        self.cursor.track(ctx.scene, ctx.colliders, &ctx.ray);
        self.writer.write(ctx.scene, self.cursor.aligned_position())
    }
}

/// Direction of a local axis of `target` in world space.
fn world_axis(ctx: &HandleContext<'_>, target: CoordinateId, local: Vec3) -> Vec3 {
    ctx.scene
        .to_world(target)
        .transform_vector3(local)
        .normalize_or_zero()
}
