// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Endpoints of lines.

use glam::Vec3;

use diorama_scene::CoordinateId;

use crate::line::{Line, LineSegment};

/// One end of a [`LineSegment`].
#[derive(Clone, Debug)]
pub struct LineEdge {
    line: LineSegment,
    t: f32,
    coordinate: CoordinateId,
}

impl LineEdge {
    /// The `t = 0` end of `line`.
    pub fn start(line: &LineSegment) -> Self {
        Self {
            coordinate: line.start(),
            line: line.clone(),
            t: 0.0,
        }
    }

    /// The `t = 1` end of `line`.
    pub fn end(line: &LineSegment) -> Self {
        Self {
            coordinate: line.end(),
            line: line.clone(),
            t: 1.0,
        }
    }

    /// The line this edge belongs to.
    pub fn line(&self) -> &LineSegment {
        &self.line
    }

    /// Curve parameter of the edge, `0.0` or `1.0`.
    pub fn t(&self) -> f32 {
        self.t
    }

    /// Coordinate that places the edge.
    pub fn coordinate(&self) -> CoordinateId {
        self.coordinate
    }

    /// Returns true for the `t = 0` end.
    pub fn is_start(&self) -> bool {
        self.t == 0.0
    }

    /// Cached world position of the edge.
    pub fn position(&self) -> Vec3 {
        self.line.position_at(self.t)
    }

    /// Tangent of the line at the edge.
    pub fn tangent(&self) -> Vec3 {
        self.line.direction_at(self.t)
    }

    /// Unit direction from the edge into its line.
    pub fn inward_direction(&self) -> Vec3 {
        if self.is_start() {
            self.tangent()
        } else {
            -self.tangent()
        }
    }
}
