// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared setup for the demo programs.

use std::collections::BTreeMap;

use diorama_scene::{Color, CoordinateId, Renderer, RenderingObjectBuilder};
use glam::{Mat4, Vec2, Vec3};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to debug output for diorama.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,diorama=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

/// A primitive as requested from a [`RenderingObjectBuilder`].
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// An arrow.
    Vector { direction: Vec3, color: Color },
    /// A box with full edge lengths.
    Cuboid { size: Vec3, color: Color },
    /// A sphere.
    Sphere { radius: f32, color: Color },
    /// A rectangle in local XZ.
    Plane { width: f32, depth: f32, color: Color },
    /// A disc in local XZ.
    Circle { radius: f32, color: Color },
    /// A ring in local XZ.
    Annulus { inner: f32, outer: f32, color: Color },
    /// A polygon in local XZ.
    Polygon { points: Vec<Vec2>, color: Color },
}

/// Stand-in rendering engine: builds [`Shape`]s and records where they are mounted.
#[derive(Debug, Default)]
pub struct ShapeLog {
    mounted: BTreeMap<CoordinateId, (Shape, Mat4)>,
    built: usize,
    syncs: usize,
}

impl ShapeLog {
    /// Number of shapes built so far.
    pub fn built(&self) -> usize {
        self.built
    }

    /// Number of mounted shapes.
    pub fn mounted(&self) -> usize {
        self.mounted.len()
    }

    /// Number of transform syncs received.
    pub fn syncs(&self) -> usize {
        self.syncs
    }

    /// Shape mounted at `coordinate`.
    pub fn shape(&self, coordinate: CoordinateId) -> Option<&Shape> {
        self.mounted.get(&coordinate).map(|(s, _)| s)
    }

    /// Last world matrix of the shape at `coordinate`.
    pub fn world(&self, coordinate: CoordinateId) -> Option<Mat4> {
        self.mounted.get(&coordinate).map(|(_, m)| *m)
    }

    fn build(&mut self, shape: Shape) -> Shape {
        self.built += 1;
        tracing::trace!(?shape, "built");
        shape
    }
}

impl RenderingObjectBuilder for ShapeLog {
    type Object = Shape;

    fn vector(&mut self, direction: Vec3, color: Color) -> Shape {
        self.build(Shape::Vector { direction, color })
    }

    fn cuboid(&mut self, size: Vec3, color: Color) -> Shape {
        self.build(Shape::Cuboid { size, color })
    }

    fn sphere(&mut self, radius: f32, color: Color) -> Shape {
        self.build(Shape::Sphere { radius, color })
    }

    fn plane(&mut self, width: f32, depth: f32, color: Color) -> Shape {
        self.build(Shape::Plane {
            width,
            depth,
            color,
        })
    }

    fn circle(&mut self, radius: f32, color: Color) -> Shape {
        self.build(Shape::Circle { radius, color })
    }

    fn annulus(&mut self, inner: f32, outer: f32, color: Color) -> Shape {
        self.build(Shape::Annulus {
            inner,
            outer,
            color,
        })
    }

    fn polygon(&mut self, points: &[Vec2], color: Color) -> Shape {
        self.build(Shape::Polygon {
            points: points.to_vec(),
            color,
        })
    }
}

impl Renderer for ShapeLog {
    type Object = Shape;

    fn mount(&mut self, coordinate: CoordinateId, object: Shape, world: Mat4) {
        self.mounted.insert(coordinate, (object, world));
    }

    fn unmount(&mut self, coordinate: CoordinateId) -> Option<Shape> {
        self.mounted.remove(&coordinate).map(|(s, _)| s)
    }

    fn sync(&mut self, coordinate: CoordinateId, world: Mat4) {
        self.syncs += 1;
        if let Some(entry) = self.mounted.get_mut(&coordinate) {
            entry.1 = world;
        }
    }
}
