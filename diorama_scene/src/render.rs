// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contracts for the external rendering engine.
//!
//! The scene never inspects geometry. It hands opaque objects built by a
//! [`RenderingObjectBuilder`] to a [`Renderer`], keyed by [`CoordinateId`], and keeps
//! the renderer's transforms in sync through [`RenderBinding`].

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use glam::{Mat4, Vec2, Vec3};

use crate::error::Result;
use crate::observer::Subscription;
use crate::scene::Scene;
use crate::types::CoordinateId;

/// An RGB color with 8-bit channels.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    /// Red, 0..=255.
    pub r: u8,
    /// Green, 0..=255.
    pub g: u8,
    /// Blue, 0..=255.
    pub b: u8,
}

impl Color {
    /// Pure red, the conventional X axis color.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Pure green, the conventional Y axis color.
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Pure blue, the conventional Z axis color.
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    /// White.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Construct a color from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Factory for opaque renderable primitives.
pub trait RenderingObjectBuilder {
    /// Renderer-specific handle to a built object.
    type Object;

    /// An arrow from the local origin along `direction`.
    fn vector(&mut self, direction: Vec3, color: Color) -> Self::Object;
    /// An axis-aligned box with full edge lengths `size`.
    fn cuboid(&mut self, size: Vec3, color: Color) -> Self::Object;
    /// A sphere.
    fn sphere(&mut self, radius: f32, color: Color) -> Self::Object;
    /// A rectangle in the local XZ plane.
    fn plane(&mut self, width: f32, depth: f32, color: Color) -> Self::Object;
    /// A filled disc in the local XZ plane.
    fn circle(&mut self, radius: f32, color: Color) -> Self::Object;
    /// A ring in the local XZ plane.
    fn annulus(&mut self, inner: f32, outer: f32, color: Color) -> Self::Object;
    /// A filled polygon in the local XZ plane, given as (x, z) points.
    fn polygon(&mut self, points: &[Vec2], color: Color) -> Self::Object;
}

/// A scene graph owned by the rendering engine.
pub trait Renderer {
    /// Renderer-specific handle to a mounted object.
    type Object;

    /// Mount `object` at `coordinate` with the given world matrix.
    fn mount(&mut self, coordinate: CoordinateId, object: Self::Object, world: Mat4);
    /// Unmount the object at `coordinate`, returning it if one was mounted.
    fn unmount(&mut self, coordinate: CoordinateId) -> Option<Self::Object>;
    /// Update the world matrix of the object at `coordinate`.
    fn sync(&mut self, coordinate: CoordinateId, world: Mat4);
}

/// Sink for debug markers, injected where needed instead of a process-wide renderer.
pub trait DebugSink {
    /// Draw a marker at a world position.
    fn point(&mut self, position: Vec3, color: Color);
}

/// Keeps a mounted object's transform in sync with its coordinate.
///
/// Any update of the coordinate re-syncs it and every descendant, since their world
/// matrices depend on it. The binding holds the renderer weakly.
#[derive(Debug)]
pub struct RenderBinding {
    coordinate: CoordinateId,
    subscription: Subscription,
}

impl RenderBinding {
    /// Mount `object` on `renderer` and subscribe to updates of `coordinate`.
    pub fn mount<R: Renderer + 'static>(
        scene: &mut Scene,
        renderer: &Rc<RefCell<R>>,
        coordinate: CoordinateId,
        object: R::Object,
    ) -> Result<Self> {
        let weak = Rc::downgrade(renderer);
        let subscription = scene.on_updated(coordinate, move |scene, id| {
            let Some(renderer) = weak.upgrade() else {
                return;
            };
            let mut stack: Vec<CoordinateId> = alloc::vec![id];
            while let Some(c) = stack.pop() {
                renderer.borrow_mut().sync(c, scene.to_world(c));
                stack.extend_from_slice(scene.children(c));
            }
        })?;
        renderer
            .borrow_mut()
            .mount(coordinate, object, scene.to_world(coordinate));
        Ok(Self {
            coordinate,
            subscription,
        })
    }

    /// The bound coordinate.
    pub fn coordinate(&self) -> CoordinateId {
        self.coordinate
    }

    /// Unsubscribe and unmount, returning the object.
    pub fn unmount<R: Renderer>(
        self,
        scene: &mut Scene,
        renderer: &RefCell<R>,
    ) -> Option<R::Object> {
        // The coordinate may already be gone; its subscribers went with it.
        let _ = scene.remove_updated(self.coordinate, self.subscription);
        renderer.borrow_mut().unmount(self.coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;

    #[derive(Default)]
    struct Recorder {
        mounted: BTreeMap<CoordinateId, (&'static str, Mat4)>,
        syncs: usize,
    }

    impl Renderer for Recorder {
        type Object = &'static str;

        fn mount(&mut self, coordinate: CoordinateId, object: Self::Object, world: Mat4) {
            self.mounted.insert(coordinate, (object, world));
        }

        fn unmount(&mut self, coordinate: CoordinateId) -> Option<Self::Object> {
            self.mounted.remove(&coordinate).map(|(o, _)| o)
        }

        fn sync(&mut self, coordinate: CoordinateId, world: Mat4) {
            self.syncs += 1;
            if let Some(entry) = self.mounted.get_mut(&coordinate) {
                entry.1 = world;
            }
        }
    }

    /// Names each primitive after its kind and counts requests per color.
    #[derive(Default)]
    struct Catalog {
        by_color: BTreeMap<(u8, u8, u8), usize>,
    }

    impl Catalog {
        fn note(&mut self, color: Color, name: &'static str) -> &'static str {
            *self.by_color.entry((color.r, color.g, color.b)).or_default() += 1;
            name
        }
    }

    impl RenderingObjectBuilder for Catalog {
        type Object = &'static str;

        fn vector(&mut self, _direction: Vec3, color: Color) -> Self::Object {
            self.note(color, "vector")
        }
        fn cuboid(&mut self, _size: Vec3, color: Color) -> Self::Object {
            self.note(color, "box")
        }
        fn sphere(&mut self, _radius: f32, color: Color) -> Self::Object {
            self.note(color, "ball")
        }
        fn plane(&mut self, _width: f32, _depth: f32, color: Color) -> Self::Object {
            self.note(color, "plane")
        }
        fn circle(&mut self, _radius: f32, color: Color) -> Self::Object {
            self.note(color, "circle")
        }
        fn annulus(&mut self, _inner: f32, _outer: f32, color: Color) -> Self::Object {
            self.note(color, "annulus")
        }
        fn polygon(&mut self, _points: &[Vec2], color: Color) -> Self::Object {
            self.note(color, "polygon")
        }
    }

    #[test]
    fn built_objects_mount_at_their_coordinates() {
        let mut scene = Scene::new();
        let renderer = Rc::new(RefCell::new(Recorder::default()));
        let mut catalog = Catalog::default();
        let axes = [(Vec3::X, Color::RED), (Vec3::Y, Color::GREEN), (Vec3::Z, Color::BLUE)];
        let mut bindings = Vec::new();
        for (axis, color) in axes {
            let arrow = scene.insert();
            scene.set_position(arrow, axis);
            let object = catalog.vector(axis, color);
            bindings.push(RenderBinding::mount(&mut scene, &renderer, arrow, object).unwrap());
        }
        let ring = scene.insert();
        let object = catalog.annulus(0.8, 1.0, Color::RED);
        bindings.push(RenderBinding::mount(&mut scene, &renderer, ring, object).unwrap());

        assert_eq!(catalog.by_color[&(255, 0, 0)], 2);
        let r = renderer.borrow();
        assert_eq!(r.mounted.len(), 4);
        let first = bindings[0].coordinate();
        assert_eq!(r.mounted[&first], ("vector", Mat4::from_translation(Vec3::X)));
        assert_eq!(r.mounted[&ring].0, "annulus");
    }

    #[test]
    fn binding_tracks_coordinate_and_descendants() {
        let mut scene = Scene::new();
        let renderer = Rc::new(RefCell::new(Recorder::default()));
        let parent = scene.insert();
        let child = scene.insert();
        scene.add_child(parent, child).unwrap();
        let binding = RenderBinding::mount(&mut scene, &renderer, parent, "box").unwrap();
        renderer.borrow_mut().mount(child, "ball", scene.to_world(child));

        scene.set_position(parent, Vec3::new(0.0, 2.0, 0.0));
        let r = renderer.borrow();
        assert_eq!(r.mounted[&parent].1, Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)));
        assert_eq!(r.mounted[&child].1, Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)));
        drop(r);

        assert_eq!(binding.unmount(&mut scene, &renderer), Some("box"));
        let before = renderer.borrow().syncs;
        scene.set_x(parent, 1.0);
        assert_eq!(renderer.borrow().syncs, before, "unmounted binding must stop syncing");
    }
}
