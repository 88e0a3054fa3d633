// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The line contract and straight segments between two coordinates.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use glam::Vec3;

use diorama_scene::{CoordinateId, Observers, Scene, Subscription};

use crate::error::Result;

/// A parametric curve over `t` in `0.0..=1.0`.
pub trait Line {
    /// Arc length.
    fn length(&self) -> f32;
    /// Points defining the curve, in world space.
    fn control_points(&self) -> Vec<Vec3>;
    /// World position at `t`.
    fn position_at(&self, t: f32) -> Vec3;
    /// Unit tangent at `t`, pointing toward increasing `t`. Zero for a degenerate line.
    fn direction_at(&self, t: f32) -> Vec3;
}

/// Callback fired after a segment recomputed its cached geometry.
pub type SegmentCallback = dyn Fn(&mut Scene, &LineSegment);

#[derive(Debug)]
struct SegmentInner {
    start: CoordinateId,
    end: CoordinateId,
    start_position: Vec3,
    end_position: Vec3,
    watch: Option<[Subscription; 2]>,
    updated: Observers<SegmentCallback>,
}

/// A straight line between the origins of two coordinates.
///
/// This is a shared handle; clones refer to the same segment. The segment follows its
/// endpoint coordinates: every update of either one refreshes the cached endpoints and then
/// notifies the segment's own `updated` subscribers.
#[derive(Clone, Debug)]
pub struct LineSegment(Rc<RefCell<SegmentInner>>);

impl LineSegment {
    /// Create a segment from `start` to `end` and start following both coordinates.
    pub fn new(scene: &mut Scene, start: CoordinateId, end: CoordinateId) -> Result<Self> {
        let inner = Rc::new(RefCell::new(SegmentInner {
            start,
            end,
            start_position: scene.world_origin(start),
            end_position: scene.world_origin(end),
            watch: None,
            updated: Observers::new(),
        }));
        let s = Self::watch(scene, &inner, start)?;
        let e = match Self::watch(scene, &inner, end) {
            Ok(e) => e,
            Err(err) => {
                let _ = scene.remove_updated(start, s);
                return Err(err.into());
            }
        };
        inner.borrow_mut().watch = Some([s, e]);
        Ok(Self(inner))
    }

    fn watch(
        scene: &mut Scene,
        inner: &Rc<RefCell<SegmentInner>>,
        id: CoordinateId,
    ) -> diorama_scene::Result<Subscription> {
        let weak: Weak<RefCell<SegmentInner>> = Rc::downgrade(inner);
        scene.on_updated(id, move |scene, _| {
            if let Some(inner) = weak.upgrade() {
                Self(inner).refresh(scene);
            }
        })
    }

    /// Re-read both endpoints from the scene and notify subscribers.
    pub fn refresh(&self, scene: &mut Scene) {
        let subscribers = {
            let mut inner = self.0.borrow_mut();
            let (start, end) = (inner.start, inner.end);
            inner.start_position = scene.world_origin(start);
            inner.end_position = scene.world_origin(end);
            inner.updated.snapshot()
        };
        for f in subscribers {
            f(scene, self);
        }
    }

    /// Coordinate at `t = 0`.
    pub fn start(&self) -> CoordinateId {
        self.0.borrow().start
    }

    /// Coordinate at `t = 1`.
    pub fn end(&self) -> CoordinateId {
        self.0.borrow().end
    }

    /// Cached world position of the start.
    pub fn start_position(&self) -> Vec3 {
        self.0.borrow().start_position
    }

    /// Cached world position of the end.
    pub fn end_position(&self) -> Vec3 {
        self.0.borrow().end_position
    }

    /// Subscribe to geometry refreshes.
    pub fn on_updated(&self, f: impl Fn(&mut Scene, &Self) + 'static) -> Subscription {
        self.0.borrow_mut().updated.subscribe(Rc::new(f))
    }

    /// Remove an `updated` subscriber.
    pub fn remove_updated(&self, token: Subscription) -> Result<()> {
        Ok(self.0.borrow_mut().updated.unsubscribe(token)?)
    }

    /// Stop following the endpoint coordinates and drop all subscribers.
    pub fn dispose(&self, scene: &mut Scene) {
        let (start, end, watch) = {
            let mut inner = self.0.borrow_mut();
            inner.updated.clear();
            (inner.start, inner.end, inner.watch.take())
        };
        if let Some([s, e]) = watch {
            // Endpoints may already be gone.
            let _ = scene.remove_updated(start, s);
            let _ = scene.remove_updated(end, e);
        }
    }

    /// Returns true if both handles refer to the same segment.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Line for LineSegment {
    fn length(&self) -> f32 {
        let inner = self.0.borrow();
        inner.start_position.distance(inner.end_position)
    }

    fn control_points(&self) -> Vec<Vec3> {
        let inner = self.0.borrow();
        alloc::vec![inner.start_position, inner.end_position]
    }

    fn position_at(&self, t: f32) -> Vec3 {
        let inner = self.0.borrow();
        inner.start_position.lerp(inner.end_position, t)
    }

    fn direction_at(&self, _t: f32) -> Vec3 {
        let inner = self.0.borrow();
        (inner.end_position - inner.start_position).normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn follows_endpoints_and_notifies() {
        let mut scene = Scene::new();
        let a = scene.insert();
        let b = scene.insert();
        scene.set_position(b, Vec3::new(4.0, 0.0, 0.0));
        let seg = LineSegment::new(&mut scene, a, b).unwrap();
        assert_eq!(seg.length(), 4.0);
        assert_eq!(seg.direction_at(0.3), Vec3::X);

        let seen = Rc::new(Cell::new(0.0_f32));
        let s2 = seen.clone();
        seg.on_updated(move |_, seg| s2.set(seg.length()));
        scene.set_position(a, Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(seen.get(), 5.0);
        assert_eq!(seg.position_at(0.5), Vec3::new(2.0, 1.5, 0.0));
        assert_eq!(seg.control_points().len(), 2);
    }

    #[test]
    fn dispose_stops_following() {
        let mut scene = Scene::new();
        let a = scene.insert();
        let b = scene.insert();
        let seg = LineSegment::new(&mut scene, a, b).unwrap();
        assert_eq!(scene.updated_len(a), 1);
        seg.dispose(&mut scene);
        assert_eq!(scene.updated_len(a), 0);
        assert_eq!(scene.updated_len(b), 0);
        scene.set_x(b, 2.0);
        assert_eq!(seg.length(), 0.0);
    }

    #[test]
    fn stale_endpoint_is_an_error() {
        let mut scene = Scene::new();
        let a = scene.insert();
        let b = scene.insert();
        scene.remove(b);
        assert!(LineSegment::new(&mut scene, a, b).is_err());
        assert_eq!(scene.updated_len(a), 0, "partial subscription is rolled back");
    }
}
