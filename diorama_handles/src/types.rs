// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handler contract, shared handler state, and the per-event context.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use glam::Vec2;

use diorama_collide::{CameraView, ColliderSet, Ray, Raycasters};
use diorama_scene::{CoordinateId, Observers, Scene, Subscription};

/// Identifier of a handle registered with a [`MouseControlHandles`](crate::MouseControlHandles).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub(crate) u64);

/// Interaction policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HandlesConfig {
    /// Refuse to start a handler whose driven coordinate is already driven by a handling handler.
    pub single_writer: bool,
}

impl Default for HandlesConfig {
    fn default() -> Self {
        Self {
            single_writer: true,
        }
    }
}

/// Everything a handler may touch while processing one pointer event.
///
/// `hits` is the raycast snapshot for this event only; handlers must not keep it.
pub struct HandleContext<'a> {
    /// The scene being edited.
    pub scene: &'a mut Scene,
    /// Colliders, so handlers can suppress their own during a drag.
    pub colliders: &'a mut ColliderSet,
    /// The viewing camera.
    pub camera: &'a dyn CameraView,
    /// Raycast results for this event.
    pub hits: &'a Raycasters,
    /// Normalized pointer position (`-1.0..=1.0`, `y` up).
    pub pointer: Vec2,
    /// Pointer movement since the previous event, in normalized units.
    pub delta: Vec2,
    /// World ray through the pointer.
    pub ray: Ray,
}

impl core::fmt::Debug for HandleContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HandleContext")
            .field("pointer", &self.pointer)
            .field("delta", &self.delta)
            .field("ray", &self.ray)
            .finish_non_exhaustive()
    }
}

/// Behavior attached to a handle.
///
/// Lifecycle per gesture: `start` (may refuse), any number of `move_to`, then `end`.
pub trait Handler {
    /// Returns true between an accepted `start` and the following `end`.
    fn is_start(&self) -> bool;

    /// Try to begin a gesture. Returns false to refuse.
    fn start(&mut self, ctx: &mut HandleContext<'_>) -> bool;

    /// Pointer moved during the gesture.
    fn move_to(&mut self, ctx: &mut HandleContext<'_>);

    /// Gesture ended.
    fn end(&mut self, ctx: &mut HandleContext<'_>);

    /// Wheel input, in lines.
    fn wheel(&mut self, _ctx: &mut HandleContext<'_>, _delta: f32) {}

    /// Coordinate this handler writes while active, if any.
    fn driven_coordinate(&self) -> Option<CoordinateId> {
        None
    }
}

/// A handler shared between the manager and guards of other handlers.
pub type SharedHandler = Rc<RefCell<dyn Handler>>;

/// Predicate consulted before starting. Returning false refuses the start.
pub type StartGuard = dyn Fn() -> bool;

/// Callback fired when a handler accepted a start or ended.
pub type StateCallback = dyn Fn(&mut Scene);

/// Started flag, starting guards, and lifecycle observers shared by the built-in handlers.
#[derive(Default)]
pub struct HandlerState {
    started: bool,
    guards: Vec<Rc<StartGuard>>,
    on_started: Observers<StateCallback>,
    on_ended: Observers<StateCallback>,
}

impl core::fmt::Debug for HandlerState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HandlerState")
            .field("started", &self.started)
            .field("guards", &self.guards.len())
            .finish_non_exhaustive()
    }
}

impl HandlerState {
    /// A stopped state with no guards.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while started.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Add a starting guard.
    pub fn add_guard(&mut self, guard: impl Fn() -> bool + 'static) {
        self.guards.push(Rc::new(guard));
    }

    /// Refuse to start while `other` is started.
    pub fn exclude(&mut self, other: &SharedHandler) {
        let other = Rc::downgrade(other);
        self.add_guard(move || {
            other
                .upgrade()
                // A handler that is mutably borrowed is the one being started.
                .is_none_or(|h| h.try_borrow().map_or(true, |h| !h.is_start()))
        });
    }

    /// Returns true if every guard allows starting.
    pub fn guards_pass(&self) -> bool {
        self.guards.iter().all(|g| g())
    }

    /// Mark started and notify. Callers check [`HandlerState::guards_pass`] first.
    pub fn begin(&mut self, scene: &mut Scene) {
        self.started = true;
        for f in self.on_started.snapshot() {
            f(scene);
        }
    }

    /// Mark stopped and notify. No-op when not started.
    pub fn finish(&mut self, scene: &mut Scene) {
        if !self.started {
            return;
        }
        self.started = false;
        for f in self.on_ended.snapshot() {
            f(scene);
        }
    }

    /// Subscribe to accepted starts.
    pub fn on_started(&mut self, f: impl Fn(&mut Scene) + 'static) -> Subscription {
        self.on_started.subscribe(Rc::new(f))
    }

    /// Subscribe to ends.
    pub fn on_ended(&mut self, f: impl Fn(&mut Scene) + 'static) -> Subscription {
        self.on_ended.subscribe(Rc::new(f))
    }
}
