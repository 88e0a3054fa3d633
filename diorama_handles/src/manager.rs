// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer routing to handles.
//!
//! ## Overview
//!
//! Re-checks the raycaster chain on every pointer event and routes the event to handlers.
//!
//! ## Routing
//!
//! - Down: every handle whose colliders were hit and whose handler is idle is offered `start`, in
//!   registration order. Handlers that accept join the *handling* set for this gesture.
//! - Move: only handling handlers receive `move_to`. With nothing handling, the move updates
//!   hover state for the handle of the nearest hit instead.
//!
//! A press or a removal clears the hover. Its `Leave` is queued and returned by the next
//! [`MouseControlHandles::mouse_move`].
//! - Up: every handling handler receives `end`, then the handling set is cleared.
//! - Wheel: handling handlers receive it, or the hit handles when nothing is handling.
//!
//! ## Single writer
//!
//! With [`HandlesConfig::single_writer`] set, a handler is not offered `start` while another
//! handling handler drives the same coordinate.
//!
//! ## See Also
//!
//! [`hover`](crate::hover) for the transitions returned by [`MouseControlHandles::mouse_move`].

use alloc::rc::Rc;
use alloc::vec::Vec;
use glam::Vec2;
use kurbo::Point;

use diorama_collide::{
    CameraView, ColliderId, ColliderSet, Ray, RaycastConfig, Raycasters, ndc, pointer_ray,
};
use diorama_scene::{CoordinateId, Observers, Scene, Subscription};

use crate::hover::{HoverEvent, HoverState};
use crate::types::{HandleContext, HandleId, HandlesConfig, SharedHandler};

/// Callback fired before a pointer event is routed, with the normalized pointer position.
pub type PointerCallback = dyn Fn(&mut Scene, Vec2);

struct Handle {
    id: HandleId,
    colliders: Vec<ColliderId>,
    handler: SharedHandler,
}

impl Handle {
    fn is_hit(&self, hits: &Raycasters) -> bool {
        self.colliders.iter().any(|c| hits.is_collided(*c))
    }
}

/// Routes pointer events to (collider, handler) handles.
pub struct MouseControlHandles {
    handles: Vec<Handle>,
    handling: Vec<HandleId>,
    raycasters: Raycasters,
    hover: HoverState<HandleId>,
    pending_hover: Vec<HoverEvent<HandleId>>,
    config: HandlesConfig,
    next_id: u64,
    last_pointer: Option<Vec2>,
    before_down: Observers<PointerCallback>,
    before_move: Observers<PointerCallback>,
    before_up: Observers<PointerCallback>,
}

impl core::fmt::Debug for MouseControlHandles {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MouseControlHandles")
            .field("handles", &self.handles.len())
            .field("handling", &self.handling)
            .field("hovered", &self.hover.current())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Copy, Clone)]
enum Phase {
    Down,
    Move,
    Up,
}

impl MouseControlHandles {
    /// Create a manager over a raycaster chain.
    pub fn new(raycasters: Raycasters, config: HandlesConfig) -> Self {
        Self {
            handles: Vec::new(),
            handling: Vec::new(),
            raycasters,
            hover: HoverState::new(),
            pending_hover: Vec::new(),
            config,
            next_id: 0,
            last_pointer: None,
            before_down: Observers::new(),
            before_move: Observers::new(),
            before_up: Observers::new(),
        }
    }

    /// The interaction policy.
    pub fn config(&self) -> HandlesConfig {
        self.config
    }

    /// The raycaster chain.
    pub fn raycasters(&self) -> &Raycasters {
        &self.raycasters
    }

    /// The raycaster chain, for registering targets.
    pub fn raycasters_mut(&mut self) -> &mut Raycasters {
        &mut self.raycasters
    }

    /// Register a handle triggered by `collider`.
    pub fn add(&mut self, collider: ColliderId, handler: SharedHandler) -> HandleId {
        self.add_with(&[collider], handler)
    }

    /// Register a handle triggered by any of `colliders`.
    pub fn add_with(&mut self, colliders: &[ColliderId], handler: SharedHandler) -> HandleId {
        self.next_id += 1;
        let id = HandleId(self.next_id);
        self.handles.push(Handle {
            id,
            colliders: colliders.to_vec(),
            handler,
        });
        id
    }

    /// Unregister a handle. A handling handler is dropped without `end`.
    pub fn remove(&mut self, id: HandleId) -> bool {
        let before = self.handles.len();
        self.handles.retain(|h| h.id != id);
        self.handling.retain(|h| *h != id);
        if self.hover.current() == Some(id) {
            self.pending_hover.extend(self.hover.clear());
        }
        self.handles.len() != before
    }

    /// The handler of a handle.
    pub fn handler(&self, id: HandleId) -> Option<SharedHandler> {
        self.find(id).map(|h| h.handler.clone())
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true if no handle is registered.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Handles in the current gesture, in start order.
    pub fn handling(&self) -> &[HandleId] {
        &self.handling
    }

    /// Returns true during a gesture.
    pub fn is_handling(&self) -> bool {
        !self.handling.is_empty()
    }

    /// The hovered handle.
    pub fn hovered(&self) -> Option<HandleId> {
        self.hover.current()
    }

    /// Subscribe to pointer-down before routing.
    pub fn on_before_down(&mut self, f: impl Fn(&mut Scene, Vec2) + 'static) -> Subscription {
        self.before_down.subscribe(Rc::new(f))
    }

    /// Subscribe to pointer-move before routing.
    pub fn on_before_move(&mut self, f: impl Fn(&mut Scene, Vec2) + 'static) -> Subscription {
        self.before_move.subscribe(Rc::new(f))
    }

    /// Subscribe to pointer-up before routing.
    pub fn on_before_up(&mut self, f: impl Fn(&mut Scene, Vec2) + 'static) -> Subscription {
        self.before_up.subscribe(Rc::new(f))
    }

    /// Pointer pressed at a normalized position. Returns the handles that started.
    pub fn mouse_down(
        &mut self,
        scene: &mut Scene,
        colliders: &mut ColliderSet,
        camera: &dyn CameraView,
        pointer: Point,
    ) -> Vec<HandleId> {
        let pointer = ndc(pointer);
        self.prelude(Phase::Down, scene, colliders, camera, pointer);
        self.pending_hover.extend(self.hover.clear());
        let (delta, ray) = self.advance(scene, camera, pointer);
        let mut ctx = HandleContext {
            scene,
            colliders,
            camera,
            hits: &self.raycasters,
            pointer,
            delta,
            ray,
        };

        let mut started = Vec::new();
        for handle in &self.handles {
            if self.handling.contains(&handle.id) || !handle.is_hit(ctx.hits) {
                continue;
            }
            let Ok(mut handler) = handle.handler.try_borrow_mut() else {
                continue;
            };
            if handler.is_start() {
                continue;
            }
            if self.config.single_writer
                && let Some(driven) = handler.driven_coordinate()
                && self.drives(driven)
            {
                tracing::debug!(
                    handle = handle.id.0,
                    ?driven,
                    "start refused: coordinate already driven"
                );
                continue;
            }
            if handler.start(&mut ctx) {
                tracing::debug!(handle = handle.id.0, "handle started");
                self.handling.push(handle.id);
                started.push(handle.id);
            }
        }
        started
    }

    /// Pointer moved to a normalized position.
    ///
    /// Returns queued and new hover transitions. During a gesture only queued ones are returned.
    pub fn mouse_move(
        &mut self,
        scene: &mut Scene,
        colliders: &mut ColliderSet,
        camera: &dyn CameraView,
        pointer: Point,
    ) -> Vec<HoverEvent<HandleId>> {
        let pointer = ndc(pointer);
        self.prelude(Phase::Move, scene, colliders, camera, pointer);
        let mut events = core::mem::take(&mut self.pending_hover);
        if self.handling.is_empty() {
            let nearest = self.raycasters.nearest().map(|h| h.collider);
            let hovered = nearest.and_then(|c| {
                self.handles
                    .iter()
                    .find(|h| h.colliders.contains(&c))
                    .map(|h| h.id)
            });
            events.extend(self.hover.update(hovered));
            return events;
        }
        let (delta, ray) = self.advance(scene, camera, pointer);
        let mut ctx = HandleContext {
            scene,
            colliders,
            camera,
            hits: &self.raycasters,
            pointer,
            delta,
            ray,
        };
        for id in &self.handling {
            if let Some(handle) = self.find(*id)
                && let Ok(mut handler) = handle.handler.try_borrow_mut()
            {
                handler.move_to(&mut ctx);
            }
        }
        events
    }

    /// Pointer released at a normalized position. Returns the handles that ended.
    pub fn mouse_up(
        &mut self,
        scene: &mut Scene,
        colliders: &mut ColliderSet,
        camera: &dyn CameraView,
        pointer: Point,
    ) -> Vec<HandleId> {
        let pointer = ndc(pointer);
        self.prelude(Phase::Up, scene, colliders, camera, pointer);
        let ended = core::mem::take(&mut self.handling);
        let (delta, ray) = self.advance(scene, camera, pointer);
        self.last_pointer = None;
        let mut ctx = HandleContext {
            scene,
            colliders,
            camera,
            hits: &self.raycasters,
            pointer,
            delta,
            ray,
        };
        for id in &ended {
            if let Some(handle) = self.find(*id)
                && let Ok(mut handler) = handle.handler.try_borrow_mut()
            {
                handler.end(&mut ctx);
                tracing::debug!(handle = id.0, "handle ended");
            }
        }
        ended
    }

    /// Wheel input at a normalized position, in lines.
    pub fn wheel(
        &mut self,
        scene: &mut Scene,
        colliders: &mut ColliderSet,
        camera: &dyn CameraView,
        pointer: Point,
        delta: f32,
    ) {
        let pointer = ndc(pointer);
        self.raycasters.check(scene, colliders, camera, pointer);
        let targets: Vec<HandleId> = if self.handling.is_empty() {
            self.handles
                .iter()
                .filter(|h| h.is_hit(&self.raycasters))
                .map(|h| h.id)
                .collect()
        } else {
            self.handling.clone()
        };
        let (motion, ray) = self.advance(scene, camera, pointer);
        let mut ctx = HandleContext {
            scene,
            colliders,
            camera,
            hits: &self.raycasters,
            pointer,
            delta: motion,
            ray,
        };
        for id in targets {
            if let Some(handle) = self.find(id)
                && let Ok(mut handler) = handle.handler.try_borrow_mut()
            {
                handler.wheel(&mut ctx, delta);
            }
        }
    }

    fn prelude(
        &mut self,
        phase: Phase,
        scene: &mut Scene,
        colliders: &ColliderSet,
        camera: &dyn CameraView,
        pointer: Vec2,
    ) {
        let subscribers = match phase {
            Phase::Down => self.before_down.snapshot(),
            Phase::Move => self.before_move.snapshot(),
            Phase::Up => self.before_up.snapshot(),
        };
        for f in subscribers {
            f(scene, pointer);
        }
        self.raycasters.check(scene, colliders, camera, pointer);
        tracing::trace!(hits = self.raycasters.hits().count(), "pointer raycast");
    }

    /// Pointer delta since the previous event, and the ray for this one.
    fn advance(&mut self, scene: &Scene, camera: &dyn CameraView, pointer: Vec2) -> (Vec2, Ray) {
        let delta = self.last_pointer.map_or(Vec2::ZERO, |last| pointer - last);
        self.last_pointer = Some(pointer);
        let ray = self
            .raycasters
            .last_ray()
            .unwrap_or_else(|| pointer_ray(scene, camera, pointer, &RaycastConfig::default()));
        (delta, ray)
    }

    fn find(&self, id: HandleId) -> Option<&Handle> {
        self.handles.iter().find(|h| h.id == id)
    }

    fn drives(&self, coordinate: CoordinateId) -> bool {
        self.handling.iter().any(|id| {
            self.find(*id)
                .and_then(|h| h.handler.try_borrow().ok())
                .and_then(|h| h.driven_coordinate())
                == Some(coordinate)
        })
    }
}
