// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use diorama_collide::ColliderId;
use diorama_lines::LineItemConnection;
use diorama_scene::CoordinateId;

use crate::types::{HandleContext, Handler};

/// Shared registry of colliders standing for line connections.
///
/// Clones share the registry, so every joint handler of an editor sees the same targets. The
/// registry also records which connections are being dragged, so one junction is never
/// dragged by two joints at once.
#[derive(Clone, Debug, Default)]
pub struct Connectables(Rc<RefCell<Registry>>);

#[derive(Debug, Default)]
struct Registry {
    markers: BTreeMap<ColliderId, LineItemConnection>,
    dragging: Vec<LineItemConnection>,
}

impl Connectables {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `collider` as the marker of `connection`, replacing any previous entry.
    pub fn insert(&self, collider: ColliderId, connection: LineItemConnection) {
        self.0.borrow_mut().markers.insert(collider, connection);
    }

    /// Unregister a collider.
    pub fn remove(&self, collider: ColliderId) -> Option<LineItemConnection> {
        self.0.borrow_mut().markers.remove(&collider)
    }

    /// Connection marked by `collider`.
    pub fn get(&self, collider: ColliderId) -> Option<LineItemConnection> {
        self.0.borrow().markers.get(&collider).cloned()
    }

    /// Collider marking `connection`.
    pub fn collider_of(&self, connection: &LineItemConnection) -> Option<ColliderId> {
        self.0
            .borrow()
            .markers
            .iter()
            .find(|(_, c)| c.ptr_eq(connection))
            .map(|(id, _)| *id)
    }

    /// Number of registered colliders.
    pub fn len(&self) -> usize {
        self.0.borrow().markers.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().markers.is_empty()
    }

    /// Returns true if a member of `connection`'s group is being dragged.
    pub fn is_dragging(&self, connection: &LineItemConnection) -> bool {
        let group = connection.group();
        let registry = self.0.borrow();
        group.iter().any(|m| registry.dragging.iter().any(|d| d.ptr_eq(m)))
    }

    fn begin_drag(&self, connection: &LineItemConnection) {
        self.0.borrow_mut().dragging.push(connection.clone());
    }

    fn end_drag(&self, connection: &LineItemConnection) {
        self.0.borrow_mut().dragging.retain(|d| !d.ptr_eq(connection));
    }
}

/// Predicate deciding, at start, whether a joint leaves its neighbors behind.
pub type DetachPredicate = dyn Fn() -> bool;

/// Drags a line connection with an inner handler and links it to what it is dropped on.
///
/// The connection keeps its links while dragged, so a joined point moves as a whole. Its own
/// marker collider is disabled during the drag so the drop target is hit through it. A joint
/// refuses to start while another member of its group is being dragged.
///
/// On `end`, every registered connectable under the pointer is connected, except ignored
/// colliders and the other end of the same line. A disconnectable joint then disconnects
/// from every previous neighbor that is neither under the pointer nor at the drop point.
///
/// With a detach predicate that holds at start, a disconnectable joint is held for the drag:
/// it moves without its neighbors, and the drop decides which links survive.
pub struct JointHandler {
    inner: Box<dyn Handler>,
    connection: LineItemConnection,
    connectables: Connectables,
    ignored: Vec<ColliderId>,
    disconnectable: bool,
    detach: Option<Box<DetachPredicate>>,
    holding: bool,
    tracked: Vec<LineItemConnection>,
}

impl core::fmt::Debug for JointHandler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JointHandler")
            .field("connection", &self.connection.id())
            .field("ignored", &self.ignored)
            .field("disconnectable", &self.disconnectable)
            .field("detach", &self.detach.is_some())
            .field("holding", &self.holding)
            .field("tracked", &self.tracked.len())
            .finish_non_exhaustive()
    }
}

impl JointHandler {
    /// Drag `connection` with `inner`, linking to entries of `connectables`.
    pub fn new(
        connection: LineItemConnection,
        connectables: Connectables,
        inner: Box<dyn Handler>,
    ) -> Self {
        Self {
            inner,
            connection,
            connectables,
            ignored: Vec::new(),
            disconnectable: false,
            detach: None,
            holding: false,
            tracked: Vec::new(),
        }
    }

    /// Never link to `colliders`.
    pub fn with_ignored(mut self, colliders: impl IntoIterator<Item = ColliderId>) -> Self {
        self.ignored.extend(colliders);
        self
    }

    /// Allow the drop to remove links to previous neighbors.
    pub fn with_disconnectable(mut self, disconnectable: bool) -> Self {
        self.disconnectable = disconnectable;
        self
    }

    /// Leave neighbors behind when `predicate` holds at start, e.g. while a modifier key is down.
    ///
    /// Only disconnectable joints detach.
    pub fn with_detach(mut self, predicate: impl Fn() -> bool + 'static) -> Self {
        self.detach = Some(Box::new(predicate));
        self
    }

    /// The dragged connection.
    pub fn connection(&self) -> &LineItemConnection {
        &self.connection
    }

    fn own_collider(&self) -> Option<ColliderId> {
        self.connectables.collider_of(&self.connection)
    }

    /// Registered connections under the pointer that this joint may link to.
    fn dropped_on(&self, ctx: &HandleContext<'_>) -> Vec<LineItemConnection> {
        let own = self.own_collider();
        let line = self.connection.edge().line().clone();
        let mut found: Vec<LineItemConnection> = Vec::new();
        for collider in ctx.hits.collided_colliders() {
            if Some(collider) == own || self.ignored.contains(&collider) {
                continue;
            }
            let Some(target) = self.connectables.get(collider) else {
                continue;
            };
            if target.edge().line().ptr_eq(&line) || found.iter().any(|f| f.ptr_eq(&target)) {
                continue;
            }
            found.push(target);
        }
        found
    }

    /// Remove links to previous neighbors that were left behind; snap onto those dropped on.
    fn settle_tracked(
        &self,
        ctx: &mut HandleContext<'_>,
        found: &[LineItemConnection],
    ) -> usize {
        let epsilon = self.connection.sync_epsilon();
        let mut dropped = 0;
        for old in &self.tracked {
            if !self.connection.is_connected(old) {
                continue;
            }
            let here = self.connection.position(ctx.scene);
            let there = old.position(ctx.scene);
            if there.distance(here) <= epsilon {
                continue;
            }
            if found.iter().any(|f| f.ptr_eq(old)) {
                ctx.scene.set_global_position(self.connection.coordinate(), there);
            } else if self.connection.disconnect(ctx.scene, old) {
                dropped += 1;
            }
        }
        dropped
    }
}

impl Handler for JointHandler {
    fn is_start(&self) -> bool {
        self.inner.is_start()
    }

    fn start(&mut self, ctx: &mut HandleContext<'_>) -> bool {
        if self.connectables.is_dragging(&self.connection) {
            tracing::debug!(
                connection = self.connection.id(),
                "joint start refused: junction already dragged"
            );
            return false;
        }
        if !self.inner.start(ctx) {
            return false;
        }
        self.tracked = self.connection.neighbors();
        self.holding = self.disconnectable && self.detach.as_ref().is_some_and(|d| d());
        if self.holding {
            self.connection.set_held(true);
        }
        self.connectables.begin_drag(&self.connection);
        if let Some(own) = self.own_collider() {
            ctx.colliders.set_enabled(own, false);
        }
        true
    }

    fn move_to(&mut self, ctx: &mut HandleContext<'_>) {
        self.inner.move_to(ctx);
    }

    fn end(&mut self, ctx: &mut HandleContext<'_>) {
        self.inner.end(ctx);
        if self.holding {
            self.connection.set_held(false);
            self.holding = false;
        }
        let found = self.dropped_on(ctx);
        if self.disconnectable {
            let dropped = self.settle_tracked(ctx, &found);
            if dropped > 0 {
                tracing::debug!(connection = self.connection.id(), dropped, "joint detached");
            }
        }
        for target in &found {
            if !self.connection.is_connected(target) {
                self.connection.connect(ctx.scene, target);
            }
        }
        self.tracked.clear();
        self.connectables.end_drag(&self.connection);
        if let Some(own) = self.own_collider() {
            ctx.colliders.set_enabled(own, true);
        }
        tracing::debug!(
            connection = self.connection.id(),
            neighbors = self.connection.neighbor_count(),
            "joint dropped"
        );
    }

    fn wheel(&mut self, ctx: &mut HandleContext<'_>, delta: f32) {
        self.inner.wheel(ctx, delta);
    }

    fn driven_coordinate(&self) -> Option<CoordinateId> {
        self.inner.driven_coordinate()
    }
}
