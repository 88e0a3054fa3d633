// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Graph-linked line endpoints with synchronized positions.
//!
//! Connecting two connections installs a pair of position-sync subscriptions, one on each
//! side's coordinate. Whichever side moves, the other is moved to match. A sync is skipped when
//! the positions already agree within [`LineConfig::sync_epsilon`], which ends the ping-pong
//! after one round.
//!
//! Connections linked directly or through other connections form a *group*. Every member of a
//! group whose membership changed receives a `group_changed` notification, after the
//! `connected`/`disconnected` notifications of the two parties.
//!
//! A *held* connection keeps its links but stops mirroring its own moves onto its neighbors,
//! so it can be dragged out of a junction and the link decided when it is dropped.

use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use glam::Vec3;

use diorama_scene::{CoordinateId, Observers, Scene, Subscription};

use crate::config::LineConfig;
use crate::edge::LineEdge;
use crate::error::Result;

/// Callback fired on a connect or disconnect, with `(this, other)`.
pub type ConnectionCallback = dyn Fn(&mut Scene, &LineItemConnection, &LineItemConnection);

/// Callback fired when the group of a connection changed.
pub type GroupCallback = dyn Fn(&mut Scene, &LineItemConnection);

#[derive(Debug)]
struct Neighbor {
    id: u64,
    connection: Weak<RefCell<ConnectionInner>>,
    // Installed on our own coordinate; mirrors it onto the neighbor.
    sync: Subscription,
}

#[derive(Debug)]
struct ConnectionInner {
    id: u64,
    edge: LineEdge,
    config: LineConfig,
    held: Rc<Cell<bool>>,
    neighbors: Vec<Neighbor>,
    connected: Observers<ConnectionCallback>,
    disconnected: Observers<ConnectionCallback>,
    group_changed: Observers<GroupCallback>,
}

/// An endpoint of a line that can be linked to other endpoints.
///
/// This is a shared handle; clones refer to the same connection.
#[derive(Clone, Debug)]
pub struct LineItemConnection(Rc<RefCell<ConnectionInner>>);

impl LineItemConnection {
    /// Create an unconnected connection at `edge`.
    pub fn new(scene: &mut Scene, edge: LineEdge, config: LineConfig) -> Self {
        Self(Rc::new(RefCell::new(ConnectionInner {
            id: scene.uid(),
            edge,
            config,
            held: Rc::new(Cell::new(false)),
            neighbors: Vec::new(),
            connected: Observers::new(),
            disconnected: Observers::new(),
            group_changed: Observers::new(),
        })))
    }

    /// Scene-unique id. Lower ids lead their group.
    pub fn id(&self) -> u64 {
        self.0.borrow().id
    }

    /// The line edge this connection sits on.
    pub fn edge(&self) -> LineEdge {
        self.0.borrow().edge.clone()
    }

    /// Coordinate of the edge.
    pub fn coordinate(&self) -> CoordinateId {
        self.0.borrow().edge.coordinate()
    }

    /// Current world position of the connection.
    pub fn position(&self, scene: &Scene) -> Vec3 {
        scene.world_origin(self.coordinate())
    }

    /// Distance below which two positions count as the same point.
    pub fn sync_epsilon(&self) -> f32 {
        self.epsilon()
    }

    /// Stop or resume mirroring this connection's moves onto its neighbors.
    ///
    /// Links are untouched; neighbors moving still move this connection.
    pub fn set_held(&self, held: bool) {
        self.0.borrow().held.set(held);
    }

    /// Returns true while moves are not mirrored onto neighbors.
    pub fn is_held(&self) -> bool {
        self.0.borrow().held.get()
    }

    /// Returns true if both handles refer to the same connection.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Directly linked connections, in connection order.
    pub fn neighbors(&self) -> Vec<Self> {
        self.0
            .borrow()
            .neighbors
            .iter()
            .filter_map(|n| n.connection.upgrade().map(Self))
            .collect()
    }

    /// Number of directly linked connections.
    pub fn neighbor_count(&self) -> usize {
        self.0.borrow().neighbors.len()
    }

    /// Returns true if `other` is a direct neighbor.
    pub fn is_connected(&self, other: &Self) -> bool {
        let id = other.id();
        self.0.borrow().neighbors.iter().any(|n| n.id == id)
    }

    /// This connection and everything reachable through neighbors, ordered by id.
    pub fn group(&self) -> Vec<Self> {
        let mut found = BTreeMap::new();
        let mut stack = alloc::vec![self.clone()];
        while let Some(c) = stack.pop() {
            let id = c.id();
            if found.contains_key(&id) {
                continue;
            }
            stack.extend(c.neighbors());
            found.insert(id, c);
        }
        found.into_values().collect()
    }

    /// The lowest-id member of the group, which owns any joint geometry generated for it.
    pub fn lead(&self) -> Self {
        let mut group = self.group();
        if group.is_empty() {
            return self.clone();
        }
        group.swap_remove(0)
    }

    /// Returns true if this connection leads its group.
    pub fn is_lead(&self) -> bool {
        self.lead().ptr_eq(self)
    }

    /// Link `self` to `other`.
    ///
    /// `self` is first moved onto `other`, then the sync pair is installed and both sides'
    /// `connected` subscribers run. Returns false without changes when the two are the same
    /// connection, already connected, or either coordinate is gone.
    pub fn connect(&self, scene: &mut Scene, other: &Self) -> bool {
        if self.ptr_eq(other) || self.is_connected(other) {
            return false;
        }
        let (a, b) = (self.coordinate(), other.coordinate());
        if !scene.is_alive(a) || !scene.is_alive(b) {
            return false;
        }
        let target = scene.world_origin(b);
        if scene.world_origin(a).distance(target) > self.epsilon() {
            scene.set_global_position(a, target);
        }
        let Ok(sync_a) = scene.on_updated(a, sync_onto(b, self.epsilon(), self.held())) else {
            return false;
        };
        let sync_b = match scene.on_updated(b, sync_onto(a, other.epsilon(), other.held())) {
            Ok(s) => s,
            Err(_) => {
                let _ = scene.remove_updated(a, sync_a);
                return false;
            }
        };
        self.0.borrow_mut().neighbors.push(Neighbor {
            id: other.id(),
            connection: Rc::downgrade(&other.0),
            sync: sync_a,
        });
        other.0.borrow_mut().neighbors.push(Neighbor {
            id: self.id(),
            connection: Rc::downgrade(&self.0),
            sync: sync_b,
        });
        tracing::debug!(a = self.id(), b = other.id(), "connected");

        let on_self = self.0.borrow().connected.snapshot();
        for f in on_self {
            f(scene, self, other);
        }
        let on_other = other.0.borrow().connected.snapshot();
        for f in on_other {
            f(scene, other, self);
        }
        notify_group(scene, &self.group());
        true
    }

    /// Unlink `self` and `other`.
    ///
    /// Both sync subscriptions are removed, then both sides' `disconnected` subscribers run.
    /// Returns false without changes unless the two are mutually connected.
    pub fn disconnect(&self, scene: &mut Scene, other: &Self) -> bool {
        if !self.is_connected(other) || !other.is_connected(self) {
            return false;
        }
        let mine = self.take_neighbor(other.id());
        let theirs = other.take_neighbor(self.id());
        if let Some(sync) = mine {
            let _ = scene.remove_updated(self.coordinate(), sync);
        }
        if let Some(sync) = theirs {
            let _ = scene.remove_updated(other.coordinate(), sync);
        }
        tracing::debug!(a = self.id(), b = other.id(), "disconnected");

        let on_self = self.0.borrow().disconnected.snapshot();
        for f in on_self {
            f(scene, self, other);
        }
        let on_other = other.0.borrow().disconnected.snapshot();
        for f in on_other {
            f(scene, other, self);
        }
        let mut affected = self.group();
        if !affected.iter().any(|c| c.ptr_eq(other)) {
            affected.extend(other.group());
        }
        notify_group(scene, &affected);
        true
    }

    /// Run this connection's `group_changed` subscribers without changing the graph.
    ///
    /// Used when a member's geometry changed in a way its group depends on.
    pub fn notify_group_changed(&self, scene: &mut Scene) {
        notify_group(scene, core::slice::from_ref(self));
    }

    /// Disconnect from every neighbor and drop all subscribers.
    pub fn dispose(&self, scene: &mut Scene) {
        for n in self.neighbors() {
            self.disconnect(scene, &n);
        }
        let mut inner = self.0.borrow_mut();
        inner.connected.clear();
        inner.disconnected.clear();
        inner.group_changed.clear();
    }

    /// Subscribe to connects involving this connection.
    pub fn on_connected(&self, f: impl Fn(&mut Scene, &Self, &Self) + 'static) -> Subscription {
        self.0.borrow_mut().connected.subscribe(Rc::new(f))
    }

    /// Subscribe to disconnects involving this connection.
    pub fn on_disconnected(&self, f: impl Fn(&mut Scene, &Self, &Self) + 'static) -> Subscription {
        self.0.borrow_mut().disconnected.subscribe(Rc::new(f))
    }

    /// Subscribe to membership changes of this connection's group.
    pub fn on_group_changed(&self, f: impl Fn(&mut Scene, &Self) + 'static) -> Subscription {
        self.0.borrow_mut().group_changed.subscribe(Rc::new(f))
    }

    /// Remove a `connected` subscriber.
    pub fn remove_connected(&self, token: Subscription) -> Result<()> {
        Ok(self.0.borrow_mut().connected.unsubscribe(token)?)
    }

    /// Remove a `disconnected` subscriber.
    pub fn remove_disconnected(&self, token: Subscription) -> Result<()> {
        Ok(self.0.borrow_mut().disconnected.unsubscribe(token)?)
    }

    /// Remove a `group_changed` subscriber.
    pub fn remove_group_changed(&self, token: Subscription) -> Result<()> {
        Ok(self.0.borrow_mut().group_changed.unsubscribe(token)?)
    }

    fn epsilon(&self) -> f32 {
        self.0.borrow().config.sync_epsilon
    }

    fn held(&self) -> Rc<Cell<bool>> {
        self.0.borrow().held.clone()
    }

    fn take_neighbor(&self, id: u64) -> Option<Subscription> {
        let mut inner = self.0.borrow_mut();
        let idx = inner.neighbors.iter().position(|n| n.id == id)?;
        Some(inner.neighbors.remove(idx).sync)
    }
}

fn sync_onto(
    target: CoordinateId,
    epsilon: f32,
    held: Rc<Cell<bool>>,
) -> impl Fn(&mut Scene, CoordinateId) + 'static {
    move |scene, source| {
        if held.get() {
            return;
        }
        let p = scene.world_origin(source);
        if scene.world_origin(target).distance(p) > epsilon {
            scene.set_global_position(target, p);
        }
    }
}

fn notify_group(scene: &mut Scene, members: &[LineItemConnection]) {
    for member in members {
        let subscribers = member.0.borrow().group_changed.snapshot();
        for f in subscribers {
            f(scene, member);
        }
    }
}
