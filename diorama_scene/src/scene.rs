// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core scene implementation: structure, transform mutation, world queries.

use alloc::rc::Rc;
use alloc::vec::Vec;
use glam::{Mat4, Vec3};

use crate::error::{Error, Result};
use crate::math::{Axis, basis_from_direction};
use crate::observer::{Observers, Subscription};
use crate::types::{CoordinateId, LocalTransform};

/// Callback fired around transform mutations of a coordinate.
pub type CoordinateCallback = dyn Fn(&mut Scene, CoordinateId);

/// Callback fired when a child is attached to or detached from a parent, as
/// `(scene, parent, child)`.
pub type ChildCallback = dyn Fn(&mut Scene, CoordinateId, CoordinateId);

/// Singular threshold for matrices inverted while solving for positions.
const SINGULAR_DET: f32 = 1e-12;

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Arena of coordinates forming a forest of transform trees.
///
/// Every mutation notifies synchronously: `before_update` subscribers run before the
/// matrix changes and `updated` subscribers run after it, before the mutating call returns.
/// Subscribers receive `&mut Scene` and may read or mutate any coordinate, including the one
/// that is being notified.
pub struct Scene {
    nodes: Vec<Option<Node>>,
    /// Generation stamped on each slot; outlives the node so stale ids stay stale.
    stamps: Vec<u32>,
    vacant: Vec<usize>,
    next_uid: u64,
    child_added: Observers<ChildCallback>,
    child_removed: Observers<ChildCallback>,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Scene")
            .field("slots", &total)
            .field("alive", &alive)
            .field("vacant", &self.vacant.len())
            .field("next_uid", &self.next_uid)
            .finish_non_exhaustive()
    }
}

struct Node {
    generation: u32,
    parent: Option<CoordinateId>,
    children: Vec<CoordinateId>,
    transform: LocalTransform,
    before_update: Observers<CoordinateCallback>,
    updated: Observers<CoordinateCallback>,
}

impl Node {
    fn new(generation: u32, transform: LocalTransform) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            transform,
            before_update: Observers::new(),
            updated: Observers::new(),
        }
    }
}

#[derive(Copy, Clone)]
enum Hook {
    BeforeUpdate,
    Updated,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            stamps: Vec::new(),
            vacant: Vec::new(),
            next_uid: 0,
            child_added: Observers::new(),
            child_removed: Observers::new(),
        }
    }

    /// Create a standalone coordinate with the identity transform.
    pub fn insert(&mut self) -> CoordinateId {
        self.insert_with(LocalTransform::default())
    }

    /// Create a standalone coordinate with the given transform.
    pub fn insert_with(&mut self, transform: LocalTransform) -> CoordinateId {
        let (slot, stamp) = match self.vacant.pop() {
            Some(slot) => {
                let stamp = self.stamps[slot].saturating_add(1);
                self.stamps[slot] = stamp;
                self.nodes[slot] = Some(Node::new(stamp, transform));
                (slot, stamp)
            }
            None => {
                self.nodes.push(Some(Node::new(1, transform)));
                self.stamps.push(1);
                (self.nodes.len() - 1, 1)
            }
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "coordinate slots are addressed with 32 bits"
        )]
        CoordinateId::new(slot as u32, stamp)
    }

    /// Destroy a coordinate.
    ///
    /// The coordinate is detached from its parent and its children are detached from it.
    /// Children are not destroyed; they become roots.
    pub fn remove(&mut self, id: CoordinateId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id);
        }
        let children = self.children(id).to_vec();
        for child in children {
            self.remove_child(id, child);
        }
        // A child hook may have removed the node already.
        if self.is_alive(id) {
            self.nodes[id.slot()] = None;
            self.vacant.push(id.slot());
        }
    }

    /// Returns true if `id` refers to a live coordinate.
    pub fn is_alive(&self, id: CoordinateId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live coordinates.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Returns true if the scene holds no live coordinates.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocate a scene-unique, monotonically increasing id for non-coordinate objects.
    pub fn uid(&mut self) -> u64 {
        self.next_uid += 1;
        self.next_uid
    }

    // --- structure ---

    /// Attach `child` under `parent`.
    ///
    /// Fails with [`Error::InvalidParentCoordinate`] if `child` already has a parent; detach it
    /// first.
    /// Fails with [`Error::CycleDetected`] if `child` is `parent` or one of its ancestors.
    /// The tree is unchanged on failure.
    pub fn add_child(&mut self, parent: CoordinateId, child: CoordinateId) -> Result<()> {
        if !self.is_alive(parent) {
            return Err(Error::StaleCoordinate(parent));
        }
        if !self.is_alive(child) {
            return Err(Error::StaleCoordinate(child));
        }
        if let Some(current) = self.parent(child) {
            tracing::debug!(
                ?child,
                ?current,
                requested = ?parent,
                "refusing to re-parent coordinate"
            );
            return Err(Error::InvalidParentCoordinate {
                child,
                parent: current,
            });
        }
        if self.is_ancestor_or_self(child, parent) {
            tracing::debug!(?child, ?parent, "refusing to attach coordinate under its own subtree");
            return Err(Error::CycleDetected { parent, child });
        }
        self.link_parent(child, parent);
        for hook in self.child_added.snapshot() {
            hook(self, parent, child);
        }
        Ok(())
    }

    /// Detach `child` from `parent`. Does nothing if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: CoordinateId, child: CoordinateId) {
        if self.parent(child) != Some(parent) || !self.is_alive(parent) {
            return;
        }
        self.unlink_parent(child, parent);
        for hook in self.child_removed.snapshot() {
            hook(self, parent, child);
        }
    }

    /// Parent of `id`, if any.
    pub fn parent(&self, id: CoordinateId) -> Option<CoordinateId> {
        self.node(id)?.parent
    }

    /// Children of `id` in attachment order. Empty for stale ids.
    pub fn children(&self, id: CoordinateId) -> &[CoordinateId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Returns true if `ancestor` is `id` or lies on the parent chain of `id`.
    pub fn is_ancestor_or_self(&self, ancestor: CoordinateId, id: CoordinateId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.parent(c);
        }
        false
    }

    /// Subscribe to child attachment on any coordinate.
    pub fn on_child_added(
        &mut self,
        f: impl Fn(&mut Self, CoordinateId, CoordinateId) + 'static,
    ) -> Subscription {
        self.child_added.subscribe(Rc::new(f))
    }

    /// Subscribe to child detachment on any coordinate.
    pub fn on_child_removed(
        &mut self,
        f: impl Fn(&mut Self, CoordinateId, CoordinateId) + 'static,
    ) -> Subscription {
        self.child_removed.subscribe(Rc::new(f))
    }

    /// Remove a child-added subscriber.
    pub fn remove_child_added(&mut self, token: Subscription) -> Result<()> {
        self.child_added.unsubscribe(token)
    }

    /// Remove a child-removed subscriber.
    pub fn remove_child_removed(&mut self, token: Subscription) -> Result<()> {
        self.child_removed.unsubscribe(token)
    }

    // --- callbacks ---

    /// Subscribe to changes of `id`, called before the matrix is modified.
    pub fn on_before_update(
        &mut self,
        id: CoordinateId,
        f: impl Fn(&mut Self, CoordinateId) + 'static,
    ) -> Result<Subscription> {
        let node = self.node_mut(id).ok_or(Error::StaleCoordinate(id))?;
        Ok(node.before_update.subscribe(Rc::new(f)))
    }

    /// Subscribe to changes of `id`, called after the matrix is modified.
    pub fn on_updated(
        &mut self,
        id: CoordinateId,
        f: impl Fn(&mut Self, CoordinateId) + 'static,
    ) -> Result<Subscription> {
        let node = self.node_mut(id).ok_or(Error::StaleCoordinate(id))?;
        Ok(node.updated.subscribe(Rc::new(f)))
    }

    /// Remove a before-update subscriber of `id`.
    pub fn remove_before_update(&mut self, id: CoordinateId, token: Subscription) -> Result<()> {
        let node = self.node_mut(id).ok_or(Error::StaleCoordinate(id))?;
        node.before_update.unsubscribe(token)
    }

    /// Remove an updated subscriber of `id`.
    pub fn remove_updated(&mut self, id: CoordinateId, token: Subscription) -> Result<()> {
        let node = self.node_mut(id).ok_or(Error::StaleCoordinate(id))?;
        node.updated.unsubscribe(token)
    }

    /// Number of updated subscribers of `id`.
    pub fn updated_len(&self, id: CoordinateId) -> usize {
        self.node(id).map_or(0, |n| n.updated.len())
    }

    // --- local state ---

    /// Local transform state of `id`.
    pub fn transform(&self, id: CoordinateId) -> Option<&LocalTransform> {
        self.node(id).map(|n| &n.transform)
    }

    /// Rotation and translation matrix of `id`. Identity for stale ids.
    pub fn matrix(&self, id: CoordinateId) -> Mat4 {
        self.transform(id).map_or(Mat4::IDENTITY, |t| t.local)
    }

    /// `scale * mirror * local` of `id`. Identity for stale ids.
    pub fn effective_matrix(&self, id: CoordinateId) -> Mat4 {
        self.transform(id)
            .map_or(Mat4::IDENTITY, LocalTransform::effective)
    }

    /// Local translation of `id`.
    pub fn position(&self, id: CoordinateId) -> Vec3 {
        self.transform(id)
            .map_or(Vec3::ZERO, LocalTransform::translation)
    }

    /// Replace the rotation and translation matrix.
    pub fn set_matrix(&mut self, id: CoordinateId, m: Mat4) {
        self.mutate(id, |t| t.local = m);
    }

    /// Set the local X translation.
    pub fn set_x(&mut self, id: CoordinateId, x: f32) {
        self.mutate(id, |t| t.local.w_axis.x = x);
    }

    /// Set the local Y translation.
    pub fn set_y(&mut self, id: CoordinateId, y: f32) {
        self.mutate(id, |t| t.local.w_axis.y = y);
    }

    /// Set the local Z translation.
    pub fn set_z(&mut self, id: CoordinateId, z: f32) {
        self.mutate(id, |t| t.local.w_axis.z = z);
    }

    /// Set the local translation; notifies once.
    pub fn set_position(&mut self, id: CoordinateId, p: Vec3) {
        self.mutate(id, |t| t.local.w_axis = p.extend(1.0));
    }

    /// Rotate about the local X axis.
    pub fn rotate_x(&mut self, id: CoordinateId, rad: f32) {
        self.mutate(id, |t| t.local *= Mat4::from_rotation_x(rad));
    }

    /// Rotate about the local Y axis.
    pub fn rotate_y(&mut self, id: CoordinateId, rad: f32) {
        self.mutate(id, |t| t.local *= Mat4::from_rotation_y(rad));
    }

    /// Rotate about the local Z axis.
    pub fn rotate_z(&mut self, id: CoordinateId, rad: f32) {
        self.mutate(id, |t| t.local *= Mat4::from_rotation_z(rad));
    }

    /// Rotate about an arbitrary local axis. A zero axis leaves the coordinate untouched.
    pub fn rotate(&mut self, id: CoordinateId, axis: Vec3, angle: f32) {
        let axis = axis.normalize_or_zero();
        if axis == Vec3::ZERO {
            return;
        }
        self.mutate(id, |t| t.local *= Mat4::from_axis_angle(axis, angle));
    }

    /// Orient the local Y axis along `direction` and place the origin at `position`.
    pub fn set_direction_y_axis(&mut self, id: CoordinateId, direction: Vec3, position: Vec3) {
        self.set_direction(id, direction, position, Axis::Y);
    }

    /// Orient the local Z axis along `direction` and place the origin at `position`.
    pub fn set_direction_z_axis(&mut self, id: CoordinateId, direction: Vec3, position: Vec3) {
        self.set_direction(id, direction, position, Axis::Z);
    }

    /// Replace the scale matrix with per-axis factors.
    pub fn set_scale(&mut self, id: CoordinateId, factors: Vec3) {
        self.mutate(id, |t| t.scale = Mat4::from_scale(factors));
    }

    /// Reflect across the local YZ plane.
    pub fn mirror_x(&mut self, id: CoordinateId) {
        self.mutate(id, |t| t.mirror.x_axis.x = -1.0);
    }

    /// Reflect across the local XZ plane.
    pub fn mirror_y(&mut self, id: CoordinateId) {
        self.mutate(id, |t| t.mirror.y_axis.y = -1.0);
    }

    /// Reflect across the local XY plane.
    pub fn mirror_z(&mut self, id: CoordinateId) {
        self.mutate(id, |t| t.mirror.z_axis.z = -1.0);
    }

    /// Clear all reflections.
    pub fn reset_mirror(&mut self, id: CoordinateId) {
        self.mutate(id, |t| t.mirror = Mat4::IDENTITY);
    }

    // --- world queries ---

    /// Matrix from the local space of `id` to world space.
    ///
    /// Accumulates effective matrices from `id` out to its root. Stale ids contribute the identity.
    pub fn to_world(&self, id: CoordinateId) -> Mat4 {
        let mut m = self.effective_matrix(id);
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            m = self.effective_matrix(p) * m;
            cur = self.parent(p);
        }
        m
    }

    /// Matrix from world space to the local space of `id`.
    ///
    /// Composes per-node inverses along the same path as [`Scene::to_world`].
    pub fn from_world(&self, id: CoordinateId) -> Mat4 {
        let mut m = self.effective_matrix(id).inverse();
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            m *= self.effective_matrix(p).inverse();
            cur = self.parent(p);
        }
        m
    }

    /// World position of a point given in the local space of `id`.
    pub fn global_position(&self, id: CoordinateId, local: Vec3) -> Vec3 {
        self.to_world(id).transform_point3(local)
    }

    /// World position of the origin of `id`.
    pub fn world_origin(&self, id: CoordinateId) -> Vec3 {
        self.global_position(id, Vec3::ZERO)
    }

    /// Move `id` so its origin lands on the world point `world`.
    ///
    /// Only the translation changes. Does nothing when the parent chain, scale, or mirror is
    /// singular.
    pub fn set_global_position(&mut self, id: CoordinateId, world: Vec3) {
        let Some(pre) = self.pre_local(id) else {
            return;
        };
        if pre.determinant().abs() < SINGULAR_DET {
            return;
        }
        let local = pre.inverse().transform_point3(world);
        self.set_position(id, local);
    }

    /// Rotate `id` so that its Z axis points from its current world position toward `target`.
    ///
    /// The position is kept. Does nothing when `target` coincides with the current position.
    pub fn look_at(&mut self, id: CoordinateId, target: Vec3) {
        let Some(pre) = self.pre_local(id) else {
            return;
        };
        if pre.determinant().abs() < SINGULAR_DET {
            return;
        }
        let dir = target - self.world_origin(id);
        let local_dir = pre.inverse().transform_vector3(dir);
        if local_dir.length_squared() <= f32::EPSILON {
            return;
        }
        let position = self.position(id);
        self.set_direction_z_axis(id, local_dir, position);
    }

    // --- internals ---

    // parent-to-world * scale * mirror: the frame that `local` is expressed in
    fn pre_local(&self, id: CoordinateId) -> Option<Mat4> {
        let t = self.transform(id)?;
        let parent = self.parent(id).map_or(Mat4::IDENTITY, |p| self.to_world(p));
        Some(parent * t.scale * t.mirror)
    }

    fn set_direction(&mut self, id: CoordinateId, direction: Vec3, position: Vec3, axis: Axis) {
        let basis = basis_from_direction(direction, axis);
        let m = Mat4::from_cols(
            basis.x_axis.extend(0.0),
            basis.y_axis.extend(0.0),
            basis.z_axis.extend(0.0),
            position.extend(1.0),
        );
        self.mutate(id, |t| t.local = m);
    }

    fn mutate(&mut self, id: CoordinateId, f: impl FnOnce(&mut LocalTransform)) {
        if !self.is_alive(id) {
            return;
        }
        self.notify(id, Hook::BeforeUpdate);
        // A before-update subscriber may have removed the coordinate.
        let Some(node) = self.node_mut(id) else {
            return;
        };
        f(&mut node.transform);
        self.notify(id, Hook::Updated);
    }

    fn notify(&mut self, id: CoordinateId, hook: Hook) {
        let subscribers = match (self.node(id), hook) {
            (Some(n), Hook::BeforeUpdate) => n.before_update.snapshot(),
            (Some(n), Hook::Updated) => n.updated.snapshot(),
            (None, _) => return,
        };
        for f in subscribers {
            f(self, id);
        }
    }

    fn node(&self, id: CoordinateId) -> Option<&Node> {
        let n = self.nodes.get(id.slot())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_mut(&mut self, id: CoordinateId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.slot())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn link_parent(&mut self, id: CoordinateId, parent: CoordinateId) {
        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = Some(parent);
        }
    }

    fn unlink_parent(&mut self, id: CoordinateId, parent: CoordinateId) {
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};
    use core::f32::consts::FRAC_PI_2;

    #[derive(Clone)]
    struct Rng(u64);

    impl Rng {
        fn next_f32(&mut self) -> f32 {
            // xorshift64*
            self.0 ^= self.0 >> 12;
            self.0 ^= self.0 << 25;
            self.0 ^= self.0 >> 27;
            let v = self.0.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 40;
            #[allow(clippy::cast_possible_truncation, reason = "24-bit mantissa sample")]
            let v = v as u32;
            v as f32 / (1_u32 << 24) as f32
        }

        fn range(&mut self, lo: f32, hi: f32) -> f32 {
            lo + (hi - lo) * self.next_f32()
        }

        fn vec3(&mut self, lo: f32, hi: f32) -> Vec3 {
            Vec3::new(self.range(lo, hi), self.range(lo, hi), self.range(lo, hi))
        }

        fn transform(&mut self) -> LocalTransform {
            let axis = self.vec3(-1.0, 1.0).normalize_or(Vec3::Y);
            let local = Mat4::from_translation(self.vec3(-5.0, 5.0))
                * Mat4::from_axis_angle(axis, self.range(-3.0, 3.0));
            let signs = Vec3::new(
                if self.next_f32() < 0.5 { -1.0 } else { 1.0 },
                1.0,
                if self.next_f32() < 0.5 { -1.0 } else { 1.0 },
            );
            LocalTransform {
                local,
                scale: Mat4::from_scale(self.vec3(0.5, 2.0)),
                mirror: Mat4::from_scale(signs),
            }
        }
    }

    #[test]
    fn effective_matrix_is_scale_mirror_local() {
        let mut rng = Rng(0x9E37_79B9_7F4A_7C15);
        let mut scene = Scene::new();
        for _ in 0..64 {
            let t = rng.transform();
            let id = scene.insert_with(t);
            assert_eq!(scene.effective_matrix(id), t.scale * t.mirror * t.local);
            assert_eq!(scene.to_world(id), t.scale * t.mirror * t.local);
        }
    }

    #[test]
    fn reparenting_attached_child_fails_and_keeps_tree() {
        let mut scene = Scene::new();
        let a = scene.insert();
        let b = scene.insert();
        let c = scene.insert();
        scene.add_child(a, b).unwrap();
        let err = scene.add_child(c, b).unwrap_err();
        assert_eq!(err, Error::InvalidParentCoordinate { child: b, parent: a });
        assert_eq!(scene.parent(b), Some(a));
        assert_eq!(scene.children(a), &[b]);
        assert!(scene.children(c).is_empty());

        scene.remove_child(a, b);
        assert!(scene.add_child(c, b).is_ok(), "detached child may be re-attached");
        assert_eq!(scene.parent(b), Some(c));
    }

    #[test]
    fn cycles_are_refused() {
        let mut scene = Scene::new();
        let a = scene.insert();
        let b = scene.insert();
        let c = scene.insert();
        scene.add_child(a, b).unwrap();
        scene.add_child(b, c).unwrap();
        assert!(matches!(scene.add_child(c, a), Err(Error::CycleDetected { .. })));
        assert!(matches!(scene.add_child(a, a), Err(Error::CycleDetected { .. })));
        assert_eq!(scene.parent(a), None);
    }

    #[test]
    fn world_round_trip_at_any_depth() {
        let mut rng = Rng(42);
        for depth in 0..5 {
            let mut scene = Scene::new();
            let mut leaf = scene.insert_with(rng.transform());
            for _ in 0..depth {
                let child = scene.insert_with(rng.transform());
                scene.add_child(leaf, child).unwrap();
                leaf = child;
            }
            for _ in 0..16 {
                let p = rng.vec3(-10.0, 10.0);
                let local = scene.from_world(leaf).transform_point3(p);
                let back = scene.to_world(leaf).transform_point3(local);
                assert!(back.abs_diff_eq(p, 5e-3), "depth {depth}: {back} != {p}");
            }
        }
    }

    #[test]
    fn to_world_composes_parent_then_child() {
        let mut scene = Scene::new();
        let parent = scene.insert();
        let child = scene.insert();
        scene.add_child(parent, child).unwrap();
        scene.set_position(parent, Vec3::new(10.0, 0.0, 0.0));
        scene.rotate_y(parent, FRAC_PI_2);
        scene.set_position(child, Vec3::new(0.0, 0.0, 1.0));
        // Parent turned +Z onto +X.
        let p = scene.world_origin(child);
        assert!(p.abs_diff_eq(Vec3::new(11.0, 0.0, 0.0), 1e-5), "{p}");
    }

    #[test]
    fn callbacks_fire_around_every_mutation() {
        let mut scene = Scene::new();
        let id = scene.insert();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s1 = Rc::clone(&seen);
        scene
            .on_before_update(id, move |scene, id| {
                s1.borrow_mut().push(("before", scene.position(id).x));
            })
            .unwrap();
        let s2 = Rc::clone(&seen);
        let token = scene
            .on_updated(id, move |scene, id| {
                s2.borrow_mut().push(("updated", scene.position(id).x));
            })
            .unwrap();
        scene.set_x(id, 3.0);
        scene.set_x(id, 3.0);
        assert_eq!(
            *seen.borrow(),
            vec![("before", 0.0), ("updated", 3.0), ("before", 3.0), ("updated", 3.0)]
        );
        scene.remove_updated(id, token).unwrap();
        assert!(matches!(scene.remove_updated(id, token), Err(Error::UnknownSubscription(_))));
    }

    #[test]
    fn updated_callback_may_reenter_scene() {
        let mut scene = Scene::new();
        let leader = scene.insert();
        let follower = scene.insert();
        scene
            .on_updated(leader, move |scene, id| {
                let p = scene.world_origin(id);
                scene.set_global_position(follower, p + Vec3::Y);
            })
            .unwrap();
        scene.set_position(leader, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(scene.world_origin(follower), Vec3::new(1.0, 3.0, 3.0));
    }

    #[test]
    fn child_hooks_and_benign_removal() {
        let mut scene = Scene::new();
        let added = Rc::new(Cell::new(0));
        let removed = Rc::new(Cell::new(0));
        let a2 = Rc::clone(&added);
        let r2 = Rc::clone(&removed);
        scene.on_child_added(move |_, _, _| a2.set(a2.get() + 1));
        scene.on_child_removed(move |_, _, _| r2.set(r2.get() + 1));
        let p = scene.insert();
        let c = scene.insert();
        let stranger = scene.insert();
        scene.add_child(p, c).unwrap();
        scene.remove_child(p, stranger);
        assert_eq!((added.get(), removed.get()), (1, 0));
        scene.remove(p);
        assert_eq!(removed.get(), 1);
        assert!(scene.is_alive(c), "children outlive their parent");
        assert_eq!(scene.parent(c), None);
    }

    #[test]
    fn removed_slot_is_reused_with_new_stamp() {
        let mut scene = Scene::new();
        let a = scene.insert();
        scene.remove(a);
        assert!(!scene.is_alive(a));
        let b = scene.insert();
        assert!(scene.is_alive(b));
        assert!(!scene.is_alive(a));
        assert_eq!(a.index(), b.index());
        assert!(b.generation() > a.generation(), "generation must increase on reuse");
        scene.set_x(a, 5.0);
        assert_eq!(scene.position(b).x, 0.0, "stale ids never alias");
    }

    #[test]
    fn look_at_points_z_axis_to_target() {
        let mut scene = Scene::new();
        let id = scene.insert();
        scene.set_position(id, Vec3::new(1.0, 1.0, 1.0));
        scene.look_at(id, Vec3::new(1.0, 1.0, -4.0));
        let z = scene.to_world(id).transform_vector3(Vec3::Z);
        assert!(z.abs_diff_eq(Vec3::NEG_Z, 1e-5), "{z}");
        assert!(scene.world_origin(id).abs_diff_eq(Vec3::ONE, 1e-6));
        // Straight up is parallel to the default reference.
        scene.look_at(id, Vec3::new(1.0, 9.0, 1.0));
        let z = scene.to_world(id).transform_vector3(Vec3::Z);
        assert!(z.abs_diff_eq(Vec3::Y, 1e-5), "{z}");
    }

    #[test]
    fn global_position_under_scaled_parent() {
        let mut scene = Scene::new();
        let parent = scene.insert();
        let child = scene.insert();
        scene.add_child(parent, child).unwrap();
        scene.set_scale(parent, Vec3::splat(2.0));
        scene.set_position(parent, Vec3::new(0.0, 1.0, 0.0));
        scene.set_global_position(child, Vec3::new(4.0, 0.0, 0.0));
        assert!(scene.world_origin(child).abs_diff_eq(Vec3::new(4.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn mirror_is_idempotent_and_resettable() {
        let mut scene = Scene::new();
        let id = scene.insert();
        scene.mirror_x(id);
        scene.mirror_x(id);
        let flipped = Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0));
        assert_eq!(scene.transform(id).unwrap().mirror, flipped);
        scene.mirror_z(id);
        scene.reset_mirror(id);
        assert_eq!(scene.transform(id).unwrap().mirror, Mat4::IDENTITY);
    }
}
