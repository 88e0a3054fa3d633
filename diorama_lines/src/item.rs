// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Road-like line items with junction-aware render geometry.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use glam::Vec3;

use diorama_scene::{CoordinateId, Observers, Scene, Subscription};

use crate::config::LineConfig;
use crate::connection::LineItemConnection;
use crate::edge::LineEdge;
use crate::error::Result;
use crate::junction::{
    JointEdge, JointGenerators, JointKind, JointRequest, junction_offset, min_subtended_angle,
};
use crate::line::{Line, LineSegment};

/// Callback fired after a line item recomputed its render geometry.
pub type ItemCallback = dyn Fn(&mut Scene, &LineItem);

/// Which end of a line item.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum End {
    /// The `t = 0` end.
    Start,
    /// The `t = 1` end.
    End,
}

impl End {
    const fn index(self) -> usize {
        match self {
            Self::Start => 0,
            Self::End => 1,
        }
    }
}

#[derive(Debug)]
struct ItemInner {
    id: u64,
    width: f32,
    config: LineConfig,
    segment: LineSegment,
    connections: [LineItemConnection; 2],
    anchor: CoordinateId,
    generators: JointGenerators,
    kinds: [JointKind; 2],
    offsets: [f32; 2],
    joints: [Vec<CoordinateId>; 2],
    render_length: f32,
    watch: Option<(Subscription, [Subscription; 2])>,
    updated: Observers<ItemCallback>,
    disposed: bool,
}

/// A straight, width-carrying line between two connectable ends.
///
/// The item owns three coordinates: one per end and a render anchor. The anchor sits at the
/// center of the visible part of the line, which is the segment shortened at each end by that
/// end's junction offset, and its Z axis follows the segment direction.
///
/// Recomputation runs on every segment update and every group change at either end. Joint
/// geometry at an end is rebuilt only by the item whose connection leads that end's group.
#[derive(Clone, Debug)]
pub struct LineItem(Rc<RefCell<ItemInner>>);

// Inputs of a recompute, cloned out so no borrow is held across scene mutation.
struct Snapshot {
    segment: LineSegment,
    connections: [LineItemConnection; 2],
    width: f32,
    degenerate: f32,
    generators: JointGenerators,
}

// Plan for one end, computed before any scene mutation.
struct EndPlan {
    kind: JointKind,
    offset: f32,
    request: Option<JointRequest>,
}

impl LineItem {
    /// Create an item from `start` to `end` (world positions).
    pub fn new(
        scene: &mut Scene,
        start: Vec3,
        end: Vec3,
        width: f32,
        generators: JointGenerators,
        config: LineConfig,
    ) -> Result<Self> {
        let start_coord = scene.insert();
        let end_coord = scene.insert();
        let anchor = scene.insert();
        scene.set_position(start_coord, start);
        scene.set_position(end_coord, end);
        let segment = LineSegment::new(scene, start_coord, end_coord)?;
        let connections = [
            LineItemConnection::new(scene, LineEdge::start(&segment), config),
            LineItemConnection::new(scene, LineEdge::end(&segment), config),
        ];
        let item = Self(Rc::new(RefCell::new(ItemInner {
            id: scene.uid(),
            width,
            config,
            segment: segment.clone(),
            connections: connections.clone(),
            anchor,
            generators,
            kinds: [JointKind::FreeEnd; 2],
            offsets: [0.0; 2],
            joints: [Vec::new(), Vec::new()],
            render_length: 0.0,
            watch: None,
            updated: Observers::new(),
            disposed: false,
        })));

        let weak = Rc::downgrade(&item.0);
        let on_segment = segment.on_updated(move |scene, _| {
            if let Some(item) = upgrade(&weak) {
                item.recompute(scene);
                item.refresh_neighbors(scene);
            }
        });
        let on_group = connections.each_ref().map(|c| {
            let weak = Rc::downgrade(&item.0);
            c.on_group_changed(move |scene, _| {
                if let Some(item) = upgrade(&weak) {
                    item.recompute(scene);
                }
            })
        });
        item.0.borrow_mut().watch = Some((on_segment, on_group));
        item.recompute(scene);
        tracing::debug!(id = item.id(), width, "line item created");
        Ok(item)
    }

    /// Scene-unique id.
    pub fn id(&self) -> u64 {
        self.0.borrow().id
    }

    /// Width of the item.
    pub fn width(&self) -> f32 {
        self.0.borrow().width
    }

    /// Change the width and recompute this item and its neighbors.
    pub fn set_width(&self, scene: &mut Scene, width: f32) {
        self.0.borrow_mut().width = width;
        self.recompute(scene);
        self.refresh_neighbors(scene);
    }

    /// The underlying segment.
    pub fn segment(&self) -> LineSegment {
        self.0.borrow().segment.clone()
    }

    /// Connection at `end`.
    pub fn connection(&self, end: End) -> LineItemConnection {
        self.0.borrow().connections[end.index()].clone()
    }

    /// Coordinate placing `end`. Attach marker colliders here.
    pub fn end_coordinate(&self, end: End) -> CoordinateId {
        self.connection(end).coordinate()
    }

    /// Coordinate at the center of the rendered part, Z along the line.
    pub fn anchor(&self) -> CoordinateId {
        self.0.borrow().anchor
    }

    /// Segment length minus both junction offsets, never negative.
    pub fn render_length(&self) -> f32 {
        self.0.borrow().render_length
    }

    /// Junction offset at `end`.
    pub fn offset(&self, end: End) -> f32 {
        self.0.borrow().offsets[end.index()]
    }

    /// Joint classification at `end`.
    pub fn joint_kind(&self, end: End) -> JointKind {
        self.0.borrow().kinds[end.index()]
    }

    /// Joint geometry this item currently owns at `end`.
    pub fn joints(&self, end: End) -> Vec<CoordinateId> {
        self.0.borrow().joints[end.index()].clone()
    }

    /// Move `end` to a world position. Connected ends follow.
    pub fn set_end_position(&self, scene: &mut Scene, end: End, position: Vec3) {
        let coordinate = self.end_coordinate(end);
        scene.set_global_position(coordinate, position);
    }

    /// Returns true if both handles refer to the same item.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Subscribe to recomputations.
    pub fn on_updated(&self, f: impl Fn(&mut Scene, &Self) + 'static) -> Subscription {
        self.0.borrow_mut().updated.subscribe(Rc::new(f))
    }

    /// Remove an `updated` subscriber.
    pub fn remove_updated(&self, token: Subscription) -> Result<()> {
        Ok(self.0.borrow_mut().updated.unsubscribe(token)?)
    }

    /// Recompute offsets, render length, anchor, and owned joint geometry.
    pub fn recompute(&self, scene: &mut Scene) {
        let Some(Snapshot {
            segment,
            connections,
            width,
            degenerate,
            generators,
        }) = self.snapshot()
        else {
            return;
        };
        let plans = connections
            .each_ref()
            .map(|c| plan_end(scene, c, width, degenerate));

        let old = core::mem::take(&mut self.0.borrow_mut().joints);
        for coords in &old {
            generators.dispose(scene, coords);
        }
        let joints = plans.each_ref().map(|p| {
            p.request
                .as_ref()
                .map(|r| generators.build(scene, r))
                .unwrap_or_default()
        });

        let length = segment.length();
        let [start_offset, end_offset] = [plans[0].offset, plans[1].offset];
        let render_length = (length - start_offset - end_offset).max(0.0);
        let direction = segment.direction_at(0.0);
        let center = segment.start_position() + direction * (start_offset + render_length * 0.5);

        let anchor = {
            let mut inner = self.0.borrow_mut();
            inner.kinds = [plans[0].kind, plans[1].kind];
            inner.offsets = [start_offset, end_offset];
            inner.joints = joints;
            inner.render_length = render_length;
            inner.anchor
        };
        if direction == Vec3::ZERO {
            scene.set_position(anchor, center);
        } else {
            scene.set_direction_z_axis(anchor, direction, center);
        }
        tracing::trace!(
            id = self.id(),
            render_length,
            start_offset,
            end_offset,
            "line item recomputed"
        );

        let subscribers = self.0.borrow().updated.snapshot();
        for f in subscribers {
            f(scene, self);
        }
    }

    /// Ask every other member of both end groups to recompute.
    pub fn refresh_neighbors(&self, scene: &mut Scene) {
        let connections = self.0.borrow().connections.clone();
        for own in &connections {
            for member in own.group() {
                if connections.iter().any(|c| c.ptr_eq(&member)) {
                    continue;
                }
                member.notify_group_changed(scene);
            }
        }
    }

    /// Disconnect both ends, dispose joint geometry, and remove the item's coordinates.
    pub fn dispose(&self, scene: &mut Scene) {
        let (segment, connections, anchor, generators, joints, watch) = {
            let mut inner = self.0.borrow_mut();
            if inner.disposed {
                return;
            }
            inner.disposed = true;
            inner.updated.clear();
            (
                inner.segment.clone(),
                inner.connections.clone(),
                inner.anchor,
                inner.generators.clone(),
                core::mem::take(&mut inner.joints),
                inner.watch.take(),
            )
        };
        if let Some((on_segment, on_group)) = watch {
            let _ = segment.remove_updated(on_segment);
            for (c, token) in connections.iter().zip(on_group) {
                let _ = c.remove_group_changed(token);
            }
        }
        for c in &connections {
            c.dispose(scene);
        }
        for coords in &joints {
            generators.dispose(scene, coords);
        }
        segment.dispose(scene);
        scene.remove(segment.start());
        scene.remove(segment.end());
        scene.remove(anchor);
        tracing::debug!(id = self.id(), "line item disposed");
    }

    fn snapshot(&self) -> Option<Snapshot> {
        let inner = self.0.borrow();
        if inner.disposed {
            return None;
        }
        Some(Snapshot {
            segment: inner.segment.clone(),
            connections: inner.connections.clone(),
            width: inner.width,
            degenerate: inner.config.degenerate_angle,
            generators: inner.generators.clone(),
        })
    }
}

fn upgrade(weak: &Weak<RefCell<ItemInner>>) -> Option<LineItem> {
    weak.upgrade().map(LineItem)
}

fn plan_end(
    scene: &Scene,
    connection: &LineItemConnection,
    width: f32,
    degenerate: f32,
) -> EndPlan {
    let group = connection.group();
    let kind = JointKind::from_edge_count(group.len());
    let edges: Vec<JointEdge> = group
        .iter()
        .map(|c| JointEdge {
            connection: c.id(),
            direction: c.edge().inward_direction(),
        })
        .collect();
    let offset = if kind == JointKind::Junction {
        let dirs: Vec<Vec3> = edges.iter().map(|e| e.direction).collect();
        min_subtended_angle(&dirs).map_or(0.0, |a| junction_offset(width, a, degenerate))
    } else {
        0.0
    };
    let leads = group.first().is_some_and(|lead| lead.ptr_eq(connection));
    let request = (leads && kind != JointKind::FreeEnd).then(|| JointRequest {
        kind,
        center: connection.position(scene),
        width,
        offset,
        edges,
    });
    EndPlan {
        kind,
        offset,
        request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[derive(Default)]
    struct Joints {
        live: RefCell<Vec<(CoordinateId, JointKind)>>,
    }

    fn recording(log: &Rc<Joints>) -> JointGenerators {
        let (s, j, d) = (log.clone(), log.clone(), log.clone());
        JointGenerators::new()
            .with_straight(move |scene, _| {
                let c = scene.insert();
                s.live.borrow_mut().push((c, JointKind::Straight));
                alloc::vec![c]
            })
            .with_junction(move |scene, req| {
                assert_eq!(req.edges.len(), 3);
                let c = scene.insert();
                j.live.borrow_mut().push((c, JointKind::Junction));
                alloc::vec![c]
            })
            .with_dispose(move |scene, coords| {
                d.live.borrow_mut().retain(|(c, _)| !coords.contains(c));
                for &c in coords {
                    scene.remove(c);
                }
            })
    }

    fn live_kinds(log: &Joints) -> Vec<JointKind> {
        log.live.borrow().iter().map(|(_, k)| *k).collect()
    }

    #[test]
    fn free_item_renders_full_length_centered() {
        let mut scene = Scene::new();
        let item = LineItem::new(
            &mut scene,
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 4.0),
            1.0,
            JointGenerators::new(),
            LineConfig::default(),
        )
        .unwrap();
        assert_eq!(item.render_length(), 4.0);
        assert_eq!(item.joint_kind(End::Start), JointKind::FreeEnd);
        assert!(scene.world_origin(item.anchor()).abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-6));

        let lengths = Rc::new(Cell::new(0.0));
        let l2 = lengths.clone();
        item.on_updated(move |_, item| l2.set(item.render_length()));
        item.set_end_position(&mut scene, End::End, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(lengths.get(), 10.0);
    }

    #[test]
    fn tee_selects_junction_and_falls_back_to_straight() {
        let mut scene = Scene::new();
        let log = Rc::new(Joints::default());
        let width = 2.0;
        let mk = |scene: &mut Scene, a: Vec3, b: Vec3| {
            LineItem::new(scene, a, b, width, recording(&log), LineConfig::default()).unwrap()
        };
        let west = mk(&mut scene, Vec3::new(-5.0, 0.0, 0.0), Vec3::ZERO);
        let east = mk(&mut scene, Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0));
        let north = mk(&mut scene, Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0));

        let w = west.connection(End::End);
        let e = east.connection(End::Start);
        let n = north.connection(End::Start);
        assert!(e.connect(&mut scene, &w));
        assert_eq!(live_kinds(&log), [JointKind::Straight]);
        assert_eq!(west.joint_kind(End::End), JointKind::Straight);
        assert_eq!(west.offset(End::End), 0.0);

        assert!(n.connect(&mut scene, &w));
        assert_eq!(live_kinds(&log), [JointKind::Junction], "straight joint was disposed");
        for (item, end) in [(&west, End::End), (&east, End::Start), (&north, End::Start)] {
            assert_eq!(item.joint_kind(end), JointKind::Junction);
            assert!((item.offset(end) - width / 2.0).abs() < 1e-5);
            assert!((item.render_length() - (5.0 - width / 2.0)).abs() < 1e-5);
        }
        assert_eq!(west.joints(End::End).len(), 1, "lowest-id connection owns the joint");
        assert!(east.joints(End::Start).is_empty());
        let anchor = scene.world_origin(north.anchor());
        assert!(anchor.abs_diff_eq(Vec3::new(0.0, 0.0, 3.0), 1e-5), "{anchor}");

        assert!(n.disconnect(&mut scene, &w));
        assert_eq!(live_kinds(&log), [JointKind::Straight]);
        assert_eq!(north.joint_kind(End::Start), JointKind::FreeEnd);
        assert_eq!(north.render_length(), 5.0);
        assert_eq!(east.render_length(), 5.0);
    }

    #[test]
    fn far_end_moves_refresh_the_junction_of_neighbors() {
        let mut scene = Scene::new();
        let log = Rc::new(Joints::default());
        let mk = |scene: &mut Scene, a: Vec3, b: Vec3| {
            LineItem::new(scene, a, b, 2.0, recording(&log), LineConfig::default()).unwrap()
        };
        let west = mk(&mut scene, Vec3::new(-5.0, 0.0, 0.0), Vec3::ZERO);
        let east = mk(&mut scene, Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0));
        let north = mk(&mut scene, Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0));
        east.connection(End::Start).connect(&mut scene, &west.connection(End::End));
        north.connection(End::Start).connect(&mut scene, &west.connection(End::End));

        // Swing north's far end to 60 degrees from east.
        let sixty = 60.0_f32.to_radians();
        let tip = Vec3::new(sixty.cos(), 0.0, sixty.sin()) * 5.0;
        north.set_end_position(&mut scene, End::End, tip);
        let expected = junction_offset(2.0, sixty, 1e-4);
        assert!((east.offset(End::Start) - expected).abs() < 1e-4, "{}", east.offset(End::Start));
    }

    #[test]
    fn dispose_disconnects_and_cleans_up() {
        let mut scene = Scene::new();
        let log = Rc::new(Joints::default());
        let mk = |scene: &mut Scene, a: Vec3, b: Vec3| {
            LineItem::new(scene, a, b, 1.0, recording(&log), LineConfig::default()).unwrap()
        };
        let a = mk(&mut scene, Vec3::ZERO, Vec3::X);
        let b = mk(&mut scene, Vec3::X, Vec3::new(2.0, 0.0, 0.0));
        b.connection(End::Start).connect(&mut scene, &a.connection(End::End));
        assert_eq!(live_kinds(&log).len(), 1);
        let before = scene.len();
        a.dispose(&mut scene);
        assert!(live_kinds(&log).is_empty());
        assert_eq!(b.connection(End::Start).neighbor_count(), 0);
        assert_eq!(b.joint_kind(End::Start), JointKind::FreeEnd);
        assert_eq!(scene.len(), before - 4, "three item coordinates and one joint");
        a.dispose(&mut scene);
    }
}
