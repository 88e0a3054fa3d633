// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Joint classification, junction offsets, and caller-supplied joint geometry builders.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::f32::consts::PI;
use glam::Vec3;

use diorama_scene::{CoordinateId, Scene};

/// Shape of the meeting point of connected line edges.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum JointKind {
    /// A single, unconnected edge.
    #[default]
    FreeEnd,
    /// Two edges passing straight through.
    Straight,
    /// Three or more edges (T or Y junction and up).
    Junction,
}

impl JointKind {
    /// Classify a meeting point by the number of edges at it.
    pub fn from_edge_count(edges: usize) -> Self {
        match edges {
            0 | 1 => Self::FreeEnd,
            2 => Self::Straight,
            _ => Self::Junction,
        }
    }
}

/// Smallest angle (radians, `0..=PI`) between any two directions.
///
/// Returns `None` with fewer than two non-zero directions.
pub fn min_subtended_angle(directions: &[Vec3]) -> Option<f32> {
    let dirs: Vec<Vec3> = directions
        .iter()
        .map(|d| d.normalize_or_zero())
        .filter(|d| *d != Vec3::ZERO)
        .collect();
    let mut min: Option<f32> = None;
    for (i, a) in dirs.iter().enumerate() {
        for b in &dirs[i + 1..] {
            let angle = a.angle_between(*b);
            min = Some(min.map_or(angle, |m| m.min(angle)));
        }
    }
    min
}

/// How far back along each incoming edge a junction of `width` consumes.
///
/// `offset = (width / 2) * sin((PI - angle) / 2) / sin(angle / 2)`. A straight pass-through
/// (`angle = PI`) yields zero. Angles below `degenerate` yield zero instead of diverging.
pub fn junction_offset(width: f32, angle: f32, degenerate: f32) -> f32 {
    if angle < degenerate {
        return 0.0;
    }
    let offset = (width * 0.5) * ((PI - angle) * 0.5).sin() / (angle * 0.5).sin();
    offset.max(0.0)
}

/// One edge entering a joint.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JointEdge {
    /// Connection id of the edge.
    pub connection: u64,
    /// Unit direction from the joint into the edge's line.
    pub direction: Vec3,
}

/// Everything a joint geometry builder needs.
#[derive(Clone, Debug, PartialEq)]
pub struct JointRequest {
    /// Joint classification.
    pub kind: JointKind,
    /// World position of the joint.
    pub center: Vec3,
    /// Width of the line item building the joint.
    pub width: f32,
    /// Offset the junction consumes along each edge.
    pub offset: f32,
    /// Edges meeting at the joint, ordered by connection id.
    pub edges: Vec<JointEdge>,
}

/// Builds joint geometry, returning the render coordinates it created.
pub type JointBuilder = dyn Fn(&mut Scene, &JointRequest) -> Vec<CoordinateId>;

/// Disposes geometry previously returned by a [`JointBuilder`].
pub type JointDisposer = dyn Fn(&mut Scene, &[CoordinateId]);

/// Caller-supplied joint geometry hooks.
///
/// A missing builder produces no geometry for that kind. Free ends never produce geometry.
#[derive(Clone, Default)]
pub struct JointGenerators {
    straight: Option<Rc<JointBuilder>>,
    junction: Option<Rc<JointBuilder>>,
    dispose: Option<Rc<JointDisposer>>,
}

impl core::fmt::Debug for JointGenerators {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JointGenerators")
            .field("straight", &self.straight.is_some())
            .field("junction", &self.junction.is_some())
            .field("dispose", &self.dispose.is_some())
            .finish()
    }
}

impl JointGenerators {
    /// No geometry for any joint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the builder for two-edge joints.
    pub fn with_straight(
        mut self,
        f: impl Fn(&mut Scene, &JointRequest) -> Vec<CoordinateId> + 'static,
    ) -> Self {
        self.straight = Some(Rc::new(f));
        self
    }

    /// Set the builder for joints of three or more edges.
    pub fn with_junction(
        mut self,
        f: impl Fn(&mut Scene, &JointRequest) -> Vec<CoordinateId> + 'static,
    ) -> Self {
        self.junction = Some(Rc::new(f));
        self
    }

    /// Set the disposal hook. Without one, generated coordinates are removed from the scene.
    pub fn with_dispose(mut self, f: impl Fn(&mut Scene, &[CoordinateId]) + 'static) -> Self {
        self.dispose = Some(Rc::new(f));
        self
    }

    /// Run the builder matching `request.kind`.
    pub fn build(&self, scene: &mut Scene, request: &JointRequest) -> Vec<CoordinateId> {
        let builder = match request.kind {
            JointKind::FreeEnd => None,
            JointKind::Straight => self.straight.as_ref(),
            JointKind::Junction => self.junction.as_ref(),
        };
        builder.map(|b| b(scene, request)).unwrap_or_default()
    }

    /// Dispose previously built geometry.
    pub fn dispose(&self, scene: &mut Scene, coordinates: &[CoordinateId]) {
        if coordinates.is_empty() {
            return;
        }
        match &self.dispose {
            Some(f) => f(scene, coordinates),
            None => {
                for &c in coordinates {
                    scene.remove(c);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::f32::consts::FRAC_PI_2;

    #[test]
    fn edge_counts_select_kinds() {
        assert_eq!(JointKind::from_edge_count(1), JointKind::FreeEnd);
        assert_eq!(JointKind::from_edge_count(2), JointKind::Straight);
        assert_eq!(JointKind::from_edge_count(3), JointKind::Junction);
        assert_eq!(JointKind::from_edge_count(5), JointKind::Junction);
    }

    #[test]
    fn right_angle_tee_offset_is_half_width() {
        let dirs = [Vec3::X, Vec3::NEG_X, Vec3::Z];
        let angle = min_subtended_angle(&dirs).unwrap();
        assert!((angle - FRAC_PI_2).abs() < 1e-6);
        let width = 3.0;
        let offset = junction_offset(width, angle, 1e-4);
        let closed_form = (width / 2.0) * ((PI - angle) / 2.0).sin() / (angle / 2.0).sin();
        assert!((offset - closed_form).abs() < 1e-6);
        assert!((offset - 1.5).abs() < 1e-5, "{offset}");
    }

    #[test]
    fn narrow_and_degenerate_angles() {
        let sixty = 60.0_f32.to_radians();
        let offset = junction_offset(2.0, sixty, 1e-4);
        assert!((offset - 3.0_f32.sqrt()).abs() < 1e-5, "{offset}");
        assert_eq!(junction_offset(2.0, 0.0, 1e-4), 0.0);
        assert!(junction_offset(2.0, PI, 1e-4).abs() < 1e-6);
        assert_eq!(min_subtended_angle(&[Vec3::X]), None);
        assert_eq!(min_subtended_angle(&[Vec3::X, Vec3::ZERO]), None);
    }

    #[test]
    fn build_dispatches_by_kind_and_dispose_defaults_to_remove() {
        let mut scene = Scene::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l2 = log.clone();
        let gens = JointGenerators::new().with_junction(move |scene, req| {
            l2.borrow_mut().push(req.kind);
            alloc::vec![scene.insert()]
        });
        let mut req = JointRequest {
            kind: JointKind::Straight,
            center: Vec3::ZERO,
            width: 1.0,
            offset: 0.0,
            edges: Vec::new(),
        };
        assert!(gens.build(&mut scene, &req).is_empty());
        req.kind = JointKind::Junction;
        let built = gens.build(&mut scene, &req);
        assert_eq!(built.len(), 1);
        assert_eq!(*log.borrow(), [JointKind::Junction]);
        gens.dispose(&mut scene, &built);
        assert!(!scene.is_alive(built[0]));
    }
}
