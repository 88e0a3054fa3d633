// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collider shapes and their ray and overlap tests.

use alloc::rc::Rc;
use diorama_scene::math::direction_matrix;
use diorama_scene::{CoordinateId, Scene};
use glam::Vec3;

use crate::ray::{Ray, RaycastConfig};

bitflags::bitflags! {
    /// Collider flags controlling participation in raycasts.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ColliderFlags: u8 {
        /// Collider participates in raycasts.
        const ENABLED     = 0b0000_0001;
        /// Hits on this collider do not block later raycasters in a
        /// [`Raycasters`](crate::Raycasters) chain.
        const TRANSPARENT = 0b0000_0010;
    }
}

impl Default for ColliderFlags {
    fn default() -> Self {
        Self::ENABLED
    }
}

/// A candidate plane hit offered to an [`EdgeEvaluator`].
#[derive(Copy, Clone, Debug)]
pub struct EdgeQuery<'a> {
    /// Signed distance along the ray.
    pub distance: f32,
    /// The tested ray, in world space.
    pub ray: &'a Ray,
    /// The hit point in the plane coordinate's local space.
    pub local_point: Vec3,
    /// The plane normal in local space (unit length).
    pub local_normal: Vec3,
}

/// Predicate restricting an infinite plane to a bounded or patterned region.
#[derive(Clone)]
pub struct EdgeEvaluator(Rc<dyn Fn(&EdgeQuery<'_>) -> bool>);

impl core::fmt::Debug for EdgeEvaluator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("EdgeEvaluator").finish_non_exhaustive()
    }
}

impl EdgeEvaluator {
    /// Wrap an arbitrary predicate.
    pub fn new(f: impl Fn(&EdgeQuery<'_>) -> bool + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Accept hits whose in-plane distance from the local origin lies in `inner..=outer`.
    pub fn annulus(inner: f32, outer: f32) -> Self {
        Self::new(move |q| {
            let p = q.local_point;
            let in_plane = p - q.local_normal * p.dot(q.local_normal);
            let r = in_plane.length();
            r >= inner && r <= outer
        })
    }

    /// Accept hits inside a local axis-aligned box of half extents `half_extents`.
    ///
    /// Give the axis along the plane normal a non-zero extent for tolerance.
    pub fn rectangle(half_extents: Vec3) -> Self {
        Self::new(move |q| {
            let p = q.local_point.abs();
            p.x <= half_extents.x && p.y <= half_extents.y && p.z <= half_extents.z
        })
    }

    /// Evaluate the predicate.
    pub fn accepts(&self, query: &EdgeQuery<'_>) -> bool {
        (self.0)(query)
    }
}

/// Geometry of a collider, in the local space of its coordinate.
#[derive(Clone, Debug)]
pub enum ColliderShape {
    /// Hit by every ray at a small fixed distance. Use as a guaranteed fallback target.
    Infinite,
    /// A sphere centered on the coordinate origin.
    Ball {
        /// Sphere radius in world units.
        radius: f32,
    },
    /// An oriented box centered on the coordinate origin.
    Box {
        /// Half of the edge length along each local axis.
        half_extents: Vec3,
    },
    /// A plane through the coordinate origin.
    Plane {
        /// Plane normal in local space.
        normal: Vec3,
        /// Optional restriction of the plane to a region.
        edge: Option<EdgeEvaluator>,
    },
}

/// A shape attached to a coordinate.
///
/// The collider refers to its coordinate; it never owns it.
#[derive(Clone, Debug)]
pub struct Collider {
    /// Coordinate providing the world placement.
    pub coordinate: CoordinateId,
    /// Local geometry.
    pub shape: ColliderShape,
    /// Raycast participation.
    pub flags: ColliderFlags,
}

impl Collider {
    /// A collider of any shape with default flags.
    pub fn new(coordinate: CoordinateId, shape: ColliderShape) -> Self {
        Self {
            coordinate,
            shape,
            flags: ColliderFlags::default(),
        }
    }

    /// An always-hit collider.
    pub fn infinite(coordinate: CoordinateId) -> Self {
        Self::new(coordinate, ColliderShape::Infinite)
    }

    /// A ball collider.
    pub fn ball(coordinate: CoordinateId, radius: f32) -> Self {
        Self::new(coordinate, ColliderShape::Ball { radius })
    }

    /// A box collider.
    pub fn cuboid(coordinate: CoordinateId, half_extents: Vec3) -> Self {
        Self::new(coordinate, ColliderShape::Box { half_extents })
    }

    /// An unbounded plane collider.
    pub fn plane(coordinate: CoordinateId, normal: Vec3) -> Self {
        Self::new(coordinate, ColliderShape::Plane { normal, edge: None })
    }

    /// Restrict a plane collider to a region. No effect on other shapes.
    pub fn with_edge(mut self, evaluator: EdgeEvaluator) -> Self {
        if let ColliderShape::Plane { edge, .. } = &mut self.shape {
            *edge = Some(evaluator);
        }
        self
    }

    /// Replace the flags.
    pub fn with_flags(mut self, flags: ColliderFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Returns true if the collider takes part in raycasts.
    pub fn is_enabled(&self) -> bool {
        self.flags.contains(ColliderFlags::ENABLED)
    }

    /// Returns true if hits on this collider do not block later raycasters.
    pub fn is_transparent(&self) -> bool {
        self.flags.contains(ColliderFlags::TRANSPARENT)
    }

    /// [`Collider::check_ray_with`] using the default [`RaycastConfig`].
    pub fn check_ray(&self, scene: &Scene, ray: &Ray) -> Option<f32> {
        self.check_ray_with(scene, ray, &RaycastConfig::default())
    }

    /// Signed distance along `ray` to the surface, or `None` when the ray misses.
    ///
    /// The distance is negative when the entry point lies behind the ray origin
    /// (origin inside a ball or box, or a plane behind the origin).
    /// Raycasters discard such hits.
    pub fn check_ray_with(&self, scene: &Scene, ray: &Ray, config: &RaycastConfig) -> Option<f32> {
        match &self.shape {
            ColliderShape::Infinite => Some(config.infinite_distance),
            ColliderShape::Ball { radius } => {
                ball_ray(scene.world_origin(self.coordinate), *radius, ray)
            }
            ColliderShape::Box { half_extents } => {
                box_ray(scene, self.coordinate, *half_extents, ray)
            }
            ColliderShape::Plane { normal, edge } => {
                plane_ray(scene, self.coordinate, *normal, edge.as_ref(), ray, config)
            }
        }
    }

    /// Vector that would push `self` out of `other`.
    ///
    /// Only ball-vs-ball overlaps produce a non-zero vector. Coincident centers give zero.
    pub fn check_collider(&self, scene: &Scene, other: &Self) -> Vec3 {
        let (ColliderShape::Ball { radius: ra }, ColliderShape::Ball { radius: rb }) =
            (&self.shape, &other.shape)
        else {
            return Vec3::ZERO;
        };
        let a = scene.world_origin(self.coordinate);
        let b = scene.world_origin(other.coordinate);
        let overlap = ra + rb - a.distance(b);
        if overlap <= 0.0 {
            return Vec3::ZERO;
        }
        (a - b).normalize_or_zero() * overlap
    }
}

pub(crate) fn ball_ray(center: Vec3, radius: f32, ray: &Ray) -> Option<f32> {
    // a = 1 for a unit direction.
    let oc = ray.origin - center;
    let b = 2.0 * oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;
    let d = b * b - 4.0 * c;
    if d < 0.0 {
        return None;
    }
    Some((-b - d.sqrt()) * 0.5)
}

fn box_ray(scene: &Scene, coordinate: CoordinateId, half: Vec3, ray: &Ray) -> Option<f32> {
    let inv = scene.from_world(coordinate);
    let origin = inv.transform_point3(ray.origin);
    let dir = inv.transform_vector3(ray.direction);
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        let (o, d, h) = (origin[axis], dir[axis], half[axis]);
        if d.abs() < f32::EPSILON {
            if o < -h || o > h {
                return None;
            }
            continue;
        }
        let t1 = (-h - o) / d;
        let t2 = (h - o) / d;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
        if t_min > t_max {
            return None;
        }
    }
    if t_max < 0.0 {
        return None;
    }
    Some(t_min)
}

fn plane_ray(
    scene: &Scene,
    coordinate: CoordinateId,
    local_normal: Vec3,
    edge: Option<&EdgeEvaluator>,
    ray: &Ray,
    config: &RaycastConfig,
) -> Option<f32> {
    let to_world = scene.to_world(coordinate);
    let normal = (direction_matrix(to_world) * local_normal).normalize_or_zero();
    let denom = normal.dot(ray.direction);
    if denom.abs() < config.parallel_epsilon {
        return None;
    }
    let point = to_world.transform_point3(Vec3::ZERO);
    let t = (point - ray.origin).dot(normal) / denom;
    if let Some(edge) = edge {
        let query = EdgeQuery {
            distance: t,
            ray,
            local_point: scene.from_world(coordinate).transform_point3(ray.at(t)),
            local_normal: local_normal.normalize_or_zero(),
        };
        if !edge.accepts(&query) {
            return None;
        }
    }
    Some(t)
}
