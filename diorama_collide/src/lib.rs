// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diorama Collide: colliders and screen-to-world raycasting over a diorama scene.
//!
//! - [`Collider`]s attach a closed set of shapes ([`ColliderShape`]) to scene coordinates.
//! - [`ColliderSet`] stores them under generational [`ColliderId`]s.
//! - [`Raycaster`] turns a normalized pointer position and a [`CameraView`] into a world ray
//!   and records which of its targets the ray hits, nearest first.
//! - [`Raycasters`] chains raycasters so foreground targets (gizmos) can block background ones.
//!
//! ## Distances
//!
//! Shape tests return `Option<f32>`: `None` when the ray misses, otherwise the signed
//! distance along the ray to the entry point. A negative distance means the entry lies behind
//! the ray origin. Raycasters only record non-negative hits.
//!
//! ## Example
//!
//! ```
//! use diorama_collide::{Camera, Collider, ColliderSet, Raycaster};
//! use diorama_scene::Scene;
//! use glam::{Vec2, Vec3};
//!
//! let mut scene = Scene::new();
//! let eye = scene.insert();
//! scene.set_position(eye, Vec3::new(0.0, 0.0, 10.0));
//! let camera = Camera::new(eye);
//!
//! let target = scene.insert();
//! let mut colliders = ColliderSet::new();
//! let ball = colliders.insert(Collider::ball(target, 1.0));
//!
//! let mut raycaster = Raycaster::new();
//! raycaster.add_target(ball);
//! let hits = raycaster.check(&scene, &colliders, &camera, Vec2::ZERO);
//! assert_eq!(hits[0].collider, ball);
//! ```

extern crate alloc;

mod camera;
mod collider;
mod ray;
mod raycaster;
mod set;

pub use camera::{Camera, CameraView, Projection};
pub use collider::{Collider, ColliderFlags, ColliderShape, EdgeEvaluator, EdgeQuery};
pub use ray::{Ray, RaycastConfig, ndc};
pub use raycaster::{RaycastHit, Raycaster, RaycasterIndex, Raycasters, pointer_ray};
pub use set::{ColliderId, ColliderSet};
