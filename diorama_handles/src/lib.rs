// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diorama Handles: pointer-driven manipulation of scene coordinates.
//!
//! A *handle* pairs colliders with a [`Handler`]. [`MouseControlHandles`] raycasts on every
//! pointer event and routes the gesture to the handlers whose colliders were hit:
//!
//! - Down: hit, idle handlers are offered `start`; those that accept are *handling*.
//! - Move: handling handlers receive `move_to`; otherwise hover transitions are reported.
//! - Up: handling handlers receive `end` and the gesture is over.
//!
//! Built-in handlers cover axis, plane and surface drags ([`DirectionalMoveHandler`],
//! [`PlaneMoveHandler`], [`RaycastMoveHandler`]), rotation ([`RotationHandler`]), nearest-hit
//! disambiguation ([`ProxyHandler`]) and linking line ends ([`JointHandler`]). Drag positions
//! go through a [`CursorModifier`] for grid or surface snapping.
//!
//! ## Example
//!
//! ```
//! use std::{cell::RefCell, rc::Rc};
//! use diorama_collide::{Camera, Collider, ColliderSet, Raycaster, Raycasters};
//! use diorama_handles::{
//!     CursorModifier, DirectionalMoveHandler, HandlesConfig, MouseControlHandles,
//! };
//! use diorama_scene::Scene;
//! use glam::Vec3;
//! use kurbo::Point;
//!
//! let mut scene = Scene::new();
//! let eye = scene.insert();
//! scene.set_position(eye, Vec3::new(0.0, 0.0, 10.0));
//! let camera = Camera::new(eye);
//! let cube = scene.insert();
//! let mut colliders = ColliderSet::new();
//! let grip = colliders.insert(Collider::cuboid(cube, Vec3::ONE));
//!
//! let mut rc = Raycaster::new();
//! rc.add_target(grip);
//! let mut chain = Raycasters::new();
//! chain.push(rc);
//! let mut handles = MouseControlHandles::new(chain, HandlesConfig::default());
//! let mover = DirectionalMoveHandler::new(cube, Vec3::X, CursorModifier::none());
//! handles.add(grip, Rc::new(RefCell::new(mover)));
//!
//! assert_eq!(handles.mouse_down(&mut scene, &mut colliders, &camera, Point::ZERO).len(), 1);
//! handles.mouse_move(&mut scene, &mut colliders, &camera, Point::new(0.1, 0.0));
//! handles.mouse_up(&mut scene, &mut colliders, &camera, Point::new(0.1, 0.0));
//! assert!(scene.world_origin(cube).x > 0.0);
//! ```

extern crate alloc;

mod cursor;
mod drag;
mod handlers;
pub mod hover;
mod manager;
mod types;

pub use cursor::{Alignment, CursorModifier};
pub use drag::{DragBasis, PositionWriter, constrain};
pub use handlers::{
    Connectables, DetachPredicate, DirectionalMoveHandler, JointHandler, PlaneMoveHandler,
    ProxyHandler, RaycastMoveHandler, RotationHandler,
};
pub use hover::{HoverEvent, HoverState};
pub use manager::{MouseControlHandles, PointerCallback};
pub use types::{
    HandleContext, HandleId, Handler, HandlerState, HandlesConfig, SharedHandler, StartGuard,
    StateCallback,
};
