// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diorama Scene: an arena-backed 3D transform hierarchy.
//!
//! Diorama Scene is the spatial layer of the Diorama editing toolkit.
//!
//! - Represents a forest of coordinates, each with a local rotation+translation matrix and
//!   separate scale and mirror matrices.
//! - Computes world transforms by walking parent links, and inverse world transforms along the
//!   same path.
//! - Notifies subscribers synchronously on every mutation, so render adapters and dependent
//!   geometry stay in step.
//!
//! ## Arena, not pointers
//!
//! Coordinates live in a [`Scene`] and are addressed by generational [`CoordinateId`]s.
//! The tree is stored as explicit parent and child id lists.
//! Anything that needs per-coordinate data (colliders, render objects, markers) keeps a side
//! table keyed by `CoordinateId`.
//!
//! ## Effective transform
//!
//! A coordinate's effective local matrix is `scale * mirror * local`
//! (see [`LocalTransform::effective`]).
//! Its world matrix is the product of effective matrices from the root down to it.
//!
//! ## Notification
//!
//! There is no dirty-flag batching. Each setter fires the coordinate's `before_update`
//! subscribers, applies the change, then fires its `updated` subscribers before returning.
//! Subscribers get `&mut Scene` and may re-enter it; see [`observer`] for the snapshot contract.
//!
//! ## Example
//!
//! ```
//! use diorama_scene::Scene;
//! use glam::Vec3;
//!
//! let mut scene = Scene::new();
//! let base = scene.insert();
//! let arm = scene.insert();
//! scene.add_child(base, arm).unwrap();
//! scene.set_position(base, Vec3::new(1.0, 0.0, 0.0));
//! scene.set_position(arm, Vec3::new(0.0, 2.0, 0.0));
//! assert_eq!(scene.world_origin(arm), Vec3::new(1.0, 2.0, 0.0));
//!
//! // A coordinate has at most one parent.
//! let other = scene.insert();
//! assert!(scene.add_child(other, arm).is_err());
//! ```

extern crate alloc;

pub mod error;
pub mod math;
pub mod observer;
pub mod render;
mod scene;
mod types;

pub use error::{Error, Result};
pub use observer::{Observers, Subscription};
pub use render::{Color, DebugSink, RenderBinding, Renderer, RenderingObjectBuilder};
pub use scene::{ChildCallback, CoordinateCallback, Scene};
pub use types::{CoordinateId, LocalTransform};
