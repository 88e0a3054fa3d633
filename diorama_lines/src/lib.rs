// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diorama Lines: connectable line items with junction geometry.
//!
//! - [`LineSegment`] is a straight [`Line`] that follows two scene coordinates.
//! - [`LineItemConnection`] links line ends into groups whose positions stay synchronized.
//! - [`LineItem`] is a width-carrying line whose rendered part is shortened by the junction
//!   offset at each end, and which asks caller-supplied [`JointGenerators`] for joint geometry.
//! - [`LineItemGenerator`] creates items interactively from a [`LineItemPrototype`].
//!
//! ## Joints
//!
//! The number of connections in a group selects the [`JointKind`]: one is a free end, two a
//! straight joint, three or more a junction. A junction consumes
//! [`junction_offset`]`(width, angle)` of each incoming line, where `angle` is the smallest
//! angle between any two incoming directions.
//!
//! ## Example
//!
//! ```
//! use diorama_lines::{End, JointGenerators, JointKind, LineConfig, LineItem};
//! use diorama_scene::Scene;
//! use glam::Vec3;
//!
//! let mut scene = Scene::new();
//! let cfg = LineConfig::default();
//! let joints = JointGenerators::new;
//! let a = LineItem::new(&mut scene, Vec3::ZERO, Vec3::X, 1.0, joints(), cfg).unwrap();
//! let b = LineItem::new(&mut scene, Vec3::X, 2.0 * Vec3::X, 1.0, joints(), cfg).unwrap();
//! assert!(b.connection(End::Start).connect(&mut scene, &a.connection(End::End)));
//! assert_eq!(a.joint_kind(End::End), JointKind::Straight);
//!
//! // Connected ends move together.
//! a.set_end_position(&mut scene, End::End, Vec3::new(1.0, 1.0, 0.0));
//! assert_eq!(b.segment().start_position(), Vec3::new(1.0, 1.0, 0.0));
//! ```

extern crate alloc;

mod config;
mod connection;
mod edge;
pub mod error;
mod generator;
mod item;
mod junction;
mod line;

pub use config::LineConfig;
pub use connection::{ConnectionCallback, GroupCallback, LineItemConnection};
pub use edge::LineEdge;
pub use error::{Error, Result};
pub use generator::{LineItemGenerator, LineItemPrototype};
pub use item::{End, ItemCallback, LineItem};
pub use junction::{
    JointBuilder, JointDisposer, JointEdge, JointGenerators, JointKind, JointRequest,
    junction_offset, min_subtended_angle,
};
pub use line::{Line, LineSegment, SegmentCallback};
