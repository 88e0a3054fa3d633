// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for structural scene operations.

use thiserror::Error;

use crate::observer::Subscription;
use crate::types::CoordinateId;

/// Errors raised by [`Scene`](crate::Scene) and [`Observers`](crate::Observers).
///
/// Only structural invariant violations and missing-state lookups are errors.
/// Geometric degeneracies are reported through sentinel values instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The child is already attached to a parent and must be detached first.
    #[error("coordinate {child:?} already has parent {parent:?}")]
    InvalidParentCoordinate {
        /// Coordinate that was offered as a child.
        child: CoordinateId,
        /// Its current parent.
        parent: CoordinateId,
    },
    /// Attaching would make a coordinate its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    CycleDetected {
        /// Requested parent.
        parent: CoordinateId,
        /// Requested child.
        child: CoordinateId,
    },
    /// The identifier refers to a removed coordinate.
    #[error("coordinate {0:?} is not alive")]
    StaleCoordinate(CoordinateId),
    /// The callback token was never registered, or was already removed.
    #[error("callback {0:?} is not registered")]
    UnknownSubscription(Subscription),
}

/// Result alias for scene operations.
pub type Result<T> = core::result::Result<T, Error>;
