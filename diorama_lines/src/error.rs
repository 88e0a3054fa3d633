// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for line construction and interactive generation.

use thiserror::Error;

/// Errors raised by line items and the [`LineItemGenerator`](crate::LineItemGenerator).
///
/// Graph inconsistencies (disconnecting a pair that is not connected) are not errors;
/// those operations return `false` instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Generation was started before a prototype was configured.
    #[error("no line item prototype is configured")]
    MissingPrototype,
    /// An update, finish, or cancel arrived while nothing was being generated.
    #[error("no line item is being generated")]
    NotGenerating,
    /// A scene operation failed.
    #[error(transparent)]
    Scene(#[from] diorama_scene::Error),
}

/// Result alias for line operations.
pub type Result<T> = core::result::Result<T, Error>;
