// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tuning for connection sync and junction math.

/// Tolerances shared by connections and line items.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineConfig {
    /// Connected positions closer than this are considered equal and are not re-synced.
    pub sync_epsilon: f32,
    /// Subtended angles below this (radians) produce no junction offset.
    pub degenerate_angle: f32,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            sync_epsilon: 1e-4,
            degenerate_angle: 1e-4,
        }
    }
}
