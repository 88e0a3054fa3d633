// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover state helper: compute enter/leave transitions as the nearest hovered handle changes.
//!
//! ## Minimal example
//!
//! ```
//! use diorama_handles::hover::{HoverEvent, HoverState};
//! let mut h: HoverState<u32> = HoverState::new();
//! assert_eq!(h.update(Some(1)), vec![HoverEvent::Enter(1)]);
//! assert_eq!(h.update(Some(2)), vec![HoverEvent::Leave(1), HoverEvent::Enter(2)]);
//! assert_eq!(h.update(None), vec![HoverEvent::Leave(2)]);
//! ```

use alloc::vec::Vec;

/// A hover state machine over a single hovered key.
///
/// Ordering semantics: when the hovered key changes, the leave of the old key is emitted
/// before the enter of the new one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HoverState<K: Copy + Eq> {
    current: Option<K>,
}

/// A hover transition event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HoverEvent<K> {
    /// Pointer enters the given key.
    Enter(K),
    /// Pointer leaves the given key.
    Leave(K),
}

impl<K: Copy + Eq> HoverState<K> {
    /// Create an empty hover state.
    pub fn new() -> Self {
        Self { current: None }
    }

    /// The currently hovered key.
    pub fn current(&self) -> Option<K> {
        self.current
    }

    /// Clear the hover, returning the leave event if something was hovered.
    pub fn clear(&mut self) -> Vec<HoverEvent<K>> {
        self.update(None)
    }

    /// Set the hovered key and return the transitions from the previous one.
    pub fn update(&mut self, hovered: Option<K>) -> Vec<HoverEvent<K>> {
        if self.current == hovered {
            return Vec::new();
        }
        let mut out = Vec::new();
        if let Some(old) = self.current {
            out.push(HoverEvent::Leave(old));
        }
        if let Some(new) = hovered {
            out.push(HoverEvent::Enter(new));
        }
        self.current = hovered;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn same_key_emits_nothing() {
        let mut h: HoverState<u32> = HoverState::new();
        assert_eq!(h.update(Some(7)), vec![HoverEvent::Enter(7)]);
        assert!(h.update(Some(7)).is_empty());
        assert_eq!(h.current(), Some(7));
    }

    #[test]
    fn clear_leaves_once() {
        let mut h: HoverState<u32> = HoverState::new();
        let _ = h.update(Some(3));
        assert_eq!(h.clear(), vec![HoverEvent::Leave(3)]);
        assert!(h.clear().is_empty());
        assert_eq!(h.current(), None);
    }
}
