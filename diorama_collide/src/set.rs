// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena of colliders addressed by generational ids.

use alloc::vec::Vec;

use crate::collider::{Collider, ColliderFlags};

/// Identifier for a collider in a [`ColliderSet`].
///
/// Like [`CoordinateId`](diorama_scene::CoordinateId), a slot index plus a generation.
/// Ids of removed colliders are stale and never alias a later collider in the same slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ColliderId(u32, u32);

impl ColliderId {
    const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Slot index.
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Generation of the slot when the id was issued.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

/// Storage for colliders.
#[derive(Debug, Default)]
pub struct ColliderSet {
    slots: Vec<Option<Collider>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl ColliderSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collider, returning its id.
    pub fn insert(&mut self, collider: Collider) -> ColliderId {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.generations[idx] = self.generations[idx].saturating_add(1);
            self.slots[idx] = Some(collider);
            idx
        } else {
            self.slots.push(Some(collider));
            self.generations.push(1);
            self.slots.len() - 1
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Collider counts are far below u32::MAX."
        )]
        ColliderId(idx as u32, self.generations[idx])
    }

    /// Remove a collider, returning it if `id` was live.
    pub fn remove(&mut self, id: ColliderId) -> Option<Collider> {
        if !self.contains(id) {
            return None;
        }
        let removed = self.slots[id.idx()].take();
        self.free_list.push(id.idx());
        removed
    }

    /// Returns true if `id` refers to a live collider.
    pub fn contains(&self, id: ColliderId) -> bool {
        self.generations.get(id.idx()).copied() == Some(id.1)
            && self.slots.get(id.idx()).is_some_and(Option::is_some)
    }

    /// Look up a live collider.
    pub fn get(&self, id: ColliderId) -> Option<&Collider> {
        if !self.contains(id) {
            return None;
        }
        self.slots[id.idx()].as_ref()
    }

    /// Look up a live collider mutably.
    pub fn get_mut(&mut self, id: ColliderId) -> Option<&mut Collider> {
        if !self.contains(id) {
            return None;
        }
        self.slots[id.idx()].as_mut()
    }

    /// Enable or disable raycast participation. No-op on stale ids.
    pub fn set_enabled(&mut self, id: ColliderId, enabled: bool) {
        if let Some(c) = self.get_mut(id) {
            c.flags.set(ColliderFlags::ENABLED, enabled);
        }
    }

    /// Iterate live colliders in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ColliderId, &Collider)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.as_ref().map(|c| {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "Slot indices were issued as u32."
                )]
                let id = ColliderId(idx as u32, self.generations[idx]);
                (id, c)
            })
        })
    }

    /// Number of live colliders.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Returns true if no collider is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diorama_scene::Scene;

    #[test]
    fn stale_ids_do_not_alias_reused_slots() {
        let mut scene = Scene::new();
        let c = scene.insert();
        let mut set = ColliderSet::new();
        let a = set.insert(Collider::ball(c, 1.0));
        assert!(set.remove(a).is_some());
        assert!(set.remove(a).is_none());
        let b = set.insert(Collider::ball(c, 2.0));
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert!(set.get(a).is_none());
        assert!(set.contains(b));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn set_enabled_toggles_flag() {
        let mut scene = Scene::new();
        let c = scene.insert();
        let mut set = ColliderSet::new();
        let id = set.insert(Collider::plane(c, glam::Vec3::Y));
        set.set_enabled(id, false);
        assert!(!set.get(id).unwrap().is_enabled());
        set.set_enabled(id, true);
        assert!(set.get(id).unwrap().is_enabled());
        assert_eq!(set.iter().count(), 1);
    }
}
