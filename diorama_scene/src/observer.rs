// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered subscriber lists.
//!
//! ## Re-entrancy
//!
//! Owners never call subscribers while iterating the list itself.
//! They take a [`snapshot`](Observers::snapshot) first and invoke the cloned `Rc`s.
//! A subscriber may therefore subscribe, unsubscribe, or mutate the owner while it is being
//! notified:
//! - a subscriber added during dispatch is first called on the next dispatch;
//! - a subscriber removed during dispatch is still called in the current one if it was part of
//!   the snapshot.

use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::error::{Error, Result};

/// Token returned by [`Observers::subscribe`].
///
/// Tokens are unique within the list that issued them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Subscription(u64);

/// An ordered list of subscribers of type `F` (usually `dyn Fn(..)`).
pub struct Observers<F: ?Sized> {
    next: u64,
    entries: Vec<(Subscription, Rc<F>)>,
}

impl<F: ?Sized> Default for Observers<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> core::fmt::Debug for Observers<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<F: ?Sized> Observers<F> {
    /// Create an empty list.
    pub const fn new() -> Self {
        Self {
            next: 0,
            entries: Vec::new(),
        }
    }

    /// Append a subscriber. Subscribers are notified in subscription order.
    pub fn subscribe(&mut self, subscriber: Rc<F>) -> Subscription {
        let token = Subscription(self.next);
        self.next += 1;
        self.entries.push((token, subscriber));
        token
    }

    /// Remove a subscriber.
    ///
    /// Fails with [`Error::UnknownSubscription`] if the token is not registered.
    pub fn unsubscribe(&mut self, token: Subscription) -> Result<()> {
        let Some(pos) = self.entries.iter().position(|(t, _)| *t == token) else {
            return Err(Error::UnknownSubscription(token));
        };
        self.entries.remove(pos);
        Ok(())
    }

    /// Returns true if `token` is registered.
    pub fn contains(&self, token: Subscription) -> bool {
        self.entries.iter().any(|(t, _)| *t == token)
    }

    /// Clone the current subscribers, in order, for dispatch.
    pub fn snapshot(&self) -> Vec<Rc<F>> {
        self.entries.iter().map(|(_, f)| Rc::clone(f)).collect()
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no subscribers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every subscriber.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    type Listener = dyn Fn(&RefCell<Vec<u32>>);

    #[test]
    fn notifies_in_subscription_order() {
        let mut list: Observers<Listener> = Observers::new();
        list.subscribe(Rc::new(|log: &RefCell<Vec<u32>>| log.borrow_mut().push(1)));
        list.subscribe(Rc::new(|log: &RefCell<Vec<u32>>| log.borrow_mut().push(2)));
        let log = RefCell::new(Vec::new());
        for f in list.snapshot() {
            f(&log);
        }
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn unsubscribe_unknown_token_fails() {
        let mut list: Observers<Listener> = Observers::new();
        let t = list.subscribe(Rc::new(|_: &RefCell<Vec<u32>>| {}));
        assert!(list.unsubscribe(t).is_ok());
        assert_eq!(list.unsubscribe(t), Err(Error::UnknownSubscription(t)));
        assert!(list.is_empty());
    }

    #[test]
    fn snapshot_survives_mutation_during_dispatch() {
        let list: Rc<RefCell<Observers<dyn Fn()>>> = Rc::new(RefCell::new(Observers::new()));
        let calls = Rc::new(RefCell::new(0_u32));
        let token = Rc::new(RefCell::new(None));
        {
            let list2 = Rc::clone(&list);
            let calls2 = Rc::clone(&calls);
            let token2 = Rc::clone(&token);
            let t = list.borrow_mut().subscribe(Rc::new(move || {
                *calls2.borrow_mut() += 1;
                // Remove ourselves while being dispatched.
                if let Some(t) = token2.borrow_mut().take() {
                    list2.borrow_mut().unsubscribe(t).unwrap();
                }
            }));
            *token.borrow_mut() = Some(t);
        }
        let snap = list.borrow().snapshot();
        for f in snap {
            f();
        }
        assert_eq!(*calls.borrow(), 1);
        assert!(list.borrow().is_empty(), "self-removal must take effect");
    }
}
