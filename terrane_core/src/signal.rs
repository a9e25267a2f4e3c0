// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered observer lists.
//!
//! A [`Signal`] owns an ordered list of registered callbacks. Emission invokes
//! each callback in registration order. Disconnection is an explicit removal
//! keyed by the [`ConnectionId`] returned at connect time, never by comparing
//! closure identity.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

/// Token identifying one connection to a [`Signal`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl fmt::Debug for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConnectionId({})", self.0)
    }
}

/// An ordered list of observers invoked on [`emit`](Self::emit).
pub struct Signal<T> {
    slots: Vec<(ConnectionId, Box<dyn FnMut(&T)>)>,
    next_id: u64,
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.slots.len())
            .finish_non_exhaustive()
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Signal<T> {
    /// Creates a signal with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_id: 0,
        }
    }

    /// Registers an observer, returning its connection token.
    pub fn connect(&mut self, observer: impl FnMut(&T) + 'static) -> ConnectionId {
        let id = ConnectionId(self.next_id);
        self.next_id += 1;
        self.slots.push((id, Box::new(observer)));
        id
    }

    /// Removes the observer registered under `id`.
    ///
    /// Returns `false` if the token was already disconnected.
    pub fn disconnect(&mut self, id: ConnectionId) -> bool {
        let before = self.slots.len();
        self.slots.retain(|(slot_id, _)| *slot_id != id);
        self.slots.len() != before
    }

    /// Invokes every observer, in registration order.
    pub fn emit(&mut self, arg: &T) {
        for (_, observer) in &mut self.slots {
            observer(arg);
        }
    }

    /// Returns the number of connected observers.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use super::*;

    #[test]
    fn emission_follows_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut signal = Signal::new();

        for tag in [1_u32, 2, 3] {
            let order = Rc::clone(&order);
            signal.connect(move |(): &()| order.borrow_mut().push(tag));
        }

        signal.emit(&());
        assert_eq!(*order.borrow(), [1, 2, 3]);
    }

    #[test]
    fn disconnect_by_token() {
        let hits = Rc::new(RefCell::new(0_u32));
        let mut signal = Signal::new();

        let hits_a = Rc::clone(&hits);
        let a = signal.connect(move |(): &()| *hits_a.borrow_mut() += 1);
        let hits_b = Rc::clone(&hits);
        let _b = signal.connect(move |(): &()| *hits_b.borrow_mut() += 10);

        assert!(signal.disconnect(a));
        assert!(!signal.disconnect(a), "second disconnect is a no-op");

        signal.emit(&());
        assert_eq!(*hits.borrow(), 10, "only the remaining observer fires");
    }

    #[test]
    fn emit_passes_argument() {
        let seen = Rc::new(RefCell::new(0_i64));
        let mut signal = Signal::new();
        let seen_inner = Rc::clone(&seen);
        signal.connect(move |v: &i64| *seen_inner.borrow_mut() = *v);

        signal.emit(&42);
        assert_eq!(*seen.borrow(), 42);
    }

    #[test]
    fn connection_count_tracks_membership() {
        let mut signal = Signal::<()>::new();
        assert_eq!(signal.connection_count(), 0);
        let id = signal.connect(|()| {});
        assert_eq!(signal.connection_count(), 1);
        signal.disconnect(id);
        assert_eq!(signal.connection_count(), 0);
    }
}
