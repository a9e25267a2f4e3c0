// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{ActorId, INVALID};
use super::store::ActorStore;

/// An iterator over the direct children of an actor.
///
/// Created by [`ActorStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a ActorStore,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a ActorStore, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = ActorId;

    fn next(&mut self) -> Option<ActorId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(ActorId {
            idx,
            generation: self.store.generation[idx as usize],
        })
    }
}
