// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame change collection.
//!
//! Collection follows a drain pattern per dirty channel: each
//! [`ActorStore::collect_changes`] call drains every channel and surfaces the
//! dirty slot indices as an [`UpdateChanges`]. The render side reads this to
//! decide whether anything needs redrawing; a quiescent scene produces an
//! empty set and the frame can be skipped entirely.
//!
//! [`UpdateChanges`] uses raw slot indices (`u32`) rather than
//! [`ActorId`](super::ActorId) handles so consumers can index without paying
//! for generation checks.

use alloc::vec::Vec;

use super::store::ActorStore;
use crate::dirty;

/// The set of changes produced by a single [`ActorStore::collect_changes`]
/// call.
#[derive(Clone, Debug, Default)]
pub struct UpdateChanges {
    /// Actors whose position changed.
    pub positions: Vec<u32>,
    /// Actors whose size changed (including via negotiation).
    pub sizes: Vec<u32>,
    /// Actors with a changed custom property (including via constraints).
    pub properties: Vec<u32>,
    /// Actors added since the last collection.
    pub added: Vec<u32>,
    /// Actors removed since the last collection.
    pub removed: Vec<u32>,
    /// Whether the tree topology changed.
    pub topology_changed: bool,
}

impl UpdateChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.sizes.clear();
        self.properties.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns whether nothing changed this frame.
    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        self.positions.is_empty()
            && self.sizes.is_empty()
            && self.properties.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl ActorStore {
    /// Drains all dirty channels, returning the set of changes since the last
    /// collection.
    pub fn collect_changes(&mut self) -> UpdateChanges {
        let mut changes = UpdateChanges::default();
        self.collect_changes_into(&mut changes);
        changes
    }

    /// Like [`collect_changes`](Self::collect_changes), but reuses a
    /// caller-provided buffer to avoid allocation.
    pub fn collect_changes_into(&mut self, changes: &mut UpdateChanges) {
        changes.clear();

        changes.topology_changed = core::mem::take(&mut self.topology_dirty);

        changes.positions = self
            .dirty
            .drain(dirty::POSITION)
            .deterministic()
            .run()
            .collect();

        changes.sizes = self
            .dirty
            .drain(dirty::SIZE)
            .deterministic()
            .run()
            .collect();

        changes.properties = self
            .dirty
            .drain(dirty::PROPERTY)
            .deterministic()
            .run()
            .collect();

        // Drain TOPOLOGY (just consume, changes are structural).
        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }
}
