// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays actor storage with allocation, topology, and property
//! management.

use alloc::vec::Vec;

use kurbo::{Point, Size};
use understory_dirty::{CycleHandling, DirtyTracker};

use super::id::{ActorId, INVALID};
use super::traverse::Children;
use crate::dirty;
use crate::property::{CUSTOM_BASE, POSITION, PropertyIndex, PropertyValue, SIZE};

/// Per-actor boolean flags.
///
/// An actor with [`is_control`](Self::is_control) set participates in size
/// negotiation: the relayout walk queues it on the work stack instead of
/// descending through it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ActorFlags {
    /// Whether the actor negotiates its own and its children's sizes.
    pub is_control: bool,
}

/// Struct-of-arrays storage for all actors.
///
/// Actors are addressed by [`ActorId`] handles. Internally, each actor
/// occupies a slot in parallel arrays. Destroyed actors are recycled via a
/// free list, and generation counters prevent stale handle access.
#[derive(Debug)]
pub struct ActorStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties --
    pub(crate) position: Vec<Point>,
    pub(crate) size: Vec<Size>,
    pub(crate) flags: Vec<ActorFlags>,
    pub(crate) custom: Vec<Vec<PropertyValue>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,
    pub(crate) topology_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,

    // -- Relayout subscription --
    relayout_requested: bool,
}

impl Default for ActorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ActorStore {
    /// Creates an empty actor store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            position: Vec::new(),
            size: Vec::new(),
            flags: Vec::new(),
            custom: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            topology_dirty: false,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            relayout_requested: false,
        }
    }

    // -- Allocation API --

    /// Creates a new actor and returns its handle.
    ///
    /// The actor starts at the origin with zero size, no custom properties,
    /// default flags, and no parent.
    pub fn create_actor(&mut self) -> ActorId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            self.generation[idx as usize] += 1;
            self.parent[idx as usize] = INVALID;
            self.first_child[idx as usize] = INVALID;
            self.next_sibling[idx as usize] = INVALID;
            self.prev_sibling[idx as usize] = INVALID;
            self.position[idx as usize] = Point::ZERO;
            self.size[idx as usize] = Size::ZERO;
            self.flags[idx as usize] = ActorFlags::default();
            self.custom[idx as usize].clear();
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.position.push(Point::ZERO);
            self.size.push(Size::ZERO);
            self.flags.push(ActorFlags::default());
            self.custom.push(Vec::new());
            self.generation.push(0);
            idx
        };

        self.topology_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);

        ActorId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys an actor, freeing its slot for reuse.
    ///
    /// Constraints targeting or sourcing the actor become inert and are
    /// culled by the scheduler's next cleanup pass.
    ///
    /// # Panics
    ///
    /// Panics if the actor has children (remove them first) or if the handle
    /// is stale.
    pub fn destroy_actor(&mut self, id: ActorId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy actor with children"
        );

        // Remove from parent's child list if attached.
        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }

        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
        self.topology_dirty = true;
        self.pending_removed.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    /// Returns whether the given handle refers to a live actor.
    #[must_use]
    pub fn is_alive(&self, id: ActorId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: ActorId, child: ActorId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );

        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        self.topology_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `child` from its current parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the actor has no parent.
    pub fn remove_from_parent(&mut self, child: ActorId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "actor has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);

        self.topology_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Returns the parent of an actor, if any.
    #[must_use]
    pub fn parent(&self, id: ActorId) -> Option<ActorId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(ActorId {
                idx: p,
                generation: self.generation[p as usize],
            })
        }
    }

    /// Returns an iterator over the direct children of an actor.
    #[must_use]
    pub fn children(&self, id: ActorId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the live actors that have no parent.
    #[must_use]
    pub fn roots(&self) -> Vec<ActorId> {
        let mut roots = Vec::new();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                roots.push(ActorId {
                    idx,
                    generation: self.generation[idx as usize],
                });
            }
        }
        roots
    }

    // -- Built-in property accessors --

    /// Returns the position of an actor.
    #[must_use]
    pub fn position(&self, id: ActorId) -> Point {
        self.validate(id);
        self.position[id.idx as usize]
    }

    /// Sets the position of an actor.
    pub fn set_position(&mut self, id: ActorId, position: Point) {
        self.validate(id);
        self.position[id.idx as usize] = position;
        self.dirty.mark(id.idx, dirty::POSITION);
    }

    /// Returns the size of an actor.
    #[must_use]
    pub fn size(&self, id: ActorId) -> Size {
        self.validate(id);
        self.size[id.idx as usize]
    }

    /// Sets the size of an actor.
    ///
    /// Called both by applications and by controls during size negotiation.
    pub fn set_size(&mut self, id: ActorId, size: Size) {
        self.validate(id);
        self.size[id.idx as usize] = size;
        self.dirty.mark(id.idx, dirty::SIZE);
    }

    /// Returns the flags of an actor.
    #[must_use]
    pub fn flags(&self, id: ActorId) -> ActorFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Sets the flags of an actor.
    ///
    /// Changing `is_control` changes which actors the next relayout walk
    /// queues, so this also requests a relayout.
    pub fn set_flags(&mut self, id: ActorId, flags: ActorFlags) {
        self.validate(id);
        self.flags[id.idx as usize] = flags;
        self.request_relayout();
    }

    // -- Uniform property API --

    /// Registers a custom property on an actor with the given initial value,
    /// returning its index.
    ///
    /// The value's variant becomes the property's fixed type.
    pub fn register_property(&mut self, id: ActorId, initial: PropertyValue) -> PropertyIndex {
        self.validate(id);
        let slot = &mut self.custom[id.idx as usize];
        slot.push(initial);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "per-actor property counts are far below u32::MAX"
        )]
        let offset = (slot.len() - 1) as u32;
        PropertyIndex(CUSTOM_BASE + offset)
    }

    /// Returns whether `id` is alive and carries the given property.
    ///
    /// Unlike [`property`](Self::property), this never panics; constraints
    /// use it to detect vanished sources.
    #[must_use]
    pub fn has_property(&self, id: ActorId, index: PropertyIndex) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        match index {
            POSITION | SIZE => true,
            PropertyIndex(raw) => {
                raw >= CUSTOM_BASE
                    && ((raw - CUSTOM_BASE) as usize) < self.custom[id.idx as usize].len()
            }
        }
    }

    /// Returns the value of a property.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the index does not name a property of
    /// this actor.
    #[must_use]
    pub fn property(&self, id: ActorId, index: PropertyIndex) -> PropertyValue {
        self.validate(id);
        match index {
            POSITION => PropertyValue::Point(self.position[id.idx as usize]),
            SIZE => PropertyValue::Size(self.size[id.idx as usize]),
            PropertyIndex(raw) => {
                assert!(raw >= CUSTOM_BASE, "unknown built-in property {index:?}");
                let custom = &self.custom[id.idx as usize];
                let offset = (raw - CUSTOM_BASE) as usize;
                assert!(
                    offset < custom.len(),
                    "actor has no property at {index:?} (registered: {})",
                    custom.len()
                );
                custom[offset]
            }
        }
    }

    /// Sets the value of a property.
    ///
    /// The value must hold the property's fixed type; writing a
    /// differently-typed value is a contract violation.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, the index does not name a property of
    /// this actor, or the variant does not match the property's type.
    pub fn set_property(&mut self, id: ActorId, index: PropertyIndex, value: PropertyValue) {
        self.validate(id);
        match index {
            POSITION => {
                let PropertyValue::Point(p) = value else {
                    panic!("POSITION expects a Point value, got {value:?}");
                };
                self.position[id.idx as usize] = p;
                self.dirty.mark(id.idx, dirty::POSITION);
            }
            SIZE => {
                let PropertyValue::Size(s) = value else {
                    panic!("SIZE expects a Size value, got {value:?}");
                };
                self.size[id.idx as usize] = s;
                self.dirty.mark(id.idx, dirty::SIZE);
            }
            PropertyIndex(raw) => {
                assert!(raw >= CUSTOM_BASE, "unknown built-in property {index:?}");
                let custom = &mut self.custom[id.idx as usize];
                let offset = (raw - CUSTOM_BASE) as usize;
                assert!(
                    offset < custom.len(),
                    "actor has no property at {index:?} (registered: {})",
                    custom.len()
                );
                assert!(
                    custom[offset].same_type(&value),
                    "property type is fixed at registration: {:?} vs {value:?}",
                    custom[offset]
                );
                custom[offset] = value;
                self.dirty.mark(id.idx, dirty::PROPERTY);
            }
        }
    }

    // -- Relayout subscription --

    /// Requests a size-negotiation pass on the next event-processing-finished
    /// notification.
    ///
    /// Idempotent. A request issued while a pass is running is honored on the
    /// *next* frame, never the current pass.
    pub fn request_relayout(&mut self) {
        self.relayout_requested = true;
    }

    /// Returns whether a relayout request is pending.
    #[must_use]
    pub fn relayout_requested(&self) -> bool {
        self.relayout_requested
    }

    /// Consumes the pending relayout request, if any.
    pub(crate) fn take_relayout_request(&mut self) -> bool {
        core::mem::take(&mut self.relayout_requested)
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    fn validate(&self, id: ActorId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale ActorId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}
