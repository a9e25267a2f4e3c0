// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Demand-driven size negotiation.
//!
//! The relayout engine runs at most one pass per frame, and only on demand.
//! Its lifecycle per pass is:
//!
//! ```text
//! Idle ──request_relayout()──► Connected ──event processing finished──► Walking
//!                                                                          │
//!          Idle ◄──────────────── work stack empty ◄──────────────── Negotiating
//! ```
//!
//! - **Connected** — [`ActorStore::request_relayout`] subscribes the engine to
//!   the next event-processing-finished notification. It is idempotent and
//!   triggers nothing by itself.
//! - **Walking** — A depth-first traversal from the root carries an allocation
//!   down the tree (initially the viewport size). A control is pushed onto the
//!   work stack paired with that allocation and the traversal does *not*
//!   descend through it; a plain actor hands the allocation unchanged to its
//!   children.
//! - **Negotiating** — The stack is popped LIFO. Each control's
//!   [`SizeNegotiator::negotiate`] call may resize itself and its children and
//!   appends any children that still need independent negotiation; those are
//!   pushed onto the same stack, so a child discovered mid-negotiation is
//!   processed before entries queued earlier in the walk.
//! - Once the stack empties the engine disconnects. A quiescent scene performs
//!   zero relayout work — this is the system's backpressure mechanism.
//!
//! # Re-entrancy
//!
//! A `request_relayout()` issued *during* a pass (a control resizing a
//! sibling, say) re-arms the store's request flag, which this pass has already
//! consumed; it is honored on the next frame's notification. The pass in
//! progress completes with the sizes it already computed, bounding worst-case
//! cost to the controls present at pass start plus those the pass itself
//! discovers.

use alloc::vec::Vec;

use kurbo::Size;

use crate::actor::{ActorId, ActorStore};
use crate::trace::{RelayoutPassEvent, Tracer};

/// Negotiates sizes on behalf of controls.
///
/// The toolkit layer implements this seam to dispatch to per-control layout
/// logic; tests use doubles. One trait serves all controls — the engine passes
/// the control's handle, so implementations route on it.
pub trait SizeNegotiator {
    /// Negotiates `control`'s size given `allocation`.
    ///
    /// The implementation may mutate the control's own size and position and
    /// those of its children through `store`. Children that require
    /// independent negotiation (subsets a container does not size itself, or
    /// children created lazily during this very call) must be appended to
    /// `discovered` together with their allocations.
    fn negotiate(
        &mut self,
        store: &mut ActorStore,
        control: ActorId,
        allocation: Size,
        discovered: &mut Vec<(ActorId, Size)>,
    );
}

/// Counters describing one relayout pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelayoutStats {
    /// Controls queued by the initial tree walk.
    pub initial_controls: usize,
    /// Total negotiation calls made (walk-discovered plus
    /// negotiation-discovered controls).
    pub negotiations: usize,
}

/// The work-stack engine driving size negotiation.
///
/// Stateless between passes apart from reusable buffers; the pending-request
/// flag lives on the [`ActorStore`] so that controls can re-arm it from
/// within a negotiation.
#[derive(Debug, Default)]
pub struct RelayoutEngine {
    stack: Vec<(ActorId, Size)>,
    discovered: Vec<(ActorId, Size)>,
}

impl RelayoutEngine {
    /// Creates an engine with empty work buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one pass if a relayout was requested; otherwise does nothing.
    ///
    /// Called once per frame after event processing finishes. Consumes the
    /// store's pending request before walking, so requests issued during the
    /// pass are deferred to the next frame.
    pub fn process(
        &mut self,
        store: &mut ActorStore,
        root: ActorId,
        viewport: Size,
        negotiator: &mut dyn SizeNegotiator,
        tracer: &mut Tracer<'_>,
    ) -> RelayoutStats {
        if !store.take_relayout_request() {
            return RelayoutStats::default();
        }

        debug_assert!(self.stack.is_empty(), "work stack must start empty");

        // Walking.
        self.walk(store, root, viewport);
        let mut stats = RelayoutStats {
            initial_controls: self.stack.len(),
            negotiations: 0,
        };

        // Negotiating.
        while let Some((control, allocation)) = self.stack.pop() {
            // A control destroyed by an earlier negotiation is skipped.
            if !store.is_alive(control) {
                continue;
            }

            self.discovered.clear();
            negotiator.negotiate(store, control, allocation, &mut self.discovered);
            stats.negotiations += 1;

            for pair in self.discovered.drain(..) {
                self.stack.push(pair);
            }
        }

        tracer.relayout_pass(&RelayoutPassEvent {
            initial_controls: stats.initial_controls,
            negotiations: stats.negotiations,
        });
        stats
    }

    /// Depth-first walk queuing controls with the carried allocation.
    fn walk(&mut self, store: &ActorStore, actor: ActorId, allocation: Size) {
        if store.flags(actor).is_control {
            self.stack.push((actor, allocation));
            return;
        }
        for child in store.children(actor) {
            self.walk(store, child, allocation);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::actor::ActorFlags;

    /// Records negotiation order; optionally discovers children or issues
    /// re-entrant relayout requests.
    #[derive(Default)]
    struct RecordingNegotiator {
        calls: Vec<ActorId>,
        discover: Vec<(ActorId, ActorId, Size)>,
        request_during: bool,
    }

    impl SizeNegotiator for RecordingNegotiator {
        fn negotiate(
            &mut self,
            store: &mut ActorStore,
            control: ActorId,
            allocation: Size,
            discovered: &mut Vec<(ActorId, Size)>,
        ) {
            self.calls.push(control);
            store.set_size(control, allocation);
            for (parent, child, size) in &self.discover {
                if *parent == control {
                    discovered.push((*child, *size));
                }
            }
            if self.request_during {
                store.request_relayout();
            }
        }
    }

    fn make_control(store: &mut ActorStore, parent: ActorId) -> ActorId {
        let id = store.create_actor();
        store.set_flags(id, ActorFlags { is_control: true });
        store.add_child(parent, id);
        id
    }

    #[test]
    fn no_request_means_zero_work() {
        let mut store = ActorStore::new();
        let root = store.create_actor();
        let _control = make_control(&mut store, root);
        let _ = store.take_relayout_request();

        let mut engine = RelayoutEngine::new();
        let mut negotiator = RecordingNegotiator::default();
        let stats = engine.process(
            &mut store,
            root,
            Size::new(800.0, 600.0),
            &mut negotiator,
            &mut Tracer::none(),
        );

        assert_eq!(stats, RelayoutStats::default());
        assert!(negotiator.calls.is_empty(), "quiescent scene does no work");
    }

    #[test]
    fn walk_queues_controls_not_their_subtrees() {
        let mut store = ActorStore::new();
        let root = store.create_actor();
        let control = make_control(&mut store, root);

        // A control nested under another control is not reached by the walk;
        // its parent is responsible for discovering it.
        let nested = store.create_actor();
        store.set_flags(nested, ActorFlags { is_control: true });
        store.add_child(control, nested);

        store.request_relayout();
        let mut engine = RelayoutEngine::new();
        let mut negotiator = RecordingNegotiator::default();
        let stats = engine.process(
            &mut store,
            root,
            Size::new(100.0, 100.0),
            &mut negotiator,
            &mut Tracer::none(),
        );

        assert_eq!(stats.initial_controls, 1);
        assert_eq!(negotiator.calls, [control]);
    }

    #[test]
    fn plain_actors_pass_allocation_through() {
        let mut store = ActorStore::new();
        let root = store.create_actor();
        let wrapper = store.create_actor();
        store.add_child(root, wrapper);
        let control = make_control(&mut store, wrapper);

        store.request_relayout();
        let mut engine = RelayoutEngine::new();
        let mut negotiator = RecordingNegotiator::default();
        engine.process(
            &mut store,
            root,
            Size::new(640.0, 480.0),
            &mut negotiator,
            &mut Tracer::none(),
        );

        // The control received the viewport allocation through the wrapper.
        assert_eq!(store.size(control), Size::new(640.0, 480.0));
    }

    #[test]
    fn discovered_children_are_negotiated_in_the_same_pass() {
        let mut store = ActorStore::new();
        let root = store.create_actor();
        let container = make_control(&mut store, root);

        let child = store.create_actor();
        store.set_flags(child, ActorFlags { is_control: true });
        store.add_child(container, child);
        let _ = store.take_relayout_request();

        store.request_relayout();
        let mut engine = RelayoutEngine::new();
        let mut negotiator = RecordingNegotiator {
            discover: alloc::vec![(container, child, Size::new(50.0, 50.0))],
            ..Default::default()
        };
        let stats = engine.process(
            &mut store,
            root,
            Size::new(100.0, 100.0),
            &mut negotiator,
            &mut Tracer::none(),
        );

        assert_eq!(negotiator.calls, [container, child]);
        assert_eq!(stats.negotiations, 2);
        assert_eq!(store.size(child), Size::new(50.0, 50.0));
    }

    #[test]
    fn discovered_child_preempts_earlier_queue_entries() {
        let mut store = ActorStore::new();
        let root = store.create_actor();
        // Walk order queues a then b; LIFO pops b first. b discovers a child,
        // which must be negotiated before a.
        let a = make_control(&mut store, root);
        let b = make_control(&mut store, root);
        let b_child = store.create_actor();
        store.set_flags(b_child, ActorFlags { is_control: true });
        store.add_child(b, b_child);
        let _ = store.take_relayout_request();

        store.request_relayout();
        let mut engine = RelayoutEngine::new();
        let mut negotiator = RecordingNegotiator {
            discover: alloc::vec![(b, b_child, Size::new(10.0, 10.0))],
            ..Default::default()
        };
        engine.process(
            &mut store,
            root,
            Size::new(100.0, 100.0),
            &mut negotiator,
            &mut Tracer::none(),
        );

        assert_eq!(negotiator.calls, [b, b_child, a]);
    }

    #[test]
    fn pass_terminates_with_bounded_negotiations() {
        let mut store = ActorStore::new();
        let root = store.create_actor();
        let mut expected = 0;
        for _ in 0..16 {
            let _ = make_control(&mut store, root);
            expected += 1;
        }

        store.request_relayout();
        let mut engine = RelayoutEngine::new();
        let mut negotiator = RecordingNegotiator::default();
        let stats = engine.process(
            &mut store,
            root,
            Size::new(100.0, 100.0),
            &mut negotiator,
            &mut Tracer::none(),
        );

        assert_eq!(stats.negotiations, expected);
        assert_eq!(stats.initial_controls, expected);
    }

    #[test]
    fn request_during_pass_defers_to_next_frame() {
        let mut store = ActorStore::new();
        let root = store.create_actor();
        let control = make_control(&mut store, root);
        let _ = store.take_relayout_request();

        store.request_relayout();
        let mut engine = RelayoutEngine::new();
        let mut negotiator = RecordingNegotiator {
            request_during: true,
            ..Default::default()
        };

        let stats = engine.process(
            &mut store,
            root,
            Size::new(100.0, 100.0),
            &mut negotiator,
            &mut Tracer::none(),
        );
        // The in-pass request did not extend the current pass...
        assert_eq!(stats.negotiations, 1);
        assert_eq!(negotiator.calls, [control]);
        // ...but re-armed the subscription for the next frame.
        assert!(store.relayout_requested());

        negotiator.request_during = false;
        let stats = engine.process(
            &mut store,
            root,
            Size::new(100.0, 100.0),
            &mut negotiator,
            &mut Tracer::none(),
        );
        assert_eq!(stats.negotiations, 1, "deferred request runs next frame");
    }

    #[test]
    fn dead_controls_are_skipped() {
        struct DestroySibling {
            victim: ActorId,
            calls: usize,
        }
        impl SizeNegotiator for DestroySibling {
            fn negotiate(
                &mut self,
                store: &mut ActorStore,
                _control: ActorId,
                _allocation: Size,
                _discovered: &mut Vec<(ActorId, Size)>,
            ) {
                self.calls += 1;
                if store.is_alive(self.victim) {
                    store.remove_from_parent(self.victim);
                    store.destroy_actor(self.victim);
                }
            }
        }

        let mut store = ActorStore::new();
        let root = store.create_actor();
        // LIFO: b pops first and destroys a; a must then be skipped.
        let a = make_control(&mut store, root);
        let _b = make_control(&mut store, root);
        let _ = store.take_relayout_request();

        store.request_relayout();
        let mut engine = RelayoutEngine::new();
        let mut negotiator = DestroySibling { victim: a, calls: 0 };
        let stats = engine.process(
            &mut store,
            root,
            Size::new(100.0, 100.0),
            &mut negotiator,
            &mut Tracer::none(),
        );

        assert_eq!(stats.negotiations, 1, "destroyed control is not negotiated");
        assert_eq!(negotiator.calls, 1);
    }
}
