// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Actor tree, relayout engine, and property constraints for terrane.
//!
//! `terrane_core` provides the update-side data structures of a retained
//! scene-graph toolkit: an actor tree with animatable properties, a
//! demand-driven size-negotiation engine, and a per-frame constraint
//! scheduler. It is `no_std` compatible (with `alloc`) and uses array-based
//! struct-of-arrays storage with index handles for cache-friendly traversal.
//!
//! # Architecture
//!
//! The crate is organized around a frame loop that turns finished event
//! processing into incremental scene updates:
//!
//! ```text
//!   Event pump (external)
//!       │
//!       ▼
//!   Scene::process_frame()
//!       ├─► Signal<()> (event-processing-finished observers)
//!       ├─► RelayoutEngine::process() ──► size negotiation work stack
//!       ├─► ConstraintScheduler::apply_frame() ──► constrained properties
//!       └─► ActorStore::collect_changes() ──► UpdateChanges
//!                                                  │
//!                                                  ▼
//!                               render side (terrane_surface Pre/PostRender)
//! ```
//!
//! **[`actor`]** — Struct-of-arrays actor tree with generational handles.
//! Local properties (position, size, custom values) are set by callers or by
//! the engines; mutations mark dirty channels automatically.
//!
//! **[`relayout`]** — Demand-driven size negotiation. A relayout request
//! subscribes the engine to the next event-processing-finished notification;
//! the pass walks the tree, queues controls on a LIFO work stack, and lets
//! each control discover further children to negotiate. A quiescent scene
//! performs zero relayout work.
//!
//! **[`constraint`]** — Per-frame functional constraints on properties, with
//! timed apply/remove blending and the Bake/Discard removal policy.
//!
//! **[`scene`]** — The explicit process-wide context object owning the store
//! and both engines. There are no global accessors; the scene is passed down
//! from application bring-up.
//!
//! **[`dirty`]** — Dirty-channel constants for property and topology
//! invalidation via `understory_dirty`.
//!
//! **[`signal`]** — Ordered observer lists with token-based disconnection.
//!
//! **[`time`]** — Monotonic tick time for constraint blend windows.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! update-loop instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod actor;
pub mod constraint;
pub mod dirty;
pub mod property;
pub mod relayout;
pub mod scene;
pub mod signal;
pub mod time;
pub mod trace;
