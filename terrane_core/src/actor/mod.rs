// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Actor tree data model.
//!
//! An *actor* is a node in the scene tree. Each actor has:
//!
//! - An identity ([`ActorId`]) — a generational handle that becomes stale when
//!   the actor is destroyed, preventing use-after-free bugs at the API level.
//! - Topology — parent, first-child, and sibling links forming an ordered tree.
//! - **Built-in properties** set by callers or by size negotiation:
//!   [`position`](ActorStore::set_position) and [`size`](ActorStore::set_size).
//! - **Custom properties** registered via
//!   [`register_property`](ActorStore::register_property) and addressed
//!   uniformly through [`PropertyRef`](crate::property::PropertyRef) — the
//!   attachment points for constraints.
//! - [`ActorFlags`] — whether the actor is a *control*, i.e. participates in
//!   size negotiation.
//!
//! Actors are stored in struct-of-arrays layout with index-based handles for
//! cache-friendly traversal.
//!
//! # Dirty tracking
//!
//! Property mutations automatically mark the corresponding dirty channel
//! (see [`dirty`](crate::dirty)). All channels are local-only: layout
//! allocations flow parent-to-child through negotiation, not through the
//! dirty graph. [`ActorStore::collect_changes`] drains every channel into an
//! [`UpdateChanges`], which the render side consumes to decide whether a
//! frame needs drawing at all.

mod changes;
mod id;
mod store;
mod traverse;

pub use changes::UpdateChanges;
pub use id::{ActorId, INVALID};
pub use store::{ActorFlags, ActorStore};
pub use traverse::Children;
