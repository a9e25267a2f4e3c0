// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Terrane uses multi-channel dirty tracking (via [`understory_dirty`]) to
//! record which actors changed between frames. Each channel represents an
//! independent category of change.
//!
//! Unlike inherited visual properties (world transforms in a compositor),
//! none of the update-side properties here propagate to descendants through
//! the dirty graph: layout allocations flow through size negotiation, not
//! through invalidation. Every channel is therefore marked with the default
//! (local-only) policy.
//!
//! - [`POSITION`] / [`SIZE`] — the built-in geometry properties changed.
//! - [`PROPERTY`] — a custom registered property changed.
//! - [`TOPOLOGY`] — structural mutations (add/remove child, create/destroy
//!   actor).
//!
//! # Consumption
//!
//! Callers never need to query dirty state directly. Each
//! [`ActorStore::collect_changes`](crate::actor::ActorStore::collect_changes)
//! call drains all channels and surfaces the results as
//! [`UpdateChanges`](crate::actor::UpdateChanges), which the render side uses
//! to decide whether anything needs redrawing at all.

use understory_dirty::Channel;

/// Actor position changed.
pub const POSITION: Channel = Channel::new(0);

/// Actor size changed (by a caller or by size negotiation).
pub const SIZE: Channel = Channel::new(1);

/// A custom registered property changed (directly or through a constraint).
pub const PROPERTY: Channel = Channel::new(2);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(3);
