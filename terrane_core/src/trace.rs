// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the update loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! update-loop instrumentation calls at each stage. All method bodies default
//! to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing (zero
//! overhead). When **on**, each method performs a single `Option` branch
//! before dispatching.

use crate::time::FrameTime;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after a relayout pass completes. Frames with no pending request
/// run no pass and emit nothing.
#[derive(Clone, Copy, Debug)]
pub struct RelayoutPassEvent {
    /// Controls queued by the initial walk.
    pub initial_controls: usize,
    /// Total negotiation calls.
    pub negotiations: usize,
}

/// Emitted after a constraint application pass.
#[derive(Clone, Copy, Debug)]
pub struct ConstraintPassEvent {
    /// Constraints evaluated this frame.
    pub evaluated: usize,
    /// Constraints culled by the cleanup pass (finished removal or vanished
    /// targets/sources).
    pub culled: usize,
}

/// Emitted once per processed frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameUpdateEvent {
    /// The frame's time.
    pub now: FrameTime,
    /// Whether the frame produced any changes for the render side.
    pub quiescent: bool,
}

/// A render-surface lifecycle operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceOp {
    /// EGL was initialized for the surface.
    EglInitialized,
    /// An EGL surface was created and bound.
    SurfaceCreated,
    /// The EGL surface was replaced in place.
    SurfaceReplaced,
    /// The EGL surface was destroyed.
    SurfaceDestroyed,
    /// The native window was moved.
    Moved,
    /// The native window was resized.
    Resized,
    /// The native window was moved and resized in one call.
    MovedResized,
    /// The native window was mapped (shown).
    Mapped,
    /// A deiconify approval was sent to the window manager.
    DeiconifyApproved,
}

/// Emitted by the render-surface layer for lifecycle operations.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceLifecycleEvent {
    /// Which operation ran.
    pub op: SurfaceOp,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the update and render loops.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after a relayout pass ran.
    fn on_relayout_pass(&mut self, e: &RelayoutPassEvent) {
        _ = e;
    }

    /// Called after a constraint pass ran.
    fn on_constraint_pass(&mut self, e: &ConstraintPassEvent) {
        _ = e;
    }

    /// Called once per processed frame.
    fn on_frame_update(&mut self, e: &FrameUpdateEvent) {
        _ = e;
    }

    /// Called for render-surface lifecycle operations.
    fn on_surface_lifecycle(&mut self, e: &SurfaceLifecycleEvent) {
        _ = e;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`RelayoutPassEvent`].
    #[inline]
    pub fn relayout_pass(&mut self, e: &RelayoutPassEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_relayout_pass(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ConstraintPassEvent`].
    #[inline]
    pub fn constraint_pass(&mut self, e: &ConstraintPassEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_constraint_pass(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameUpdateEvent`].
    #[inline]
    pub fn frame_update(&mut self, e: &FrameUpdateEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_update(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SurfaceLifecycleEvent`].
    #[inline]
    pub fn surface_lifecycle(&mut self, e: &SurfaceLifecycleEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_surface_lifecycle(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}
