// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use terrane_core::trace::{
    ConstraintPassEvent, FrameUpdateEvent, RelayoutPassEvent, SurfaceLifecycleEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_relayout_pass(&mut self, e: &RelayoutPassEvent) {
        let _ = writeln!(
            self.writer,
            "[relayout] queued={} negotiated={}",
            e.initial_controls, e.negotiations,
        );
    }

    fn on_constraint_pass(&mut self, e: &ConstraintPassEvent) {
        let _ = writeln!(
            self.writer,
            "[constraints] evaluated={} culled={}",
            e.evaluated, e.culled,
        );
    }

    fn on_frame_update(&mut self, e: &FrameUpdateEvent) {
        let _ = writeln!(
            self.writer,
            "[frame] now={}t quiescent={}",
            e.now.ticks(),
            e.quiescent,
        );
    }

    fn on_surface_lifecycle(&mut self, e: &SurfaceLifecycleEvent) {
        let _ = writeln!(self.writer, "[surface] {:?}", e.op);
    }
}
