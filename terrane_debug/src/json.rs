// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON-lines trace export.
//!
//! [`JsonLinesSink`] writes one JSON object per event, suitable for offline
//! tooling (filtering with `jq`, plotting negotiation counts over time).

use std::io::Write;

use serde_json::json;

use terrane_core::trace::{
    ConstraintPassEvent, FrameUpdateEvent, RelayoutPassEvent, SurfaceLifecycleEvent, TraceSink,
};

/// Writes one JSON object per trace event to a [`Write`](std::io::Write)
/// destination.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for JsonLinesSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesSink").finish_non_exhaustive()
    }
}

impl<W: Write> JsonLinesSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write(&mut self, value: &serde_json::Value) {
        let _ = writeln!(self.writer, "{value}");
    }
}

impl<W: Write> TraceSink for JsonLinesSink<W> {
    fn on_relayout_pass(&mut self, e: &RelayoutPassEvent) {
        self.write(&json!({
            "event": "relayout_pass",
            "initial_controls": e.initial_controls,
            "negotiations": e.negotiations,
        }));
    }

    fn on_constraint_pass(&mut self, e: &ConstraintPassEvent) {
        self.write(&json!({
            "event": "constraint_pass",
            "evaluated": e.evaluated,
            "culled": e.culled,
        }));
    }

    fn on_frame_update(&mut self, e: &FrameUpdateEvent) {
        self.write(&json!({
            "event": "frame_update",
            "now_ticks": e.now.ticks(),
            "quiescent": e.quiescent,
        }));
    }

    fn on_surface_lifecycle(&mut self, e: &SurfaceLifecycleEvent) {
        self.write(&json!({
            "event": "surface_lifecycle",
            "op": format!("{:?}", e.op),
        }));
    }
}
