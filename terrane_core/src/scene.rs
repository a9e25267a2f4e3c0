// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The process-wide scene context.
//!
//! [`Scene`] owns the actor store, the relayout engine, the constraint
//! scheduler, the root actor, and the event-processing-finished signal. There
//! are no global accessors: the scene is created once at application bring-up
//! and passed down explicitly, which is also what enforces the single
//! instance.
//!
//! # Frame flow
//!
//! The external frame pump calls [`process_frame`](Scene::process_frame)
//! once per frame after its event processing completes:
//!
//! 1. The event-processing-finished signal fires (observers in registration
//!    order).
//! 2. The relayout engine runs one pass if a relayout was requested.
//! 3. The constraint scheduler applies every attached constraint.
//! 4. The store's dirty channels drain into the returned [`UpdateChanges`];
//!    a quiescent result means the render side can skip the frame.

use kurbo::Size;

use crate::actor::{ActorId, ActorStore, UpdateChanges};
use crate::constraint::ConstraintScheduler;
use crate::relayout::{RelayoutEngine, SizeNegotiator};
use crate::signal::Signal;
use crate::time::FrameTime;
use crate::trace::{FrameUpdateEvent, Tracer};

/// The root context of a scene graph.
#[derive(Debug)]
pub struct Scene {
    store: ActorStore,
    relayout: RelayoutEngine,
    constraints: ConstraintScheduler,
    root: ActorId,
    viewport: Size,
    event_processing_finished: Signal<()>,
}

impl Scene {
    /// Creates a scene with an empty root actor sized to `viewport`.
    ///
    /// The first [`process_frame`](Self::process_frame) runs an initial
    /// relayout pass.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        let mut store = ActorStore::new();
        let root = store.create_actor();
        store.set_size(root, viewport);
        store.request_relayout();
        Self {
            store,
            relayout: RelayoutEngine::new(),
            constraints: ConstraintScheduler::new(),
            root,
            viewport,
            event_processing_finished: Signal::new(),
        }
    }

    /// Returns the root actor.
    #[must_use]
    pub fn root(&self) -> ActorId {
        self.root
    }

    /// Returns the viewport size.
    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Resizes the viewport and requests a relayout.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.store.set_size(self.root, viewport);
        self.store.request_relayout();
    }

    /// Returns the actor store.
    #[must_use]
    pub fn store(&self) -> &ActorStore {
        &self.store
    }

    /// Returns the actor store mutably.
    pub fn store_mut(&mut self) -> &mut ActorStore {
        &mut self.store
    }

    /// Returns the constraint scheduler.
    #[must_use]
    pub fn constraints(&self) -> &ConstraintScheduler {
        &self.constraints
    }

    /// Returns the constraint scheduler mutably.
    pub fn constraints_mut(&mut self) -> &mut ConstraintScheduler {
        &mut self.constraints
    }

    /// Splits the scene into its store and constraint scheduler.
    ///
    /// Attaching a constraint needs the store and the scheduler at once;
    /// this keeps that a single borrow-checker-friendly call.
    pub fn store_and_constraints(&mut self) -> (&mut ActorStore, &mut ConstraintScheduler) {
        (&mut self.store, &mut self.constraints)
    }

    /// Returns the event-processing-finished signal for observer
    /// registration.
    pub fn event_processing_finished(&mut self) -> &mut Signal<()> {
        &mut self.event_processing_finished
    }

    /// Runs one update frame and returns the changes for the render side.
    pub fn process_frame(
        &mut self,
        now: FrameTime,
        negotiator: &mut dyn SizeNegotiator,
        tracer: &mut Tracer<'_>,
    ) -> UpdateChanges {
        self.event_processing_finished.emit(&());

        self.relayout
            .process(&mut self.store, self.root, self.viewport, negotiator, tracer);

        self.constraints.apply_frame(&mut self.store, now, tracer);

        let changes = self.store.collect_changes();
        tracer.frame_update(&FrameUpdateEvent {
            now,
            quiescent: changes.is_quiescent(),
        });
        changes
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use super::*;
    use crate::actor::ActorFlags;
    use crate::constraint::Constraint;
    use crate::property::{PropertyRef, PropertyValue};

    /// Sizes every control to its allocation.
    struct FillNegotiator;

    impl SizeNegotiator for FillNegotiator {
        fn negotiate(
            &mut self,
            store: &mut ActorStore,
            control: ActorId,
            allocation: Size,
            _discovered: &mut Vec<(ActorId, Size)>,
        ) {
            store.set_size(control, allocation);
        }
    }

    #[test]
    fn first_frame_lays_out_and_reports_changes() {
        let mut scene = Scene::new(Size::new(800.0, 600.0));
        let root = scene.root();
        let control = scene.store_mut().create_actor();
        scene
            .store_mut()
            .set_flags(control, ActorFlags { is_control: true });
        scene.store_mut().add_child(root, control);

        let changes = scene.process_frame(FrameTime(0), &mut FillNegotiator, &mut Tracer::none());
        assert!(!changes.is_quiescent());
        assert_eq!(scene.store().size(control), Size::new(800.0, 600.0));
    }

    #[test]
    fn quiescent_scene_produces_quiescent_changes() {
        let mut scene = Scene::new(Size::new(100.0, 100.0));
        let _ = scene.process_frame(FrameTime(0), &mut FillNegotiator, &mut Tracer::none());

        let changes = scene.process_frame(FrameTime(1), &mut FillNegotiator, &mut Tracer::none());
        assert!(changes.is_quiescent(), "nothing changed, nothing to draw");
    }

    #[test]
    fn set_viewport_triggers_relayout() {
        let mut scene = Scene::new(Size::new(100.0, 100.0));
        let root = scene.root();
        let control = scene.store_mut().create_actor();
        scene
            .store_mut()
            .set_flags(control, ActorFlags { is_control: true });
        scene.store_mut().add_child(root, control);
        let _ = scene.process_frame(FrameTime(0), &mut FillNegotiator, &mut Tracer::none());

        scene.set_viewport(Size::new(640.0, 480.0));
        let _ = scene.process_frame(FrameTime(1), &mut FillNegotiator, &mut Tracer::none());
        assert_eq!(scene.store().size(control), Size::new(640.0, 480.0));
    }

    #[test]
    fn signal_fires_before_relayout_each_frame() {
        let mut scene = Scene::new(Size::new(100.0, 100.0));
        let fired = Rc::new(RefCell::new(0_u32));
        let fired_inner = Rc::clone(&fired);
        scene
            .event_processing_finished()
            .connect(move |()| *fired_inner.borrow_mut() += 1);

        let _ = scene.process_frame(FrameTime(0), &mut FillNegotiator, &mut Tracer::none());
        let _ = scene.process_frame(FrameTime(1), &mut FillNegotiator, &mut Tracer::none());
        assert_eq!(*fired.borrow(), 2);
    }

    #[test]
    fn constraints_run_each_frame_through_process_frame() {
        let mut scene = Scene::new(Size::new(100.0, 100.0));
        let actor = scene.store_mut().create_actor();
        let prop = scene
            .store_mut()
            .register_property(actor, PropertyValue::Float(0.0));

        let (store, constraints) = scene.store_and_constraints();
        let _id = constraints.attach(
            Constraint::new(
                PropertyRef {
                    actor,
                    property: prop,
                },
                &[],
                |current, _| {
                    let PropertyValue::Float(v) = current else {
                        unreachable!()
                    };
                    PropertyValue::Float(v + 1.0)
                },
            ),
            store,
            FrameTime(0),
        );

        let _ = scene.process_frame(FrameTime(1), &mut FillNegotiator, &mut Tracer::none());
        let _ = scene.process_frame(FrameTime(2), &mut FillNegotiator, &mut Tracer::none());
        assert_eq!(
            scene.store().property(actor, prop),
            PropertyValue::Float(2.0)
        );
    }
}
