// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame functional constraints with timed apply/remove blending.
//!
//! A constraint drives one target property from up to [`MAX_SOURCES`] source
//! properties through a pure function `f(current, sources) -> value`, applied
//! every frame while active. Constraints on the same target compose: each
//! sees the value produced by constraints registered before it *in the same
//! frame*, not the pre-frame value.
//!
//! # Lifecycle
//!
//! ```text
//! attach ──► Blending ──apply window elapses──► Applied
//!                │                                 │
//!                └────────── remove() ◄────────────┘
//!                                │
//!                    Removing (Bake | Discard) ──► culled
//! ```
//!
//! - **Blending** — the effective value is
//!   `interpolate(pre_constraint_value, f(...), alpha(t))` with `t`
//!   normalized over the apply window. A zero apply window skips straight to
//!   Applied.
//! - **Applied** — the effective value is `f(...)` with no interpolation
//!   overhead.
//! - **Removing** — with a zero remove window, removal is immediate:
//!   [`Bake`](RemoveAction::Bake) leaves the last computed value on the
//!   target, [`Discard`](RemoveAction::Discard) restores the exact value the
//!   target held before the constraint was first applied. A non-zero window
//!   blends from the value at removal toward the live `f(...)` (Bake — the
//!   constraint is conceptually still setting the value as it fades) or
//!   toward the pre-constraint value (Discard).
//!
//! # Vanished objects
//!
//! Constraints hold weak, id-based references. A constraint whose target or
//! source actor has been destroyed becomes inert — its target simply stops
//! updating — and is culled by the cleanup step of the same pass. This is
//! deliberate: constraints are best-effort visual refinements, and a
//! vanished participant is never a crash.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::actor::ActorStore;
use crate::property::{PropertyRef, PropertyValue};
use crate::time::{FrameTime, TickDuration};
use crate::trace::{ConstraintPassEvent, Tracer};

/// Maximum number of source properties per constraint.
///
/// A deliberate, enforced ceiling, matching the widest registration the
/// toolkit layer offers.
pub const MAX_SOURCES: usize = 6;

/// Easing applied to the normalized blend parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AlphaFunction {
    /// No easing.
    #[default]
    Linear,
    /// Quadratic ease-in.
    EaseIn,
    /// Quadratic ease-out.
    EaseOut,
    /// Cubic smoothstep.
    EaseInOut,
}

impl AlphaFunction {
    /// Evaluates the easing curve at `t`, clamped to `[0, 1]`.
    #[must_use]
    pub fn evaluate(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// What happens to the target property when a constraint is removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RemoveAction {
    /// Permanently commit whatever value is showing when the constraint's
    /// lifecycle ends.
    #[default]
    Bake,
    /// Revert to having never been constrained: restore the pre-constraint
    /// value.
    Discard,
}

/// The constraint function: `f(current, sources) -> new value`.
pub type ConstraintFn = Box<dyn Fn(&PropertyValue, &[PropertyValue]) -> PropertyValue>;

/// A custom blend function used only during the apply/remove windows.
pub type InterpolateFn = Box<dyn Fn(&PropertyValue, &PropertyValue, f64) -> PropertyValue>;

/// A constraint definition, built with [`Constraint::new`] and the `with_*`
/// methods, then attached via [`ConstraintScheduler::attach`].
pub struct Constraint {
    target: PropertyRef,
    sources: Vec<PropertyRef>,
    function: ConstraintFn,
    interpolator: Option<InterpolateFn>,
    apply_period: TickDuration,
    remove_period: TickDuration,
    alpha: AlphaFunction,
    remove_action: RemoveAction,
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("target", &self.target)
            .field("sources", &self.sources)
            .field("apply_period", &self.apply_period)
            .field("remove_period", &self.remove_period)
            .field("alpha", &self.alpha)
            .field("remove_action", &self.remove_action)
            .finish_non_exhaustive()
    }
}

impl Constraint {
    /// Creates a constraint on `target` computed from `sources`.
    ///
    /// Defaults: immediate apply (zero window), immediate removal, linear
    /// alpha, [`RemoveAction::Bake`], component-wise linear interpolation.
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_SOURCES`] sources are given.
    #[must_use]
    pub fn new(
        target: PropertyRef,
        sources: &[PropertyRef],
        function: impl Fn(&PropertyValue, &[PropertyValue]) -> PropertyValue + 'static,
    ) -> Self {
        assert!(
            sources.len() <= MAX_SOURCES,
            "constraint supports at most {MAX_SOURCES} sources, got {}",
            sources.len()
        );
        Self {
            target,
            sources: sources.into(),
            function: Box::new(function),
            interpolator: None,
            apply_period: TickDuration::ZERO,
            remove_period: TickDuration::ZERO,
            alpha: AlphaFunction::default(),
            remove_action: RemoveAction::default(),
        }
    }

    /// Sets the apply blend window.
    #[must_use]
    pub fn with_apply_period(mut self, period: TickDuration) -> Self {
        self.apply_period = period;
        self
    }

    /// Sets the remove blend window.
    #[must_use]
    pub fn with_remove_period(mut self, period: TickDuration) -> Self {
        self.remove_period = period;
        self
    }

    /// Sets the easing used during blend windows.
    #[must_use]
    pub fn with_alpha_function(mut self, alpha: AlphaFunction) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the removal policy.
    #[must_use]
    pub fn with_remove_action(mut self, action: RemoveAction) -> Self {
        self.remove_action = action;
        self
    }

    /// Replaces the default component-wise lerp used during blend windows.
    #[must_use]
    pub fn with_interpolator(
        mut self,
        interpolator: impl Fn(&PropertyValue, &PropertyValue, f64) -> PropertyValue + 'static,
    ) -> Self {
        self.interpolator = Some(Box::new(interpolator));
        self
    }

    fn blend(&self, from: &PropertyValue, to: &PropertyValue, t: f64) -> PropertyValue {
        match &self.interpolator {
            Some(f) => f(from, to, t),
            None => from.interpolate(to, t),
        }
    }
}

/// Handle to an attached constraint.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId(u32);

impl fmt::Debug for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConstraintId({})", self.0)
    }
}

/// Lifecycle phase of an attached constraint.
#[derive(Clone, Copy, Debug)]
enum Phase {
    Blending,
    Applied,
    Removing { since: FrameTime, from: PropertyValue },
    Defunct,
}

struct Entry {
    id: u32,
    constraint: Constraint,
    /// Target value captured at attach time; Discard restores this.
    start_value: PropertyValue,
    attached_at: FrameTime,
    phase: Phase,
}

/// Applies attached constraints every frame, in registration order.
pub struct ConstraintScheduler {
    entries: Vec<Entry>,
    next_id: u32,
    /// Scratch buffer for source snapshots.
    inputs: Vec<PropertyValue>,
}

impl fmt::Debug for ConstraintScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintScheduler")
            .field("constraints", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl Default for ConstraintScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintScheduler {
    /// Creates a scheduler with no constraints.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            inputs: Vec::new(),
        }
    }

    /// Attaches a constraint, capturing the target's pre-constraint value.
    ///
    /// Registration order is execution order; constraints on the same target
    /// registered later see the values earlier ones produced that frame.
    ///
    /// # Panics
    ///
    /// Panics if the target or any source property does not exist at attach
    /// time (sources vanishing *later* is tolerated, see the module docs).
    pub fn attach(
        &mut self,
        constraint: Constraint,
        store: &ActorStore,
        now: FrameTime,
    ) -> ConstraintId {
        let target = constraint.target;
        assert!(
            store.has_property(target.actor, target.property),
            "constraint target {target:?} does not exist"
        );
        for source in &constraint.sources {
            assert!(
                store.has_property(source.actor, source.property),
                "constraint source {source:?} does not exist"
            );
        }

        let start_value = store.property(target.actor, target.property);
        let phase = if constraint.apply_period.is_zero() {
            Phase::Applied
        } else {
            Phase::Blending
        };

        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            constraint,
            start_value,
            attached_at: now,
            phase,
        });
        ConstraintId(id)
    }

    /// Returns whether `id` refers to a constraint that is still attached
    /// (possibly mid-removal).
    #[must_use]
    pub fn is_active(&self, id: ConstraintId) -> bool {
        self.entries
            .iter()
            .any(|e| e.id == id.0 && !matches!(e.phase, Phase::Defunct))
    }

    /// Returns the number of attached constraints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no constraints are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Starts removing a constraint.
    ///
    /// With a zero remove window the removal completes immediately:
    /// [`RemoveAction::Bake`] leaves the target holding the last computed
    /// value, [`RemoveAction::Discard`] restores the captured pre-constraint
    /// value. Otherwise the value blends out over the window on subsequent
    /// [`apply_frame`](Self::apply_frame) calls. Removing a constraint that
    /// is already blending out is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to an attached constraint (it was never
    /// attached, or was already culled).
    pub fn remove(&mut self, id: ConstraintId, store: &mut ActorStore, now: FrameTime) {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id.0)
            .unwrap_or_else(|| panic!("stale {id:?}"));

        if matches!(entry.phase, Phase::Removing { .. } | Phase::Defunct) {
            return;
        }

        let target = entry.constraint.target;
        if entry.constraint.remove_period.is_zero() {
            // Immediate: Bake keeps the last written value, Discard restores.
            if matches!(entry.constraint.remove_action, RemoveAction::Discard)
                && store.has_property(target.actor, target.property)
            {
                store.set_property(target.actor, target.property, entry.start_value);
            }
            entry.phase = Phase::Defunct;
            self.entries.retain(|e| !matches!(e.phase, Phase::Defunct));
        } else {
            let from = if store.has_property(target.actor, target.property) {
                store.property(target.actor, target.property)
            } else {
                entry.start_value
            };
            entry.phase = Phase::Removing { since: now, from };
        }
    }

    /// Applies every constraint for this frame, then culls defunct entries.
    ///
    /// Writes go through the store's property setters, so the dirty channels
    /// reflect constrained values and later constraints observe earlier ones'
    /// output.
    pub fn apply_frame(&mut self, store: &mut ActorStore, now: FrameTime, tracer: &mut Tracer<'_>) {
        let Self {
            entries, inputs, ..
        } = self;

        let mut evaluated = 0;
        for entry in entries.iter_mut() {
            if matches!(entry.phase, Phase::Defunct) {
                continue;
            }

            let target = entry.constraint.target;
            if !store.has_property(target.actor, target.property) {
                entry.phase = Phase::Defunct;
                continue;
            }

            // Snapshot sources; a vanished source makes the constraint inert.
            inputs.clear();
            let mut inert = false;
            for source in &entry.constraint.sources {
                if store.has_property(source.actor, source.property) {
                    inputs.push(store.property(source.actor, source.property));
                } else {
                    inert = true;
                    break;
                }
            }
            if inert {
                entry.phase = Phase::Defunct;
                continue;
            }

            let current = store.property(target.actor, target.property);
            let computed = (entry.constraint.function)(&current, inputs.as_slice());

            let value = match entry.phase {
                Phase::Blending => {
                    let t = normalized(entry.attached_at, entry.constraint.apply_period, now);
                    if t >= 1.0 {
                        entry.phase = Phase::Applied;
                        computed
                    } else {
                        let a = entry.constraint.alpha.evaluate(t);
                        entry.constraint.blend(&entry.start_value, &computed, a)
                    }
                }
                Phase::Applied => computed,
                Phase::Removing { since, from } => {
                    let t = normalized(since, entry.constraint.remove_period, now);
                    let toward = match entry.constraint.remove_action {
                        RemoveAction::Bake => computed,
                        RemoveAction::Discard => entry.start_value,
                    };
                    if t >= 1.0 {
                        entry.phase = Phase::Defunct;
                        toward
                    } else {
                        let a = entry.constraint.alpha.evaluate(t);
                        entry.constraint.blend(&from, &toward, a)
                    }
                }
                Phase::Defunct => unreachable!("defunct entries are skipped above"),
            };

            store.set_property(target.actor, target.property, value);
            evaluated += 1;
        }

        // Cleanup pass: drop finished removals and constraints whose
        // participants vanished.
        let before = entries.len();
        entries.retain(|e| !matches!(e.phase, Phase::Defunct));
        let culled = before - entries.len();

        tracer.constraint_pass(&ConstraintPassEvent { evaluated, culled });
    }
}

/// Normalized elapsed time in `[0, 1]`; a zero period is complete.
fn normalized(start: FrameTime, period: TickDuration, now: FrameTime) -> f64 {
    if period.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(start);
    let t = elapsed.ticks() as f64 / period.ticks() as f64;
    t.clamp(0.0, 1.0)
}
