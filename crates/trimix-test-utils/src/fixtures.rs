//! Stand-in propagators for driving the step engine without the physics.
//!
//! - [`IdentityPropagator`]: copies one field into another, optionally
//!   tagging the output with a prolongation hint.
//! - [`ConstPropagator`]: fills a field with one value. A non-finite value
//!   makes every step fail with `NonFinite`.
//! - [`FailingPropagator`]: succeeds a fixed number of times, then fails.
//!
//! All of them write in `Full` mode through [`FullWriteGuard`], the same
//! path the three-phase propagators use. Each defaults to the pre-solve
//! hook; `in_phase` moves it to post-advection.

use std::sync::atomic::{AtomicUsize, Ordering};

use trimix_core::{FieldId, FieldSet, Prolongation, PropagatorError, RefinementHints};
use trimix_propagator::{FullWriteGuard, Phase, Propagator, StepContext, WriteMode};

fn full_write(
    ctx: &mut StepContext<'_>,
    name: &str,
    field: FieldId,
    value: impl FnMut(usize) -> f64,
) -> Result<(), PropagatorError> {
    let out = ctx.write_field(field)?;
    FullWriteGuard::new(out, name, field).fill_with(value)
}

/// Copies `input` into `output`.
pub struct IdentityPropagator {
    pub name: String,
    pub phase: Phase,
    pub input: FieldId,
    pub output: FieldId,
    pub prolongation: Option<Prolongation>,
}

impl IdentityPropagator {
    pub fn new(name: impl Into<String>, input: FieldId, output: FieldId) -> Self {
        Self {
            name: name.into(),
            phase: Phase::PreSolve,
            input,
            output,
            prolongation: None,
        }
    }

    pub fn in_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Issue `prolongation` for the output and mark it dirty on every step.
    pub fn with_prolongation(mut self, prolongation: Prolongation) -> Self {
        self.prolongation = Some(prolongation);
        self
    }
}

impl Propagator for IdentityPropagator {
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn reads(&self) -> FieldSet {
        [self.input].into_iter().collect()
    }

    fn writes(&self) -> Vec<(FieldId, WriteMode)> {
        vec![(self.output, WriteMode::Full)]
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let input = ctx.read_field(self.input)?;
        let out_len = ctx.write_field(self.output)?.len();
        if out_len != input.len() {
            return Err(PropagatorError::failed(format!(
                "cannot copy {} values of field {} into {} slots of field {}",
                input.len(),
                self.input,
                out_len,
                self.output,
            )));
        }
        full_write(ctx, &self.name, self.output, |i| input[i])?;
        if let Some(prolongation) = self.prolongation {
            let hints = ctx.hints();
            hints.set_prolongation(self.output, prolongation);
            hints.mark_dirty(self.output);
        }
        Ok(())
    }
}

/// Fills `output` with `value`; reads nothing.
pub struct ConstPropagator {
    pub name: String,
    pub phase: Phase,
    pub output: FieldId,
    pub value: f64,
}

impl ConstPropagator {
    pub fn new(name: impl Into<String>, output: FieldId, value: f64) -> Self {
        Self {
            name: name.into(),
            phase: Phase::PreSolve,
            output,
            value,
        }
    }

    pub fn in_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }
}

impl Propagator for ConstPropagator {
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn reads(&self) -> FieldSet {
        FieldSet::empty()
    }

    fn writes(&self) -> Vec<(FieldId, WriteMode)> {
        vec![(self.output, WriteMode::Full)]
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        full_write(ctx, &self.name, self.output, |_| self.value)
    }
}

/// Succeeds `succeed_count` times, writing the call index, then fails on
/// every later call.
pub struct FailingPropagator {
    pub name: String,
    pub phase: Phase,
    pub output: FieldId,
    pub succeed_count: usize,
    calls: AtomicUsize,
}

impl FailingPropagator {
    pub fn new(name: impl Into<String>, output: FieldId, succeed_count: usize) -> Self {
        Self {
            name: name.into(),
            phase: Phase::PreSolve,
            output,
            succeed_count,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn in_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Number of times `step` has run, failed calls included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Propagator for FailingPropagator {
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn reads(&self) -> FieldSet {
        FieldSet::empty()
    }

    fn writes(&self) -> Vec<(FieldId, WriteMode)> {
        vec![(self.output, WriteMode::Full)]
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        if call >= self.succeed_count {
            return Err(PropagatorError::failed(format!(
                "call {call} past the {} allowed successes",
                self.succeed_count
            )));
        }
        full_write(ctx, &self.name, self.output, |_| call as f64)
    }
}
