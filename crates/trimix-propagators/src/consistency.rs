//! Phase consistency repair after fraction transport.
//!
//! Advecting `f1` and `f2` independently can leave nested material (`f2`)
//! outside its host region (`f1`). From the activation step on, every cell
//! where `f2 > ε` and `f1 < 1 − ε` gets `f1 = f2`.
//!
//! The repair is one-directional: `f1` follows `f2`, never the reverse.
//! Inside the band `f1` takes the value of `f2` even when that is smaller;
//! outside it nothing moves, so `f2 > f1` may survive and is accepted.

use crate::error::BuildError;
use crate::grid_helpers::check_len;
use trimix_core::{FieldId, FieldSet, PropagatorError};
use trimix_propagator::{Phase, Propagator, StepContext, WriteMode};

/// Post-advection propagator repairing `f1` from `f2`.
///
/// ```
/// use trimix_core::FieldId;
/// use trimix_propagators::PhaseConsistency;
///
/// let prop = PhaseConsistency::builder()
///     .f1(FieldId(0))
///     .f2(FieldId(1))
///     .build()
///     .unwrap();
/// assert_eq!(prop.epsilon(), 1e-2);
/// ```
#[derive(Debug)]
pub struct PhaseConsistency {
    f1: FieldId,
    f2: FieldId,
    epsilon: f64,
    first_active_step: u64,
}

/// Builder for [`PhaseConsistency`].
pub struct PhaseConsistencyBuilder {
    f1: Option<FieldId>,
    f2: Option<FieldId>,
    epsilon: f64,
    first_active_step: u64,
}

impl PhaseConsistency {
    /// Default tolerance ε.
    pub const DEFAULT_EPSILON: f64 = 1e-2;

    /// The repair is skipped while the step index is below this.
    pub const DEFAULT_FIRST_ACTIVE_STEP: u64 = 2;

    /// Create a new builder.
    pub fn builder() -> PhaseConsistencyBuilder {
        PhaseConsistencyBuilder {
            f1: None,
            f2: None,
            epsilon: Self::DEFAULT_EPSILON,
            first_active_step: Self::DEFAULT_FIRST_ACTIVE_STEP,
        }
    }

    /// Tolerance ε.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// First step index on which the repair runs.
    pub fn first_active_step(&self) -> u64 {
        self.first_active_step
    }
}

impl PhaseConsistencyBuilder {
    /// Outer fraction field, repaired in place.
    pub fn f1(mut self, field: FieldId) -> Self {
        self.f1 = Some(field);
        self
    }

    /// Nested fraction field, read only.
    pub fn f2(mut self, field: FieldId) -> Self {
        self.f2 = Some(field);
        self
    }

    /// Tolerance ε, in `(0, 0.5)`.
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// First step index on which the repair runs. Use 1 for hosts whose
    /// step count starts at 1 and should skip only their first step.
    pub fn first_active_step(mut self, step: u64) -> Self {
        self.first_active_step = step;
        self
    }

    /// Build the propagator.
    pub fn build(self) -> Result<PhaseConsistency, BuildError> {
        let f1 = self.f1.ok_or(BuildError::MissingField { field: "f1" })?;
        let f2 = self.f2.ok_or(BuildError::MissingField { field: "f2" })?;
        if !(self.epsilon > 0.0 && self.epsilon < 0.5) {
            return Err(BuildError::InvalidEpsilon {
                value: self.epsilon,
            });
        }
        Ok(PhaseConsistency {
            f1,
            f2,
            epsilon: self.epsilon,
            first_active_step: self.first_active_step,
        })
    }
}

impl Propagator for PhaseConsistency {
    fn name(&self) -> &str {
        "phase_consistency"
    }

    fn phase(&self) -> Phase {
        Phase::PostAdvection
    }

    fn reads(&self) -> FieldSet {
        [self.f2].into_iter().collect()
    }

    fn writes(&self) -> Vec<(FieldId, WriteMode)> {
        vec![(self.f1, WriteMode::Incremental)]
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let step = ctx.step_id();
        if step.0 < self.first_active_step {
            tracing::trace!(%step, "phase consistency inactive");
            return Ok(());
        }
        let f2 = ctx.read_field(self.f2)?;
        let f1 = ctx.write_field(self.f1)?;
        check_len(self.f1, f1, f2.len())?;

        let upper = 1.0 - self.epsilon;
        let mut repaired = 0usize;
        for (a, &b) in f1.iter_mut().zip(f2) {
            if b > self.epsilon && *a < upper {
                *a = b;
                repaired += 1;
            }
        }
        tracing::debug!(%step, repaired, "phase consistency");
        Ok(())
    }
}
