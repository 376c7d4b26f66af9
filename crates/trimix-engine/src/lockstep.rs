//! Lockstep (synchronous) world.
//!
//! [`LockstepWorld`] is the host-facing API. The host drives it with one
//! hook per scheduling point:
//!
//! 1. advect `f1`, `f2` and push them in with
//!    [`write_field`](LockstepWorld::write_field);
//! 2. [`post_advection`](LockstepWorld::post_advection);
//! 3. [`pre_solve`](LockstepWorld::pre_solve), then read the derived
//!    fields for the solver.
//!
//! [`step_sync`](LockstepWorld::step_sync) runs both hooks back to back.
//!
//! # Ownership model
//!
//! `LockstepWorld` is [`Send`] (can be moved between threads) but not
//! [`Sync`]. All mutating methods take `&mut self`, and
//! [`read`](LockstepWorld::read) borrows from `self`, so the borrow checker
//! prevents reading a field while a hook is rewriting it.

use std::error::Error;
use std::fmt;

use trimix_core::{FieldId, FieldMutability, StepError, StepId};
use trimix_propagator::Phase;
use trimix_space::Space;

use crate::annotations::GridAnnotations;
use crate::config::{ConfigError, WorldConfig};
use crate::metrics::StepMetrics;
use crate::step::StepEngine;

// Compile-time assertion: LockstepWorld is Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<LockstepWorld>();
    }
};

// ── FieldAccessError ────────────────────────────────────────────

/// Errors from host reads and writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldAccessError {
    /// The field is not defined in this world.
    UnknownField {
        /// The requested field.
        field: FieldId,
    },
    /// Static fields are fixed at construction.
    StaticField {
        /// The requested field.
        field: FieldId,
    },
    /// The supplied values have the wrong number of slots.
    LengthMismatch {
        /// The target field.
        field: FieldId,
        /// Slots the field occupies.
        expected: usize,
        /// Slots supplied.
        got: usize,
    },
    /// A supplied value is NaN or infinite.
    NonFinite {
        /// The target field.
        field: FieldId,
        /// Slot of the first non-finite value.
        index: usize,
    },
}

impl fmt::Display for FieldAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField { field } => write!(f, "field {field} is not defined"),
            Self::StaticField { field } => write!(f, "field {field} is static"),
            Self::LengthMismatch {
                field,
                expected,
                got,
            } => write!(f, "field {field} has {expected} slots, got {got} values"),
            Self::NonFinite { field, index } => {
                write!(f, "non-finite value for field {field} at slot {index}")
            }
        }
    }
}

impl Error for FieldAccessError {}

// ── StepResult ──────────────────────────────────────────────────

/// Result of a successful [`LockstepWorld::step_sync()`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepResult {
    /// Index of the step that just completed.
    pub step: StepId,
    /// Metrics for both phases of the step.
    pub metrics: StepMetrics,
}

// ── LockstepWorld ───────────────────────────────────────────────

/// Single-threaded world driven by the host's step hooks.
///
/// # Example
///
/// ```
/// use trimix_core::{FieldDef, FieldId, StepId};
/// use trimix_engine::{LockstepWorld, WorldConfig};
/// use trimix_space::{EdgeBehavior, Square8};
/// use trimix_test_utils::IdentityPropagator;
///
/// let config = WorldConfig {
///     space: Box::new(Square8::new(4, 4, EdgeBehavior::Absorb).unwrap()),
///     fields: vec![FieldDef::scalar("f1"), FieldDef::scalar("copy")],
///     initial_values: vec![],
///     propagators: vec![Box::new(IdentityPropagator::new("copy", FieldId(0), FieldId(1)))],
///     adaptive: false,
/// };
/// let mut world = LockstepWorld::new(config).unwrap();
/// world.write_field(FieldId(0), &[0.5; 16]).unwrap();
/// let result = world.step_sync().unwrap();
/// assert_eq!(result.step, StepId(0));
/// assert_eq!(world.read(FieldId(1)), Some(&[0.5; 16][..]));
/// assert_eq!(world.current_step(), StepId(1));
/// ```
pub struct LockstepWorld {
    engine: StepEngine,
}

impl LockstepWorld {
    /// Create a new world from a [`WorldConfig`].
    ///
    /// Validates the configuration, builds the pipeline plan, and loads the
    /// initial values. Consumes the `WorldConfig`.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: StepEngine::new(config)?,
        })
    }

    /// Run the post-advection hook.
    ///
    /// # Errors
    ///
    /// Returns [`StepError`] if a propagator fails (the phase is rolled
    /// back) or if stepping is disabled after consecutive rollbacks.
    pub fn post_advection(&mut self) -> Result<StepMetrics, StepError> {
        self.engine.run_phase(Phase::PostAdvection)
    }

    /// Run the pre-solve hook. On success the step index advances.
    ///
    /// # Errors
    ///
    /// As for [`post_advection`](Self::post_advection).
    pub fn pre_solve(&mut self) -> Result<StepMetrics, StepError> {
        self.engine.run_phase(Phase::PreSolve)
    }

    /// Run both hooks.
    ///
    /// If pre-solve fails, the committed post-advection output stays in
    /// place and the step index does not advance.
    pub fn step_sync(&mut self) -> Result<StepResult, StepError> {
        let step = self.engine.current_step();
        self.post_advection()?;
        self.pre_solve()?;
        Ok(StepResult {
            step,
            metrics: self.engine.last_metrics().clone(),
        })
    }

    /// Committed values of `field`.
    pub fn read(&self, field: FieldId) -> Option<&[f64]> {
        self.engine.read(field)
    }

    /// Overwrite a per-step field, typically a fraction after advection.
    pub fn write_field(&mut self, field: FieldId, values: &[f64]) -> Result<(), FieldAccessError> {
        let def = self
            .engine
            .field_def(field)
            .ok_or(FieldAccessError::UnknownField { field })?;
        if def.mutability == FieldMutability::Static {
            return Err(FieldAccessError::StaticField { field });
        }
        let expected = self
            .engine
            .len_of(field)
            .ok_or(FieldAccessError::UnknownField { field })?;
        if values.len() != expected {
            return Err(FieldAccessError::LengthMismatch {
                field,
                expected,
                got: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(FieldAccessError::NonFinite { field, index });
        }
        self.engine.overwrite(field, values);
        Ok(())
    }

    /// Restore the initial values and return to step 0.
    ///
    /// Clears annotations, metrics and the disabled state.
    pub fn reset(&mut self) {
        self.engine.reset();
    }

    /// Index of the step in progress (0 after construction or reset).
    pub fn current_step(&self) -> StepId {
        self.engine.current_step()
    }

    /// Committed refinement annotations.
    pub fn annotations(&self) -> &GridAnnotations {
        self.engine.annotations()
    }

    /// Drain the fields marked dirty since the last call.
    pub fn take_dirty(&mut self) -> Vec<FieldId> {
        self.engine.take_dirty()
    }

    /// Metrics from the most recent completed step.
    pub fn last_metrics(&self) -> &StepMetrics {
        self.engine.last_metrics()
    }

    /// Whether stepping is disabled due to consecutive rollbacks.
    pub fn is_step_disabled(&self) -> bool {
        self.engine.is_step_disabled()
    }

    /// Number of consecutive rollbacks since the last committed phase.
    pub fn consecutive_rollback_count(&self) -> u32 {
        self.engine.consecutive_rollback_count()
    }

    /// The lattice for this world.
    pub fn space(&self) -> &dyn Space {
        self.engine.space()
    }
}

impl fmt::Debug for LockstepWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockstepWorld")
            .field("current_step", &self.engine.current_step())
            .field("step_disabled", &self.engine.is_step_disabled())
            .finish()
    }
}
