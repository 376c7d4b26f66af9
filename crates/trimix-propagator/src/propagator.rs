//! The [`Propagator`] trait, [`Phase`] and [`WriteMode`].

use crate::context::StepContext;
use trimix_core::{FieldId, FieldSet, PropagatorError};

/// Hook point a propagator runs in.
///
/// The host calls the post-advection hook right after it has transported
/// the volume fractions, then the pre-solve hook right before the
/// momentum solver reads the material properties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Fraction repair and smoothing.
    PostAdvection,
    /// Material property evaluation.
    PreSolve,
}

/// Write initialization strategy for a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// Fresh buffer. The propagator must fill every slot.
    ///
    /// In debug builds a [`FullWriteGuard`](crate::FullWriteGuard) can
    /// track coverage.
    Full,

    /// Buffer seeded from the field's current value. The propagator
    /// modifies only the slots it needs to update.
    Incremental,
}

/// A stateless operator executed once per step.
///
/// # Contract
///
/// - `step()` must be deterministic: same inputs produce identical outputs.
/// - `&self`: configuration is fixed at construction; all state lives in
///   fields.
/// - `phase()`, `reads()` and `writes()` are called once at pipeline
///   construction, not per step.
///
/// # Examples
///
/// ```
/// use trimix_propagator::{Propagator, StepContext, WriteMode};
/// use trimix_core::{FieldId, FieldSet, PropagatorError};
///
/// struct ConstantFill {
///     field: FieldId,
///     value: f64,
/// }
///
/// impl Propagator for ConstantFill {
///     fn name(&self) -> &str { "constant_fill" }
///
///     fn reads(&self) -> FieldSet { FieldSet::empty() }
///
///     fn writes(&self) -> Vec<(FieldId, WriteMode)> {
///         vec![(self.field, WriteMode::Full)]
///     }
///
///     fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
///         ctx.write_field(self.field)?.fill(self.value);
///         Ok(())
///     }
/// }
///
/// let prop = ConstantFill { field: FieldId(0), value: 1000.0 };
/// assert_eq!(prop.name(), "constant_fill");
/// ```
pub trait Propagator: Send + 'static {
    /// Human-readable name for error reporting and logging.
    fn name(&self) -> &str;

    /// The hook this propagator runs in. Default: [`Phase::PreSolve`].
    fn phase(&self) -> Phase {
        Phase::PreSolve
    }

    /// Fields read through the in-step overlay view, which sees values
    /// written by earlier propagators of the same phase.
    fn reads(&self) -> FieldSet;

    /// Fields this propagator writes, with their initialization mode.
    fn writes(&self) -> Vec<(FieldId, WriteMode)>;

    /// Execute the propagator for one step.
    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError>;
}
