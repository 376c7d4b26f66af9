//! Execution context passed to propagators during a step.
//!
//! [`StepContext`] provides split-borrow field access: the in-step overlay
//! for reads, the propagator's staging buffers for writes, plus the grid
//! accessor and the refinement hint sink.

use trimix_core::{FieldId, FieldReader, FieldWriter, PropagatorError, RefinementHints, StepId};
use trimix_space::Space;

/// Execution context passed to each propagator's `step()` method.
///
/// Uses dynamic dispatch so the [`Propagator`](crate::Propagator) trait
/// stays object-safe and mocks from `trimix-test-utils` can stand in for
/// the engine's buffers.
///
/// Read views hand out slices with the context lifetime `'a`, so a
/// propagator can hold input slices while it writes its outputs.
pub struct StepContext<'a> {
    reads: &'a dyn FieldReader,
    writes: &'a mut dyn FieldWriter,
    space: &'a dyn Space,
    hints: &'a mut dyn RefinementHints,
    step_id: StepId,
}

impl<'a> StepContext<'a> {
    /// Construct a new step context.
    ///
    /// Typically called by the engine, not by propagators directly.
    pub fn new(
        reads: &'a dyn FieldReader,
        writes: &'a mut dyn FieldWriter,
        space: &'a dyn Space,
        hints: &'a mut dyn RefinementHints,
        step_id: StepId,
    ) -> Self {
        Self {
            reads,
            writes,
            space,
            hints,
            step_id,
        }
    }

    /// In-step overlay reader.
    pub fn reads(&self) -> &'a dyn FieldReader {
        self.reads
    }

    /// Mutable field writer for the current propagator's declared outputs.
    pub fn writes(&mut self) -> &mut dyn FieldWriter {
        self.writes
    }

    /// Read a field through the overlay, failing if it is not readable.
    pub fn read_field(&self, field: FieldId) -> Result<&'a [f64], PropagatorError> {
        self.reads
            .read(field)
            .ok_or_else(|| PropagatorError::failed(format!("field {field} not readable")))
    }

    /// Borrow a declared output, failing if it is not writable.
    pub fn write_field(&mut self, field: FieldId) -> Result<&mut [f64], PropagatorError> {
        self.writes
            .write(field)
            .ok_or_else(|| PropagatorError::failed(format!("field {field} not writable")))
    }

    /// Grid accessor.
    pub fn space(&self) -> &'a dyn Space {
        self.space
    }

    /// Refinement hint sink. A no-op on non-adaptive worlds.
    pub fn hints(&mut self) -> &mut dyn RefinementHints {
        self.hints
    }

    /// Index of the current step.
    pub fn step_id(&self) -> StepId {
        self.step_id
    }
}
