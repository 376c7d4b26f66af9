//! Field access traits used by propagators.

use crate::id::FieldId;

/// Read-only access to field data within a step.
///
/// Returns `None` if the field is unknown or not readable in the current
/// context.
pub trait FieldReader {
    /// Read the data for a field as a flat f64 slice.
    fn read(&self, field: FieldId) -> Option<&[f64]>;
}

/// Mutable access to a propagator's staging buffers.
///
/// Returns `None` if the field is unknown or was not declared as a write.
pub trait FieldWriter {
    /// Get a mutable slice for writing field data.
    fn write(&mut self, field: FieldId) -> Option<&mut [f64]>;
}
