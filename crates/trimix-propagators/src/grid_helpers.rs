//! Shared helpers for the stencil propagators.

use trimix_core::{FieldId, PropagatorError};
use trimix_propagator::{FullWriteGuard, StepContext};

/// Fail unless `data` has exactly `expected` slots.
pub(crate) fn check_len(
    field: FieldId,
    data: &[f64],
    expected: usize,
) -> Result<(), PropagatorError> {
    if data.len() == expected {
        Ok(())
    } else {
        Err(PropagatorError::failed(format!(
            "field {field} has {} slots, expected {expected}",
            data.len()
        )))
    }
}

/// Overwrite every slot of `field` with `value(slot)`.
///
/// Returns [`PropagatorError::NonFinite`] at the first NaN or infinite
/// value; the step engine discards the partially written buffer.
pub(crate) fn fill_field(
    ctx: &mut StepContext<'_>,
    writer: &str,
    field: FieldId,
    len: usize,
    value: impl FnMut(usize) -> f64,
) -> Result<(), PropagatorError> {
    let out = ctx.write_field(field)?;
    check_len(field, out, len)?;
    FullWriteGuard::new(out, writer, field).fill_with(value)
}
