//! Checked writes into `WriteMode::Full` output buffers.
//!
//! [`FullWriteGuard`] rejects NaN and infinite values in every build, so a
//! mixing law that divides by a zero density surfaces as
//! [`PropagatorError::NonFinite`] instead of reaching the solver. Debug
//! builds additionally track which slots were written and warn on drop if
//! the buffer was left partly stale.

use trimix_core::{FieldId, PropagatorError};

/// Finite-value, full-coverage writer for one [`WriteMode::Full`](crate::WriteMode) buffer.
pub struct FullWriteGuard<'a> {
    data: &'a mut [f64],
    field_id: FieldId,
    #[cfg(debug_assertions)]
    written: Vec<bool>,
    #[cfg(debug_assertions)]
    propagator_name: String,
}

impl<'a> FullWriteGuard<'a> {
    /// Wrap the output buffer of `field_id`.
    ///
    /// `propagator_name` only appears in the debug-build coverage warning.
    pub fn new(
        data: &'a mut [f64],
        #[cfg_attr(not(debug_assertions), allow(unused_variables))] propagator_name: &str,
        field_id: FieldId,
    ) -> Self {
        Self {
            #[cfg(debug_assertions)]
            written: vec![false; data.len()],
            #[cfg(debug_assertions)]
            propagator_name: propagator_name.to_string(),
            data,
            field_id,
        }
    }

    /// Store `value` at `index`.
    ///
    /// The slot is left untouched if `value` is not finite.
    pub fn write_at(&mut self, index: usize, value: f64) -> Result<(), PropagatorError> {
        if !value.is_finite() {
            return Err(PropagatorError::NonFinite {
                field_id: self.field_id,
                cell_index: Some(index),
            });
        }
        self.data[index] = value;
        #[cfg(debug_assertions)]
        {
            self.written[index] = true;
        }
        Ok(())
    }

    /// Write `value(slot)` into every slot in ascending order, stopping at
    /// the first non-finite value.
    pub fn fill_with(&mut self, mut value: impl FnMut(usize) -> f64) -> Result<(), PropagatorError> {
        for slot in 0..self.data.len() {
            self.write_at(slot, value(slot))?;
        }
        Ok(())
    }

    /// The field being written.
    pub fn field_id(&self) -> FieldId {
        self.field_id
    }

    /// Number of slots in the buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Fraction of slots written (always 1.0 in release builds).
    pub fn coverage(&self) -> f64 {
        #[cfg(debug_assertions)]
        {
            if self.written.is_empty() {
                return 1.0;
            }
            let count = self.written.iter().filter(|&&b| b).count();
            count as f64 / self.written.len() as f64
        }
        #[cfg(not(debug_assertions))]
        {
            1.0
        }
    }
}

#[cfg(debug_assertions)]
impl Drop for FullWriteGuard<'_> {
    fn drop(&mut self) {
        let total = self.written.len();
        let count = self.written.iter().filter(|&&b| b).count();
        if count < total {
            tracing::warn!(
                propagator = %self.propagator_name,
                field = %self.field_id,
                written = count,
                total,
                "full write left stale slots"
            );
        }
    }
}
