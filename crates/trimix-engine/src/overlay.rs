//! In-phase overlay reader.
//!
//! [`OverlayReader`] routes each `(propagator, field)` read according to
//! the [`PipelinePlan`](trimix_propagator::PipelinePlan): either to the
//! committed [`FieldStore`] or to the staging buffers of an earlier
//! propagator in the same phase. The earlier buffers are borrowed directly,
//! so no field data is copied between propagators.

use indexmap::IndexMap;
use trimix_core::{FieldId, FieldReader};
use trimix_propagator::ReadSource;

use crate::store::{FieldStore, StagingBuffers};

/// [`FieldReader`] view for a single propagator.
pub(crate) struct OverlayReader<'a> {
    routes: &'a IndexMap<FieldId, ReadSource>,
    store: &'a FieldStore,
    staged: &'a [StagingBuffers],
    phase_start: usize,
}

impl<'a> OverlayReader<'a> {
    /// `staged[k]` holds the outputs of pipeline index `phase_start + k`.
    pub(crate) fn new(
        routes: &'a IndexMap<FieldId, ReadSource>,
        store: &'a FieldStore,
        staged: &'a [StagingBuffers],
        phase_start: usize,
    ) -> Self {
        Self {
            routes,
            store,
            staged,
            phase_start,
        }
    }
}

impl FieldReader for OverlayReader<'_> {
    fn read(&self, field: FieldId) -> Option<&[f64]> {
        match self.routes.get(&field)? {
            ReadSource::Store => self.store.read(field),
            ReadSource::Staged { writer_index } => self
                .staged
                .get(writer_index.checked_sub(self.phase_start)?)?
                .read(field),
        }
    }
}
