//! Committed field storage and per-propagator staging buffers.
//!
//! [`FieldStore`] holds one buffer per field, sized from its
//! [`FieldDef`]. A phase never writes the store directly: each propagator
//! writes into its own [`StagingBuffers`], and the engine swaps the staged
//! buffers into the store only once the whole phase has succeeded.

use indexmap::IndexMap;
use trimix_core::{FieldDef, FieldId, FieldReader, FieldWriter};
use trimix_propagator::{PipelinePlan, WriteMode};

/// Committed values of every field.
#[derive(Clone)]
pub(crate) struct FieldStore {
    buffers: Vec<Vec<f64>>,
}

impl FieldStore {
    /// Allocate zeroed buffers for `defs` on a grid of `cell_count` cells
    /// and `face_count` faces.
    pub(crate) fn zeroed(defs: &[FieldDef], cell_count: usize, face_count: usize) -> Self {
        Self {
            buffers: defs
                .iter()
                .map(|d| vec![0.0; d.len_for(cell_count, face_count)])
                .collect(),
        }
    }

    /// Overwrite a field. The caller has checked the length.
    pub(crate) fn set(&mut self, field: FieldId, values: &[f64]) {
        if let Some(buf) = self.buffers.get_mut(field.0 as usize) {
            buf.copy_from_slice(values);
        }
    }

    /// Number of slots of `field`, if defined.
    pub(crate) fn len_of(&self, field: FieldId) -> Option<usize> {
        self.buffers.get(field.0 as usize).map(Vec::len)
    }

    /// Swap every staged buffer into the store.
    ///
    /// The displaced buffers end up in the staging set and are dropped with
    /// it.
    pub(crate) fn commit(&mut self, staged: &mut [StagingBuffers]) {
        for stage in staged {
            for (field, buf) in stage.buffers.iter_mut() {
                if let Some(slot) = self.buffers.get_mut(field.0 as usize) {
                    std::mem::swap(slot, buf);
                }
            }
        }
    }
}

impl FieldReader for FieldStore {
    fn read(&self, field: FieldId) -> Option<&[f64]> {
        self.buffers.get(field.0 as usize).map(Vec::as_slice)
    }
}

/// Write buffers for one propagator's declared outputs.
pub(crate) struct StagingBuffers {
    buffers: IndexMap<FieldId, Vec<f64>>,
}

impl StagingBuffers {
    /// Allocate buffers for propagator `index` of `plan`.
    ///
    /// `Full` outputs start zeroed; `Incremental` outputs are seeded from
    /// the committed value.
    pub(crate) fn for_propagator(plan: &PipelinePlan, index: usize, store: &FieldStore) -> Self {
        let mut buffers = IndexMap::new();
        if let Some(modes) = plan.write_modes_for(index) {
            for (&field, &mode) in modes {
                let Some(current) = store.read(field) else {
                    continue;
                };
                let buf = match mode {
                    WriteMode::Full => vec![0.0; current.len()],
                    WriteMode::Incremental => current.to_vec(),
                };
                buffers.insert(field, buf);
            }
        }
        Self { buffers }
    }
}

impl FieldReader for StagingBuffers {
    fn read(&self, field: FieldId) -> Option<&[f64]> {
        self.buffers.get(&field).map(Vec::as_slice)
    }
}

impl FieldWriter for StagingBuffers {
    fn write(&mut self, field: FieldId) -> Option<&mut [f64]> {
        self.buffers.get_mut(&field).map(Vec::as_mut_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trimix_core::FieldSet;
    use trimix_propagator::{validate_pipeline, Propagator};
    use trimix_test_utils::{ConstPropagator, IdentityPropagator};

    fn defs() -> Vec<FieldDef> {
        vec![
            FieldDef::scalar("a"),
            FieldDef::scalar("b"),
            FieldDef::face("c", 2),
        ]
    }

    #[test]
    fn zeroed_store_sizes_by_field_type() {
        let store = FieldStore::zeroed(&defs(), 4, 12);
        assert_eq!(store.len_of(FieldId(0)), Some(4));
        assert_eq!(store.len_of(FieldId(2)), Some(12));
        assert_eq!(store.len_of(FieldId(3)), None);
        assert!(store.read(FieldId(1)).unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn staging_and_commit() {
        let mut store = FieldStore::zeroed(&defs(), 4, 12);
        store.set(FieldId(0), &[1.0, 2.0, 3.0, 4.0]);
        let props: Vec<Box<dyn Propagator>> = vec![
            Box::new(ConstPropagator::new("c", FieldId(1), 5.0)),
            Box::new(IdentityPropagator::new("i", FieldId(1), FieldId(0))),
        ];
        let defined: FieldSet = (0..3).map(FieldId).collect();
        let plan = validate_pipeline(&props, &defined, &FieldSet::empty()).unwrap();

        let mut staged = vec![
            StagingBuffers::for_propagator(&plan, 0, &store),
            StagingBuffers::for_propagator(&plan, 1, &store),
        ];
        assert_eq!(staged[0].read(FieldId(1)), Some(&[0.0; 4][..]));
        assert!(staged[0].read(FieldId(0)).is_none());
        staged[0].write(FieldId(1)).unwrap().fill(5.0);

        store.commit(&mut staged);
        assert_eq!(store.read(FieldId(1)), Some(&[5.0; 4][..]));
        // Full writes start zeroed and were committed as such.
        assert_eq!(store.read(FieldId(0)), Some(&[0.0; 4][..]));
    }
}
