//! Refinement annotations collected for an adaptive host grid.
//!
//! Propagators issue hints through [`RefinementHints`]. The engine
//! buffers a phase's hints in [`PendingHints`] and merges them into the
//! world's [`GridAnnotations`] only when the phase commits, so a rolled
//! back phase leaves no trace.

use indexmap::{IndexMap, IndexSet};
use trimix_core::{FieldId, Prolongation, RefinementHints};

/// Hints issued during a single phase.
#[derive(Debug, Default)]
pub(crate) struct PendingHints {
    prolongations: IndexMap<FieldId, Prolongation>,
    dirty: IndexSet<FieldId>,
}

impl RefinementHints for PendingHints {
    fn set_prolongation(&mut self, field: FieldId, prolongation: Prolongation) {
        self.prolongations.insert(field, prolongation);
    }

    fn mark_dirty(&mut self, field: FieldId) {
        self.dirty.insert(field);
    }
}

/// Committed refinement state of every annotated field.
///
/// Prolongation rules persist until overridden. Dirty marks accumulate
/// until the host drains them with [`take_dirty`](Self::take_dirty).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridAnnotations {
    prolongations: IndexMap<FieldId, Prolongation>,
    dirty: IndexSet<FieldId>,
}

impl GridAnnotations {
    /// Prolongation rule for `field`, if one was issued.
    pub fn prolongation(&self, field: FieldId) -> Option<Prolongation> {
        self.prolongations.get(&field).copied()
    }

    /// Every `(field, rule)` pair, in first-issued order.
    pub fn prolongations(&self) -> impl Iterator<Item = (FieldId, Prolongation)> + '_ {
        self.prolongations.iter().map(|(&f, &p)| (f, p))
    }

    /// Whether `field` awaits boundary recomputation.
    pub fn is_dirty(&self, field: FieldId) -> bool {
        self.dirty.contains(&field)
    }

    /// Fields awaiting boundary recomputation, in first-marked order.
    pub fn dirty(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.dirty.iter().copied()
    }

    /// Drain the dirty set.
    pub fn take_dirty(&mut self) -> Vec<FieldId> {
        self.dirty.drain(..).collect()
    }

    /// Whether no hint has ever been committed (or all were cleared).
    pub fn is_empty(&self) -> bool {
        self.prolongations.is_empty() && self.dirty.is_empty()
    }

    pub(crate) fn merge(&mut self, pending: PendingHints) {
        self.prolongations.extend(pending.prolongations);
        self.dirty.extend(pending.dirty);
    }

    pub(crate) fn clear(&mut self) {
        self.prolongations.clear();
        self.dirty.clear();
    }
}
