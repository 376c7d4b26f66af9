//! Refinement hints issued to an adaptive grid.
//!
//! The physics never refines or coarsens anything itself. On an adaptive
//! grid it tells the host how each fraction field should be interpolated
//! onto newly created fine cells, and which fields need their boundary
//! values recomputed before the solver reads them.

use crate::id::FieldId;

/// How a field is interpolated onto refined cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Prolongation {
    /// Bilinear (trilinear in 3-D) interpolation from the coarse parent.
    Bilinear,
    /// Volume-fraction-conserving refinement; children average to the parent.
    FractionRefine,
}

/// Sink for refinement hints.
///
/// Non-adaptive worlds use [`NoRefinementHints`], which drops every hint.
pub trait RefinementHints {
    /// Record the prolongation rule for `field`. A later call overrides an
    /// earlier one.
    fn set_prolongation(&mut self, field: FieldId, prolongation: Prolongation);

    /// Mark `field` as needing boundary recomputation.
    fn mark_dirty(&mut self, field: FieldId);
}

/// A hint sink that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRefinementHints;

impl RefinementHints for NoRefinementHints {
    fn set_prolongation(&mut self, _field: FieldId, _prolongation: Prolongation) {}

    fn mark_dirty(&mut self, _field: FieldId) {}
}
