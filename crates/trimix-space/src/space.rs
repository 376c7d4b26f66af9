//! The core `Space` trait.

use crate::edge::EdgeBehavior;
use trimix_core::Coord;

/// Abstract grid accessor.
///
/// The smoothing stencil and the face pass of the property evaluator read
/// neighbours exclusively through [`offset_rank`](Self::offset_rank), so
/// they run unchanged on any backend.
///
/// Cells are numbered by their position in
/// [`canonical_ordering`](Self::canonical_ordering); that rank is also the
/// index into every scalar field buffer.
///
/// # Object Safety
///
/// This trait is designed for use as `dyn Space`.
pub trait Space: Send + Sync + 'static {
    /// Number of spatial dimensions.
    fn ndim(&self) -> usize;

    /// Total number of cells in the space.
    fn cell_count(&self) -> usize;

    /// How lookups past the domain edge resolve. Decides, among other
    /// things, whether the grid has upper boundary faces.
    fn edge_behavior(&self) -> EdgeBehavior;

    /// All cells in deterministic canonical order.
    fn canonical_ordering(&self) -> Vec<Coord>;

    /// Position of a coordinate in the canonical ordering.
    ///
    /// Default implementation performs a linear search; backends should
    /// override with O(1) arithmetic.
    fn canonical_rank(&self, coord: &Coord) -> Option<usize> {
        self.canonical_ordering().iter().position(|c| c == coord)
    }

    /// Rank of the cell displaced by `offset` from the cell at `rank`.
    ///
    /// `offset` has one entry per axis. Returns `None` when `rank` is out
    /// of range, `offset` has the wrong length, or the lookup leaves an
    /// absorbing edge.
    fn offset_rank(&self, rank: usize, offset: &[i32]) -> Option<usize>;
}
