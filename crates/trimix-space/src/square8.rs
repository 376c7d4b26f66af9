//! 2-D square grid with 8-connected neighbourhood (cardinal + diagonal).

use crate::edge::EdgeBehavior;
use crate::error::SpaceError;
use crate::lattice;
use crate::space::Space;
use trimix_core::Coord;

/// A two-dimensional square grid with 8-connected neighbourhood.
///
/// Each cell has coordinate `[row, col]`; rank is `row * cols + col`.
/// The 8-connected neighbourhood (four cardinal directions plus four
/// diagonals) is exactly the support of the 2-D smoothing stencil.
///
/// Boundary handling is controlled by [`EdgeBehavior`]:
/// - **Absorb**: edge cells see fewer stencil points (corners see 3, edges see 5)
/// - **Clamp**: edge cells self-loop on the boundary axis
/// - **Wrap**: periodic boundary (torus topology)
#[derive(Debug, Clone)]
pub struct Square8 {
    rows: u32,
    cols: u32,
    edge: EdgeBehavior,
}

impl Square8 {
    /// Maximum extent per axis: coordinates use `i32`.
    pub const MAX_DIM: u32 = lattice::MAX_DIM;

    /// Create a new 2-D grid with `rows * cols` cells and the given edge behavior.
    ///
    /// Returns `Err(SpaceError::EmptySpace)` if either dimension is 0, or
    /// `Err(SpaceError::DimensionTooLarge)` if either exceeds `i32::MAX`.
    pub fn new(rows: u32, cols: u32, edge: EdgeBehavior) -> Result<Self, SpaceError> {
        lattice::check_dims(&[rows, cols], &["rows", "cols"])?;
        Ok(Self {
            rows,
            cols,
            edge,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    fn dims(&self) -> [u32; 2] {
        [self.rows, self.cols]
    }
}

impl Space for Square8 {
    fn ndim(&self) -> usize {
        2
    }

    fn cell_count(&self) -> usize {
        lattice::cell_count(&self.dims())
    }

    fn edge_behavior(&self) -> EdgeBehavior {
        self.edge
    }

    fn canonical_ordering(&self) -> Vec<Coord> {
        lattice::canonical_ordering(&self.dims())
    }

    fn canonical_rank(&self, coord: &Coord) -> Option<usize> {
        lattice::canonical_rank(coord, &self.dims())
    }

    fn offset_rank(&self, rank: usize, offset: &[i32]) -> Option<usize> {
        lattice::offset_rank(rank, offset, &self.dims(), self.edge)
    }
}
