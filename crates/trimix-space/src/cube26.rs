//! 3-D cubic grid with 26-connected neighbourhood.

use crate::edge::EdgeBehavior;
use crate::error::SpaceError;
use crate::lattice;
use crate::space::Space;
use trimix_core::Coord;

/// A three-dimensional cubic grid with 26-connected neighbourhood.
///
/// Each cell has coordinate `[layer, row, col]`; rank is
/// `(layer * rows + row) * cols + col`. The 26-connected neighbourhood
/// (6 faces, 12 edges, 8 corners) is the support of the 3-D smoothing
/// stencil.
#[derive(Debug, Clone)]
pub struct Cube26 {
    layers: u32,
    rows: u32,
    cols: u32,
    edge: EdgeBehavior,
}

impl Cube26 {
    /// Maximum extent per axis: coordinates use `i32`.
    pub const MAX_DIM: u32 = lattice::MAX_DIM;

    /// Create a `layers * rows * cols` grid with the given edge behavior.
    pub fn new(layers: u32, rows: u32, cols: u32, edge: EdgeBehavior) -> Result<Self, SpaceError> {
        lattice::check_dims(&[layers, rows, cols], &["layers", "rows", "cols"])?;
        Ok(Self {
            layers,
            rows,
            cols,
            edge,
        })
    }

    /// Number of layers (extent of axis 0).
    pub fn layers(&self) -> u32 {
        self.layers
    }

    /// Number of rows (extent of axis 1).
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns (extent of axis 2).
    pub fn cols(&self) -> u32 {
        self.cols
    }

    fn dims(&self) -> [u32; 3] {
        [self.layers, self.rows, self.cols]
    }
}

impl Space for Cube26 {
    fn ndim(&self) -> usize {
        3
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
