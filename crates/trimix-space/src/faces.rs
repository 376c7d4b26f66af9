//! Face enumeration for face-centred fields.
//!
//! Every cell owns its lower face on each axis. On a non-periodic grid the
//! cells on the upper edge of an axis also own the upper boundary face of
//! that axis, so each axis of extent `n` has `n + 1` face planes.
//!
//! Buffer layout:
//!
//! - slots `0 .. cell_count * ndim`: lower faces, interleaved as
//!   `rank * ndim + axis`
//! - the remaining slots: upper boundary faces, grouped by axis and ordered
//!   by rank within each axis
//!
//! Under [`EdgeBehavior::Wrap`] the upper face of the last cell is the lower
//! face of the first, so no boundary faces are added.

use crate::edge::EdgeBehavior;
use crate::space::Space;

/// Which side of its owning cell a face sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceSide {
    /// Between the cell and its lower neighbour along the axis.
    Lower,
    /// On the upper domain boundary.
    Upper,
}

/// One face of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face {
    /// Axis the face is normal to.
    pub axis: usize,
    /// Rank of the owning cell.
    pub cell: usize,
    /// Side of the owning cell.
    pub side: FaceSide,
    /// Rank of the cell on the other side. Equals `cell` where the other
    /// side is outside the domain.
    pub across: usize,
}

/// Flat face numbering for one grid.
#[derive(Clone, Debug)]
pub struct FaceLayout {
    ndim: usize,
    /// `across` of each lower face, indexed like the buffer.
    lower: Vec<usize>,
    /// `(axis, cell)` of each upper boundary face, in buffer order.
    upper: Vec<(usize, usize)>,
}

impl FaceLayout {
    /// Enumerate the faces of `space`.
    pub fn new(space: &dyn Space) -> Self {
        let ndim = space.ndim();
        let n = space.cell_count();
        let mut offset = vec![0i32; ndim];

        let mut lower = Vec::with_capacity(n * ndim);
        for rank in 0..n {
            for axis in 0..ndim {
                offset[axis] = -1;
                lower.push(space.offset_rank(rank, &offset).unwrap_or(rank));
                offset[axis] = 0;
            }
        }

        let mut upper = Vec::new();
        if space.edge_behavior() != EdgeBehavior::Wrap {
            for axis in 0..ndim {
                offset[axis] = 1;
                for rank in 0..n {
                    let on_edge = space
                        .offset_rank(rank, &offset)
                        .map_or(true, |r| r == rank);
                    if on_edge {
                        upper.push((axis, rank));
                    }
                }
                offset[axis] = 0;
            }
        }

        Self { ndim, lower, upper }
    }

    /// Total number of faces, which is the length of a face field buffer.
    pub fn len(&self) -> usize {
        self.lower.len() + self.upper.len()
    }

    /// `true` for a grid with no faces.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of upper boundary faces at the end of the buffer.
    pub fn boundary_count(&self) -> usize {
        self.upper.len()
    }

    /// The face at buffer slot `index`.
    pub fn get(&self, index: usize) -> Option<Face> {
        if let Some(&across) = self.lower.get(index) {
            return Some(Face {
                axis: index % self.ndim,
                cell: index / self.ndim,
                side: FaceSide::Lower,
                across,
            });
        }
        let &(axis, cell) = self.upper.get(index - self.lower.len())?;
        Some(Face {
            axis,
            cell,
            side: FaceSide::Upper,
            across: cell,
        })
    }

    /// All faces in buffer order.
    pub fn iter(&self) -> impl Iterator<Item = Face> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }
}
