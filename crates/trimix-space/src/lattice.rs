//! Row-major lattice arithmetic shared by [`Square8`](crate::Square8) and
//! [`Cube26`](crate::Cube26).
//!
//! Ranks are row-major with the last axis fastest, matching the flat
//! layout of every field buffer.

use crate::edge::EdgeBehavior;
use crate::error::SpaceError;
use trimix_core::Coord;

/// Largest extent per axis; coordinates are `i32`.
pub(crate) const MAX_DIM: u32 = i32::MAX as u32;

/// Reject empty or oversized extents. `names` labels each axis for errors.
pub(crate) fn check_dims(dims: &[u32], names: &[&'static str]) -> Result<(), SpaceError> {
    if dims.iter().any(|&d| d == 0) {
        return Err(SpaceError::EmptySpace);
    }
    for (&value, &name) in dims.iter().zip(names) {
        if value > MAX_DIM {
            return Err(SpaceError::DimensionTooLarge {
                name,
                value,
                max: MAX_DIM,
            });
        }
    }
    Ok(())
}

/// Total cell count of a lattice.
pub(crate) fn cell_count(dims: &[u32]) -> usize {
    dims.iter().map(|&d| d as usize).product()
}

/// Check that `coord` lies inside the lattice.
pub(crate) fn check_bounds(coord: &Coord, dims: &[u32]) -> Result<(), SpaceError> {
    if coord.len() != dims.len() {
        return Err(SpaceError::CoordOutOfBounds {
            coord: coord.clone(),
            bounds: format!(
                "expected {}-D coordinate, got {}-D",
                dims.len(),
                coord.len()
            ),
        });
    }
    let inside = coord
        .iter()
        .zip(dims)
        .all(|(&c, &d)| c >= 0 && (c as i64) < d as i64);
    if !inside {
        let bounds = dims
            .iter()
            .map(|d| format!("[0, {d})"))
            .collect::<Vec<_>>()
            .join(" x ");
        return Err(SpaceError::CoordOutOfBounds {
            coord: coord.clone(),
            bounds,
        });
    }
    Ok(())
}

/// All coordinates in row-major order.
pub(crate) fn canonical_ordering(dims: &[u32]) -> Vec<Coord> {
    (0..cell_count(dims)).map(|r| coord_of(r, dims)).collect()
}

/// Row-major rank of an in-bounds coordinate.
pub(crate) fn canonical_rank(coord: &Coord, dims: &[u32]) -> Option<usize> {
    check_bounds(coord, dims).ok()?;
    Some(
        coord
            .iter()
            .zip(dims)
            .fold(0usize, |acc, (&c, &d)| acc * d as usize + c as usize),
    )
}

/// Coordinate of a rank. The caller guarantees `rank < cell_count(dims)`.
pub(crate) fn coord_of(rank: usize, dims: &[u32]) -> Coord {
    let mut coord: Coord = dims.iter().map(|_| 0).collect();
    let mut rest = rank;
    for axis in (0..dims.len()).rev() {
        let d = dims[axis] as usize;
        coord[axis] = (rest % d) as i32;
        rest /= d;
    }
    coord
}

/// Rank of the cell at `offset` from the cell at `rank`, resolved under
/// `edge`. `None` when the rank is out of range, the offset has the wrong
/// length, or an absorbing edge swallows the lookup.
pub(crate) fn offset_rank(
    rank: usize,
    offset: &[i32],
    dims: &[u32],
    edge: EdgeBehavior,
) -> Option<usize> {
    if offset.len() != dims.len() || rank >= cell_count(dims) {
        return None;
    }
    let mut rest = rank;
    let mut stride = 1usize;
    let mut out = 0usize;
    for axis in (0..dims.len()).rev() {
        let d = dims[axis] as usize;
        let here = (rest % d) as i32;
        rest /= d;
        let there = resolve_axis(here.checked_add(offset[axis])?, dims[axis], edge)?;
        out += there as usize * stride;
        stride *= d;
    }
    Some(out)
}

/// Resolve a single axis value under the given edge behavior.
/// Returns `None` for an absorbed out-of-bounds value.
pub(crate) fn resolve_axis(val: i32, len: u32, edge: EdgeBehavior) -> Option<i32> {
    let n = len as i32;
    if val >= 0 && val < n {
        return Some(val);
    }
    match edge {
        EdgeBehavior::Absorb => None,
        EdgeBehavior::Clamp => Some(val.clamp(0, n - 1)),
        EdgeBehavior::Wrap => Some(val.rem_euclid(n)),
    }
}
