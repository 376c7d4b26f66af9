//! Space trait compliance test helpers.
//!
//! These functions verify that a Space implementation satisfies the
//! invariants the stencil code and the face pass rely on. Reused by every
//! backend's test module.

use crate::edge::EdgeBehavior;
use crate::faces::{FaceLayout, FaceSide};
use crate::space::Space;
use indexmap::IndexSet;

/// Assert that `canonical_ordering` returns exactly `cell_count` unique
/// coords and that `canonical_rank` inverts it.
pub fn assert_canonical_ordering_complete(space: &dyn Space) {
    let ordering = space.canonical_ordering();
    assert_eq!(ordering.len(), space.cell_count());
    let unique: IndexSet<_> = ordering.iter().collect();
    assert_eq!(unique.len(), space.cell_count(), "canonical_ordering has duplicates");
    for (rank, coord) in ordering.iter().enumerate() {
        assert_eq!(space.canonical_rank(coord), Some(rank), "rank mismatch at {coord:?}");
    }
}

/// Assert that a zero offset is the identity and that every unit offset
/// either resolves in bounds or is absent.
pub fn assert_offset_rank_consistent(space: &dyn Space) {
    let zero = vec![0i32; space.ndim()];
    let n = space.cell_count();
    for rank in 0..n {
        assert_eq!(space.offset_rank(rank, &zero), Some(rank));
        for axis in 0..space.ndim() {
            for step in [-1, 1] {
                let mut offset = zero.clone();
                offset[axis] = step;
                if let Some(other) = space.offset_rank(rank, &offset) {
                    assert!(other < n, "offset_rank({rank}, {offset:?}) = {other} >= {n}");
                }
            }
        }
    }
    assert_eq!(space.offset_rank(n, &zero), None);
}

/// Assert that a unit step along an axis is undone by the opposite step,
/// unless it stays in place at a clamped edge.
pub fn assert_unit_offsets_symmetric(space: &dyn Space) {
    let ndim = space.ndim();
    for rank in 0..space.cell_count() {
        for axis in 0..ndim {
            for step in [-1, 1] {
                let mut offset = vec![0i32; ndim];
                offset[axis] = step;
                let Some(other) = space.offset_rank(rank, &offset) else {
                    continue;
                };
                if other == rank {
                    continue;
                }
                offset[axis] = -step;
                assert_eq!(
                    space.offset_rank(other, &offset),
                    Some(rank),
                    "unit step {step} along axis {axis} from {rank} is not reversible"
                );
            }
        }
    }
}

/// Assert that the face layout has one lower face per cell and axis, plus
/// the upper boundary faces, and that every face touches real cells.
pub fn assert_face_layout_complete(space: &dyn Space) {
    let n = space.cell_count();
    let faces = FaceLayout::new(space);
    assert_eq!(faces.len(), n * space.ndim() + faces.boundary_count());
    if space.edge_behavior() == EdgeBehavior::Wrap {
        assert_eq!(faces.boundary_count(), 0);
    }
    let mut upper = 0;
    for (index, face) in faces.iter().enumerate() {
        assert!(face.cell < n && face.across < n, "face {index} = {face:?}");
        if face.side == FaceSide::Upper {
            upper += 1;
        } else {
            assert!(upper == 0, "lower face {index} after an upper face");
        }
    }
    assert_eq!(upper, faces.boundary_count());
}

/// Run all compliance checks on a space.
pub fn run_full_compliance(space: &dyn Space) {
    assert_canonical_ordering_complete(space);
    assert_offset_rank_consistent(space);
    assert_unit_offsets_symmetric(space);
    assert_face_layout_complete(space);
}
