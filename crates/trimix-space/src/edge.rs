//! Spatial edge (boundary) behavior for lattice backends.

/// How a lattice space handles lookups past its edges.
///
/// This decides what [`Space::offset_rank`](crate::Space::offset_rank)
/// returns for an out-of-range stencil point, and whether the grid has
/// upper boundary faces (see [`FaceLayout`](crate::FaceLayout)).
///
/// # Examples
///
/// ```
/// use trimix_space::{Square8, EdgeBehavior, Space};
///
/// let moore = [[-1, -1], [-1, 0], [-1, 1], [0, -1], [0, 1], [1, -1], [1, 0], [1, 1]];
/// let seen = |space: &Square8, rank: usize| {
///     moore.iter().filter(|off| space.offset_rank(rank, &off[..]).is_some()).count()
/// };
///
/// // Absorb: the corner sees 3 stencil points, the interior sees 8.
/// let absorb = Square8::new(4, 4, EdgeBehavior::Absorb).unwrap();
/// assert_eq!(seen(&absorb, 0), 3);
/// assert_eq!(seen(&absorb, 5), 8);
///
/// // Wrap: every cell sees all 8 (torus).
/// let wrap = Square8::new(4, 4, EdgeBehavior::Wrap).unwrap();
/// assert_eq!(seen(&wrap, 0), 8);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeBehavior {
    /// Out-of-bounds lookups map to the nearest boundary cell
    /// (zero-gradient ghost).
    Clamp,
    /// Out-of-bounds lookups wrap to the opposite side (periodic).
    Wrap,
    /// Out-of-bounds lookups find nothing.
    Absorb,
}
