//! Strongly-typed identifiers and the [`Coord`] type alias.

use smallvec::SmallVec;
use std::fmt;

/// Identifies a field within a simulation world.
///
/// Fields are registered at world creation and assigned sequential IDs.
/// `FieldId(n)` corresponds to the n-th field in the world configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u32);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FieldId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Index of the simulation step supplied by the host scheduler.
///
/// Starts at 0 for the initial property evaluation and advances by one
/// per completed step. The phase consistency repair keys off this value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u64);

impl StepId {
    /// The step that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StepId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// A coordinate in simulation space.
///
/// Uses `SmallVec<[i32; 4]>` to avoid heap allocation for the 2-D and
/// 3-D lattices this workspace works with.
pub type Coord = SmallVec<[i32; 4]>;
