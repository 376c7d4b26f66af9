//! Error types for space operations.

use std::fmt;
use trimix_core::Coord;

/// Errors arising from space construction, coordinate queries, or metric
/// computation.
#[derive(Debug, Clone, PartialEq)]
pub enum SpaceError {
    /// A coordinate is outside the bounds of the space.
    CoordOutOfBounds {
        /// The offending coordinate.
        coord: Coord,
        /// Human-readable description of the valid range.
        bounds: String,
    },
    /// Attempted to construct a space with zero cells.
    EmptySpace,
    /// A dimension exceeds the representable coordinate range.
    DimensionTooLarge {
        /// Which axis.
        name: &'static str,
        /// The requested extent.
        value: u32,
        /// The largest allowed extent.
        max: u32,
    },
    /// Metric parameters do not fit the space.
    InvalidMetric {
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoordOutOfBounds { coord, bounds } => {
                write!(f, "coordinate {coord:?} out of bounds: {bounds}")
            }
            Self::EmptySpace => write!(f, "space must have at least one cell"),
            Self::DimensionTooLarge { name, value, max } => {
                write!(f, "{name} = {value} exceeds maximum {max}")
            }
            Self::InvalidMetric { reason } => write!(f, "invalid metric: {reason}"),
        }
    }
}

impl std::error::Error for SpaceError {}
