//! Construction-time errors for the three-phase propagators.

use std::error::Error;
use std::fmt;

use trimix_core::FieldId;

/// Errors returned by the builders in this crate.
#[derive(Clone, Debug, PartialEq)]
pub enum BuildError {
    /// A required builder field was never set.
    MissingField {
        /// Name of the builder method that must be called.
        field: &'static str,
    },
    /// A material constant is NaN, infinite or negative.
    InvalidConstant {
        /// Which constant, e.g. `"phase_b.viscosity"`.
        name: String,
        /// The rejected value.
        value: f64,
    },
    /// `TOLelastic` lies outside `[0, 1)`.
    InvalidThreshold {
        /// The rejected value.
        value: f64,
    },
    /// The consistency tolerance lies outside `(0, 0.5)`.
    InvalidEpsilon {
        /// The rejected value.
        value: f64,
    },
    /// The smoothing stencil exists only for 2-D and 3-D lattices.
    UnsupportedDimension {
        /// The requested dimensionality.
        ndim: u32,
    },
    /// A smoothing pair reads and writes the same field.
    AliasedPair {
        /// The field named on both sides.
        field: FieldId,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "missing required builder field '{field}'"),
            Self::InvalidConstant { name, value } => {
                write!(f, "{name} must be finite and non-negative, got {value}")
            }
            Self::InvalidThreshold { value } => {
                write!(f, "tol_elastic must lie in [0, 1), got {value}")
            }
            Self::InvalidEpsilon { value } => {
                write!(f, "consistency epsilon must lie in (0, 0.5), got {value}")
            }
            Self::UnsupportedDimension { ndim } => {
                write!(f, "no smoothing stencil for {ndim}-D grids (need 2 or 3)")
            }
            Self::AliasedPair { field } => {
                write!(f, "smoothing pair reads and writes field {field}")
            }
        }
    }
}

impl Error for BuildError {}
