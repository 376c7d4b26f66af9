//! Error types shared across the trimix workspace.
//!
//! Propagators report [`PropagatorError`]; the step engine wraps them in
//! [`StepError`] together with the failing propagator's name.

use std::error::Error;
use std::fmt;

use crate::id::FieldId;

/// Errors returned by a step hook (`post_advection` / `pre_solve`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepError {
    /// A propagator returned an error. The phase it ran in was rolled back.
    PropagatorFailed {
        /// Name of the failing propagator.
        name: String,
        /// The underlying propagator error.
        reason: PropagatorError,
    },
    /// Stepping is disabled after consecutive rollbacks. Call `reset()`
    /// to re-enable it.
    StepDisabled,
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PropagatorFailed { name, reason } => {
                write!(f, "propagator '{name}' failed: {reason}")
            }
            Self::StepDisabled => write!(f, "stepping disabled after consecutive rollbacks"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PropagatorFailed { reason, .. } => Some(reason),
            Self::StepDisabled => None,
        }
    }
}

/// Errors from a single propagator's `step()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropagatorError {
    /// The step function could not run, usually because a declared field
    /// was missing from the context.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A computed value was NaN or infinite.
    ///
    /// The property evaluator raises this when a mixing law produces a zero
    /// density where a specific volume is required.
    NonFinite {
        /// The field that received the non-finite value.
        field_id: FieldId,
        /// Flat index of the first offending slot, if known.
        cell_index: Option<usize>,
    },
}

impl PropagatorError {
    /// Shorthand for [`PropagatorError::ExecutionFailed`].
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PropagatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
            Self::NonFinite {
                field_id,
                cell_index,
            } => {
                write!(f, "non-finite value in field {field_id}")?;
                if let Some(idx) = cell_index {
                    write!(f, " at slot {idx}")?;
                }
                Ok(())
            }
        }
    }
}

impl Error for PropagatorError {}
