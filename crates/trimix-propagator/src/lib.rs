//! Propagator trait and step context for trimix.
//!
//! A [`Propagator`] is a stateless operator the step engine runs once per
//! step in one of two [`Phase`]s. Its field dependencies are declared up
//! front and checked by [`validate_pipeline`] before the first step.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod guard;
pub mod pipeline;
pub mod propagator;

pub use context::StepContext;
pub use guard::FullWriteGuard;
pub use pipeline::{validate_pipeline, PipelineError, PipelinePlan, ReadSource, WriteConflict};
pub use propagator::{Phase, Propagator, WriteMode};
