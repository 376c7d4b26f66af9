//! Step engine hosting the trimix propagator pipeline.
//!
//! The host advances its own solver and calls into a [`LockstepWorld`] at
//! two scheduling points per step: after advecting the volume fractions
//! (post-advection) and before the momentum solve (pre-solve). The engine
//! runs the propagators registered for each hook, commits their outputs
//! atomically, and collects refinement hints for adaptive hosts.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod annotations;
pub mod config;
pub mod lockstep;
pub mod metrics;
mod overlay;
pub mod step;
mod store;

pub use annotations::GridAnnotations;
pub use config::{ConfigError, WorldConfig};
pub use lockstep::{FieldAccessError, LockstepWorld, StepResult};
pub use metrics::StepMetrics;
pub use step::{StepEngine, MAX_CONSECUTIVE_ROLLBACKS};
