//! trimix: three-phase material property mixing for interfacial flow.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all trimix sub-crates. For most users, adding `trimix` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use trimix::prelude::*;
//!
//! // A 2-D model with interface smoothing and default (unit) constants.
//! let model = ThreePhaseModel::builder().ndim(2).filtered(true).build().unwrap();
//! let fields = model.fields();
//!
//! let space = Square8::new(16, 16, EdgeBehavior::Absorb).unwrap();
//! let initial_values = model.metric_values(&Metric::Cartesian, &space).unwrap();
//! let (defs, propagators) = model.into_parts();
//! let mut world = LockstepWorld::new(WorldConfig {
//!     space: Box::new(space),
//!     fields: defs,
//!     initial_values,
//!     propagators,
//!     adaptive: false,
//! })
//! .unwrap();
//!
//! // The host advects the fractions, then calls both hooks.
//! world.write_field(fields.f1, &[1.0; 256]).unwrap();
//! world.post_advection().unwrap();
//! world.pre_solve().unwrap();
//! assert_eq!(world.read(fields.density), Some(&[1.0; 256][..]));
//! assert_eq!(world.current_step(), StepId(1));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `trimix-core` | IDs, field definitions, errors, core traits |
//! | [`space`] | `trimix-space` | Lattices, edge behavior, grid metrics |
//! | [`propagator`] | `trimix-propagator` | Propagator trait and pipeline validation |
//! | [`propagators`] | `trimix-propagators` | Phase consistency, smoothing, property evaluation |
//! | [`engine`] | `trimix-engine` | Lockstep world and step engine |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`trimix-core`).
///
/// Contains field definitions, error types, refinement hints, and the
/// fundamental traits ([`types::FieldReader`], [`types::FieldWriter`],
/// [`types::RefinementHints`]).
pub use trimix_core as types;

/// Lattices and grid metrics (`trimix-space`).
///
/// Provides the [`space::Space`] trait, the [`space::Square8`] and
/// [`space::Cube26`] backends, and [`space::Metric`].
pub use trimix_space as space;

/// Propagator trait and pipeline validation (`trimix-propagator`).
///
/// The [`propagator::Propagator`] trait is the extension point for
/// additional per-step logic.
pub use trimix_propagator as propagator;

/// Three-phase propagators (`trimix-propagators`).
///
/// Includes [`propagators::PhaseConsistency`],
/// [`propagators::InterfaceSmoothing`], [`propagators::PropertyEvaluator`]
/// and the [`propagators::ThreePhaseModel`] that wires them.
pub use trimix_propagators as propagators;

/// Step engine (`trimix-engine`).
///
/// [`engine::LockstepWorld`] exposes the post-advection and pre-solve hooks.
pub use trimix_engine as engine;

/// Common imports for typical trimix usage.
///
/// ```rust
/// use trimix::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use trimix_core::{
        FieldDef, FieldId, FieldMutability, FieldReader, FieldType, FieldWriter, Prolongation,
        RefinementHints, StepId,
    };

    // Errors
    pub use trimix_core::{PropagatorError, StepError};

    // Space
    pub use trimix_space::{Cube26, EdgeBehavior, Metric, Space, Square8};

    // Propagator
    pub use trimix_propagator::{Phase, Propagator, StepContext, WriteMode};

    // Three-phase model
    pub use trimix_propagators::{
        Arithmetic, Harmonic, MaterialConstants, MixingLaw, PhaseConstants, PhaseFractions,
        ThreePhaseFields, ThreePhaseModel,
    };

    // Engine
    pub use trimix_engine::{
        FieldAccessError, GridAnnotations, LockstepWorld, StepMetrics, StepResult, WorldConfig,
    };
}
