//! Three-phase material property propagators.
//!
//! Two nested volume fractions `f1` and `f2` describe three immiscible
//! phases (see [`PhaseFractions`]). Each step runs:
//!
//! 1. [`PhaseConsistency`] (post-advection): pull `f1` up to `f2` where
//!    the nested phase has leaked outside its host.
//! 2. [`InterfaceSmoothing`] (post-advection, optional): `f1, f2 -> sf1, sf2`.
//! 3. [`PropertyEvaluator`] (pre-solve): face specific volume and
//!    viscosity, cell density, elastic modulus and relaxation time.
//!
//! [`ThreePhaseModel`] wires all three against one field layout.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod consistency;
pub mod error;
pub mod fields;
pub(crate) mod grid_helpers;
pub mod materials;
pub mod mixing;
pub mod model;
pub mod properties;
pub mod smoothing;

pub use consistency::{PhaseConsistency, PhaseConsistencyBuilder};
pub use error::BuildError;
pub use fields::ThreePhaseFields;
pub use materials::{MaterialConstants, MaterialConstantsBuilder, PhaseConstants};
pub use mixing::{Arithmetic, Harmonic, MixingLaw, PhaseFractions};
pub use model::{ThreePhaseModel, ThreePhaseModelBuilder};
pub use properties::{elastic_properties, PropertyEvaluator, PropertyEvaluatorBuilder};
pub use smoothing::{InterfaceSmoothing, InterfaceSmoothingBuilder};
