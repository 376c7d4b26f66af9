//! Core types and traits for the trimix three-phase property model.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the trimix workspace:
//! typed IDs, field descriptors, error types, the field access traits,
//! and the refinement hints issued for adaptive grids.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod field;
pub mod id;
pub mod refine;
pub mod traits;

pub use error::{PropagatorError, StepError};
pub use field::{FieldDef, FieldMutability, FieldSet, FieldSetIter, FieldType};
pub use id::{Coord, FieldId, StepId};
pub use refine::{NoRefinementHints, Prolongation, RefinementHints};
pub use traits::{FieldReader, FieldWriter};
