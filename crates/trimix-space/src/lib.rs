//! Grid accessors for the trimix workspace.
//!
//! This crate defines the [`Space`] trait, the abstract grid accessor the
//! smoothing filter and the property evaluator read neighbours through,
//! along with the two Cartesian backends and the grid metrics they need.
//!
//! # Backends
//!
//! - [`Square8`]: 2-D lattice, 8-connected
//! - [`Cube26`]: 3-D lattice, 26-connected
//!
//! Both take an [`EdgeBehavior`] (absorb, clamp, wrap) that decides what a
//! stencil sees past the domain edge.
//!
//! # Faces
//!
//! [`FaceLayout`] numbers the faces a face field stores, including the
//! upper boundary faces of non-periodic grids.
//!
//! # Metrics
//!
//! [`Metric`] produces the static cell and face metric fields for
//! Cartesian and axisymmetric grids.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cube26;
pub mod edge;
pub mod error;
pub mod faces;
pub(crate) mod lattice;
pub mod metric;
pub mod space;
pub mod square8;

#[cfg(test)]
pub(crate) mod compliance;

pub use cube26::Cube26;
pub use edge::EdgeBehavior;
pub use error::SpaceError;
pub use faces::{Face, FaceLayout, FaceSide};
pub use metric::{Metric, FACE_METRIC_FLOOR};
pub use space::Space;
pub use square8::Square8;
