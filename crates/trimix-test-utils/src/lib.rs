//! Test utilities and mock types for trimix development.
//!
//! Provides mock implementations of the core traits ([`FieldReader`],
//! [`FieldWriter`], [`RefinementHints`]) and a handful of fixture
//! propagators for exercising the step engine.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::collections::HashMap;

use trimix_core::{FieldId, FieldReader, FieldWriter, Prolongation, RefinementHints};

pub mod fixtures;

pub use fixtures::{ConstPropagator, FailingPropagator, IdentityPropagator};

/// Mock implementation of [`FieldReader`].
///
/// Pre-populate fields with [`set_field`](MockFieldReader::set_field)
/// before passing to code under test.
#[derive(Default)]
pub struct MockFieldReader {
    fields: HashMap<FieldId, Vec<f64>>,
}

impl MockFieldReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a field with data for testing.
    pub fn set_field(&mut self, field: FieldId, data: Vec<f64>) {
        self.fields.insert(field, data);
    }
}

impl FieldReader for MockFieldReader {
    fn read(&self, field: FieldId) -> Option<&[f64]> {
        self.fields.get(&field).map(|v| v.as_slice())
    }
}

/// Mock implementation of [`FieldWriter`].
///
/// Allocate buffers with [`add_field`](MockFieldWriter::add_field) (zeroed,
/// like a `Full` write) or [`seed_field`](MockFieldWriter::seed_field)
/// (pre-filled, like an `Incremental` write), then inspect results with
/// [`get_field`](MockFieldWriter::get_field).
#[derive(Default)]
pub struct MockFieldWriter {
    fields: HashMap<FieldId, Vec<f64>>,
}

impl MockFieldWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate a zeroed field buffer.
    pub fn add_field(&mut self, field: FieldId, size: usize) {
        self.fields.insert(field, vec![0.0; size]);
    }

    /// Pre-allocate a field buffer holding `data`.
    pub fn seed_field(&mut self, field: FieldId, data: Vec<f64>) {
        self.fields.insert(field, data);
    }

    /// Read back the current field data for test assertions.
    pub fn get_field(&self, field: FieldId) -> Option<&[f64]> {
        self.fields.get(&field).map(|v| v.as_slice())
    }
}

impl FieldWriter for MockFieldWriter {
    fn write(&mut self, field: FieldId) -> Option<&mut [f64]> {
        self.fields.get_mut(&field).map(|v| v.as_mut_slice())
    }
}

/// Recording [`RefinementHints`] sink.
#[derive(Default)]
pub struct MockHints {
    prolongations: HashMap<FieldId, Prolongation>,
    dirty: Vec<FieldId>,
}

impl MockHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last prolongation recorded for `field`.
    pub fn prolongation(&self, field: FieldId) -> Option<Prolongation> {
        self.prolongations.get(&field).copied()
    }

    /// Every `mark_dirty` call, in order.
    pub fn dirty(&self) -> &[FieldId] {
        &self.dirty
    }

    /// Whether any hint at all was recorded.
    pub fn is_empty(&self) -> bool {
        self.prolongations.is_empty() && self.dirty.is_empty()
    }
}

impl RefinementHints for MockHints {
    fn set_prolongation(&mut self, field: FieldId, prolongation: Prolongation) {
        self.prolongations.insert(field, prolongation);
    }

    fn mark_dirty(&mut self, field: FieldId) {
        self.dirty.push(field);
    }
}
