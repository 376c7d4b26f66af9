//! Pipeline validation and read resolution planning.
//!
//! [`validate_pipeline`] runs once at world construction to check the
//! propagator list for structural errors and build the [`PipelinePlan`],
//! a precomputed routing table the step engine consults every phase.

use indexmap::IndexMap;
use std::error::Error;
use std::fmt;
use std::ops::Range;
use trimix_core::{FieldId, FieldSet};

use crate::propagator::{Phase, Propagator, WriteMode};

/// Where a propagator reads a field from during a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSource {
    /// The committed field store (phase-start values).
    Store,
    /// The staged output of an earlier propagator in the same phase.
    Staged {
        /// Index of the writing propagator in the pipeline.
        writer_index: usize,
    },
}

/// Routing and write-mode table built by [`validate_pipeline`].
///
/// Routes are resolved per phase: a field written in the post-advection
/// phase has been committed to the store by the time the pre-solve phase
/// reads it, so it routes to [`ReadSource::Store`].
#[derive(Debug)]
#[must_use]
pub struct PipelinePlan {
    routes: Vec<IndexMap<FieldId, ReadSource>>,
    write_modes: Vec<IndexMap<FieldId, WriteMode>>,
    phases: Vec<Phase>,
}

impl PipelinePlan {
    /// Number of propagators in the plan.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the plan covers zero propagators.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Read source for a field in a given propagator's overlay view.
    pub fn source(&self, propagator_index: usize, field: FieldId) -> Option<ReadSource> {
        self.routes.get(propagator_index)?.get(&field).copied()
    }

    /// All `(field, source)` pairs for a propagator.
    pub fn routes_for(&self, propagator_index: usize) -> Option<&IndexMap<FieldId, ReadSource>> {
        self.routes.get(propagator_index)
    }

    /// Write mode for a field in a given propagator.
    pub fn write_mode(&self, propagator_index: usize, field: FieldId) -> Option<WriteMode> {
        self.write_modes.get(propagator_index)?.get(&field).copied()
    }

    /// All `(field, mode)` pairs for a propagator's writes.
    pub fn write_modes_for(&self, propagator_index: usize) -> Option<&IndexMap<FieldId, WriteMode>> {
        self.write_modes.get(propagator_index)
    }

    /// Pipeline indices of the propagators in `phase`, in execution order.
    ///
    /// Validation guarantees phases are contiguous, so this is a range.
    pub fn phase_range(&self, phase: Phase) -> Range<usize> {
        let start = self.phases.partition_point(|&p| p < phase);
        let end = self.phases.partition_point(|&p| p <= phase);
        start..end
    }
}

/// A detected write-write conflict between two propagators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteConflict {
    /// The contested field.
    pub field_id: FieldId,
    /// Name of the first writer (earlier in pipeline order).
    pub first_writer: String,
    /// Name of the second writer (later in pipeline order).
    pub second_writer: String,
}

/// Errors from pipeline validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// No propagators registered.
    EmptyPipeline,

    /// Two or more propagators write the same field.
    WriteConflict(Vec<WriteConflict>),

    /// A propagator references a field not defined in the world.
    UndefinedField {
        /// Which propagator.
        propagator: String,
        /// The missing field.
        field_id: FieldId,
    },

    /// A propagator declares a write to a static field.
    WriteToStatic {
        /// Which propagator.
        propagator: String,
        /// The static field.
        field_id: FieldId,
    },

    /// A post-advection propagator is listed after a pre-solve one.
    PhaseOrder {
        /// The out-of-order propagator.
        propagator: String,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPipeline => write!(f, "pipeline has no propagators"),
            Self::WriteConflict(conflicts) => {
                write!(f, "write-write conflicts: ")?;
                for (i, c) in conflicts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(
                        f,
                        "field {} written by '{}' and '{}'",
                        c.field_id, c.first_writer, c.second_writer,
                    )?;
                }
                Ok(())
            }
            Self::UndefinedField {
                propagator,
                field_id,
            } => write!(
                f,
                "propagator '{propagator}' references undefined field {field_id}"
            ),
            Self::WriteToStatic {
                propagator,
                field_id,
            } => write!(
                f,
                "propagator '{propagator}' writes static field {field_id}"
            ),
            Self::PhaseOrder { propagator } => write!(
                f,
                "post-advection propagator '{propagator}' follows a pre-solve propagator"
            ),
        }
    }
}

impl Error for PipelineError {}

/// Validate a propagator pipeline and build the [`PipelinePlan`].
///
/// Checks, in order:
///
/// 1. Pipeline is non-empty.
/// 2. Phases are non-decreasing in pipeline order.
/// 3. No write-write conflicts.
/// 4. Every referenced field exists in `defined_fields`.
/// 5. No write targets a field in `static_fields`.
pub fn validate_pipeline(
    propagators: &[Box<dyn Propagator>],
    defined_fields: &FieldSet,
    static_fields: &FieldSet,
) -> Result<PipelinePlan, PipelineError> {
    if propagators.is_empty() {
        return Err(PipelineError::EmptyPipeline);
    }

    let phases: Vec<Phase> = propagators.iter().map(|p| p.phase()).collect();
    if let Some(i) = (1..phases.len()).find(|&i| phases[i] < phases[i - 1]) {
        return Err(PipelineError::PhaseOrder {
            propagator: propagators[i].name().to_string(),
        });
    }

    let mut first_writer: IndexMap<FieldId, usize> = IndexMap::new();
    let mut conflicts = Vec::new();
    for (i, prop) in propagators.iter().enumerate() {
        for (field_id, _) in prop.writes() {
            if let Some(&j) = first_writer.get(&field_id) {
                conflicts.push(WriteConflict {
                    field_id,
                    first_writer: propagators[j].name().to_string(),
                    second_writer: prop.name().to_string(),
                });
            } else {
                first_writer.insert(field_id, i);
            }
        }
    }
    if !conflicts.is_empty() {
        return Err(PipelineError::WriteConflict(conflicts));
    }

    for prop in propagators {
        let written: FieldSet = prop.writes().into_iter().map(|(f, _)| f).collect();
        let referenced = prop.reads().union(&written);
        if let Some(field_id) = referenced.difference(defined_fields).iter().next() {
            return Err(PipelineError::UndefinedField {
                propagator: prop.name().to_string(),
                field_id,
            });
        }
        if let Some(field_id) = written.intersection(static_fields).iter().next() {
            return Err(PipelineError::WriteToStatic {
                propagator: prop.name().to_string(),
                field_id,
            });
        }
    }

    let mut routes = Vec::with_capacity(propagators.len());
    let mut write_modes = Vec::with_capacity(propagators.len());
    let mut staged_writer: IndexMap<FieldId, usize> = IndexMap::new();
    for (i, prop) in propagators.iter().enumerate() {
        if i > 0 && phases[i] != phases[i - 1] {
            staged_writer.clear();
        }
        let prop_routes: IndexMap<FieldId, ReadSource> = prop
            .reads()
            .iter()
            .map(|field| {
                let source = match staged_writer.get(&field) {
                    Some(&writer_index) => ReadSource::Staged { writer_index },
                    None => ReadSource::Store,
                };
                (field, source)
            })
            .collect();
        routes.push(prop_routes);

        let modes: IndexMap<FieldId, WriteMode> = prop.writes().into_iter().collect();
        for &field in modes.keys() {
            staged_writer.insert(field, i);
        }
        write_modes.push(modes);
    }

    Ok(PipelinePlan {
        routes,
        write_modes,
        phases,
    })
}
