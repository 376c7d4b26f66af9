//! World configuration, validation, and error types.
//!
//! [`WorldConfig`] is the builder-input for constructing a
//! [`LockstepWorld`](crate::LockstepWorld). [`validate()`](WorldConfig::validate)
//! checks structural invariants at startup and returns the pipeline plan
//! the step engine runs from.

use std::error::Error;
use std::fmt;

use trimix_core::{FieldDef, FieldId, FieldMutability, FieldSet, FieldType};
use trimix_propagator::{validate_pipeline, PipelineError, PipelinePlan, Propagator};
use trimix_space::{FaceLayout, Space};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`WorldConfig::validate()`].
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Propagator pipeline validation failed.
    Pipeline(PipelineError),
    /// Space has zero cells.
    EmptySpace,
    /// No fields registered.
    NoFields,
    /// Field count exceeds `u32::MAX`.
    FieldCountOverflow {
        /// The number of fields configured.
        value: usize,
    },
    /// A field definition failed validation.
    InvalidField {
        /// Description of the validation failure.
        reason: String,
    },
    /// A face field's component count differs from the space dimensionality.
    FaceDimsMismatch {
        /// The offending field.
        field: FieldId,
        /// Components declared by the field.
        dims: u32,
        /// Dimensionality of the space.
        ndim: usize,
    },
    /// An initial value targets a field that is not defined.
    UnknownInitialField {
        /// The undefined field.
        field: FieldId,
    },
    /// The same field has more than one initial value.
    DuplicateInitialValue {
        /// The repeated field.
        field: FieldId,
    },
    /// An initial value has the wrong number of slots.
    InitialValueLength {
        /// The field being initialised.
        field: FieldId,
        /// Slots the field occupies on this space.
        expected: usize,
        /// Slots supplied.
        got: usize,
    },
    /// An initial value contains NaN or infinity.
    NonFiniteInitialValue {
        /// The field being initialised.
        field: FieldId,
        /// Slot of the first non-finite value.
        index: usize,
    },
    /// A static field has no initial value. Static fields are never written
    /// after construction, so they must be supplied up front.
    MissingStaticValue {
        /// The static field.
        field: FieldId,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pipeline(e) => write!(f, "pipeline: {e}"),
            Self::EmptySpace => write!(f, "space has zero cells"),
            Self::NoFields => write!(f, "no fields registered"),
            Self::FieldCountOverflow { value } => {
                write!(f, "field count {value} exceeds u32::MAX")
            }
            Self::InvalidField { reason } => write!(f, "invalid field: {reason}"),
            Self::FaceDimsMismatch { field, dims, ndim } => write!(
                f,
                "face field {field} has {dims} components but the space is {ndim}-D"
            ),
            Self::UnknownInitialField { field } => {
                write!(f, "initial value for undefined field {field}")
            }
            Self::DuplicateInitialValue { field } => {
                write!(f, "field {field} has more than one initial value")
            }
            Self::InitialValueLength {
                field,
                expected,
                got,
            } => write!(
                f,
                "initial value for field {field} has {got} slots, expected {expected}"
            ),
            Self::NonFiniteInitialValue { field, index } => {
                write!(f, "initial value for field {field} is non-finite at slot {index}")
            }
            Self::MissingStaticValue { field } => {
                write!(f, "static field {field} has no initial value")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PipelineError> for ConfigError {
    fn from(e: PipelineError) -> Self {
        Self::Pipeline(e)
    }
}

// ── WorldConfig ────────────────────────────────────────────────────

/// Complete configuration for constructing a world.
pub struct WorldConfig {
    /// Lattice the fields live on.
    pub space: Box<dyn Space>,
    /// Field definitions. `FieldId(n)` corresponds to `fields[n]`.
    pub fields: Vec<FieldDef>,
    /// Starting values. Fields without one start at zero; static fields
    /// must have one.
    pub initial_values: Vec<(FieldId, Vec<f64>)>,
    /// Propagators in pipeline order. Post-advection propagators must
    /// precede pre-solve ones.
    pub propagators: Vec<Box<dyn Propagator>>,
    /// Collect refinement hints for an adaptive host grid.
    pub adaptive: bool,
}

impl WorldConfig {
    /// Validate all structural invariants and build the pipeline plan.
    pub fn validate(&self) -> Result<PipelinePlan, ConfigError> {
        // 1. Space must have at least one cell.
        let cell_count = self.space.cell_count();
        if cell_count == 0 {
            return Err(ConfigError::EmptySpace);
        }
        // 2. Must have at least one field, and FieldId is u32.
        if self.fields.is_empty() {
            return Err(ConfigError::NoFields);
        }
        if u32::try_from(self.fields.len()).is_err() {
            return Err(ConfigError::FieldCountOverflow {
                value: self.fields.len(),
            });
        }
        // 3. Each field must pass structural validation and match the space.
        for (id, def) in self.field_ids() {
            def.validate()
                .map_err(|reason| ConfigError::InvalidField { reason })?;
            if let FieldType::Face { dims } = def.field_type {
                if dims as usize != self.space.ndim() {
                    return Err(ConfigError::FaceDimsMismatch {
                        field: id,
                        dims,
                        ndim: self.space.ndim(),
                    });
                }
            }
        }
        // 4. Initial values.
        let face_count = FaceLayout::new(self.space.as_ref()).len();
        let mut seen = FieldSet::empty();
        for (field, values) in &self.initial_values {
            let def = self
                .fields
                .get(field.0 as usize)
                .ok_or(ConfigError::UnknownInitialField { field: *field })?;
            if seen.contains(*field) {
                return Err(ConfigError::DuplicateInitialValue { field: *field });
            }
            seen.insert(*field);
            let expected = def.len_for(cell_count, face_count);
            if values.len() != expected {
                return Err(ConfigError::InitialValueLength {
                    field: *field,
                    expected,
                    got: values.len(),
                });
            }
            if let Some(index) = values.iter().position(|v| !v.is_finite()) {
                return Err(ConfigError::NonFiniteInitialValue {
                    field: *field,
                    index,
                });
            }
        }
        let statics = self.static_field_set();
        if let Some(field) = statics.difference(&seen).iter().next() {
            return Err(ConfigError::MissingStaticValue { field });
        }
        // 5. Pipeline.
        Ok(validate_pipeline(
            &self.propagators,
            &self.defined_field_set(),
            &statics,
        )?)
    }

    fn field_ids(&self) -> impl Iterator<Item = (FieldId, &FieldDef)> {
        (0u32..).map(FieldId).zip(&self.fields)
    }

    /// Every configured field ID.
    pub(crate) fn defined_field_set(&self) -> FieldSet {
        self.field_ids().map(|(id, _)| id).collect()
    }

    /// The IDs of `Static` fields.
    pub(crate) fn static_field_set(&self) -> FieldSet {
        self.field_ids()
            .filter(|(_, d)| d.mutability == FieldMutability::Static)
            .map(|(id, _)| id)
            .collect()
    }
}

impl fmt::Debug for WorldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldConfig")
            .field("space_ndim", &self.space.ndim())
            .field("space_cell_count", &self.space.cell_count())
            .field("fields", &self.fields.len())
            .field("initial_values", &self.initial_values.len())
            .field("propagators", &self.propagators.len())
            .field("adaptive", &self.adaptive)
            .finish()
    }
}
