//! One-call assembly of the three-phase pipeline.
//!
//! [`ThreePhaseModel`] lays out the fields, builds the corrector, the
//! optional smoother and the evaluator against that layout, and hands the
//! pieces to the caller in pipeline order.

use crate::consistency::PhaseConsistency;
use crate::error::BuildError;
use crate::fields::ThreePhaseFields;
use crate::materials::MaterialConstants;
use crate::mixing::{Arithmetic, MixingLaw};
use crate::properties::PropertyEvaluator;
use crate::smoothing::InterfaceSmoothing;
use trimix_core::{FieldDef, FieldId};
use trimix_propagator::Propagator;
use trimix_space::{Metric, Space, SpaceError};

/// Field layout plus the ordered propagator pipeline.
pub struct ThreePhaseModel {
    fields: ThreePhaseFields,
    defs: Vec<FieldDef>,
    propagators: Vec<Box<dyn Propagator>>,
}

/// Builder for [`ThreePhaseModel`].
///
/// ```
/// use trimix_propagators::{MaterialConstants, PhaseConstants, ThreePhaseModel};
///
/// let model = ThreePhaseModel::builder()
///     .ndim(2)
///     .filtered(true)
///     .constants(
///         MaterialConstants::builder()
///             .phase_c(PhaseConstants::newtonian(1.2, 1.8e-5))
///             .build()
///             .unwrap(),
///     )
///     .build()
///     .unwrap();
/// assert_eq!(model.field_defs().len(), 11);
/// assert_eq!(model.propagator_names(), ["phase_consistency", "interface_smoothing", "property_evaluator"]);
/// ```
pub struct ThreePhaseModelBuilder {
    ndim: Option<u32>,
    filtered: bool,
    constants: MaterialConstants,
    epsilon: f64,
    first_active_step: u64,
    density_law: Box<dyn MixingLaw>,
    viscosity_law: Box<dyn MixingLaw>,
}

impl ThreePhaseModel {
    /// Create a new builder. Smoothing is off by default.
    pub fn builder() -> ThreePhaseModelBuilder {
        ThreePhaseModelBuilder {
            ndim: None,
            filtered: false,
            constants: MaterialConstants::default(),
            epsilon: PhaseConsistency::DEFAULT_EPSILON,
            first_active_step: PhaseConsistency::DEFAULT_FIRST_ACTIVE_STEP,
            density_law: Box::new(Arithmetic),
            viscosity_law: Box::new(Arithmetic),
        }
    }

    /// The field layout. `FieldId(n)` is `field_defs()[n]`.
    pub fn fields(&self) -> ThreePhaseFields {
        self.fields
    }

    /// Field definitions in ID order.
    pub fn field_defs(&self) -> &[FieldDef] {
        &self.defs
    }

    /// Names of the propagators, in pipeline order.
    pub fn propagator_names(&self) -> Vec<&str> {
        self.propagators.iter().map(|p| p.name()).collect()
    }

    /// Values for the two static metric fields on `space`.
    pub fn metric_values(
        &self,
        metric: &Metric,
        space: &dyn Space,
    ) -> Result<Vec<(FieldId, Vec<f64>)>, SpaceError> {
        Ok(vec![
            (self.fields.cell_metric, metric.cell_metric(space)?),
            (self.fields.face_metric, metric.face_metric(space)?),
        ])
    }

    /// Split into field definitions and the propagator pipeline.
    pub fn into_parts(self) -> (Vec<FieldDef>, Vec<Box<dyn Propagator>>) {
        (self.defs, self.propagators)
    }
}

impl ThreePhaseModelBuilder {
    /// Lattice dimensionality, 2 or 3. Required.
    pub fn ndim(mut self, ndim: u32) -> Self {
        self.ndim = Some(ndim);
        self
    }

    /// Enable the interface smoothing filter.
    pub fn filtered(mut self, filtered: bool) -> Self {
        self.filtered = filtered;
        self
    }

    /// Material constants.
    pub fn constants(mut self, constants: MaterialConstants) -> Self {
        self.constants = constants;
        self
    }

    /// Phase consistency tolerance.
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// First step index on which the phase consistency repair runs.
    pub fn first_active_step(mut self, step: u64) -> Self {
        self.first_active_step = step;
        self
    }

    /// Mixing law for density.
    pub fn density_law(mut self, law: Box<dyn MixingLaw>) -> Self {
        self.density_law = law;
        self
    }

    /// Mixing law for viscosity.
    pub fn viscosity_law(mut self, law: Box<dyn MixingLaw>) -> Self {
        self.viscosity_law = law;
        self
    }

    /// Lay out the fields and build the pipeline.
    pub fn build(self) -> Result<ThreePhaseModel, BuildError> {
        let ndim = self.ndim.ok_or(BuildError::MissingField { field: "ndim" })?;
        if !(2..=3).contains(&ndim) {
            return Err(BuildError::UnsupportedDimension { ndim });
        }
        let fields = ThreePhaseFields::sequential(self.filtered);

        let mut propagators: Vec<Box<dyn Propagator>> = Vec::with_capacity(3);
        propagators.push(Box::new(
            PhaseConsistency::builder()
                .f1(fields.f1)
                .f2(fields.f2)
                .epsilon(self.epsilon)
                .first_active_step(self.first_active_step)
                .build()?,
        ));
        if self.filtered {
            propagators.push(Box::new(
                InterfaceSmoothing::builder()
                    .ndim(ndim)
                    .pair(fields.f1, fields.sf1)
                    .pair(fields.f2, fields.sf2)
                    .build()?,
            ));
        }
        propagators.push(Box::new(
            PropertyEvaluator::builder()
                .fields(fields)
                .constants(self.constants)
                .density_law(self.density_law)
                .viscosity_law(self.viscosity_law)
                .build()?,
        ));

        Ok(ThreePhaseModel {
            fields,
            defs: fields.definitions(ndim),
            propagators,
        })
    }
}
