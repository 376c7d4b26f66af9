//! Material property evaluation.
//!
//! Two passes over the smoothed fractions:
//!
//! - **Face pass.** For each face, the fractions are averaged between the
//!   two cells it separates, then `specific_volume = fm / ρ` and
//!   `face_viscosity = fm * μ`. Faces follow [`FaceLayout`], so
//!   non-periodic grids include the upper boundary faces; a face on the
//!   domain boundary takes the value of its own cell.
//! - **Cell pass.** `density = cm * ρ`; each phase whose clamped fraction
//!   is strictly above `TOLelastic` adds `fraction * G` to the elastic
//!   modulus and `fraction * λ` to the relaxation time.
//!
//! `fm` and `cm` are the static face and cell metrics. The mixing laws for
//! `ρ` and `μ` are chosen independently at construction.

use crate::error::BuildError;
use crate::fields::ThreePhaseFields;
use crate::grid_helpers::{check_len, fill_field};
use crate::materials::MaterialConstants;
use crate::mixing::{Arithmetic, MixingLaw, PhaseFractions};
use trimix_core::{FieldId, FieldSet, Prolongation, PropagatorError};
use trimix_propagator::{Phase, Propagator, StepContext, WriteMode};
use trimix_space::FaceLayout;

/// Elastic modulus and relaxation time of one cell.
///
/// Gating is per phase: a phase excluded by the threshold does not affect
/// whether another phase contributes.
pub fn elastic_properties(fractions: PhaseFractions, constants: &MaterialConstants) -> (f64, f64) {
    let tol = constants.tol_elastic();
    let mut modulus = 0.0;
    let mut relaxation = 0.0;
    for (fraction, phase) in fractions.to_array().into_iter().zip(constants.phases()) {
        if fraction > tol {
            modulus += fraction * phase.modulus;
            relaxation += fraction * phase.relaxation_time;
        }
    }
    (modulus, relaxation)
}

/// Pre-solve propagator producing the five derived material fields.
#[derive(Debug)]
pub struct PropertyEvaluator {
    fields: ThreePhaseFields,
    constants: MaterialConstants,
    density_law: Box<dyn MixingLaw>,
    viscosity_law: Box<dyn MixingLaw>,
}

/// Builder for [`PropertyEvaluator`].
pub struct PropertyEvaluatorBuilder {
    fields: Option<ThreePhaseFields>,
    constants: MaterialConstants,
    density_law: Box<dyn MixingLaw>,
    viscosity_law: Box<dyn MixingLaw>,
}

impl PropertyEvaluator {
    /// Create a new builder with default constants and arithmetic mixing.
    pub fn builder() -> PropertyEvaluatorBuilder {
        PropertyEvaluatorBuilder {
            fields: None,
            constants: MaterialConstants::default(),
            density_law: Box::new(Arithmetic),
            viscosity_law: Box::new(Arithmetic),
        }
    }

    /// The material constants in use.
    pub fn constants(&self) -> &MaterialConstants {
        &self.constants
    }

    /// Mixture density for clamped `fractions`, before the metric.
    pub fn mixture_density(&self, fractions: PhaseFractions) -> f64 {
        self.density_law.mix(fractions, self.constants.densities())
    }

    /// Mixture viscosity for clamped `fractions`, before the metric.
    pub fn mixture_viscosity(&self, fractions: PhaseFractions) -> f64 {
        self.viscosity_law.mix(fractions, self.constants.viscosities())
    }
}

impl PropertyEvaluatorBuilder {
    /// Field layout. Required.
    pub fn fields(mut self, fields: ThreePhaseFields) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Material constants, already validated by their builder.
    pub fn constants(mut self, constants: MaterialConstants) -> Self {
        self.constants = constants;
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

    /// Build the propagator.
    pub fn build(self) -> Result<PropertyEvaluator, BuildError> {
        let fields = self.fields.ok_or(BuildError::MissingField { field: "fields" })?;
        Ok(PropertyEvaluator {
            fields,
            constants: self.constants,
            density_law: self.density_law,
            viscosity_law: self.viscosity_law,
        })
    }
}

impl Propagator for PropertyEvaluator {
    fn name(&self) -> &str {
        "property_evaluator"
    }

    fn phase(&self) -> Phase {
        Phase::PreSolve
    }

    fn reads(&self) -> FieldSet {
        let f = &self.fields;
        [f.sf1, f.sf2, f.cell_metric, f.face_metric]
            .into_iter()
            .collect()
    }

    fn writes(&self) -> Vec<(FieldId, WriteMode)> {
        let f = &self.fields;
        [
            f.specific_volume,
            f.face_viscosity,
            f.density,
            f.elastic_modulus,
            f.relaxation_time,
        ]
        .into_iter()
        .map(|id| (id, WriteMode::Full))
        .collect()
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let f = self.fields;
        let space = ctx.space();
        let n = space.cell_count();
        let faces = FaceLayout::new(space);
        let nf = faces.len();

        let sf1 = ctx.read_field(f.sf1)?;
        let sf2 = ctx.read_field(f.sf2)?;
        let cm = ctx.read_field(f.cell_metric)?;
        let fm = ctx.read_field(f.face_metric)?;
        check_len(f.sf1, sf1, n)?;
        check_len(f.sf2, sf2, n)?;
        check_len(f.cell_metric, cm, n)?;
        check_len(f.face_metric, fm, nf)?;

        // Face pass.
        let face_fractions: Vec<PhaseFractions> = faces
            .iter()
            .map(|face| {
                let ff1 = 0.5 * (sf1[face.cell] + sf1[face.across]);
                let ff2 = 0.5 * (sf2[face.cell] + sf2[face.across]);
                PhaseFractions::clamped(ff1, ff2)
            })
            .collect();
        fill_field(ctx, self.name(), f.specific_volume, nf, |face| {
            fm[face] / self.mixture_density(face_fractions[face])
        })?;
        fill_field(ctx, self.name(), f.face_viscosity, nf, |face| {
            fm[face] * self.mixture_viscosity(face_fractions[face])
        })?;

        // Cell pass.
        let cell_fractions: Vec<PhaseFractions> = sf1
            .iter()
            .zip(sf2)
            .map(|(&a, &b)| PhaseFractions::clamped(a, b))
            .collect();
        fill_field(ctx, self.name(), f.density, n, |rank| {
            cm[rank] * self.mixture_density(cell_fractions[rank])
        })?;
        fill_field(ctx, self.name(), f.elastic_modulus, n, |rank| {
            elastic_properties(cell_fractions[rank], &self.constants).0
        })?;
        fill_field(ctx, self.name(), f.relaxation_time, n, |rank| {
            elastic_properties(cell_fractions[rank], &self.constants).1
        })?;

        let hints = ctx.hints();
        for field in f.smeared_interfaces() {
            hints.set_prolongation(field, Prolongation::FractionRefine);
            hints.mark_dirty(field);
        }
        tracing::debug!(
            step = %ctx.step_id(),
            cells = n,
            faces = nf,
            density_law = self.density_law.name(),
            viscosity_law = self.viscosity_law.name(),
            "material properties evaluated"
        );
        Ok(())
    }
}
