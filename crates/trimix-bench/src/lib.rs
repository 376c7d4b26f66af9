//! Benchmark profiles and utilities for trimix.
//!
//! Provides pre-built worlds for benchmarking and examples:
//!
//! - [`reference_profile`]: 128x128 axisymmetric grid with smoothing
//! - [`volume_profile`]: 32x32x32 Cartesian grid with smoothing
//! - [`bubble_fractions`]: a coated drop used as the initial condition

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use trimix_core::FieldId;
use trimix_engine::{LockstepWorld, WorldConfig};
use trimix_propagators::{
    BuildError, MaterialConstants, PhaseConstants, ThreePhaseFields, ThreePhaseModel,
};
use trimix_space::{Cube26, EdgeBehavior, Metric, Space, Square8};

/// Coated bubble constants: water film (A), viscoelastic coating (B),
/// air outside (C).
pub fn coated_bubble_constants() -> Result<MaterialConstants, BuildError> {
    MaterialConstants::builder()
        .phase_a(PhaseConstants::newtonian(1000.0, 1e-3))
        .phase_b(PhaseConstants::newtonian(1000.0, 5e-2).with_elasticity(10.0, 0.5))
        .phase_c(PhaseConstants::newtonian(1.2, 1.8e-5))
        .tol_elastic(0.1)
        .build()
}

/// Any error raised while assembling a profile.
pub type ProfileError = Box<dyn std::error::Error>;

/// A world plus the layout of its fields.
pub struct Profile {
    /// The world, with fractions loaded.
    pub world: LockstepWorld,
    /// Field layout.
    pub fields: ThreePhaseFields,
}

fn build(
    ndim: u32,
    space: Box<dyn Space>,
    metric: Metric,
    adaptive: bool,
) -> Result<Profile, ProfileError> {
    let model = ThreePhaseModel::builder()
        .ndim(ndim)
        .filtered(true)
        .constants(coated_bubble_constants()?)
        .build()?;
    let fields = model.fields();
    let mut initial_values = model.metric_values(&metric, space.as_ref())?;
    let (f1, f2) = bubble_fractions(space.as_ref(), 0.3, 0.05);
    initial_values.push((fields.f1, f1));
    initial_values.push((fields.f2, f2));
    let (defs, propagators) = model.into_parts();
    let world = LockstepWorld::new(WorldConfig {
        space,
        fields: defs,
        initial_values,
        propagators,
        adaptive,
    })?;
    Ok(Profile { world, fields })
}

/// 128x128 axisymmetric grid (16K cells), radius along rows, adaptive.
pub fn reference_profile() -> Result<Profile, ProfileError> {
    let space = Square8::new(128, 128, EdgeBehavior::Clamp)?;
    let metric = Metric::Axisymmetric {
        radial_axis: 0,
        origin: 0.0,
        spacing: 1.0 / 128.0,
    };
    build(2, Box::new(space), metric, true)
}

/// 32x32x32 Cartesian grid (32K cells).
pub fn volume_profile() -> Result<Profile, ProfileError> {
    let space = Cube26::new(32, 32, 32, EdgeBehavior::Absorb)?;
    build(3, Box::new(space), Metric::Cartesian, false)
}

/// Fractions of a coated drop centred in the unit box.
///
/// `f1` is 1 inside radius `radius + coating`; `f2` (the coating share of
/// `f1`) is 1 in the outer shell of width `coating`. Cells are sampled at
/// their centres, so the fractions are sharp.
pub fn bubble_fractions(space: &dyn Space, radius: f64, coating: f64) -> (Vec<f64>, Vec<f64>) {
    let ordering = space.canonical_ordering();
    let extent: Vec<i32> = (0..space.ndim())
        .map(|axis| ordering.iter().map(|c| c[axis]).max().unwrap_or(0) + 1)
        .collect();
    let mut f1 = Vec::with_capacity(ordering.len());
    let mut f2 = Vec::with_capacity(ordering.len());
    for coord in &ordering {
        let r2: f64 = coord
            .iter()
            .zip(&extent)
            .map(|(&c, &n)| {
                let x = (c as f64 + 0.5) / n as f64 - 0.5;
                x * x
            })
            .sum();
        let r = r2.sqrt();
        let outer = r <= radius + coating;
        f1.push(if outer { 1.0 } else { 0.0 });
        f2.push(if outer && r > radius { 1.0 } else { 0.0 });
    }
    (f1, f2)
}

/// Write new fractions, as an advection step would, then run both hooks.
pub fn advect_and_step(
    profile: &mut Profile,
    f1: &[f64],
    f2: &[f64],
) -> Result<(), ProfileError> {
    profile.world.write_field(profile.fields.f1, f1)?;
    profile.world.write_field(profile.fields.f2, f2)?;
    profile.world.step_sync()?;
    Ok(())
}

/// Sum of a field over all slots.
pub fn field_total(world: &LockstepWorld, field: FieldId) -> f64 {
    world.read(field).map(|v| v.iter().sum()).unwrap_or(0.0)
}
