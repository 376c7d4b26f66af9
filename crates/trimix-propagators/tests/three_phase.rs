//! End-to-end tests of the three-phase pipeline.
//!
//! These run the model through `LockstepWorld`, not individual propagators
//! in isolation, so field routing between the hooks is exercised too.

use trimix_core::{FieldId, Prolongation, PropagatorError, StepError, StepId};
use trimix_engine::{LockstepWorld, WorldConfig};
use trimix_propagators::{
    Harmonic, MaterialConstants, PhaseConstants, ThreePhaseFields, ThreePhaseModel,
};
use trimix_space::{Cube26, EdgeBehavior, Metric, Space, Square8};

const G_A: f64 = 10.0;
const G_B: f64 = 20.0;
const G_C: f64 = 4.0;
const L_A: f64 = 0.5;
const L_B: f64 = 1.5;
const L_C: f64 = 0.25;

fn constants(tol: f64) -> MaterialConstants {
    MaterialConstants::builder()
        .phase_a(PhaseConstants::newtonian(1000.0, 1e-3).with_elasticity(G_A, L_A))
        .phase_b(PhaseConstants::newtonian(800.0, 2e-3).with_elasticity(G_B, L_B))
        .phase_c(PhaseConstants::newtonian(1.25, 2e-5).with_elasticity(G_C, L_C))
        .tol_elastic(tol)
        .build()
        .unwrap()
}

fn build_world(
    model: ThreePhaseModel,
    space: Box<dyn Space>,
    metric: Metric,
    adaptive: bool,
) -> (LockstepWorld, ThreePhaseFields) {
    let fields = model.fields();
    let initial_values = model.metric_values(&metric, space.as_ref()).unwrap();
    let (defs, propagators) = model.into_parts();
    let world = LockstepWorld::new(WorldConfig {
        space,
        fields: defs,
        initial_values,
        propagators,
        adaptive,
    })
    .unwrap();
    (world, fields)
}

fn square_world(filtered: bool, tol: f64) -> (LockstepWorld, ThreePhaseFields) {
    let model = ThreePhaseModel::builder()
        .ndim(2)
        .filtered(filtered)
        .constants(constants(tol))
        .build()
        .unwrap();
    let space = Square8::new(4, 5, EdgeBehavior::Absorb).unwrap();
    build_world(model, Box::new(space), Metric::Cartesian, false)
}

fn set_uniform(world: &mut LockstepWorld, f: &ThreePhaseFields, f1: f64, f2: f64) {
    let n = world.space().cell_count();
    world.write_field(f.f1, &vec![f1; n]).unwrap();
    world.write_field(f.f2, &vec![f2; n]).unwrap();
}

fn all_close(values: &[f64], expected: f64) -> bool {
    values.iter().all(|v| (v - expected).abs() <= 1e-12 * expected.abs().max(1.0))
}

fn read(world: &LockstepWorld, field: FieldId) -> Vec<f64> {
    world.read(field).unwrap().to_vec()
}

#[test]
fn pure_outer_phase_c() {
    let (mut w, f) = square_world(false, 0.1);
    set_uniform(&mut w, &f, 0.0, 0.0);
    w.step_sync().unwrap();
    assert!(all_close(&read(&w, f.density), 1.25));
    assert!(all_close(&read(&w, f.face_viscosity), 2e-5));
    assert!(all_close(&read(&w, f.specific_volume), 1.0 / 1.25));
    assert!(all_close(&read(&w, f.elastic_modulus), G_C));
    assert!(all_close(&read(&w, f.relaxation_time), L_C));
}

#[test]
fn pure_phase_a() {
    let (mut w, f) = square_world(false, 0.1);
    set_uniform(&mut w, &f, 1.0, 0.0);
    w.step_sync().unwrap();
    assert!(all_close(&read(&w, f.density), 1000.0));
    assert!(all_close(&read(&w, f.face_viscosity), 1e-3));
    assert!(all_close(&read(&w, f.elastic_modulus), G_A));
    assert!(all_close(&read(&w, f.relaxation_time), L_A));
}

#[test]
fn gating_is_independent_per_phase() {
    let (mut w, f) = square_world(false, 0.1);
    set_uniform(&mut w, &f, 0.05, 0.0);
    w.step_sync().unwrap();
    // Phase A holds 0.05 and is excluded; phase C holds 0.95 and counts.
    assert!(all_close(&read(&w, f.elastic_modulus), 0.95 * G_C));
    assert!(all_close(&read(&w, f.relaxation_time), 0.95 * L_C));
}

#[test]
fn gating_with_non_elastic_outer_phase_gives_zero() {
    let constants = MaterialConstants::builder()
        .phase_a(PhaseConstants::newtonian(1000.0, 1e-3).with_elasticity(G_A, L_A))
        .phase_c(PhaseConstants::newtonian(1.0, 1e-5))
        .build()
        .unwrap();
    let model = ThreePhaseModel::builder()
        .ndim(2)
        .constants(constants)
        .build()
        .unwrap();
    let space = Square8::new(2, 2, EdgeBehavior::Wrap).unwrap();
    let (mut w, f) = build_world(model, Box::new(space), Metric::Cartesian, false);
    set_uniform(&mut w, &f, 0.05, 0.0);
    w.step_sync().unwrap();
    assert_eq!(read(&w, f.elastic_modulus), vec![0.0; 4]);
    assert_eq!(read(&w, f.relaxation_time), vec![0.0; 4]);
}

#[test]
fn threshold_is_strict() {
    let (mut w, f) = square_world(false, 0.1);
    // Phase A fraction is exactly 0.1: excluded.
    set_uniform(&mut w, &f, 0.1, 0.0);
    w.step_sync().unwrap();
    assert!(all_close(&read(&w, f.elastic_modulus), 0.9 * G_C));

    // Just above the threshold: included.
    let eps = 1e-9;
    set_uniform(&mut w, &f, 0.1 + eps, 0.0);
    w.step_sync().unwrap();
    let expected = (0.1 + eps) * G_A + (0.9 - eps) * G_C;
    assert!(all_close(&read(&w, f.elastic_modulus), expected));
}

#[test]
fn nested_phase_b_contributes() {
    let (mut w, f) = square_world(false, 0.1);
    set_uniform(&mut w, &f, 0.5, 0.5);
    w.step_sync().unwrap();
    // A = 0.25, B = 0.25, C = 0.5.
    let rho = 0.25 * 1000.0 + 0.25 * 800.0 + 0.5 * 1.25;
    assert!(all_close(&read(&w, f.density), rho));
    let g = 0.25 * G_A + 0.25 * G_B + 0.5 * G_C;
    assert!(all_close(&read(&w, f.elastic_modulus), g));
}

#[test]
fn corrector_waits_for_step_two() {
    let (mut w, f) = square_world(false, 0.1);
    set_uniform(&mut w, &f, 0.2, 0.6);
    for step in 0..2 {
        assert_eq!(w.current_step(), StepId(step));
        w.step_sync().unwrap();
        assert!(all_close(&read(&w, f.f1), 0.2));
    }
    w.step_sync().unwrap();
    assert!(all_close(&read(&w, f.f1), 0.6));
    // f2 is never touched.
    assert!(all_close(&read(&w, f.f2), 0.6));
    // The evaluator saw the repaired f1 in the same step.
    let rho = 0.6 * 0.4 * 1000.0 + 0.36 * 800.0 + 0.4 * 1.25;
    assert!(all_close(&read(&w, f.density), rho));
}

#[test]
fn corrector_leaves_saturated_cells_alone() {
    let (mut w, f) = square_world(false, 0.1);
    let n = w.space().cell_count();
    let mut f1 = vec![1.0; n];
    let mut f2 = vec![0.4; n];
    f1[0] = 0.3;
    f2[1] = 0.005;
    f1[1] = 0.3;
    w.write_field(f.f1, &f1).unwrap();
    w.write_field(f.f2, &f2).unwrap();
    for _ in 0..3 {
        w.step_sync().unwrap();
    }
    let out = read(&w, f.f1);
    assert_eq!(out[0], 0.4);
    assert_eq!(out[1], 0.3);
    assert!(out[2..].iter().all(|&v| v == 1.0));
}

#[test]
fn smoothing_preserves_constant_field_2d() {
    for edge in [EdgeBehavior::Absorb, EdgeBehavior::Clamp, EdgeBehavior::Wrap] {
        let model = ThreePhaseModel::builder()
            .ndim(2)
            .filtered(true)
            .constants(constants(0.1))
            .build()
            .unwrap();
        let space = Square8::new(5, 4, edge).unwrap();
        let (mut w, f) = build_world(model, Box::new(space), Metric::Cartesian, false);
        set_uniform(&mut w, &f, 0.3, 0.7);
        w.step_sync().unwrap();
        assert!(all_close(&read(&w, f.sf1), 0.3), "{edge:?}");
        assert!(all_close(&read(&w, f.sf2), 0.7), "{edge:?}");
        // Raw fractions stay as written.
        assert_eq!(read(&w, f.f1), vec![0.3; 20]);
    }
}

#[test]
fn smoothing_preserves_constant_field_3d() {
    let model = ThreePhaseModel::builder()
        .ndim(3)
        .filtered(true)
        .constants(constants(0.1))
        .build()
        .unwrap();
    let space = Cube26::new(3, 4, 3, EdgeBehavior::Absorb).unwrap();
    let (mut w, f) = build_world(model, Box::new(space), Metric::Cartesian, false);
    set_uniform(&mut w, &f, 0.6, 0.25);
    w.step_sync().unwrap();
    assert!(all_close(&read(&w, f.sf1), 0.6));
    assert!(all_close(&read(&w, f.sf2), 0.25));
    // 108 lower faces plus the upper boundary planes of each axis.
    assert_eq!(read(&w, f.specific_volume).len(), 36 * 3 + 12 + 9 + 12);
}

#[test]
fn absorbing_grid_has_upper_boundary_faces() {
    let model = ThreePhaseModel::builder()
        .ndim(2)
        .constants(constants(0.1))
        .build()
        .unwrap();
    let space = Square8::new(1, 2, EdgeBehavior::Absorb).unwrap();
    let (mut w, f) = build_world(model, Box::new(space), Metric::Cartesian, false);
    w.write_field(f.f1, &[0.0, 1.0]).unwrap();
    w.step_sync().unwrap();
    let sv = read(&w, f.specific_volume);
    assert_eq!(sv.len(), 7);
    assert_eq!(read(&w, f.face_viscosity).len(), 7);
    // Upper faces of cell 0 (phase C) and cell 1 (phase A) on axis 0,
    // then the upper face of cell 1 on axis 1.
    assert!((sv[4] - 1.0 / 1.25).abs() < 1e-12);
    assert!((sv[5] - 1.0 / 1000.0).abs() < 1e-15);
    assert!((sv[6] - 1.0 / 1000.0).abs() < 1e-15);
}

#[test]
fn overshooting_fractions_stay_within_constants() {
    let c = constants(0.1);
    let phases = c.phases();
    let rho_min = phases.iter().map(|p| p.density).fold(f64::INFINITY, f64::min);
    let rho_max = phases.iter().map(|p| p.density).fold(0.0, f64::max);
    let g_max = phases.iter().map(|p| p.modulus).fold(0.0, f64::max);

    for filtered in [false, true] {
        let (mut w, f) = square_world(filtered, 0.1);
        set_uniform(&mut w, &f, 1.3, -0.2);
        // Past the corrector's activation step too.
        for _ in 0..3 {
            w.step_sync().unwrap();
            for d in read(&w, f.density) {
                assert!((rho_min..=rho_max).contains(&d), "density {d}");
            }
            for m in read(&w, f.elastic_modulus) {
                assert!((0.0..=g_max).contains(&m), "modulus {m}");
            }
        }
        // Clamping leaves pure phase A.
        assert!(all_close(&read(&w, f.density), 1000.0));
        assert!(all_close(&read(&w, f.elastic_modulus), G_A));
    }
}

#[test]
fn smoothing_feeds_evaluator() {
    let model = ThreePhaseModel::builder()
        .ndim(2)
        .filtered(true)
        .constants(constants(0.1))
        .build()
        .unwrap();
    let space = Square8::new(3, 3, EdgeBehavior::Wrap).unwrap();
    let (mut w, f) = build_world(model, Box::new(space), Metric::Cartesian, false);
    let mut f1 = vec![0.0; 9];
    f1[4] = 1.0;
    w.write_field(f.f1, &f1).unwrap();
    w.step_sync().unwrap();
    let sf1 = read(&w, f.sf1);
    assert_eq!(sf1[4], 0.25);
    assert_eq!(sf1[0], 1.0 / 16.0);
    let rho = read(&w, f.density);
    assert!((rho[4] - (0.25 * 1000.0 + 0.75 * 1.25)).abs() < 1e-9);
}

#[test]
fn adaptive_world_collects_hints() {
    let model = ThreePhaseModel::builder()
        .ndim(2)
        .filtered(true)
        .build()
        .unwrap();
    let space = Square8::new(2, 2, EdgeBehavior::Absorb).unwrap();
    let (mut w, f) = build_world(model, Box::new(space), Metric::Cartesian, true);
    w.post_advection().unwrap();
    assert_eq!(w.annotations().prolongation(f.sf1), Some(Prolongation::Bilinear));
    w.pre_solve().unwrap();
    // The evaluator's fraction-conserving rule overrides the smoother's.
    assert_eq!(
        w.annotations().prolongation(f.sf2),
        Some(Prolongation::FractionRefine)
    );
    assert_eq!(w.take_dirty(), vec![f.sf1, f.sf2]);
    assert!(w.annotations().prolongation(f.f1).is_none());
}

#[test]
fn unfiltered_adaptive_world_annotates_raw_fractions() {
    let model = ThreePhaseModel::builder().ndim(2).build().unwrap();
    let space = Square8::new(2, 2, EdgeBehavior::Absorb).unwrap();
    let (mut w, f) = build_world(model, Box::new(space), Metric::Cartesian, true);
    w.step_sync().unwrap();
    assert_eq!(
        w.annotations().prolongation(f.f1),
        Some(Prolongation::FractionRefine)
    );
    assert!(w.annotations().is_dirty(f.f2));
}

#[test]
fn non_adaptive_world_has_no_hints() {
    let (mut w, _) = square_world(true, 0.1);
    w.step_sync().unwrap();
    assert!(w.annotations().is_empty());
}

#[test]
fn harmonic_density_through_world() {
    let model = ThreePhaseModel::builder()
        .ndim(2)
        .constants(constants(0.1))
        .density_law(Box::new(Harmonic))
        .build()
        .unwrap();
    let space = Square8::new(2, 3, EdgeBehavior::Clamp).unwrap();
    let (mut w, f) = build_world(model, Box::new(space), Metric::Cartesian, false);
    set_uniform(&mut w, &f, 0.5, 0.0);
    w.step_sync().unwrap();
    let expected = 1.0 / (0.5 / 1000.0 + 0.5 / 1.25);
    assert!(all_close(&read(&w, f.density), expected));
    // Viscosity keeps the arithmetic default.
    assert!(all_close(&read(&w, f.face_viscosity), 0.5 * 1e-3 + 0.5 * 2e-5));
}

#[test]
fn axisymmetric_metrics_scale_outputs() {
    let model = ThreePhaseModel::builder()
        .ndim(2)
        .constants(constants(0.1))
        .build()
        .unwrap();
    let space = Square8::new(3, 2, EdgeBehavior::Absorb).unwrap();
    let metric = Metric::Axisymmetric {
        radial_axis: 0,
        origin: 0.0,
        spacing: 0.5,
    };
    let (mut w, f) = build_world(model, Box::new(space), metric, false);
    set_uniform(&mut w, &f, 1.0, 0.0);
    w.step_sync().unwrap();
    let density = read(&w, f.density);
    // Row 2: cell-centre radius 1.25.
    assert!((density[4] - 1.25 * 1000.0).abs() < 1e-9);
    let sv = read(&w, f.specific_volume);
    // Rank 5, radial face at r = 1.0; axial face at r = 1.25.
    assert!((sv[10] - 1.0 / 1000.0).abs() < 1e-15);
    assert!((sv[11] - 1.25 / 1000.0).abs() < 1e-15);
    // Faces on the axis keep a tiny positive metric.
    assert!(sv[0] > 0.0);
}

#[test]
fn zero_density_rolls_back_and_reports() {
    let constants = MaterialConstants::builder()
        .phase_c(PhaseConstants::newtonian(0.0, 0.0))
        .build()
        .unwrap();
    let model = ThreePhaseModel::builder()
        .ndim(2)
        .constants(constants)
        .build()
        .unwrap();
    let space = Square8::new(2, 2, EdgeBehavior::Absorb).unwrap();
    let (mut w, f) = build_world(model, Box::new(space), Metric::Cartesian, false);
    let err = w.step_sync().unwrap_err();
    match err {
        StepError::PropagatorFailed { name, reason } => {
            assert_eq!(name, "property_evaluator");
            assert!(matches!(reason, PropagatorError::NonFinite { field_id, .. } if field_id == f.specific_volume));
        }
        other => panic!("expected PropagatorFailed, got {other:?}"),
    }
    assert_eq!(w.current_step(), StepId(0));
    assert_eq!(read(&w, f.density), vec![0.0; 4]);
    // Fix the fractions and the world recovers.
    set_uniform(&mut w, &f, 1.0, 0.0);
    w.step_sync().unwrap();
    assert_eq!(w.current_step(), StepId(1));
}
