//! Step engine: phase-by-phase execution of the propagator pipeline.
//!
//! [`StepEngine`] owns the field store, the propagators and the pipeline
//! plan. Each call to [`run_phase`](StepEngine::run_phase) runs every
//! propagator registered for that hook, in pipeline order, and commits
//! their outputs atomically. A failing propagator abandons the staged
//! buffers and pending hints of the whole phase.

use std::time::Instant;

use trimix_core::{
    FieldDef, FieldId, NoRefinementHints, PropagatorError, RefinementHints, StepError, StepId,
};
use trimix_propagator::{Phase, PipelinePlan, Propagator, StepContext};
use trimix_space::{FaceLayout, Space};

use crate::annotations::{GridAnnotations, PendingHints};
use crate::config::{ConfigError, WorldConfig};
use crate::metrics::StepMetrics;
use crate::overlay::OverlayReader;
use crate::store::{FieldStore, StagingBuffers};

/// Consecutive failed phases after which stepping is disabled.
pub const MAX_CONSECUTIVE_ROLLBACKS: u32 = 3;

/// Single-threaded, phase-ordered step engine.
pub struct StepEngine {
    space: Box<dyn Space>,
    fields: Vec<FieldDef>,
    propagators: Vec<Box<dyn Propagator>>,
    plan: PipelinePlan,
    store: FieldStore,
    initial: FieldStore,
    adaptive: bool,
    annotations: GridAnnotations,
    current_step: StepId,
    consecutive_rollback_count: u32,
    rollback_events: u64,
    step_disabled: bool,
    in_progress: StepMetrics,
    last_metrics: StepMetrics,
}

impl StepEngine {
    /// Validate `config` and build the engine at step 0.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        let plan = config.validate()?;
        let cell_count = config.space.cell_count();
        let face_count = FaceLayout::new(config.space.as_ref()).len();
        let mut store = FieldStore::zeroed(&config.fields, cell_count, face_count);
        for (field, values) in &config.initial_values {
            store.set(*field, values);
        }
        tracing::info!(
            cells = cell_count,
            faces = face_count,
            ndim = config.space.ndim(),
            fields = config.fields.len(),
            propagators = config.propagators.len(),
            adaptive = config.adaptive,
            "step engine ready"
        );
        Ok(Self {
            space: config.space,
            fields: config.fields,
            propagators: config.propagators,
            plan,
            initial: store.clone(),
            store,
            adaptive: config.adaptive,
            annotations: GridAnnotations::default(),
            current_step: StepId(0),
            consecutive_rollback_count: 0,
            rollback_events: 0,
            step_disabled: false,
            in_progress: StepMetrics::default(),
            last_metrics: StepMetrics::default(),
        })
    }

    /// Run every propagator of `phase` and commit their outputs.
    ///
    /// A phase with no propagators succeeds trivially. Completing
    /// [`Phase::PreSolve`] closes the step: the step index advances and
    /// [`last_metrics`](Self::last_metrics) is updated.
    pub fn run_phase(&mut self, phase: Phase) -> Result<StepMetrics, StepError> {
        if self.step_disabled {
            return Err(StepError::StepDisabled);
        }
        let phase_start = Instant::now();
        let range = self.plan.phase_range(phase);
        let step = self.current_step;

        let mut staged: Vec<StagingBuffers> = range
            .clone()
            .map(|i| StagingBuffers::for_propagator(&self.plan, i, &self.store))
            .collect();
        let mut pending = PendingHints::default();
        let mut discard = NoRefinementHints;
        let mut propagator_us = Vec::with_capacity(range.len());

        for (k, i) in range.clone().enumerate() {
            let prop_start = Instant::now();
            let (done, rest) = staged.split_at_mut(k);
            let (Some(prop), Some(routes), Some(writer)) = (
                self.propagators.get(i),
                self.plan.routes_for(i),
                rest.first_mut(),
            ) else {
                let name = self
                    .propagators
                    .get(i)
                    .map_or_else(|| format!("#{i}"), |p| p.name().to_string());
                return Err(self.handle_rollback(
                    phase,
                    name,
                    PropagatorError::failed(format!("slot {i} missing from the pipeline plan")),
                ));
            };
            let overlay = OverlayReader::new(routes, &self.store, done, range.start);
            let hints: &mut dyn RefinementHints = if self.adaptive {
                &mut pending
            } else {
                &mut discard
            };
            let mut ctx = StepContext::new(&overlay, writer, self.space.as_ref(), hints, step);
            if let Err(reason) = prop.step(&mut ctx) {
                let name = prop.name().to_string();
                return Err(self.handle_rollback(phase, name, reason));
            }
            let us = prop_start.elapsed().as_micros() as u64;
            tracing::trace!(%step, propagator = prop.name(), us, "propagator done");
            propagator_us.push((prop.name().to_string(), us));
        }

        let commit_start = Instant::now();
        self.store.commit(&mut staged);
        if self.adaptive {
            self.annotations.merge(pending);
        }
        let commit_us = commit_start.elapsed().as_micros() as u64;
        self.consecutive_rollback_count = 0;

        let metrics = StepMetrics {
            total_us: phase_start.elapsed().as_micros() as u64,
            propagator_us,
            commit_us,
            rollback_events: self.rollback_events,
        };
        tracing::debug!(%step, ?phase, us = metrics.total_us, "phase committed");

        if phase == Phase::PostAdvection {
            self.in_progress = metrics.clone();
        } else {
            self.in_progress.absorb(metrics.clone());
        }
        if phase == Phase::PreSolve {
            self.last_metrics = std::mem::take(&mut self.in_progress);
            self.current_step = step.next();
        }
        Ok(metrics)
    }

    /// Record a failed phase. Staged buffers and pending hints have
    /// already been dropped with the caller's locals.
    fn handle_rollback(
        &mut self,
        phase: Phase,
        name: String,
        reason: PropagatorError,
    ) -> StepError {
        self.consecutive_rollback_count += 1;
        self.rollback_events += 1;
        tracing::warn!(
            step = %self.current_step,
            ?phase,
            propagator = %name,
            error = %reason,
            consecutive = self.consecutive_rollback_count,
            "phase rolled back"
        );
        if self.consecutive_rollback_count >= MAX_CONSECUTIVE_ROLLBACKS {
            self.step_disabled = true;
            tracing::error!(
                step = %self.current_step,
                rollbacks = self.consecutive_rollback_count,
                "stepping disabled until reset"
            );
        }
        StepError::PropagatorFailed { name, reason }
    }

    /// Restore the initial field values and return to step 0.
    pub fn reset(&mut self) {
        self.store = self.initial.clone();
        self.annotations.clear();
        self.current_step = StepId(0);
        self.consecutive_rollback_count = 0;
        self.rollback_events = 0;
        self.step_disabled = false;
        self.in_progress = StepMetrics::default();
        self.last_metrics = StepMetrics::default();
        tracing::info!("step engine reset");
    }

    /// Committed values of `field`.
    pub fn read(&self, field: FieldId) -> Option<&[f64]> {
        trimix_core::FieldReader::read(&self.store, field)
    }

    /// Definition of `field`.
    pub fn field_def(&self, field: FieldId) -> Option<&FieldDef> {
        self.fields.get(field.0 as usize)
    }

    /// Overwrite the committed values of `field`. The caller has validated
    /// the field and the length.
    pub(crate) fn overwrite(&mut self, field: FieldId, values: &[f64]) {
        self.store.set(field, values);
    }

    /// Number of slots of `field`.
    pub(crate) fn len_of(&self, field: FieldId) -> Option<usize> {
        self.store.len_of(field)
    }

    /// Index of the step in progress (0 after construction or reset).
    pub fn current_step(&self) -> StepId {
        self.current_step
    }

    /// Whether stepping is disabled due to consecutive rollbacks.
    pub fn is_step_disabled(&self) -> bool {
        self.step_disabled
    }

    /// Number of consecutive rollbacks since the last committed phase.
    pub fn consecutive_rollback_count(&self) -> u32 {
        self.consecutive_rollback_count
    }

    /// Metrics of the most recent completed step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// Committed refinement annotations. Always empty on a non-adaptive
    /// world.
    pub fn annotations(&self) -> &GridAnnotations {
        &self.annotations
    }

    /// Drain the dirty set of the annotations.
    pub fn take_dirty(&mut self) -> Vec<FieldId> {
        self.annotations.take_dirty()
    }

    /// The lattice for this engine.
    pub fn space(&self) -> &dyn Space {
        self.space.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use trimix_core::{FieldId, FieldSet, Prolongation};
    use trimix_propagator::validate_pipeline;
    use trimix_propagator::Phase::{PostAdvection, PreSolve};
    use trimix_space::{EdgeBehavior, Square8};
    use trimix_test_utils::{ConstPropagator, FailingPropagator, IdentityPropagator};

    fn space() -> Box<dyn Space> {
        Box::new(Square8::new(2, 5, EdgeBehavior::Absorb).unwrap())
    }

    fn three_fields() -> Vec<FieldDef> {
        vec![
            FieldDef::scalar("a"),
            FieldDef::scalar("b"),
            FieldDef::scalar("c"),
        ]
    }

    fn engine(propagators: Vec<Box<dyn Propagator>>, adaptive: bool) -> StepEngine {
        StepEngine::new(WorldConfig {
            space: space(),
            fields: three_fields(),
            initial_values: vec![(FieldId(2), vec![3.0; 10])],
            propagators,
            adaptive,
        })
        .unwrap()
    }

    #[test]
    fn initial_values_and_zero_default() {
        let e = engine(vec![Box::new(ConstPropagator::new("c", FieldId(0), 1.0))], false);
        assert_eq!(e.read(FieldId(2)), Some(&[3.0; 10][..]));
        assert_eq!(e.read(FieldId(0)), Some(&[0.0; 10][..]));
        assert_eq!(e.current_step(), StepId(0));
    }

    #[test]
    fn staged_reads_within_phase_and_store_across_phases() {
        let mut e = engine(
            vec![
                Box::new(ConstPropagator::new("post", FieldId(0), 7.0).in_phase(PostAdvection)),
                Box::new(IdentityPropagator::new("post_copy", FieldId(0), FieldId(1)).in_phase(PostAdvection)),
            ],
            false,
        );
        e.run_phase(PostAdvection).unwrap();
        assert_eq!(e.read(FieldId(1)), Some(&[7.0; 10][..]));
        // Post-advection does not close the step.
        assert_eq!(e.current_step(), StepId(0));
        e.run_phase(PreSolve).unwrap();
        assert_eq!(e.current_step(), StepId(1));
    }

    #[test]
    fn pre_solve_reads_committed_post_advection_output() {
        let mut e = engine(
            vec![
                Box::new(ConstPropagator::new("post", FieldId(0), 4.0).in_phase(PostAdvection)),
                Box::new(IdentityPropagator::new("pre", FieldId(0), FieldId(1))),
            ],
            false,
        );
        e.run_phase(PostAdvection).unwrap();
        let m = e.run_phase(PreSolve).unwrap();
        assert_eq!(e.read(FieldId(1)), Some(&[4.0; 10][..]));
        assert_eq!(m.propagator_us.len(), 1);
        assert_eq!(e.last_metrics().propagator_us.len(), 2);
    }

    #[test]
    fn failure_rolls_back_whole_phase() {
        let mut e = engine(
            vec![
                Box::new(ConstPropagator::new("ok", FieldId(0), 5.0)),
                Box::new(FailingPropagator::new("bad", FieldId(1), 0)),
            ],
            false,
        );
        let err = e.run_phase(PreSolve).unwrap_err();
        assert!(matches!(
            err,
            StepError::PropagatorFailed { ref name, reason: PropagatorError::ExecutionFailed { .. } }
                if name == "bad"
        ));
        // "ok" ran first but its output was never committed.
        assert_eq!(e.read(FieldId(0)), Some(&[0.0; 10][..]));
        assert_eq!(e.current_step(), StepId(0));
        assert_eq!(e.consecutive_rollback_count(), 1);
    }

    #[test]
    fn three_failures_disable_until_reset() {
        let mut e = engine(vec![Box::new(FailingPropagator::new("bad", FieldId(0), 0))], false);
        for _ in 0..MAX_CONSECUTIVE_ROLLBACKS {
            assert!(matches!(
                e.run_phase(PreSolve),
                Err(StepError::PropagatorFailed { .. })
            ));
        }
        assert!(e.is_step_disabled());
        assert_eq!(e.run_phase(PreSolve), Err(StepError::StepDisabled));
        assert_eq!(e.run_phase(PostAdvection), Err(StepError::StepDisabled));
        e.reset();
        assert!(!e.is_step_disabled());
        assert_eq!(e.consecutive_rollback_count(), 0);
    }

    #[test]
    fn success_resets_consecutive_count() {
        let mut e = engine(vec![Box::new(FailingPropagator::new("flaky", FieldId(0), 1))], false);
        e.run_phase(PreSolve).unwrap();
        assert!(e.run_phase(PreSolve).is_err());
        assert!(e.run_phase(PreSolve).is_err());
        assert_eq!(e.consecutive_rollback_count(), 2);
        assert!(!e.is_step_disabled());
        assert_eq!(e.current_step(), StepId(1));
    }

    #[test]
    fn reset_restores_initial_values() {
        let mut e = engine(
            vec![Box::new(ConstPropagator::new("c", FieldId(2), 9.0))],
            false,
        );
        e.run_phase(PreSolve).unwrap();
        assert_eq!(e.read(FieldId(2)), Some(&[9.0; 10][..]));
        e.reset();
        assert_eq!(e.read(FieldId(2)), Some(&[3.0; 10][..]));
        assert_eq!(e.current_step(), StepId(0));
        assert_eq!(e.last_metrics(), &StepMetrics::default());
    }

    struct Hinting;

    impl Propagator for Hinting {
        fn name(&self) -> &str {
            "hinting"
        }
        fn reads(&self) -> FieldSet {
            FieldSet::empty()
        }
        fn writes(&self) -> Vec<(FieldId, trimix_propagator::WriteMode)> {
            vec![(FieldId(0), trimix_propagator::WriteMode::Incremental)]
        }
        fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
            ctx.hints().set_prolongation(FieldId(1), Prolongation::FractionRefine);
            ctx.hints().mark_dirty(FieldId(1));
            Ok(())
        }
    }

    #[test]
    fn hints_reach_annotations_only_when_adaptive() {
        let mut plain = engine(vec![Box::new(Hinting)], false);
        plain.run_phase(PreSolve).unwrap();
        assert!(plain.annotations().is_empty());

        let mut adaptive = engine(vec![Box::new(Hinting)], true);
        adaptive.run_phase(PreSolve).unwrap();
        assert_eq!(
            adaptive.annotations().prolongation(FieldId(1)),
            Some(Prolongation::FractionRefine)
        );
        assert_eq!(adaptive.take_dirty(), vec![FieldId(1)]);
        assert!(adaptive.take_dirty().is_empty());
    }

    #[test]
    fn rolled_back_phase_drops_its_hints() {
        let mut e = engine(
            vec![
                Box::new(
                    IdentityPropagator::new("copy", FieldId(2), FieldId(1))
                        .with_prolongation(Prolongation::Bilinear),
                ),
                Box::new(FailingPropagator::new("bad", FieldId(0), 0)),
            ],
            true,
        );
        assert!(e.run_phase(PreSolve).is_err());
        assert!(e.annotations().is_empty());
        assert_eq!(e.read(FieldId(1)), Some(&[0.0; 10][..]));
    }

    #[test]
    fn plan_slot_without_propagator_fails_the_phase() {
        let mut e = engine(vec![Box::new(ConstPropagator::new("a", FieldId(0), 1.0))], false);
        let longer: Vec<Box<dyn Propagator>> = vec![
            Box::new(ConstPropagator::new("a", FieldId(0), 1.0)),
            Box::new(ConstPropagator::new("b", FieldId(1), 2.0)),
        ];
        let defined: FieldSet = (0..3).map(FieldId).collect();
        e.plan = validate_pipeline(&longer, &defined, &FieldSet::empty()).unwrap();

        let err = e.run_phase(PreSolve).unwrap_err();
        assert!(matches!(
            err,
            StepError::PropagatorFailed { ref name, reason: PropagatorError::ExecutionFailed { .. } }
                if name == "#1"
        ));
        assert_eq!(e.read(FieldId(0)), Some(&[0.0; 10][..]));
        assert_eq!(e.current_step(), StepId(0));
        assert_eq!(e.consecutive_rollback_count(), 1);
    }

    #[test]
    fn face_fields_include_boundary_faces() {
        let e = StepEngine::new(WorldConfig {
            space: space(),
            fields: vec![FieldDef::scalar("a"), FieldDef::face("mu", 2)],
            initial_values: vec![],
            propagators: vec![Box::new(ConstPropagator::new("c", FieldId(0), 1.0))],
            adaptive: false,
        })
        .unwrap();
        // 2x5 absorb: 20 lower faces, 5 on the last row, 2 on the last column.
        assert_eq!(e.read(FieldId(1)).map(<[f64]>::len), Some(27));
    }

    proptest! {
        #[test]
        fn store_tracks_last_committed_phase(succeed in 0usize..5, calls in 1usize..10) {
            let mut e = engine(
                vec![Box::new(FailingPropagator::new("flaky", FieldId(0), succeed))],
                false,
            );
            let mut ran = 0usize;
            let mut committed = 0.0;
            let mut consecutive = 0u32;
            let mut disabled = false;
            for _ in 0..calls {
                let result = e.run_phase(PreSolve);
                if disabled {
                    prop_assert_eq!(result, Err(StepError::StepDisabled));
                } else if ran < succeed {
                    prop_assert!(result.is_ok());
                    committed = ran as f64;
                    consecutive = 0;
                    ran += 1;
                } else {
                    let is_failure = matches!(result, Err(StepError::PropagatorFailed { .. }));
                    prop_assert!(is_failure);
                    consecutive += 1;
                    ran += 1;
                    disabled = consecutive >= MAX_CONSECUTIVE_ROLLBACKS;
                }
                let expected = vec![committed; 10];
                prop_assert_eq!(e.read(FieldId(0)), Some(&expected[..]));
                prop_assert_eq!(e.current_step(), StepId(ran.min(succeed) as u64));
                prop_assert_eq!(e.consecutive_rollback_count(), consecutive);
                prop_assert_eq!(e.is_step_disabled(), disabled);
            }
        }
    }
}
