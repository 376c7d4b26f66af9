//! Per-step performance metrics for the step engine.
//!
//! [`StepMetrics`] captures timing for one phase or one complete step,
//! enabling telemetry and profiling.

/// Timing metrics collected during a step.
///
/// All durations are in microseconds. Each hook returns the metrics of its
/// own phase; [`LockstepWorld::last_metrics`](crate::LockstepWorld::last_metrics)
/// holds the sum over both phases of the most recent completed step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Wall-clock time for the whole phase or step, in microseconds.
    pub total_us: u64,
    /// Per-propagator execution times: `(name, microseconds)`.
    pub propagator_us: Vec<(String, u64)>,
    /// Time spent committing staged buffers, in microseconds.
    pub commit_us: u64,
    /// Cumulative number of rolled back phases since construction or reset.
    pub rollback_events: u64,
}

impl StepMetrics {
    /// Fold another phase's metrics into this one.
    pub fn absorb(&mut self, other: StepMetrics) {
        self.total_us += other.total_us;
        self.propagator_us.extend(other.propagator_us);
        self.commit_us += other.commit_us;
        self.rollback_events = self.rollback_events.max(other.rollback_events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = StepMetrics::default();
        assert_eq!(m.total_us, 0);
        assert_eq!(m.commit_us, 0);
        assert_eq!(m.rollback_events, 0);
        assert!(m.propagator_us.is_empty());
    }

    #[test]
    fn absorb_sums_phases() {
        let mut a = StepMetrics {
            total_us: 10,
            propagator_us: vec![("corrector".into(), 4)],
            commit_us: 1,
            rollback_events: 2,
        };
        a.absorb(StepMetrics {
            total_us: 5,
            propagator_us: vec![("evaluator".into(), 3)],
            commit_us: 2,
            rollback_events: 2,
        });
        assert_eq!(a.total_us, 15);
        assert_eq!(a.commit_us, 3);
        assert_eq!(a.propagator_us.len(), 2);
        assert_eq!(a.rollback_events, 2);
    }
}
