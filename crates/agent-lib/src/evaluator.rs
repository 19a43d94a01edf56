//! Staleness evaluation
//!
//! Turns a fresh usage sample plus the recorded history into a verdict.
//! A pod is stale when its usage delta since the previous observation
//! falls below the threshold. The raw signed delta is compared, not its
//! absolute value: dropping or flat usage counts as stale, rising usage
//! never does. The first observation of a pod only seeds the baseline.

use crate::history::UsageHistory;
use crate::probe::MetricsProbe;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of evaluating one pod
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Usage delta below threshold; candidate for remediation
    Stale,
    /// Usage moved enough, or first observation
    NotStale,
    /// Probe failed after retries; not enough information to act
    Unknown,
}

/// Combines probe results with history to decide staleness
pub struct StalenessEvaluator {
    probe: MetricsProbe,
    history: Arc<UsageHistory>,
    threshold: i64,
}

impl StalenessEvaluator {
    pub fn new(probe: MetricsProbe, history: Arc<UsageHistory>, threshold: i64) -> Self {
        Self {
            probe,
            history,
            threshold,
        }
    }

    /// Evaluate one pod, updating history as a side effect.
    ///
    /// History is untouched when the probe fails, so a transient metrics
    /// outage cannot skew the next delta.
    pub async fn evaluate(&self, pod: &str) -> Verdict {
        let current = match self.probe.probe(pod).await {
            Ok(usage) => usage,
            Err(e) => {
                warn!(pod = %pod, error = %e, "Failed to get usage after retries, skipping pod");
                return Verdict::Unknown;
            }
        };

        match self.history.observe(pod, current).await {
            None => {
                debug!(pod = %pod, usage = current, "First observation, baseline recorded");
                Verdict::NotStale
            }
            Some(previous) => {
                let delta = current - previous;
                debug!(pod = %pod, current, previous, delta, "Usage delta computed");

                if delta < self.threshold {
                    Verdict::Stale
                } else {
                    Verdict::NotStale
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{async_trait, ClusterError, UsageMetrics};
    use crate::models::ContainerUsage;
    use crate::probe::RetryPolicy;
    use std::sync::Mutex;

    /// Replays a scripted sequence of usage values, erroring when the
    /// script says so
    struct ScriptedMetrics {
        samples: Mutex<Vec<Option<i64>>>,
    }

    impl ScriptedMetrics {
        fn new(samples: Vec<Option<i64>>) -> Self {
            Self {
                samples: Mutex::new(samples),
            }
        }
    }

    #[async_trait]
    impl UsageMetrics for ScriptedMetrics {
        async fn pod_usage(&self, pod: &str) -> Result<Vec<ContainerUsage>, ClusterError> {
            let mut samples = self.samples.lock().unwrap();
            match samples.remove(0) {
                Some(cpu) => Ok(vec![ContainerUsage {
                    name: "app".to_string(),
                    cpu_millis: cpu,
                    memory_bytes: cpu,
                }]),
                None => Err(ClusterError::MalformedMetrics {
                    pod: pod.to_string(),
                    reason: "unavailable".to_string(),
                }),
            }
        }
    }

    fn evaluator(samples: Vec<Option<i64>>, threshold: i64) -> (StalenessEvaluator, Arc<UsageHistory>) {
        let history = Arc::new(UsageHistory::new());
        let probe = MetricsProbe::new(
            Arc::new(ScriptedMetrics::new(samples)),
            false,
            RetryPolicy::immediate(3),
        );
        (
            StalenessEvaluator::new(probe, history.clone(), threshold),
            history,
        )
    }

    #[tokio::test]
    async fn test_first_observation_is_not_stale() {
        let (evaluator, history) = evaluator(vec![Some(500)], 100);

        assert_eq!(evaluator.evaluate("a").await, Verdict::NotStale);
        assert_eq!(history.get("a").await, Some(500));
        assert_eq!(history.len().await, 1);
    }

    #[tokio::test]
    async fn test_small_delta_is_stale_large_is_not() {
        // Reference scenario: threshold 100, probes 500 -> 520 -> 700
        let (evaluator, history) = evaluator(vec![Some(500), Some(520), Some(700)], 100);

        assert_eq!(evaluator.evaluate("a").await, Verdict::NotStale);
        assert_eq!(history.get("a").await, Some(500));

        // delta = 20 < 100
        assert_eq!(evaluator.evaluate("a").await, Verdict::Stale);
        assert_eq!(history.get("a").await, Some(520));

        // delta = 180 >= 100
        assert_eq!(evaluator.evaluate("a").await, Verdict::NotStale);
        assert_eq!(history.get("a").await, Some(700));
    }

    #[tokio::test]
    async fn test_delta_equal_to_threshold_is_not_stale() {
        let (evaluator, _history) = evaluator(vec![Some(500), Some(600)], 100);

        evaluator.evaluate("a").await;
        assert_eq!(evaluator.evaluate("a").await, Verdict::NotStale);
    }

    #[tokio::test]
    async fn test_falling_usage_is_stale() {
        // Usage dropped after a burst; signed delta is negative
        let (evaluator, history) = evaluator(vec![Some(900), Some(400)], 100);

        evaluator.evaluate("a").await;
        assert_eq!(evaluator.evaluate("a").await, Verdict::Stale);
        assert_eq!(history.get("a").await, Some(400));
    }

    #[tokio::test]
    async fn test_probe_exhaustion_is_unknown_and_leaves_history_alone() {
        // Three failures: one per retry attempt
        let (evaluator, history) = evaluator(vec![None, None, None], 100);

        assert_eq!(evaluator.evaluate("a").await, Verdict::Unknown);
        assert!(history.is_empty().await);
    }

    #[tokio::test]
    async fn test_probe_exhaustion_keeps_existing_baseline() {
        let (evaluator, history) =
            evaluator(vec![Some(500), None, None, None, Some(520)], 100);

        assert_eq!(evaluator.evaluate("a").await, Verdict::NotStale);
        assert_eq!(evaluator.evaluate("a").await, Verdict::Unknown);
        assert_eq!(history.get("a").await, Some(500));

        // Delta still computed against the pre-outage baseline
        assert_eq!(evaluator.evaluate("a").await, Verdict::Stale);
        assert_eq!(history.get("a").await, Some(520));
    }
}
