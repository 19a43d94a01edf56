//! Remediation loop
//!
//! The periodic driver: every tick it resolves the pod set, evaluates each
//! pod in order, and deletes the stale ones unless running dry. Cancellation
//! is checked at every tick boundary so the loop exits promptly once the
//! in-flight pass completes.

use crate::cluster::ControlPlane;
use crate::evaluator::{StalenessEvaluator, Verdict};
use crate::health::{components, HealthRegistry};
use crate::lifecycle::ShutdownSignal;
use crate::observability::AgentMetrics;
use crate::selector::PodSelector;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, warn};

/// Periodically evaluates the pod population and remediates stale pods
pub struct RemediationLoop {
    selector: PodSelector,
    evaluator: StalenessEvaluator,
    control_plane: Arc<dyn ControlPlane>,
    period: Duration,
    dry_run: bool,
    health: HealthRegistry,
    metrics: AgentMetrics,
}

impl RemediationLoop {
    pub fn new(
        selector: PodSelector,
        evaluator: StalenessEvaluator,
        control_plane: Arc<dyn ControlPlane>,
        period: Duration,
        dry_run: bool,
        health: HealthRegistry,
        metrics: AgentMetrics,
    ) -> Self {
        Self {
            selector,
            evaluator,
            control_plane,
            period,
            dry_run,
            health,
            metrics,
        }
    }

    /// Drive the loop until the shutdown signal fires
    pub async fn run(self, mut shutdown: ShutdownSignal) {
        info!(
            period_secs = self.period.as_secs(),
            dry_run = self.dry_run,
            "Starting remediation loop"
        );

        // First pass lands one full period after startup
        let mut ticker = interval_at(Instant::now() + self.period, self.period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = shutdown.cancelled() => {
                    info!("Shutting down remediation loop");
                    break;
                }
            }
        }
    }

    /// One remediation pass over the current pod set
    pub async fn tick(&self) {
        self.metrics.inc_monitor_ticks();

        let pods = match self.selector.select().await {
            Ok(pods) => pods,
            Err(e) => {
                warn!(error = %e, "Failed to list pods, skipping this tick");
                self.health
                    .set_degraded(components::MONITOR, format!("pod listing failed: {}", e))
                    .await;
                return;
            }
        };

        self.health.set_healthy(components::MONITOR).await;
        debug!(pods = pods.len(), "Evaluating pods for staleness");

        for pod in &pods {
            self.evaluate_pod(pod).await;
        }
    }

    async fn evaluate_pod(&self, pod: &str) {
        let start = Instant::now();
        self.metrics.inc_pods_evaluated();

        let verdict = self.evaluator.evaluate(pod).await;
        self.metrics
            .observe_evaluation_latency(start.elapsed().as_secs_f64());

        match verdict {
            Verdict::NotStale => {}
            Verdict::Unknown => {
                self.metrics.inc_probe_failures();
            }
            Verdict::Stale => {
                self.metrics.inc_stale_detected();
                info!(pod = %pod, dry_run = self.dry_run, "Stale pod detected");

                if self.dry_run {
                    return;
                }

                // A failed delete is logged and dropped; it never blocks
                // the remaining pods or future ticks.
                match self.control_plane.delete_pod(pod).await {
                    Ok(()) => {
                        info!(pod = %pod, "Deleted stale pod");
                        self.metrics.inc_pods_deleted();
                    }
                    Err(e) => {
                        warn!(pod = %pod, error = %e, "Failed to delete stale pod");
                        self.metrics.inc_delete_failures();
                    }
                }
            }
        }
    }
}
