//! History pruning
//!
//! A slower companion loop that drops usage history for pods that no longer
//! exist, bounding memory growth across pod churn. The key set is
//! snapshotted before any control-plane call so the history mutex is never
//! held across a blocking existence check.

use crate::cluster::ControlPlane;
use crate::health::{components, HealthRegistry};
use crate::history::UsageHistory;
use crate::lifecycle::ShutdownSignal;
use crate::observability::AgentMetrics;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info};

/// Periodically prunes history entries for pods that are gone
pub struct HistoryJanitor {
    history: Arc<UsageHistory>,
    control_plane: Arc<dyn ControlPlane>,
    period: Duration,
    health: HealthRegistry,
    metrics: AgentMetrics,
}

impl HistoryJanitor {
    pub fn new(
        history: Arc<UsageHistory>,
        control_plane: Arc<dyn ControlPlane>,
        period: Duration,
        health: HealthRegistry,
        metrics: AgentMetrics,
    ) -> Self {
        Self {
            history,
            control_plane,
            period,
            health,
            metrics,
        }
    }

    /// Drive the pruning loop until the shutdown signal fires
    pub async fn run(self, mut shutdown: ShutdownSignal) {
        info!(
            period_secs = self.period.as_secs(),
            "Starting history janitor"
        );

        let mut ticker = interval_at(Instant::now() + self.period, self.period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.prune().await;
                }
                _ = shutdown.cancelled() => {
                    info!("Shutting down history janitor");
                    break;
                }
            }
        }
    }

    /// One pruning pass over the tracked pod set.
    ///
    /// An errored existence check counts as non-existence, so a pod whose
    /// lookup fails transiently loses its baseline along with pods that
    /// were actually deleted.
    pub async fn prune(&self) {
        let tracked = self.history.pods().await;
        debug!(tracked = tracked.len(), "Pruning usage history");

        let mut removed = 0u64;
        for pod in tracked {
            if self.control_plane.pod_exists(&pod).await {
                continue;
            }

            if self.history.remove(&pod).await.is_some() {
                info!(pod = %pod, "Pruned usage history for missing pod");
                removed += 1;
            }
        }

        if removed > 0 {
            self.metrics.add_history_pruned(removed);
        }
        self.metrics.set_tracked_pods(self.history.len().await as i64);
        self.health.set_healthy(components::JANITOR).await;
    }
}
