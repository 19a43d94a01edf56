//! Prometheus metrics for the stale-pod agent

use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;

/// Histogram buckets for per-pod evaluation latency in seconds; evaluations
/// include up to three metrics fetches with retry delays.
const EVALUATION_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<AgentMetricsInner> = OnceLock::new();

struct AgentMetricsInner {
    monitor_ticks: IntCounter,
    pods_evaluated: IntCounter,
    stale_detected: IntCounter,
    pods_deleted: IntCounter,
    delete_failures: IntCounter,
    probe_failures: IntCounter,
    history_pruned: IntCounter,
    tracked_pods: IntGauge,
    evaluation_latency_seconds: Histogram,
}

impl AgentMetricsInner {
    fn new() -> Self {
        Self {
            monitor_ticks: register_int_counter!(
                "stalepod_monitor_ticks_total",
                "Remediation passes started"
            )
            .expect("Failed to register monitor_ticks"),

            pods_evaluated: register_int_counter!(
                "stalepod_pods_evaluated_total",
                "Pods run through the staleness evaluator"
            )
            .expect("Failed to register pods_evaluated"),

            stale_detected: register_int_counter!(
                "stalepod_stale_detected_total",
                "Pods whose usage delta fell below the threshold"
            )
            .expect("Failed to register stale_detected"),

            pods_deleted: register_int_counter!(
                "stalepod_pods_deleted_total",
                "Stale pods successfully deleted"
            )
            .expect("Failed to register pods_deleted"),

            delete_failures: register_int_counter!(
                "stalepod_delete_failures_total",
                "Delete calls that returned an error"
            )
            .expect("Failed to register delete_failures"),

            probe_failures: register_int_counter!(
                "stalepod_probe_failures_total",
                "Pods skipped because usage could not be fetched"
            )
            .expect("Failed to register probe_failures"),

            history_pruned: register_int_counter!(
                "stalepod_history_pruned_total",
                "History entries removed for pods that no longer exist"
            )
            .expect("Failed to register history_pruned"),

            tracked_pods: register_int_gauge!(
                "stalepod_tracked_pods",
                "Pods currently holding a usage baseline"
            )
            .expect("Failed to register tracked_pods"),

            evaluation_latency_seconds: register_histogram!(
                "stalepod_evaluation_latency_seconds",
                "Time spent probing and evaluating a single pod",
                EVALUATION_BUCKETS.to_vec()
            )
            .expect("Failed to register evaluation_latency_seconds"),
        }
    }
}

/// Lightweight handle to the global metrics instance
///
/// Clones share the same underlying registry.
#[derive(Clone)]
pub struct AgentMetrics {
    _private: (),
}

impl Default for AgentMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(AgentMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &AgentMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn inc_monitor_ticks(&self) {
        self.inner().monitor_ticks.inc();
    }

    pub fn inc_pods_evaluated(&self) {
        self.inner().pods_evaluated.inc();
    }

    pub fn inc_stale_detected(&self) {
        self.inner().stale_detected.inc();
    }

    pub fn inc_pods_deleted(&self) {
        self.inner().pods_deleted.inc();
    }

    pub fn inc_delete_failures(&self) {
        self.inner().delete_failures.inc();
    }

    pub fn inc_probe_failures(&self) {
        self.inner().probe_failures.inc();
    }

    pub fn add_history_pruned(&self, count: u64) {
        self.inner().history_pruned.inc_by(count);
    }

    pub fn set_tracked_pods(&self, count: i64) {
        self.inner().tracked_pods.set(count);
    }

    pub fn observe_evaluation_latency(&self, duration_secs: f64) {
        self.inner()
            .evaluation_latency_seconds
            .observe(duration_secs);
    }
}
