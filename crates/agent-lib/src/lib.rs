//! Core library for the stale-pod agent
//!
//! This crate provides:
//! - Staleness detection from usage deltas against a shared history
//! - Pod selection by namespace or deployment label selector
//! - The periodic remediation and history-pruning loops
//! - Cancellation lifecycle shared by every periodic task
//! - Health checks and Prometheus metrics

pub mod cluster;
pub mod evaluator;
pub mod health;
pub mod history;
pub mod janitor;
pub mod lifecycle;
pub mod models;
pub mod monitor;
pub mod observability;
pub mod probe;
pub mod selector;

pub use cluster::{ClusterError, ControlPlane, KubeClusterClient, UsageMetrics};
pub use evaluator::{StalenessEvaluator, Verdict};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use history::UsageHistory;
pub use janitor::HistoryJanitor;
pub use lifecycle::{LifecycleController, Shutdown, ShutdownSignal};
pub use models::*;
pub use monitor::RemediationLoop;
pub use observability::AgentMetrics;
pub use probe::{MetricsProbe, RetryPolicy};
pub use selector::PodSelector;
