//! Core data models for the stale-pod agent

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Point-in-time resource usage of a single container within a pod
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerUsage {
    pub name: String,
    pub cpu_millis: i64,
    pub memory_bytes: i64,
}

/// Immutable runtime configuration for the monitoring core
///
/// Assembled once at startup from flags and environment; every component
/// receives the pieces it needs by value and nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Namespace being watched
    pub namespace: String,
    /// Restrict evaluation to pods of this deployment (None = whole namespace)
    pub deployment: Option<String>,
    /// Compare memory bytes instead of CPU millicores
    pub check_ram: bool,
    /// Minimum usage delta below which a pod counts as stale
    pub threshold: i64,
    /// Interval between remediation passes
    pub period: Duration,
    /// Detect and log stale pods without deleting them
    pub dry_run: bool,
    /// Stop the agent after this long (None = run indefinitely)
    pub timeout: Option<Duration>,
    /// Interval between history pruning passes
    pub janitor_period: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            deployment: None,
            check_ram: false,
            threshold: 100,
            period: Duration::from_secs(60),
            dry_run: false,
            timeout: None,
            janitor_period: Duration::from_secs(300),
        }
    }
}
