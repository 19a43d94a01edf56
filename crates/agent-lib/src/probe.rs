//! Usage probing with bounded retry
//!
//! Fetches a pod's current usage from the metrics collaborator and folds
//! the per-container rows into one scalar. Transient failures are retried
//! a fixed number of times with a fixed delay; exhaustion surfaces the
//! last error so the caller can treat the pod as unknown rather than stale.

use crate::cluster::{ClusterError, UsageMetrics};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Bounded-retry policy for metrics fetches
///
/// Parameterized so tests can substitute a zero-delay policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Retry immediately, for tests
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Fetches one aggregate usage sample per pod
pub struct MetricsProbe {
    metrics: Arc<dyn UsageMetrics>,
    check_ram: bool,
    policy: RetryPolicy,
}

impl MetricsProbe {
    pub fn new(metrics: Arc<dyn UsageMetrics>, check_ram: bool, policy: RetryPolicy) -> Self {
        Self {
            metrics,
            check_ram,
            policy,
        }
    }

    /// Current aggregate usage of `pod`: memory bytes or CPU millicores,
    /// summed across its containers
    pub async fn probe(&self, pod: &str) -> Result<i64, ClusterError> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.metrics.pod_usage(pod).await {
                Ok(containers) => {
                    let usage = containers
                        .iter()
                        .map(|c| {
                            if self.check_ram {
                                c.memory_bytes
                            } else {
                                c.cpu_millis
                            }
                        })
                        .sum();
                    return Ok(usage);
                }
                Err(e) if attempt >= self.policy.max_attempts => return Err(e),
                Err(e) => {
                    debug!(pod = %pod, attempt, error = %e, "Usage fetch failed, retrying");
                    sleep(self.policy.delay).await;
                }
            }
        }
    }
}
