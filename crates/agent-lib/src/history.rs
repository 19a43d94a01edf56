//! Shared usage history
//!
//! The single piece of mutable state in the agent: pod name to the last
//! usage sample observed for it. One mutex serializes every
//! read-modify-write; the remediation loop's evaluator and the janitor's
//! pruning pass are the only two writers.

use std::collections::HashMap;
use tokio::sync::Mutex;

/// Pod name -> last observed usage sample
///
/// A key exists iff the pod has been probed successfully at least once and
/// has not since been pruned. Created empty at startup, never persisted.
#[derive(Debug, Default)]
pub struct UsageHistory {
    inner: Mutex<HashMap<String, i64>>,
}

impl UsageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `sample` for `pod` and return the previous sample, if any.
    ///
    /// Read and overwrite happen under one lock acquisition so a concurrent
    /// pruning pass can never interleave between them.
    pub async fn observe(&self, pod: &str, sample: i64) -> Option<i64> {
        let mut inner = self.inner.lock().await;
        inner.insert(pod.to_string(), sample)
    }

    /// Last recorded sample for `pod`
    pub async fn get(&self, pod: &str) -> Option<i64> {
        self.inner.lock().await.get(pod).copied()
    }

    /// Snapshot of every tracked pod name
    pub async fn pods(&self) -> Vec<String> {
        self.inner.lock().await.keys().cloned().collect()
    }

    /// Drop the entry for `pod`, returning its last sample if one existed
    pub async fn remove(&self, pod: &str) -> Option<i64> {
        self.inner.lock().await.remove(pod)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_observe_first_sample_returns_none() {
        let history = UsageHistory::new();

        assert_eq!(history.observe("a", 500).await, None);
        assert_eq!(history.get("a").await, Some(500));
        assert_eq!(history.len().await, 1);
    }

    #[tokio::test]
    async fn test_observe_overwrites_and_returns_previous() {
        let history = UsageHistory::new();

        history.observe("a", 500).await;
        assert_eq!(history.observe("a", 520).await, Some(500));
        assert_eq!(history.get("a").await, Some(520));
    }

    #[tokio::test]
    async fn test_remove_untracks_pod() {
        let history = UsageHistory::new();

        history.observe("a", 500).await;
        history.observe("b", 300).await;

        assert_eq!(history.remove("a").await, Some(500));
        assert_eq!(history.remove("a").await, None);
        assert_eq!(history.get("b").await, Some(300));
        assert_eq!(history.len().await, 1);
    }

    #[tokio::test]
    async fn test_pods_snapshot() {
        let history = UsageHistory::new();
        assert!(history.is_empty().await);

        history.observe("a", 1).await;
        history.observe("b", 2).await;

        let mut pods = history.pods().await;
        pods.sort();
        assert_eq!(pods, vec!["a".to_string(), "b".to_string()]);
    }
}
