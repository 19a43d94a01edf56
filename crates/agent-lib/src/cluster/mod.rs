//! Cluster collaborator boundary
//!
//! The monitoring core talks to two external systems: the control plane
//! (pod listing, deployment lookup, deletion) and the resource-metrics API
//! (point-in-time usage per pod). Both are modeled as traits so tests can
//! substitute in-memory fakes for the kube-backed client.

mod kube_client;
pub mod quantity;

pub use kube_client::KubeClusterClient;

use crate::models::ContainerUsage;
use thiserror::Error;

pub use async_trait::async_trait;

/// Errors surfaced by the cluster collaborators
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("failed to load kubernetes configuration: {0}")]
    Config(String),

    #[error("kubernetes api error: {0}")]
    Api(#[from] kube::Error),

    #[error("deployment {0} has no label selector")]
    MissingSelector(String),

    #[error("malformed metrics payload for pod {pod}: {reason}")]
    MalformedMetrics { pod: String, reason: String },

    #[error("unparseable resource quantity {0:?}")]
    BadQuantity(String),

    #[error(transparent)]
    Request(#[from] http::Error),
}

/// Control-plane operations consumed by the monitoring core
///
/// Implementations are bound to a single namespace at construction time.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// List pod names in the namespace, optionally filtered by a label selector
    async fn list_pods(&self, label_selector: Option<&str>) -> Result<Vec<String>, ClusterError>;

    /// Resolve a deployment's pod-label selector into selector-string form
    async fn deployment_selector(&self, name: &str) -> Result<String, ClusterError>;

    /// Whether the pod currently exists; an errored lookup counts as absent
    async fn pod_exists(&self, pod: &str) -> bool;

    /// Delete a pod by name
    async fn delete_pod(&self, pod: &str) -> Result<(), ClusterError>;
}

/// Point-in-time resource usage, one row per container in the pod
#[async_trait]
pub trait UsageMetrics: Send + Sync {
    async fn pod_usage(&self, pod: &str) -> Result<Vec<ContainerUsage>, ClusterError>;
}
