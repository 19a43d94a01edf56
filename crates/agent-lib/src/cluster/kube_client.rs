//! kube-backed implementation of the cluster collaborators
//!
//! Pods and deployments go through the typed `kube::Api`; pod usage comes
//! from the `metrics.k8s.io/v1beta1` endpoint via a raw API request, since
//! the metrics group carries no typed bindings.

use super::{async_trait, ClusterError, ControlPlane, UsageMetrics};
use crate::models::ContainerUsage;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DeleteParams, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config, ResourceExt};
use tracing::debug;

/// Namespaced Kubernetes client implementing both collaborator traits
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
    pods: Api<Pod>,
    deployments: Api<Deployment>,
    namespace: String,
}

impl KubeClusterClient {
    /// Connect using an explicit kubeconfig path, or infer configuration
    /// (in-cluster service account, then default kubeconfig) when none is given
    pub async fn connect(
        namespace: &str,
        kubeconfig: Option<&str>,
    ) -> Result<Self, ClusterError> {
        let config = match kubeconfig {
            Some(path) => {
                let kc = Kubeconfig::read_from(path)
                    .map_err(|e| ClusterError::Config(e.to_string()))?;
                Config::from_custom_kubeconfig(kc, &KubeConfigOptions::default())
                    .await
                    .map_err(|e| ClusterError::Config(e.to_string()))?
            }
            None => Config::infer()
                .await
                .map_err(|e| ClusterError::Config(e.to_string()))?,
        };

        let client = Client::try_from(config)?;
        Ok(Self::with_client(client, namespace))
    }

    /// Wrap an existing client (used when the caller already built one)
    pub fn with_client(client: Client, namespace: &str) -> Self {
        Self {
            pods: Api::namespaced(client.clone(), namespace),
            deployments: Api::namespaced(client.clone(), namespace),
            client,
            namespace: namespace.to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

#[async_trait]
impl ControlPlane for KubeClusterClient {
    async fn list_pods(&self, label_selector: Option<&str>) -> Result<Vec<String>, ClusterError> {
        let mut params = ListParams::default();
        if let Some(selector) = label_selector {
            params = params.labels(selector);
        }

        let pods = self.pods.list(&params).await?;
        Ok(pods.items.iter().map(|p| p.name_any()).collect())
    }

    async fn deployment_selector(&self, name: &str) -> Result<String, ClusterError> {
        let deployment = self.deployments.get(name).await?;

        let labels = deployment
            .spec
            .and_then(|spec| spec.selector.match_labels)
            .filter(|labels| !labels.is_empty())
            .ok_or_else(|| ClusterError::MissingSelector(name.to_string()))?;

        Ok(labels
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(","))
    }

    async fn pod_exists(&self, pod: &str) -> bool {
        match self.pods.get(pod).await {
            Ok(_) => true,
            Err(e) => {
                debug!(pod = %pod, error = %e, "Existence check failed, treating pod as gone");
                false
            }
        }
    }

    async fn delete_pod(&self, pod: &str) -> Result<(), ClusterError> {
        self.pods.delete(pod, &DeleteParams::default()).await?;
        Ok(())
    }
}

#[async_trait]
impl UsageMetrics for KubeClusterClient {
    async fn pod_usage(&self, pod: &str) -> Result<Vec<ContainerUsage>, ClusterError> {
        let path = format!(
            "/apis/metrics.k8s.io/v1beta1/namespaces/{}/pods/{}",
            self.namespace, pod
        );

        let request = http::Request::get(path).body(Vec::new())?;
        let payload: serde_json::Value = self.client.request(request).await?;

        parse_pod_metrics(pod, &payload)
    }
}

/// Extract per-container usage rows from a PodMetrics payload
fn parse_pod_metrics(
    pod: &str,
    payload: &serde_json::Value,
) -> Result<Vec<ContainerUsage>, ClusterError> {
    let malformed = |reason: &str| ClusterError::MalformedMetrics {
        pod: pod.to_string(),
        reason: reason.to_string(),
    };

    let containers = payload
        .get("containers")
        .and_then(|c| c.as_array())
        .ok_or_else(|| malformed("missing containers array"))?;

    containers
        .iter()
        .map(|container| {
            let name = container
                .get("name")
                .and_then(|n| n.as_str())
                .unwrap_or_default()
                .to_string();

            let usage = container
                .get("usage")
                .ok_or_else(|| malformed("container has no usage block"))?;
            let cpu = usage
                .get("cpu")
                .and_then(|v| v.as_str())
                .ok_or_else(|| malformed("usage has no cpu quantity"))?;
            let memory = usage
                .get("memory")
                .and_then(|v| v.as_str())
                .ok_or_else(|| malformed("usage has no memory quantity"))?;

            Ok(ContainerUsage {
                name,
                cpu_millis: super::quantity::cpu_millis(cpu)?,
                memory_bytes: super::quantity::memory_bytes(memory)?,
            })
        })
        .collect()
}
