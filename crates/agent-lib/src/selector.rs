//! Pod selection
//!
//! Resolves the set of pods to evaluate on each tick: the whole namespace,
//! or only pods matched by a named deployment's label selector.

use crate::cluster::{ClusterError, ControlPlane};
use std::sync::Arc;
use tracing::warn;

/// Resolves the current evaluation set
pub struct PodSelector {
    control_plane: Arc<dyn ControlPlane>,
    deployment: Option<String>,
}

impl PodSelector {
    pub fn new(control_plane: Arc<dyn ControlPlane>, deployment: Option<String>) -> Self {
        Self {
            control_plane,
            deployment,
        }
    }

    /// Pod names to evaluate this tick.
    ///
    /// A failed deployment lookup yields an empty set rather than falling
    /// back to the unfiltered namespace; a failed pod listing is an error
    /// and the caller skips the tick. An empty namespace is a normal result.
    pub async fn select(&self) -> Result<Vec<String>, ClusterError> {
        let Some(deployment) = &self.deployment else {
            return self.control_plane.list_pods(None).await;
        };

        let selector = match self.control_plane.deployment_selector(deployment).await {
            Ok(selector) => selector,
            Err(e) => {
                warn!(deployment = %deployment, error = %e, "Deployment lookup failed, selecting no pods this tick");
                return Ok(Vec::new());
            }
        };

        self.control_plane.list_pods(Some(&selector)).await
    }
}
