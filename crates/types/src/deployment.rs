//! Deployment metadata as returned by the upstream deployment API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One model deployment under a tenant.
///
/// Deserialized from the upstream's camelCase JSON; snake_case aliases keep
/// locally produced fixtures working. Listings are fetched live per call and
/// never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: String,
    #[serde(default, alias = "configuration_id", skip_serializing_if = "Option::is_none")]
    pub configuration_id: Option<String>,
    #[serde(default, alias = "scenario_id", skip_serializing_if = "Option::is_none")]
    pub scenario_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Base URL of the serving endpoint; absent until the deployment is up.
    #[serde(default, alias = "deployment_url", skip_serializing_if = "Option::is_none")]
    pub deployment_url: Option<String>,
    /// Opaque detail blob; the interesting part is the model name buried in
    /// `resources.backend_details.model.name`.
    #[serde(default)]
    pub details: Value,
}

impl Deployment {
    /// The model name from the detail blob, when present.
    ///
    /// Upstreams disagree on the key casing, so both `backend_details` and
    /// `backendDetails` are tried. This is the only place that digs into
    /// `details`; everything else works with the returned string.
    #[must_use]
    pub fn model_name(&self) -> Option<String> {
        ["/resources/backend_details/model/name", "/resources/backendDetails/model/name"]
            .iter()
            .find_map(|path| self.details.pointer(path))
            .and_then(Value::as_str)
            .map(str::to_owned)
    }
}

/// Deployments aggregated across tenants, keyed by tenant id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentListing {
    pub by_tenant: BTreeMap<String, Vec<Deployment>>,
    /// Total number of deployments across all tenants.
    pub count: usize,
}

impl DeploymentListing {
    /// Record one tenant's deployments, updating the total count.
    pub fn insert(&mut self, tenant_id: impl Into<String>, deployments: Vec<Deployment>) {
        self.count += deployments.len();
        self.by_tenant.insert(tenant_id.into(), deployments);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_tenant.is_empty()
    }
}
