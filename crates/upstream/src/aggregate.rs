//! Scope-wide deployment aggregation.

use llmux_auth::CredentialStore;
use llmux_types::{DeploymentApi, DeploymentListing, Result, TenantScope};
use std::sync::Arc;

/// Fans the listing call out to every tenant in scope and unions the
/// results.
pub struct DeploymentAggregator {
    credentials: Arc<CredentialStore>,
    api: Arc<dyn DeploymentApi>,
}

impl DeploymentAggregator {
    #[must_use]
    pub fn new(credentials: Arc<CredentialStore>, api: Arc<dyn DeploymentApi>) -> Self {
        Self { credentials, api }
    }

    /// All deployments across the scope, keyed by tenant.
    ///
    /// Scope tenants without credentials are skipped, as is any tenant whose
    /// listing call fails; one bad tenant never hides the others. The
    /// per-tenant calls run concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`llmux_types::GatewayError::ConfigMissing`] when the
    /// credential blob itself cannot be loaded.
    pub async fn list_all(&self, scope: &TenantScope) -> Result<DeploymentListing> {
        let credentialed = self.credentials.tenant_ids().await?;
        let targets: Vec<&str> = scope
            .iter()
            .map(String::as_str)
            .filter(|tenant| {
                let known = credentialed.iter().any(|c| c == tenant);
                if !known {
                    tracing::debug!(tenant, "skipping tenant without credentials");
                }
                known
            })
            .collect();

        let calls = targets
            .iter()
            .map(|tenant| async move { (*tenant, self.api.list_deployments(tenant).await) });
        let results = futures::future::join_all(calls).await;

        let mut listing = DeploymentListing::default();
        for (tenant, result) in results {
            match result {
                Ok(deployments) => listing.insert(tenant, deployments),
                Err(error) => {
                    tracing::warn!(tenant, %error, "skipping tenant: deployment listing failed");
                }
            }
        }
        Ok(listing)
    }
}
