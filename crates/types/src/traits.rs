//! Async traits shared across all llmux crates.
//!
//! Every cross-crate abstraction is defined here so that higher layers depend
//! only on `llmux-types`, not on each other. Tests substitute deterministic
//! implementations for all of these, which is how the gateway is exercised
//! without real HTTP or environment state.

use crate::{
    CachedToken, ChatRequest, ChatResponse, Deployment, Group, Organization, Result, Team,
    TenantCredential,
};
use async_trait::async_trait;
use serde_json::Value;

/// Supplies the raw tenant-credential blob.
///
/// Called at most once per process by the credential store; the result
/// (success or failure) is cached for the process lifetime.
pub trait CredentialSource: Send + Sync {
    /// Fetch the raw JSON blob.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GatewayError::ConfigMissing`] when the source is
    /// absent or unreadable.
    fn fetch(&self) -> Result<String>;
}

/// Performs one OAuth2 client-credentials exchange for a tenant.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    /// Exchange the tenant's client credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GatewayError::UpstreamAuthFailed`] when the token
    /// endpoint answers non-2xx or with an undecodable body.
    async fn exchange(&self, credential: &TenantCredential) -> Result<CachedToken>;
}

/// Read-only lookups into the org → group → team topology.
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    /// Look up a team by id.
    async fn team(&self, id: &str) -> Result<Option<Team>>;
    /// Look up a group by id.
    async fn group(&self, id: &str) -> Result<Option<Group>>;
    /// Look up an organization by id.
    async fn organization(&self, id: &str) -> Result<Option<Organization>>;
    /// All teams in a group.
    async fn teams_in_group(&self, group_id: &str) -> Result<Vec<Team>>;
    /// All groups in an organization.
    async fn groups_in_organization(&self, organization_id: &str) -> Result<Vec<Group>>;
    /// All organizations.
    async fn organizations(&self) -> Result<Vec<Organization>>;

    /// All groups across all organizations.
    async fn groups(&self) -> Result<Vec<Group>> {
        let mut all = Vec::new();
        for org in self.organizations().await? {
            all.extend(self.groups_in_organization(&org.id).await?);
        }
        Ok(all)
    }
}

/// Per-tenant deployment metadata and lifecycle calls.
///
/// One implementation speaks HTTP to the real upstream; aggregation and
/// gateway tests inject recording fakes.
#[async_trait]
pub trait DeploymentApi: Send + Sync {
    /// List all deployments under a tenant.
    async fn list_deployments(&self, tenant_id: &str) -> Result<Vec<Deployment>>;
    /// Fetch a single deployment by id.
    async fn get_deployment(&self, tenant_id: &str, deployment_id: &str) -> Result<Deployment>;
    /// Create a configuration (opaque pass-through).
    async fn create_configuration(&self, tenant_id: &str, body: Value) -> Result<Value>;
    /// Create a deployment (opaque pass-through).
    async fn create_deployment(&self, tenant_id: &str, body: Value) -> Result<Value>;
    /// Patch a deployment (opaque pass-through).
    async fn modify_deployment(
        &self,
        tenant_id: &str,
        deployment_id: &str,
        body: Value,
    ) -> Result<Value>;
    /// Delete a deployment.
    async fn delete_deployment(&self, tenant_id: &str, deployment_id: &str) -> Result<Value>;
}

/// Sends one inference call to a deployment, speaking whichever wire
/// protocol the deployment requires.
#[async_trait]
pub trait InferenceApi: Send + Sync {
    /// Run a chat inference against `deployment` on behalf of `tenant_id`.
    async fn run_inference(
        &self,
        tenant_id: &str,
        deployment: &Deployment,
        request: ChatRequest,
    ) -> Result<ChatResponse>;
}
