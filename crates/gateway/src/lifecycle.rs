//! Tenant-targeted lifecycle calls.
//!
//! Unlike inference, lifecycle operations name their tenant explicitly; the
//! gateway's job is only to check the tenant against the caller's scope and
//! pass the payload through untouched.

use crate::Gateway;
use llmux_types::{CallerIdentity, Deployment, GatewayError, Result};
use serde_json::Value;

impl Gateway {
    /// Check that the target tenant is in the caller's scope and has
    /// credentials.
    async fn authorize_tenant(&self, identity: &CallerIdentity, tenant_id: &str) -> Result<()> {
        let scope = self.resolver.resolve(identity).await?;
        if !scope.contains(tenant_id) {
            return Err(GatewayError::TenantNotFound(format!(
                "tenant {tenant_id} is not in the caller's scope"
            )));
        }
        // A tenant without credentials fails here with TenantNotFound.
        self.credentials.get(tenant_id).await?;
        Ok(())
    }

    /// Fetch one deployment's detail record.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::TenantNotFound`] when the tenant is outside
    /// the caller's scope or has no credentials.
    pub async fn get_deployment(
        &self,
        identity: &CallerIdentity,
        tenant_id: &str,
        deployment_id: &str,
    ) -> Result<Deployment> {
        self.authorize_tenant(identity, tenant_id).await?;
        self.api.get_deployment(tenant_id, deployment_id).await
    }

    /// Create a configuration under the tenant (opaque pass-through).
    ///
    /// # Errors
    ///
    /// As [`Gateway::get_deployment`].
    pub async fn create_configuration(
        &self,
        identity: &CallerIdentity,
        tenant_id: &str,
        body: Value,
    ) -> Result<Value> {
        self.authorize_tenant(identity, tenant_id).await?;
        tracing::info!(user = %identity.username, tenant = %tenant_id, "creating configuration");
        self.api.create_configuration(tenant_id, body).await
    }

    /// Create a deployment under the tenant (opaque pass-through).
    ///
    /// # Errors
    ///
    /// As [`Gateway::get_deployment`].
    pub async fn create_deployment(
        &self,
        identity: &CallerIdentity,
        tenant_id: &str,
        body: Value,
    ) -> Result<Value> {
        self.authorize_tenant(identity, tenant_id).await?;
        tracing::info!(user = %identity.username, tenant = %tenant_id, "creating deployment");
        self.api.create_deployment(tenant_id, body).await
    }

    /// Patch a deployment under the tenant (opaque pass-through).
    ///
    /// # Errors
    ///
    /// As [`Gateway::get_deployment`].
    pub async fn modify_deployment(
        &self,
        identity: &CallerIdentity,
        tenant_id: &str,
        deployment_id: &str,
        body: Value,
    ) -> Result<Value> {
        self.authorize_tenant(identity, tenant_id).await?;
        tracing::info!(
            user = %identity.username,
            tenant = %tenant_id,
            deployment = %deployment_id,
            "modifying deployment"
        );
        self.api.modify_deployment(tenant_id, deployment_id, body).await
    }

    /// Delete a deployment under the tenant.
    ///
    /// # Errors
    ///
    /// As [`Gateway::get_deployment`].
    pub async fn delete_deployment(
        &self,
        identity: &CallerIdentity,
        tenant_id: &str,
        deployment_id: &str,
    ) -> Result<Value> {
        self.authorize_tenant(identity, tenant_id).await?;
        tracing::info!(
            user = %identity.username,
            tenant = %tenant_id,
            deployment = %deployment_id,
            "deleting deployment"
        );
        self.api.delete_deployment(tenant_id, deployment_id).await
    }
}
