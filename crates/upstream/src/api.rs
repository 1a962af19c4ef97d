//! HTTP implementation of the per-tenant deployment API.

use crate::http::{RESOURCE_GROUP_HEADER, UpstreamHttp};
use async_trait::async_trait;
use llmux_auth::{CredentialStore, TokenBroker};
use llmux_types::{Deployment, DeploymentApi, GatewayError, Result};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Deployment CRUD against the real upstream, authenticated per tenant.
///
/// Every call resolves the tenant's credential and bearer token first, so a
/// tenant unknown to the credential store fails before any request is sent.
pub struct HttpDeploymentApi {
    http: UpstreamHttp,
    credentials: Arc<CredentialStore>,
    broker: Arc<TokenBroker>,
    timeout: Duration,
}

impl HttpDeploymentApi {
    #[must_use]
    pub fn new(
        http: UpstreamHttp,
        credentials: Arc<CredentialStore>,
        broker: Arc<TokenBroker>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            credentials,
            broker,
            timeout,
        }
    }

    /// Builder for `{api_base}{path}` with tenant auth headers attached.
    async fn request(
        &self,
        method: Method,
        tenant_id: &str,
        path: &str,
    ) -> Result<reqwest::RequestBuilder> {
        let credential = self.credentials.get(tenant_id).await?;
        let token = self.broker.get_token(tenant_id).await?;
        Ok(self
            .http
            .client()
            .request(method, format!("{}{path}", credential.api_base_url))
            .bearer_auth(&token.bearer_token)
            .header(RESOURCE_GROUP_HEADER, &credential.resource_group)
            .timeout(self.timeout))
    }
}

/// Decode the `{count, resources}` envelope the listing endpoint returns.
fn parse_listing(body: &Value) -> Result<Vec<Deployment>> {
    let resources = body.get("resources").and_then(Value::as_array).ok_or_else(|| {
        GatewayError::DecodeFailed("deployment listing missing 'resources'".into())
    })?;
    resources
        .iter()
        .map(|record| {
            serde_json::from_value(record.clone())
                .map_err(|e| GatewayError::DecodeFailed(format!("deployment record: {e}")))
        })
        .collect()
}

#[async_trait]
impl DeploymentApi for HttpDeploymentApi {
    async fn list_deployments(&self, tenant_id: &str) -> Result<Vec<Deployment>> {
        let builder = self
            .request(Method::GET, tenant_id, "/v2/lm/deployments")
            .await?;
        let body = self.http.send_json(builder).await?;
        parse_listing(&body)
    }

    async fn get_deployment(&self, tenant_id: &str, deployment_id: &str) -> Result<Deployment> {
        let builder = self
            .request(
                Method::GET,
                tenant_id,
                &format!("/v2/lm/deployments/{deployment_id}"),
            )
            .await?;
        let body = self.http.send_json(builder).await?;
        serde_json::from_value(body)
            .map_err(|e| GatewayError::DecodeFailed(format!("deployment record: {e}")))
    }

    async fn create_configuration(&self, tenant_id: &str, body: Value) -> Result<Value> {
        let builder = self
            .request(Method::POST, tenant_id, "/v2/lm/configurations")
            .await?;
        self.http.send_json(builder.json(&body)).await
    }

    async fn create_deployment(&self, tenant_id: &str, body: Value) -> Result<Value> {
        let builder = self
            .request(Method::POST, tenant_id, "/v2/lm/deployments")
            .await?;
        self.http.send_json(builder.json(&body)).await
    }

    async fn modify_deployment(
        &self,
        tenant_id: &str,
        deployment_id: &str,
        body: Value,
    ) -> Result<Value> {
        let builder = self
            .request(
                Method::PATCH,
                tenant_id,
                &format!("/v2/lm/deployments/{deployment_id}"),
            )
            .await?;
        self.http.send_json(builder.json(&body)).await
    }

    async fn delete_deployment(&self, tenant_id: &str, deployment_id: &str) -> Result<Value> {
        let builder = self
            .request(
                Method::DELETE,
                tenant_id,
                &format!("/v2/lm/deployments/{deployment_id}"),
            )
            .await?;
        self.http.send_json(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_listing() {
        let body = json!({
            "count": 2,
            "resources": [
                {
                    "id": "d-1",
                    "configurationId": "c-1",
                    "scenarioId": "foundation-models",
                    "status": "RUNNING",
                    "deploymentUrl": "https://api.example/v2/inference/deployments/d-1"
                },
                {"id": "d-2", "status": "PENDING"}
            ]
        });
        let deployments = parse_listing(&body).unwrap();
        assert_eq!(deployments.len(), 2);
        assert_eq!(deployments[0].id, "d-1");
        assert!(deployments[1].deployment_url.is_none());
    }

    #[test]
    fn test_parse_listing_empty() {
        let deployments = parse_listing(&json!({"count": 0, "resources": []})).unwrap();
        assert!(deployments.is_empty());
    }

    #[test]
    fn test_parse_listing_missing_resources() {
        let err = parse_listing(&json!({"count": 3})).unwrap_err();
        assert!(matches!(err, GatewayError::DecodeFailed(_)));
    }

    #[test]
    fn test_parse_listing_malformed_record() {
        // A record without an id cannot become a Deployment.
        let err = parse_listing(&json!({"resources": [{"status": "RUNNING"}]})).unwrap_err();
        assert!(matches!(err, GatewayError::DecodeFailed(_)));
    }
}
