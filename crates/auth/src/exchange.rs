//! OAuth2 client-credentials exchange against a tenant's token endpoint.

use async_trait::async_trait;
use llmux_types::{CachedToken, GatewayError, Result, TenantCredential, TokenExchanger};
use serde_json::Value;
use std::time::Duration;

/// Assumed lifetime when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// Form parameters for one client-credentials exchange.
#[must_use]
pub fn token_form_params(credential: &TenantCredential) -> Vec<(String, String)> {
    vec![
        ("grant_type".into(), "client_credentials".into()),
        ("client_id".into(), credential.oauth_client_id.clone()),
        ("client_secret".into(), credential.oauth_client_secret.clone()),
    ]
}

/// Extract a [`CachedToken`] from a token-endpoint response body.
///
/// # Errors
///
/// Returns [`GatewayError::UpstreamAuthFailed`] (carrying `status` and the
/// raw body) if `access_token` is missing.
pub fn parse_token_response(tenant_id: &str, status: u16, json: &Value) -> Result<CachedToken> {
    let access_token = json
        .get("access_token")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::UpstreamAuthFailed {
            status,
            body: json.to_string(),
        })?;
    let expires_in = json
        .get("expires_in")
        .and_then(Value::as_u64)
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS);
    Ok(CachedToken::with_lifetime(tenant_id, access_token, expires_in))
}

/// [`TokenExchanger`] implementation that posts the form to the tenant's
/// real token endpoint.
pub struct HttpTokenExchanger {
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpTokenExchanger {
    #[must_use]
    pub fn new(http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }
}

#[async_trait]
impl TokenExchanger for HttpTokenExchanger {
    async fn exchange(&self, credential: &TenantCredential) -> Result<CachedToken> {
        tracing::debug!(tenant = %credential.tenant_id, "exchanging client credentials");
        let resp = self
            .http
            .post(&credential.oauth_token_url)
            .timeout(self.timeout)
            .form(&token_form_params(credential))
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(GatewayError::UpstreamAuthFailed {
                status: status.as_u16(),
                body,
            });
        }
        let json: Value =
            serde_json::from_str(&body).map_err(|_| GatewayError::UpstreamAuthFailed {
                status: status.as_u16(),
                body: body.clone(),
            })?;
        parse_token_response(&credential.tenant_id, status.as_u16(), &json)
    }
}
