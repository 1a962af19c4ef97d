//! Shared HTTP plumbing for upstream calls.
//!
//! Every upstream interaction follows the same send → status-check → decode
//! pattern; this wrapper keeps that logic in one place.

use llmux_types::{GatewayError, Result};
use reqwest::RequestBuilder;
use serde_json::Value;

/// Header carrying the tenant's resource group on every upstream call.
pub const RESOURCE_GROUP_HEADER: &str = "resource-group";

/// Thin wrapper around [`reqwest::Client`] shared by the deployment and
/// inference clients.
#[derive(Clone)]
pub struct UpstreamHttp {
    http: reqwest::Client,
}

impl UpstreamHttp {
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// The inner client, for building requests.
    #[must_use]
    pub fn client(&self) -> &reqwest::Client {
        &self.http
    }

    /// Send a request and check for a success status.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UpstreamRequestFailed`] on a non-2xx answer,
    /// with the body text attached, or [`GatewayError::Http`] when the
    /// request cannot be sent at all.
    pub async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let resp = builder.send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(GatewayError::UpstreamRequestFailed {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// Send a request and decode the successful body as JSON.
    ///
    /// # Errors
    ///
    /// As [`UpstreamHttp::send`], plus [`GatewayError::DecodeFailed`] when a
    /// 2xx body is not valid JSON.
    pub async fn send_json(&self, builder: RequestBuilder) -> Result<Value> {
        let resp = self.send(builder).await?;
        resp.json()
            .await
            .map_err(|e| GatewayError::DecodeFailed(format!("upstream body: {e}")))
    }
}
