//! HTTP implementation of the inference call.
//!
//! Picks the wire protocol from the deployment metadata, builds the
//! protocol-specific body, posts it to the deployment's serving URL and
//! normalizes the answer back into the canonical shape.

use crate::http::{RESOURCE_GROUP_HEADER, UpstreamHttp};
use async_trait::async_trait;
use llmux_auth::{CredentialStore, TokenBroker};
use llmux_translate::{Protocol, anthropic, classify, gemini, gpt, orchestration};
use llmux_types::{ChatRequest, ChatResponse, Deployment, GatewayError, InferenceApi, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub struct HttpInferenceClient {
    http: UpstreamHttp,
    credentials: Arc<CredentialStore>,
    broker: Arc<TokenBroker>,
    timeout: Duration,
}

impl HttpInferenceClient {
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
}

/// Protocol-specific request body.
fn build_body(protocol: Protocol, request: &ChatRequest, model: Option<&str>) -> Value {
    match protocol {
        Protocol::Anthropic => anthropic::build_request(request),
        Protocol::Gpt => gpt::build_request(request, model.unwrap_or_default()),
        Protocol::Gemini => gemini::build_request(request),
        Protocol::Orchestration => orchestration::build_request(request, model),
    }
}

/// Normalize the protocol-specific response body.
fn parse_body(protocol: Protocol, model: Option<&str>, body: &Value) -> Result<ChatResponse> {
    match protocol {
        Protocol::Anthropic => anthropic::parse_response(body),
        Protocol::Gpt => gpt::parse_response(body),
        Protocol::Gemini => gemini::parse_response(model.unwrap_or_default(), body),
        Protocol::Orchestration => orchestration::parse_response(model, body),
    }
}

#[async_trait]
impl InferenceApi for HttpInferenceClient {
    async fn run_inference(
        &self,
        tenant_id: &str,
        deployment: &Deployment,
        request: ChatRequest,
    ) -> Result<ChatResponse> {
        let base_url = deployment.deployment_url.as_deref().ok_or_else(|| {
            GatewayError::DeploymentNotFound(format!(
                "deployment {} has no serving URL yet",
                deployment.id
            ))
        })?;

        let model = deployment.model_name();
        let protocol = classify(deployment.scenario_id.as_deref(), model.as_deref());
        let stream = request.stream.unwrap_or(false);
        let url = format!(
            "{base_url}{}",
            protocol.endpoint_suffix(model.as_deref().unwrap_or_default(), stream)
        );
        tracing::debug!(
            tenant = %tenant_id,
            deployment = %deployment.id,
            %protocol,
            %url,
            "dispatching inference"
        );

        let body = build_body(protocol, &request, model.as_deref());
        let credential = self.credentials.get(tenant_id).await?;
        let token = self.broker.get_token(tenant_id).await?;
        let builder = self
            .http
            .client()
            .post(url)
            .bearer_auth(&token.bearer_token)
            .header(RESOURCE_GROUP_HEADER, &credential.resource_group)
            .timeout(self.timeout)
            .json(&body);

        let answer = self.http.send_json(builder).await?;
        parse_body(protocol, model.as_deref(), &answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmux_types::ChatMessage;
    use serde_json::json;

    fn request() -> ChatRequest {
        ChatRequest {
            messages: vec![ChatMessage::text("user", "hi")],
            ..ChatRequest::default()
        }
    }

    #[test]
    fn test_build_body_dispatch() {
        let req = request();
        assert!(
            build_body(Protocol::Anthropic, &req, None)
                .get("anthropic_version")
                .is_some()
        );
        assert!(
            build_body(Protocol::Gpt, &req, Some("gpt-4o"))
                .get("messages")
                .is_some()
        );
        assert!(
            build_body(Protocol::Gemini, &req, Some("gemini-1.5-pro"))
                .get("contents")
                .is_some()
        );
        assert!(
            build_body(Protocol::Orchestration, &req, None)
                .get("orchestration_config")
                .is_some()
        );
    }

    #[test]
    fn test_parse_body_dispatch() {
        let anthropic_body = json!({
            "id": "msg_1",
            "content": [{"type": "text", "text": "a"}]
        });
        let res = parse_body(Protocol::Anthropic, None, &anthropic_body).unwrap();
        assert_eq!(res.first_text(), Some("a"));

        let gemini_body = json!({
            "candidates": [{"content": {"parts": [{"text": "g"}]}}]
        });
        let res = parse_body(Protocol::Gemini, Some("gemini-1.5-pro"), &gemini_body).unwrap();
        assert_eq!(res.model, "gemini-1.5-pro");
        assert_eq!(res.first_text(), Some("g"));
    }
}
