//! Deterministic fakes shared by the gateway test modules.

use crate::Gateway;
use async_trait::async_trait;
use llmux_auth::{CredentialStore, StaticCredentialSource};
use llmux_scope::InMemoryDirectory;
use llmux_types::{
    ChatChoice, ChatMessage, ChatRequest, ChatResponse, Deployment, DeploymentApi, GatewayError,
    InferenceApi, Usage,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Credentials for team-a and team-b; team-c stays uncredentialed on purpose.
pub const BLOB: &str = r#"[
    {
        "tenant_id": "team-a",
        "oauth_client_id": "cid-a",
        "oauth_client_secret": "sec-a",
        "oauth_token_url": "https://auth.example/token",
        "api_base_url": "https://api.example/team-a",
        "resource_group": "rg-a"
    },
    {
        "tenant_id": "team-b",
        "oauth_client_id": "cid-b",
        "oauth_client_secret": "sec-b",
        "oauth_token_url": "https://auth.example/token",
        "api_base_url": "https://api.example/team-b",
        "resource_group": "rg-b"
    }
]"#;

/// team-a and team-b live in the same group, managed by gaia.
const TOPOLOGY: &str = r"
organizations:
  - id: org-1
    owner: octavia
    groups:
      - id: group-1
        owner: gaia
        teams: [team-a, team-b]
";

pub fn deployment(id: &str, model: Option<&str>) -> Deployment {
    let details = model.map_or(json!({}), |name| {
        json!({"resources": {"backend_details": {"model": {"name": name}}}})
    });
    serde_json::from_value(json!({
        "id": id,
        "scenarioId": "foundation-models",
        "status": "RUNNING",
        "deploymentUrl": format!("https://api.example/v2/inference/deployments/{id}"),
        "details": details
    }))
    .unwrap()
}

/// Serves canned listings; tenants in `failing` answer 503. Lifecycle calls
/// are recorded as `"method tenant"` strings.
#[derive(Default)]
pub struct FakeDeploymentApi {
    pub listings: HashMap<String, Vec<Deployment>>,
    pub failing: Vec<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeDeploymentApi {
    pub fn with_listings(listings: HashMap<String, Vec<Deployment>>) -> Self {
        Self {
            listings,
            ..Self::default()
        }
    }

    fn record(&self, method: &str, tenant_id: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{method} {tenant_id}"));
    }
}

#[async_trait]
impl DeploymentApi for FakeDeploymentApi {
    async fn list_deployments(&self, tenant_id: &str) -> llmux_types::Result<Vec<Deployment>> {
        self.record("list", tenant_id);
        if self.failing.iter().any(|t| t == tenant_id) {
            return Err(GatewayError::UpstreamRequestFailed {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(self.listings.get(tenant_id).cloned().unwrap_or_default())
    }

    async fn get_deployment(
        &self,
        tenant_id: &str,
        deployment_id: &str,
    ) -> llmux_types::Result<Deployment> {
        self.record("get", tenant_id);
        self.listings
            .get(tenant_id)
            .and_then(|ds| ds.iter().find(|d| d.id == deployment_id))
            .cloned()
            .ok_or_else(|| GatewayError::UpstreamRequestFailed {
                status: 404,
                body: "not found".into(),
            })
    }

    async fn create_configuration(
        &self,
        tenant_id: &str,
        _body: Value,
    ) -> llmux_types::Result<Value> {
        self.record("create_configuration", tenant_id);
        Ok(json!({"id": "cfg-new"}))
    }

    async fn create_deployment(&self, tenant_id: &str, _body: Value) -> llmux_types::Result<Value> {
        self.record("create_deployment", tenant_id);
        Ok(json!({"id": "dep-new"}))
    }

    async fn modify_deployment(
        &self,
        tenant_id: &str,
        deployment_id: &str,
        _body: Value,
    ) -> llmux_types::Result<Value> {
        self.record("modify", tenant_id);
        Ok(json!({"id": deployment_id}))
    }

    async fn delete_deployment(
        &self,
        tenant_id: &str,
        deployment_id: &str,
    ) -> llmux_types::Result<Value> {
        self.record("delete", tenant_id);
        Ok(json!({"id": deployment_id, "message": "deletion scheduled"}))
    }
}

/// Records `(tenant, deployment, message count)` per call and answers "ok".
#[derive(Default)]
pub struct FakeInference {
    pub seen: Mutex<Vec<(String, String, usize)>>,
}

#[async_trait]
impl InferenceApi for FakeInference {
    async fn run_inference(
        &self,
        tenant_id: &str,
        deployment: &Deployment,
        request: ChatRequest,
    ) -> llmux_types::Result<ChatResponse> {
        self.seen.lock().unwrap().push((
            tenant_id.to_string(),
            deployment.id.clone(),
            request.messages.len(),
        ));
        Ok(ChatResponse {
            id: "chatcmpl-fake".into(),
            model: deployment.model_name().unwrap_or_else(|| "unknown".into()),
            choices: vec![ChatChoice {
                index: 0,
                message: ChatMessage::text("assistant", "ok"),
                finish_reason: Some("stop".into()),
            }],
            usage: Usage::default(),
        })
    }
}

pub fn gateway(api: Arc<FakeDeploymentApi>, inference: Arc<FakeInference>) -> Gateway {
    let directory = Arc::new(InMemoryDirectory::from_yaml(TOPOLOGY).unwrap());
    let credentials = Arc::new(CredentialStore::new(Arc::new(StaticCredentialSource::new(
        BLOB,
    ))));
    Gateway::new(directory, credentials, api, inference)
}
