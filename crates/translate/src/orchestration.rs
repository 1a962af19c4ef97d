//! Adapter for the orchestration service (`/completion`).
//!
//! Orchestration deployments take the whole conversation as a prompt
//! template and name the model inside the request body instead of in the
//! URL.

use llmux_types::{ChatChoice, ChatMessage, ChatRequest, ChatResponse, GatewayError, Result, Usage};
use serde_json::{Value, json};

use crate::generated_id;

/// Model used when the deployment does not name one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Build a `/completion` request body.
#[must_use]
pub fn build_request(req: &ChatRequest, model_name: Option<&str>) -> Value {
    let template: Vec<Value> = req
        .messages
        .iter()
        .map(|m| json!({"role": m.role, "content": m.content}))
        .collect();

    json!({
        "orchestration_config": {
            "module_configurations": {
                "templating_module_config": {
                    "template": template
                },
                "llm_module_config": {
                    "model_name": model_name.unwrap_or(DEFAULT_MODEL),
                    "model_params": {
                        "max_tokens": req.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
                        "temperature": req.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                        "frequency_penalty": 0,
                        "presence_penalty": 0
                    },
                    "model_version": "latest"
                }
            }
        },
        "input_params": {}
    })
}

/// Decode a `/completion` response.
///
/// The service reports no token usage, so the usage block comes back
/// zeroed, and it supplies no response id, so one is minted.
///
/// # Errors
///
/// Returns [`GatewayError::DecodeFailed`] when the body has no
/// `orchestration_result.choices`.
pub fn parse_response(model_name: Option<&str>, body: &Value) -> Result<ChatResponse> {
    let choices = body
        .pointer("/orchestration_result/choices")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            GatewayError::DecodeFailed(
                "orchestration response missing 'orchestration_result.choices'".into(),
            )
        })?;

    let mut parsed = Vec::with_capacity(choices.len());
    for (position, choice) in choices.iter().enumerate() {
        let index = choice
            .get("index")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .or_else(|| u32::try_from(position).ok())
            .unwrap_or(0);
        parsed.push(ChatChoice {
            index,
            message: ChatMessage {
                role: choice
                    .pointer("/message/role")
                    .and_then(Value::as_str)
                    .unwrap_or("assistant")
                    .to_string(),
                content: choice
                    .pointer("/message/content")
                    .cloned()
                    .unwrap_or_else(|| Value::String(String::new())),
            },
            finish_reason: choice
                .get("finish_reason")
                .and_then(Value::as_str)
                .map(str::to_owned),
        });
    }

    Ok(ChatResponse {
        id: generated_id(),
        model: model_name.unwrap_or(DEFAULT_MODEL).to_string(),
        choices: parsed,
        usage: Usage::default(),
    })
}
