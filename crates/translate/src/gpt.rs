//! Adapter for the OpenAI-compatible protocol (`/chat/completions`).
//!
//! The canonical response shape is already this protocol's shape, so parsing
//! is a straight decode.

use llmux_types::{ChatRequest, ChatResponse, GatewayError, Result};
use serde_json::{Value, json};

use crate::protocol::is_reasoning_model;

/// Build a `/chat/completions` request body.
///
/// Reasoning models (`o1` / `o3-mini` / `gpt-5` families) reject sampling
/// parameters outright, so `max_tokens`, `temperature` and `top_p` are
/// omitted for them even when the caller set values.
#[must_use]
pub fn build_request(req: &ChatRequest, model: &str) -> Value {
    let messages: Vec<Value> = req
        .messages
        .iter()
        .map(|m| json!({"role": m.role, "content": m.content}))
        .collect();

    let mut out = json!({"messages": messages});
    if !is_reasoning_model(model) {
        if let Some(max_tokens) = req.max_tokens {
            out["max_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = req.temperature {
            out["temperature"] = json!(temperature);
        }
        if let Some(top_p) = req.top_p {
            out["top_p"] = json!(top_p);
        }
    }
    if let Some(stream) = req.stream {
        out["stream"] = json!(stream);
    }
    out
}

/// Decode a `/chat/completions` response.
///
/// # Errors
///
/// Returns [`GatewayError::DecodeFailed`] when the body is not a chat
/// completion object.
pub fn parse_response(body: &Value) -> Result<ChatResponse> {
    serde_json::from_value(body.clone())
        .map_err(|e| GatewayError::DecodeFailed(format!("gpt response: {e}")))
}
