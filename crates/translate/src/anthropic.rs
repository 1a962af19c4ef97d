//! Adapter for the Anthropic messages protocol (`/invoke`).

use llmux_types::{ChatChoice, ChatMessage, ChatRequest, ChatResponse, GatewayError, Result, Usage};
use serde_json::{Value, json};

use crate::generated_id;

/// Version tag the invoke endpoint requires on every request.
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// `max_tokens` is mandatory on this protocol, so an unset value gets one.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Build an `/invoke` request body.
///
/// The protocol has no system role in the message list: system messages are
/// pulled out and joined with newlines into the top-level `system` field.
#[must_use]
pub fn build_request(req: &ChatRequest) -> Value {
    let system: Vec<&str> = req
        .messages
        .iter()
        .filter(|m| m.is_system())
        .filter_map(ChatMessage::content_str)
        .collect();

    let messages: Vec<Value> = req
        .messages
        .iter()
        .filter(|m| !m.is_system())
        .map(|m| json!({"role": m.role, "content": m.content}))
        .collect();

    let mut out = json!({
        "anthropic_version": ANTHROPIC_VERSION,
        "messages": messages,
        "max_tokens": req.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        "temperature": req.temperature.unwrap_or(DEFAULT_TEMPERATURE),
    });
    if !system.is_empty() {
        out["system"] = Value::String(system.join("\n"));
    }
    if let Some(top_p) = req.top_p {
        out["top_p"] = json!(top_p);
    }
    if let Some(stream) = req.stream {
        out["stream"] = json!(stream);
    }
    out
}

fn map_stop_reason(stop_reason: Option<&str>) -> &'static str {
    match stop_reason {
        Some("max_tokens") => "length",
        Some("tool_use") => "tool_calls",
        _ => "stop",
    }
}

/// Decode an `/invoke` response into the canonical shape.
///
/// # Errors
///
/// Returns [`GatewayError::DecodeFailed`] when the body has no `content`
/// array.
pub fn parse_response(body: &Value) -> Result<ChatResponse> {
    let content = body.get("content").and_then(Value::as_array).ok_or_else(|| {
        GatewayError::DecodeFailed("anthropic response missing 'content' array".into())
    })?;

    let text: String = content
        .iter()
        .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("");

    let prompt_tokens = body
        .pointer("/usage/input_tokens")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let completion_tokens = body
        .pointer("/usage/output_tokens")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    Ok(ChatResponse {
        id: body
            .get("id")
            .and_then(Value::as_str)
            .map_or_else(generated_id, str::to_owned),
        model: body
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        choices: vec![ChatChoice {
            index: 0,
            message: ChatMessage::text("assistant", text),
            finish_reason: Some(
                map_stop_reason(body.get("stop_reason").and_then(Value::as_str)).to_string(),
            ),
        }],
        usage: Usage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ChatRequest {
        ChatRequest {
            messages: vec![
                ChatMessage::text("system", "Be terse."),
                ChatMessage::text("system", "Answer in English."),
                ChatMessage::text("user", "hello"),
            ],
            ..ChatRequest::default()
        }
    }

    #[test]
    fn test_build_extracts_system_messages() {
        let body = build_request(&request());

        assert_eq!(body["anthropic_version"], ANTHROPIC_VERSION);
        assert_eq!(body["system"], "Be terse.\nAnswer in English.");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
    }

    #[test]
    fn test_build_applies_defaults() {
        let body = build_request(&request());
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["temperature"], 0.7);
        assert!(body.get("top_p").is_none());
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn test_build_passes_explicit_params() {
        let req = ChatRequest {
            messages: vec![ChatMessage::text("user", "hi")],
            max_tokens: Some(64),
            temperature: Some(0.1),
            top_p: Some(0.9),
            stream: Some(true),
        };
        let body = build_request(&req);

        assert_eq!(body["max_tokens"], 64);
        assert_eq!(body["temperature"], 0.1);
        assert_eq!(body["top_p"], 0.9);
        assert_eq!(body["stream"], true);
        assert!(body.get("system").is_none());
    }

    #[test]
    fn test_parse_response() {
        let body = json!({
            "id": "msg_01XYZ",
            "model": "claude-3-5-sonnet",
            "content": [{"type": "text", "text": "Hi there."}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 5}
        });
        let res = parse_response(&body).unwrap();

        assert_eq!(res.id, "msg_01XYZ");
        assert_eq!(res.model, "claude-3-5-sonnet");
        assert_eq!(res.first_text(), Some("Hi there."));
        assert_eq!(res.choices[0].finish_reason.as_deref(), Some("stop"));
        assert_eq!(res.usage.prompt_tokens, 12);
        assert_eq!(res.usage.total_tokens, 17);
    }

    #[test]
    fn test_parse_maps_stop_reasons() {
        for (upstream, canonical) in [
            ("max_tokens", "length"),
            ("tool_use", "tool_calls"),
            ("end_turn", "stop"),
            ("stop_sequence", "stop"),
        ] {
            let body = json!({
                "id": "msg_1",
                "content": [{"type": "text", "text": "x"}],
                "stop_reason": upstream
            });
            let res = parse_response(&body).unwrap();
            assert_eq!(res.choices[0].finish_reason.as_deref(), Some(canonical));
        }
    }

    #[test]
    fn test_parse_joins_text_blocks_and_skips_others() {
        let body = json!({
            "content": [
                {"type": "text", "text": "part one. "},
                {"type": "tool_use", "id": "tu_1", "name": "lookup"},
                {"type": "text", "text": "part two."}
            ]
        });
        let res = parse_response(&body).unwrap();
        assert_eq!(res.first_text(), Some("part one. part two."));
        assert_eq!(res.model, "unknown");
        assert!(res.id.starts_with("chatcmpl-"));
    }

    #[test]
    fn test_parse_missing_content_is_decode_error() {
        let body = json!({"id": "msg_1", "model": "claude"});
        let err = parse_response(&body).unwrap_err();
        assert!(matches!(err, GatewayError::DecodeFailed(_)));
    }
}
