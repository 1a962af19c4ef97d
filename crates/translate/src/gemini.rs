//! Adapter for the Gemini protocol (`generateContent`).

use llmux_types::{ChatChoice, ChatMessage, ChatRequest, ChatResponse, GatewayError, Result, Usage};
use serde_json::{Value, json};

use crate::generated_id;

/// Mime type assumed for image URLs with an unrecognized extension.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

fn mime_for_url(url: &str) -> String {
    let lower = url.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix("data:")
        && let Some(mime) = rest.split([';', ',']).next()
        && mime.starts_with("image/")
    {
        return mime.to_string();
    }
    let path = lower.split('?').next().unwrap_or_default();
    let mime = if path.ends_with(".jpg") || path.ends_with(".jpeg") {
        "image/jpeg"
    } else if path.ends_with(".gif") {
        "image/gif"
    } else if path.ends_with(".webp") {
        "image/webp"
    } else {
        DEFAULT_IMAGE_MIME
    };
    mime.to_string()
}

/// Build a `generateContent` request body.
///
/// Gemini has no system role, so system text is folded into the first part
/// with a `[System]: ` prefix. `contents` is a single user-role object
/// rather than an array; multimodal `image_url` items become `fileData`
/// parts with the mime type guessed from the URL.
#[must_use]
pub fn build_request(req: &ChatRequest) -> Value {
    let mut parts: Vec<Value> = Vec::new();

    let system: Vec<&str> = req
        .messages
        .iter()
        .filter(|m| m.is_system())
        .filter_map(ChatMessage::content_str)
        .collect();
    if !system.is_empty() {
        parts.push(json!({"text": format!("[System]: {}", system.join("\n"))}));
    }

    for message in req.messages.iter().filter(|m| !m.is_system()) {
        match &message.content {
            Value::String(text) => parts.push(json!({"text": text})),
            Value::Array(items) => {
                for item in items {
                    match item.get("type").and_then(Value::as_str) {
                        Some("text") => {
                            if let Some(text) = item.get("text").and_then(Value::as_str) {
                                parts.push(json!({"text": text}));
                            }
                        }
                        Some("image_url") => {
                            if let Some(url) =
                                item.pointer("/image_url/url").and_then(Value::as_str)
                            {
                                parts.push(json!({
                                    "fileData": {
                                        "mimeType": mime_for_url(url),
                                        "fileUri": url
                                    }
                                }));
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    let mut out = json!({
        "contents": {"role": "user", "parts": parts}
    });

    let mut generation_config = json!({});
    if let Some(max_tokens) = req.max_tokens {
        generation_config["maxOutputTokens"] = json!(max_tokens);
    }
    if let Some(temperature) = req.temperature {
        generation_config["temperature"] = json!(temperature);
    }
    if let Some(top_p) = req.top_p {
        generation_config["topP"] = json!(top_p);
    }
    if generation_config.as_object().is_some_and(|o| !o.is_empty()) {
        out["generation_config"] = generation_config;
    }
    out
}

fn map_finish_reason(reason: Option<&str>) -> &'static str {
    match reason {
        Some("MAX_TOKENS") => "length",
        _ => "stop",
    }
}

/// Decode a `generateContent` response.
///
/// Gemini supplies no response id, so a fresh `chatcmpl-` id is minted; the
/// model name comes from the deployment since the body does not echo it.
///
/// # Errors
///
/// Returns [`GatewayError::DecodeFailed`] when the body has no `candidates`.
pub fn parse_response(model: &str, body: &Value) -> Result<ChatResponse> {
    let first = body
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .ok_or_else(|| {
            GatewayError::DecodeFailed("gemini response has no candidates".into())
        })?;

    let text: String = first
        .pointer("/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let prompt_tokens = body
        .pointer("/usageMetadata/promptTokenCount")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let completion_tokens = body
        .pointer("/usageMetadata/candidatesTokenCount")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let total_tokens = body
        .pointer("/usageMetadata/totalTokenCount")
        .and_then(Value::as_u64)
        .unwrap_or(prompt_tokens + completion_tokens);

    Ok(ChatResponse {
        id: generated_id(),
        model: model.to_string(),
        choices: vec![ChatChoice {
            index: 0,
            message: ChatMessage::text("assistant", text),
            finish_reason: Some(
                map_finish_reason(first.get("finishReason").and_then(Value::as_str)).to_string(),
            ),
        }],
        usage: Usage {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        },
    })
}
