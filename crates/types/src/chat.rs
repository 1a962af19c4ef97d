//! Canonical chat schema used on both sides of the gateway.
//!
//! Callers submit a [`ChatRequest`] and receive a [`ChatResponse`] regardless
//! of which wire protocol the target deployment speaks; the protocol adapters
//! in `llmux-translate` convert to and from the upstream shapes. The response
//! shape is `OpenAI`-compatible on purpose: the GPT protocol's replies decode
//! into it directly.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One conversation message.
///
/// `content` is either a plain string or a structured multimodal array
/// (`[{"type": "text", ...}, {"type": "image_url", ...}]`); adapters that
/// cannot pass arrays through convert them per protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Value,
}

impl ChatMessage {
    /// Convenience constructor for plain-text messages.
    pub fn text(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Value::String(content.into()),
        }
    }

    /// Returns `true` for system messages (case-insensitive role match).
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.role.eq_ignore_ascii_case("system")
    }

    /// The content as text, when it is a plain string.
    #[must_use]
    pub fn content_str(&self) -> Option<&str> {
        self.content.as_str()
    }
}

/// A protocol-independent inference request.
///
/// There is no `model` field: the model is a property of the target
/// deployment, not of the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// A normalized inference response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub id: String,
    pub model: String,
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Usage,
}

impl ChatResponse {
    /// Text content of the first choice, when present and plain.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.message.content_str())
    }
}

/// One completion choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    pub message: ChatMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Token accounting; zeroed for protocols that do not report usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_deserialize_minimal() {
        let v = json!({
            "messages": [{"role": "user", "content": "hi"}]
        });
        let req: ChatRequest = serde_json::from_value(v).unwrap();
        assert_eq!(req.messages.len(), 1);
        assert!(req.max_tokens.is_none());
        assert!(req.stream.is_none());
    }

    #[test]
    fn test_request_serialize_skips_unset() {
        let req = ChatRequest {
            messages: vec![ChatMessage::text("user", "hi")],
            ..ChatRequest::default()
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("max_tokens"));
        assert!(!json.contains("temperature"));
        assert!(!json.contains("stream"));
    }

    #[test]
    fn test_message_multimodal_content() {
        let v = json!({
            "role": "user",
            "content": [
                {"type": "text", "text": "what is this?"},
                {"type": "image_url", "image_url": {"url": "https://x/cat.png"}}
            ]
        });
        let msg: ChatMessage = serde_json::from_value(v).unwrap();
        assert!(msg.content_str().is_none());
        assert!(msg.content.is_array());
    }

    #[test]
    fn test_is_system_case_insensitive() {
        assert!(ChatMessage::text("system", "be brief").is_system());
        assert!(ChatMessage::text("System", "be brief").is_system());
        assert!(!ChatMessage::text("user", "hi").is_system());
    }

    #[test]
    fn test_response_decodes_openai_shape() {
        // The exact body an OpenAI-compatible upstream returns.
        let v = json!({
            "id": "chatcmpl-abc123",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "hello"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12}
        });
        let res: ChatResponse = serde_json::from_value(v).unwrap();
        assert_eq!(res.id, "chatcmpl-abc123");
        assert_eq!(res.first_text(), Some("hello"));
        assert_eq!(res.usage.total_tokens, 12);
        assert_eq!(res.choices[0].finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_response_missing_usage_defaults_to_zero() {
        let v = json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "hi"}
            }]
        });
        let res: ChatResponse = serde_json::from_value(v).unwrap();
        assert_eq!(res.usage, Usage::default());
        assert!(res.choices[0].finish_reason.is_none());
    }
}
