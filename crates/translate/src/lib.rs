//! Protocol adapters between the canonical chat shape and the upstream
//! model APIs.
//!
//! Everything in this crate is pure: build a request body from a
//! [`llmux_types::ChatRequest`], parse an upstream response body into a
//! [`llmux_types::ChatResponse`]. No I/O happens here; `llmux-upstream`
//! composes these functions around the actual HTTP calls.

pub mod anthropic;
pub mod gemini;
pub mod gpt;
pub mod orchestration;
pub mod protocol;
pub mod trim;

pub use protocol::{Protocol, api_version, classify, is_reasoning_model};
pub use trim::{message_budget, trim_messages};

/// Fresh response id for protocols whose upstream does not supply one.
pub(crate) fn generated_id() -> String {
    format!("chatcmpl-{}", uuid::Uuid::new_v4())
}
