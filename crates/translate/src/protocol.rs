//! Deployment classification: which wire protocol a deployment speaks.

use std::fmt;

/// The wire protocols the gateway can speak to an upstream deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Anthropic messages API, `/invoke` style.
    Anthropic,
    /// OpenAI-compatible `/chat/completions`.
    Gpt,
    /// Gemini `generateContent`.
    Gemini,
    /// Orchestration service `/completion`.
    Orchestration,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Anthropic => "anthropic",
            Self::Gpt => "gpt",
            Self::Gemini => "gemini",
            Self::Orchestration => "orchestration",
        };
        f.write_str(name)
    }
}

/// api-version for models that only exist in the preview API.
pub const API_VERSION_PREVIEW: &str = "2024-12-01-preview";
/// api-version for everything else.
pub const API_VERSION_STABLE: &str = "2023-05-15";

/// Model families that accept no sampling parameters. These also happen to
/// be exactly the families served by the preview API.
const REASONING_MARKERS: &[&str] = &["o1", "o3-mini", "gpt-5"];

/// Substrings that route a model to the GPT protocol.
const GPT_MARKERS: &[&str] = &["gpt", "o1", "o3", "openai"];

/// Pick the wire protocol for a deployment from its scenario id and model
/// name. The orchestration scenario wins over any model-name match; an
/// unrecognized model falls back to the Anthropic protocol.
#[must_use]
pub fn classify(scenario_id: Option<&str>, model_name: Option<&str>) -> Protocol {
    if let Some(scenario) = scenario_id
        && scenario.to_ascii_lowercase().contains("orchestration")
    {
        return Protocol::Orchestration;
    }
    let Some(model) = model_name else {
        return Protocol::Anthropic;
    };
    let model = model.to_ascii_lowercase();
    if model.contains("gemini") {
        Protocol::Gemini
    } else if GPT_MARKERS.iter().any(|marker| model.contains(marker)) {
        Protocol::Gpt
    } else {
        Protocol::Anthropic
    }
}

/// Whether a model rejects `max_tokens` / `temperature` / `top_p`.
#[must_use]
pub fn is_reasoning_model(model: &str) -> bool {
    let model = model.to_ascii_lowercase();
    REASONING_MARKERS.iter().any(|marker| model.contains(marker))
}

/// api-version query parameter for a GPT-protocol model.
#[must_use]
pub fn api_version(model: &str) -> &'static str {
    if is_reasoning_model(model) {
        API_VERSION_PREVIEW
    } else {
        API_VERSION_STABLE
    }
}

impl Protocol {
    /// Path (and query) appended to the deployment URL for a chat call.
    #[must_use]
    pub fn endpoint_suffix(self, model: &str, stream: bool) -> String {
        match self {
            Self::Anthropic => "/invoke".to_string(),
            Self::Gpt => format!("/chat/completions?api-version={}", api_version(model)),
            Self::Gemini => {
                let verb = if stream { "streamGenerateContent" } else { "generateContent" };
                format!("/models/{model}:{verb}")
            }
            Self::Orchestration => "/completion".to_string(),
        }
    }
}
