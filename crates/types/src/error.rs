//! Unified error type for the llmux workspace.

use thiserror::Error;

/// Enumerates all error kinds that can occur across llmux crates.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The credential blob (or another required configuration input) is
    /// absent or unparseable.
    #[error("configuration missing: {0}")]
    ConfigMissing(String),

    /// No credentials are loaded for the given tenant.
    #[error("credentials not found for tenant: {0}")]
    TenantNotFound(String),

    /// Scope resolution produced no usable tenant for the caller.
    #[error("no tenant scope for caller: {0}")]
    NoTenantScope(String),

    /// The OAuth token endpoint rejected the client-credentials exchange.
    #[error("upstream auth failed: status={status}, body={body}")]
    UpstreamAuthFailed { status: u16, body: String },

    /// An upstream API call returned a non-success status.
    #[error("upstream request failed: status={status}, body={body}")]
    UpstreamRequestFailed { status: u16, body: String },

    /// A 2xx upstream body did not match the expected protocol shape.
    #[error("response decode failed: {0}")]
    DecodeFailed(String),

    /// The deployment does not exist under any reachable tenant.
    #[error("deployment not found: {0}")]
    DeploymentNotFound(String),

    /// The deployment exists, but under a tenant outside the caller's scope.
    #[error("deployment access denied: {0}")]
    DeploymentAccessDenied(String),

    /// HTTP transport error.
    #[error("http error: {0}")]
    Http(String),

    /// JSON serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ── Feature-gated From impls ──────────────────────────────────────────────────

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_tenant_not_found() {
        let err = GatewayError::TenantNotFound("team-a".to_string());
        assert_eq!(err.to_string(), "credentials not found for tenant: team-a");
    }

    #[test]
    fn test_error_display_upstream_request() {
        let err = GatewayError::UpstreamRequestFailed {
            status: 429,
            body: "rate limited".to_string(),
        };
        let s = err.to_string();
        assert!(s.contains("429"));
        assert!(s.contains("rate limited"));
    }

    #[test]
    fn test_error_display_auth() {
        let err = GatewayError::UpstreamAuthFailed {
            status: 401,
            body: "invalid client".to_string(),
        };
        assert!(err.to_string().contains("auth failed"));
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid {{{").unwrap_err();
        let err: GatewayError = json_err.into();
        assert!(matches!(err, GatewayError::Serialization(_)));
    }
}
