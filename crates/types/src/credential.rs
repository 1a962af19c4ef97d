//! Per-tenant OAuth2 client credentials.

use crate::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Everything needed to authenticate against one tenant's upstream:
/// the OAuth2 client-credentials pair, the token endpoint, the tenant API
/// base, and the resource-group header value.
///
/// Immutable once loaded. The full set for a process arrives as a single
/// JSON array (see [`TenantCredential::parse_blob`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantCredential {
    pub tenant_id: String,
    pub oauth_client_id: String,
    pub oauth_client_secret: String,
    pub oauth_token_url: String,
    pub api_base_url: String,
    pub resource_group: String,
}

impl TenantCredential {
    /// Parse the one-blob credential set: a JSON array of credential
    /// records, keyed by `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigMissing`] if the blob is not a valid
    /// JSON array of credential records. An empty array parses to an empty
    /// map; lookups then fail per tenant, not at load time.
    pub fn parse_blob(blob: &str) -> Result<HashMap<String, Self>> {
        let records: Vec<Self> = serde_json::from_str(blob)
            .map_err(|e| GatewayError::ConfigMissing(format!("credential blob: {e}")))?;
        Ok(records
            .into_iter()
            .map(|c| (c.tenant_id.clone(), c))
            .collect())
    }
}
