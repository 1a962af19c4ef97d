//! Tenant credential store with one-shot lazy loading.
//!
//! The full credential set arrives as a single JSON blob from a
//! [`CredentialSource`]. The first lookup triggers the load; concurrent first
//! callers block on the same cell and share the result. The result is cached
//! for the process lifetime **including failures**: a broken blob keeps
//! failing every lookup until the process restarts, which surfaces a bad
//! deploy instead of letting it limp along half-configured.

use llmux_types::{CredentialSource, GatewayError, Result, TenantCredential};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Reads the credential blob from an environment variable.
pub struct EnvCredentialSource {
    var: String,
}

impl EnvCredentialSource {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialSource for EnvCredentialSource {
    fn fetch(&self) -> Result<String> {
        std::env::var(&self.var).map_err(|_| {
            GatewayError::ConfigMissing(format!("environment variable {} not set", self.var))
        })
    }
}

/// Reads the credential blob from a file.
pub struct FileCredentialSource {
    path: PathBuf,
}

impl FileCredentialSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSource for FileCredentialSource {
    fn fetch(&self) -> Result<String> {
        std::fs::read_to_string(&self.path).map_err(|e| {
            GatewayError::ConfigMissing(format!(
                "credential file {}: {e}",
                self.path.display()
            ))
        })
    }
}

/// A fixed in-memory blob, for tests and embedding.
pub struct StaticCredentialSource {
    blob: String,
}

impl StaticCredentialSource {
    pub fn new(blob: impl Into<String>) -> Self {
        Self { blob: blob.into() }
    }
}

impl CredentialSource for StaticCredentialSource {
    fn fetch(&self) -> Result<String> {
        Ok(self.blob.clone())
    }
}

/// Lazily loaded, process-lifetime map of tenant credentials.
pub struct CredentialStore {
    source: Arc<dyn CredentialSource>,
    // Failures are cached too; see the module docs.
    cell: OnceCell<std::result::Result<HashMap<String, TenantCredential>, String>>,
}

impl CredentialStore {
    #[must_use]
    pub fn new(source: Arc<dyn CredentialSource>) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    /// Look up one tenant's credentials.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigMissing`] if the blob never loaded and
    /// [`GatewayError::TenantNotFound`] if the tenant has no entry.
    pub async fn get(&self, tenant_id: &str) -> Result<TenantCredential> {
        self.load()
            .await?
            .get(tenant_id)
            .cloned()
            .ok_or_else(|| GatewayError::TenantNotFound(tenant_id.to_string()))
    }

    /// The ids of all loaded tenants, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigMissing`] if the blob never loaded.
    pub async fn tenant_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.load().await?.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn load(&self) -> Result<&HashMap<String, TenantCredential>> {
        let cached = self
            .cell
            .get_or_init(|| async {
                match self
                    .source
                    .fetch()
                    .and_then(|blob| TenantCredential::parse_blob(&blob))
                {
                    Ok(map) => {
                        tracing::info!(tenants = map.len(), "tenant credentials loaded");
                        Ok(map)
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "tenant credential load failed");
                        Err(match e {
                            GatewayError::ConfigMissing(reason) => reason,
                            other => other.to_string(),
                        })
                    }
                }
            })
            .await;
        match cached {
            Ok(map) => Ok(map),
            Err(reason) => Err(GatewayError::ConfigMissing(reason.clone())),
        }
    }
}
