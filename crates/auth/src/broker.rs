//! Per-tenant bearer-token cache with single-flight refresh.
//!
//! Lookups take the cache read lock; only an actual refresh takes the write
//! lock, so tenants never contend with each other on the hot path. A
//! per-tenant guard collapses concurrent misses into one upstream exchange:
//! the first caller fetches while the rest wait and then re-read the cache.
//! Tokens are never refreshed proactively; expiry is checked lazily on use.

use crate::CredentialStore;
use llmux_types::{CachedToken, Result, TokenExchanger};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

pub struct TokenBroker {
    credentials: Arc<CredentialStore>,
    exchanger: Arc<dyn TokenExchanger>,
    cache: RwLock<HashMap<String, CachedToken>>,
    flights: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TokenBroker {
    #[must_use]
    pub fn new(credentials: Arc<CredentialStore>, exchanger: Arc<dyn TokenExchanger>) -> Self {
        Self {
            credentials,
            exchanger,
            cache: RwLock::new(HashMap::new()),
            flights: Mutex::new(HashMap::new()),
        }
    }

    /// Return a usable bearer token for the tenant, exchanging client
    /// credentials when nothing fresh is cached.
    ///
    /// # Errors
    ///
    /// Returns [`llmux_types::GatewayError::TenantNotFound`] for a tenant
    /// with no credentials and [`llmux_types::GatewayError::UpstreamAuthFailed`]
    /// when the token endpoint rejects the exchange.
    pub async fn get_token(&self, tenant_id: &str) -> Result<CachedToken> {
        if let Some(token) = self.cached(tenant_id).await {
            return Ok(token);
        }

        let flight = self.flight_guard(tenant_id).await;
        let _held = flight.lock().await;

        // Another caller may have refreshed while we waited for the guard.
        if let Some(token) = self.cached(tenant_id).await {
            return Ok(token);
        }

        let credential = self.credentials.get(tenant_id).await?;
        let token = self.exchanger.exchange(&credential).await?;
        tracing::debug!(
            tenant = %tenant_id,
            remaining_secs = token.remaining_secs(),
            "bearer token refreshed"
        );
        self.cache
            .write()
            .await
            .insert(tenant_id.to_string(), token.clone());
        Ok(token)
    }

    /// Drop a cached token so the next lookup refetches.
    pub async fn invalidate(&self, tenant_id: &str) {
        self.cache.write().await.remove(tenant_id);
    }

    async fn cached(&self, tenant_id: &str) -> Option<CachedToken> {
        let cache = self.cache.read().await;
        cache.get(tenant_id).filter(|t| !t.is_expired()).cloned()
    }

    async fn flight_guard(&self, tenant_id: &str) -> Arc<Mutex<()>> {
        let mut flights = self.flights.lock().await;
        flights.entry(tenant_id.to_string()).or_default().clone()
    }
}
