//! The gateway facade: one object per process that ties scope resolution,
//! deployment aggregation, lifecycle calls and inference together.
//!
//! Every operation takes the caller's [`CallerIdentity`] and enforces the
//! resolved tenant scope before anything touches an upstream. Construction
//! is either [`Gateway::from_settings`] for the real HTTP stack or
//! [`Gateway::new`] with injected trait objects, which is how the tests run
//! the full flow without a network.

mod inference;
mod lifecycle;
#[cfg(test)]
pub(crate) mod testutil;

use llmux_auth::{
    CredentialStore, EnvCredentialSource, FileCredentialSource, HttpTokenExchanger, TokenBroker,
};
use llmux_config::Settings;
use llmux_scope::{InMemoryDirectory, ScopeResolver};
use llmux_types::{
    CallerIdentity, CredentialSource, DeploymentApi, DeploymentListing, GatewayError,
    InferenceApi, Result, TeamDirectory, TenantScope,
};
use llmux_upstream::{DeploymentAggregator, HttpDeploymentApi, HttpInferenceClient, UpstreamHttp};
use std::sync::Arc;

pub struct Gateway {
    resolver: ScopeResolver,
    aggregator: DeploymentAggregator,
    credentials: Arc<CredentialStore>,
    api: Arc<dyn DeploymentApi>,
    inference: Arc<dyn InferenceApi>,
}

impl Gateway {
    #[must_use]
    pub fn new(
        directory: Arc<dyn TeamDirectory>,
        credentials: Arc<CredentialStore>,
        api: Arc<dyn DeploymentApi>,
        inference: Arc<dyn InferenceApi>,
    ) -> Self {
        Self {
            resolver: ScopeResolver::new(directory),
            aggregator: DeploymentAggregator::new(credentials.clone(), api.clone()),
            credentials,
            api,
            inference,
        }
    }

    /// Wire the full HTTP stack from settings.
    ///
    /// The team directory comes from `directory_file` when set and is empty
    /// otherwise; member and lead callers work without one, since their
    /// scope needs no directory lookups. Credentials load from
    /// `credentials_file` when set, else from the `credentials_env`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigMissing`] when the directory topology
    /// file cannot be read.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let directory: Arc<dyn TeamDirectory> = match &settings.directory_file {
            Some(path) => Arc::new(InMemoryDirectory::from_yaml_file(path).map_err(|e| {
                GatewayError::ConfigMissing(format!("directory topology: {e}"))
            })?),
            None => Arc::new(InMemoryDirectory::default()),
        };

        let source: Arc<dyn CredentialSource> = match &settings.credentials_file {
            Some(path) => Arc::new(FileCredentialSource::new(path)),
            None => Arc::new(EnvCredentialSource::new(&settings.credentials_env)),
        };
        let credentials = Arc::new(CredentialStore::new(source));

        let http_client = reqwest::Client::new();
        let exchanger = Arc::new(HttpTokenExchanger::new(
            http_client.clone(),
            settings.metadata_timeout(),
        ));
        let broker = Arc::new(TokenBroker::new(credentials.clone(), exchanger));

        let http = UpstreamHttp::new(http_client);
        let api: Arc<dyn DeploymentApi> = Arc::new(HttpDeploymentApi::new(
            http.clone(),
            credentials.clone(),
            broker.clone(),
            settings.metadata_timeout(),
        ));
        let inference: Arc<dyn InferenceApi> = Arc::new(HttpInferenceClient::new(
            http,
            credentials.clone(),
            broker,
            settings.inference_timeout(),
        ));

        Ok(Self::new(directory, credentials, api, inference))
    }

    /// The caller's resolved tenant scope.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NoTenantScope`] when the identity maps to no
    /// tenant at all.
    pub async fn scope_for(&self, identity: &CallerIdentity) -> Result<TenantScope> {
        self.resolver.resolve(identity).await
    }

    /// Every deployment the caller can reach, keyed by tenant.
    ///
    /// # Errors
    ///
    /// Fails when scope resolution fails or the credential blob cannot be
    /// loaded; individual tenant outages only shrink the listing.
    pub async fn list_deployments(&self, identity: &CallerIdentity) -> Result<DeploymentListing> {
        let scope = self.resolver.resolve(identity).await?;
        tracing::debug!(
            user = %identity.username,
            tenants = scope.len(),
            "listing deployments across scope"
        );
        self.aggregator.list_all(&scope).await
    }
}
