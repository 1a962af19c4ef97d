//! Credential loading and bearer-token brokering.
//!
//! [`CredentialStore`] performs the one-shot lazy load of per-tenant OAuth2
//! client credentials; [`TokenBroker`] exchanges them for bearer tokens via a
//! [`llmux_types::TokenExchanger`] and caches the tokens until a
//! margin-adjusted expiry.

pub mod broker;
pub mod credentials;
pub mod exchange;

pub use broker::TokenBroker;
pub use credentials::{
    CredentialStore, EnvCredentialSource, FileCredentialSource, StaticCredentialSource,
};
pub use exchange::HttpTokenExchanger;
