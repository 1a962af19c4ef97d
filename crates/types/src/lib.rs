//! Core types and traits for the llmux workspace.
//!
//! This crate defines the shared abstractions used across all layers of the
//! llmux gateway: the unified error type, the canonical chat schema, tenant
//! credentials and cached tokens, caller identity and tenant scope, deployment
//! metadata, directory records, and the async traits each layer implements.

pub mod chat;
pub mod credential;
pub mod deployment;
pub mod directory;
pub mod error;
pub mod identity;
pub mod token;
pub mod traits;

pub use chat::{ChatChoice, ChatMessage, ChatRequest, ChatResponse, Usage};
pub use credential::TenantCredential;
pub use deployment::{Deployment, DeploymentListing};
pub use directory::{Group, Organization, Team};
pub use error::{GatewayError, Result};
pub use identity::{CallerIdentity, TeamRole, TenantScope};
pub use token::{CachedToken, EXPIRY_MARGIN_SECS};
pub use traits::{CredentialSource, DeploymentApi, InferenceApi, TeamDirectory, TokenExchanger};
