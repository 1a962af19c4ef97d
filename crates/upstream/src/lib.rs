//! Upstream HTTP clients: deployment CRUD, scope-wide aggregation, and
//! protocol-dispatched inference.
//!
//! [`HttpDeploymentApi`] and [`HttpInferenceClient`] are the only pieces of
//! the workspace that talk to tenant backends; both authenticate every call
//! through [`llmux_auth::TokenBroker`]. [`DeploymentAggregator`] fans the
//! listing call out across a whole tenant scope.

pub mod aggregate;
pub mod api;
pub mod http;
pub mod inference;

pub use aggregate::DeploymentAggregator;
pub use api::HttpDeploymentApi;
pub use http::{RESOURCE_GROUP_HEADER, UpstreamHttp};
pub use inference::HttpInferenceClient;
