//! Tenant-scope resolution for the llmux gateway.
//!
//! [`ScopeResolver`] turns a caller identity into the ordered, deduplicated
//! set of tenants the caller may act on, combining role-derived access
//! (member, lead, group manager, org manager) with tag-derived grants.
//! Lookups go through the [`llmux_types::TeamDirectory`] trait;
//! [`InMemoryDirectory`] is the bundled implementation.

pub mod memory;
pub mod resolver;

pub use memory::{GroupSpec, InMemoryDirectory, OrganizationSpec, Topology};
pub use resolver::ScopeResolver;
