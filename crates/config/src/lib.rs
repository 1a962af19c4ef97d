//! Configuration loading for the llmux gateway.
//!
//! Uses figment for YAML-based configuration with sensible defaults and
//! `LLMUX_`-prefixed environment overrides.

pub mod schema;

pub use schema::Settings;
