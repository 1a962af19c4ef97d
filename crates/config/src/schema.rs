use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_credentials_env() -> String {
    "LLMUX_TENANT_KEYS".to_string()
}
fn default_metadata_timeout_secs() -> u64 {
    30
}
fn default_inference_timeout_secs() -> u64 {
    300
}

/// Top-level gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Name of the environment variable holding the tenant-credential blob
    /// (defaults to `LLMUX_TENANT_KEYS`).
    #[serde(default = "default_credentials_env")]
    pub credentials_env: String,
    /// Optional file holding the credential blob; takes precedence over the
    /// environment variable when set.
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,
    /// Optional YAML file describing the org → group → team topology for the
    /// in-memory directory (CLI and test use).
    #[serde(default)]
    pub directory_file: Option<PathBuf>,
    /// Timeout for deployment-metadata and token calls (defaults to 30).
    #[serde(default = "default_metadata_timeout_secs")]
    pub metadata_timeout_secs: u64,
    /// Timeout for inference calls (defaults to 300; large-model generation
    /// takes tens of seconds).
    #[serde(default = "default_inference_timeout_secs")]
    pub inference_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credentials_env: default_credentials_env(),
            credentials_file: None,
            directory_file: None,
            metadata_timeout_secs: default_metadata_timeout_secs(),
            inference_timeout_secs: default_inference_timeout_secs(),
        }
    }
}

impl Settings {
    /// Parses configuration from a YAML string, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the YAML is invalid or extraction fails.
    #[allow(clippy::result_large_err)]
    pub fn from_yaml(yaml: &str) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Yaml::string(yaml))
            .extract()
    }

    /// Loads configuration from a file path, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn from_file(path: &Path) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Yaml::file(path))
            .extract()
    }

    /// Loads configuration for the binary: defaults, then the optional YAML
    /// file, then `LLMUX_`-prefixed environment overrides.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if any layer fails to parse or extract.
    #[allow(clippy::result_large_err)]
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Env, Format as _, Serialized, Yaml},
        };
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let settings: Self = figment
            .merge(Env::prefixed("LLMUX_").ignore(&["TENANT_KEYS"]))
            .extract()?;
        tracing::debug!(
            metadata_timeout_secs = settings.metadata_timeout_secs,
            inference_timeout_secs = settings.inference_timeout_secs,
            "settings loaded"
        );
        Ok(settings)
    }

    /// Timeout for deployment-metadata and token calls.
    #[must_use]
    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs)
    }

    /// Timeout for inference calls.
    #[must_use]
    pub fn inference_timeout(&self) -> Duration {
        Duration::from_secs(self.inference_timeout_secs)
    }
}
