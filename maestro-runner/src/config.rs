//! Serializable deploy-run configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration for a deploy run, loaded from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub platform: PlatformConfig,

    #[serde(default)]
    pub presentation: PresentationConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Remote platform endpoint and credentials.
///
/// The API key itself never lives in the config file — only the name of
/// the environment variable holding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Base URL, e.g. `https://platform.example.com`.
    pub base_url: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Minimum milliseconds between consecutive submissions.
    #[serde(default = "default_min_submit_interval_ms")]
    pub min_submit_interval_ms: u64,
}

/// Display metadata defaults for deployed symphonies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationConfig {
    pub color: String,
    pub tag: String,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            color: "#BF40BF".into(),
            tag: "maestro".into(),
        }
    }
}

/// Artifact output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory that receives one timestamped run directory per batch.
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: "runs".into() }
    }
}

fn default_api_key_env() -> String {
    "MAESTRO_API_KEY".into()
}

fn default_min_submit_interval_ms() -> u64 {
    1_000
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("environment variable '{var}' is not set (it should hold the platform API key)")]
    MissingCredentials { var: String },
}

impl RunConfig {
    /// Load a run configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a run configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        std::env::var(&self.platform.api_key_env).map_err(|_| ConfigError::MissingCredentials {
            var: self.platform.api_key_env.clone(),
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
