//! Operator settings stored as TOML.
//!
//! ```toml
//! endpoints = ["https://api.mainnet-beta.solana.com"]
//! timeout_ms = 10000
//! batching = true
//! patterns = "/path/to/patterns.json"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use bytelens::config::{DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT};
use bytelens::{Endpoint, EngineConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub endpoints: Vec<String>,
    pub timeout_ms: u64,
    pub batching: bool,
    pub batch_size: Option<usize>,
    pub patterns: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoints: vec![DEFAULT_ENDPOINT.to_string()],
            timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            batching: false,
            batch_size: None,
            patterns: None,
        }
    }
}

pub fn default_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Failed to determine config directory")?;
    Ok(config_dir.join("bytelens").join("settings.toml"))
}

impl Settings {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse settings")
    }

    /// Load from `path`, or from the default location.
    ///
    /// An explicit path must exist; a missing default file falls back to
    /// built-in settings.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            let settings = Self::parse(&content)?;
            info!("Loaded settings from {}", path.display());
            return Ok(settings);
        }

        let path = default_path()?;
        match fs::read_to_string(&path) {
            Ok(content) => {
                let settings = Self::parse(&content)?;
                info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) => {
                warn!(
                    "No settings at {} ({}), using defaults",
                    path.display(),
                    e
                );
                Ok(Self::default())
            }
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        let mut builder = EngineConfig::builder()
            .endpoints(self.endpoints.iter().map(Endpoint::new))
            .request_timeout(Duration::from_millis(self.timeout_ms))
            .batching(self.batching);
        if let Some(size) = self.batch_size {
            builder = builder.batch_size(size);
        }
        builder.build()
    }
}
