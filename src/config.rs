// src/config.rs
// =============================================================================
// Runtime configuration.
//
// Sources, lowest priority first:
// 1. Built-in defaults (HarvestConfig::default)
// 2. An optional TOML file passed with --config
// 3. Command-line flags, applied by main.rs
//
// Every field is optional in the file thanks to #[serde(default)], so a file
// containing only `concurrency = 4` is valid.
// =============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Depth bound enforced before a crawl starts
pub const DEFAULT_MAX_DEPTH: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Requests asking for more pages than this are rejected
    pub max_depth: usize,
    /// Maximum concurrent page fetches during scraping
    pub concurrency: usize,
    /// Timeout for a single HTTP request (seconds)
    pub request_timeout_secs: u64,
    /// Budget for a whole crawl plus scrape (seconds)
    pub pipeline_timeout_secs: u64,
    /// Redirects followed before a fetch fails
    pub max_redirects: usize,
    pub user_agent: String,
    /// Address `serve` binds to
    pub listen_addr: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            concurrency: 16,
            request_timeout_secs: 10,
            pipeline_timeout_secs: 40,
            max_redirects: 5,
            user_agent: concat!("site-harvester/", env!("CARGO_PKG_VERSION")).to_string(),
            listen_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

impl HarvestConfig {
    // Loads configuration from a TOML file, or defaults when no path is given
    //
    // A path that was given but cannot be read is an error: silently falling
    // back to defaults would hide a typo in --config.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::from_toml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn pipeline_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline_timeout_secs)
    }
}
