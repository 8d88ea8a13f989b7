// src/config.rs
// =============================================================================
// Crawler settings.
//
// Every field has a default, so an empty JSON object `{}` is a valid config
// file. The CLI loads the file (if any) and then applies its own overrides.
// =============================================================================

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Number of workers run at once, including the one on the seed.
    /// `None` means one per CPU.
    #[serde(default)]
    pub parallelism: Option<usize>,

    /// Total number of pages fetched across all workers. `None` is unbounded.
    #[serde(default)]
    pub max_pages: Option<usize>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            max_redirects: default_max_redirects(),
            parallelism: None,
            max_pages: None,
        }
    }
}

impl BotConfig {
    // Reads a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Could not open config file {}", path.display()))?;
        let config = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    // The effective parallelism: configured value, else the CPU count.
    // Never less than 1 (the seed worker always runs).
    pub fn effective_parallelism(&self) -> usize {
        self.parallelism.unwrap_or_else(num_cpus::get).max(1)
    }
}

fn default_user_agent() -> String {
    format!("webbot/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    5
}
