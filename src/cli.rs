// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// The binary is a "print bot": give it a seed URL and it crawls from there,
// printing every page it visits. Everything else is optional tuning.
// =============================================================================

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use webbot::{BotConfig, Cookie};

#[derive(Parser, Debug)]
#[command(
    name = "webbot",
    version,
    about = "Crawl a website from a seed URL and print every page visited",
    long_about = "webbot fetches the seed page, follows every absolute http:// link it finds \
                  and prints each page it visits. Work is spread over several workers, one per \
                  CPU by default."
)]
pub struct Cli {
    /// The URL to start crawling from (e.g., http://example.com/)
    pub seed: String,

    /// JSON config file (see BotConfig); flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of workers to run at once, including the seed worker
    #[arg(long)]
    pub parallelism: Option<usize>,

    /// Stop after fetching this many pages in total
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Preset a cookie for a host, as HOST:NAME=VALUE (repeatable)
    ///
    /// All cookies given for one host are sent together.
    /// Example: --cookie www.reddit.com:over18=1
    #[arg(long = "cookie", value_name = "HOST:NAME=VALUE")]
    pub cookies: Vec<String>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print the crawl report as JSON when done
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    // Builds the crawler config: file (or defaults) first, then flags
    pub fn bot_config(&self) -> Result<BotConfig> {
        let mut config = match &self.config {
            Some(path) => BotConfig::load(path)?,
            None => BotConfig::default(),
        };

        if let Some(parallelism) = self.parallelism {
            config.parallelism = Some(parallelism);
        }
        if let Some(max_pages) = self.max_pages {
            config.max_pages = Some(max_pages);
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = timeout;
        }
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }

        Ok(config)
    }

    // Groups the --cookie flags by host, keeping the order they were given in
    pub fn preset_cookies(&self) -> Result<Vec<(String, Vec<Cookie>)>> {
        let mut by_host: Vec<(String, Vec<Cookie>)> = Vec::new();

        for flag in &self.cookies {
            let (host, cookie) = parse_cookie_flag(flag)?;
            match by_host.iter_mut().find(|(h, _)| *h == host) {
                Some((_, cookies)) => cookies.push(cookie),
                None => by_host.push((host, vec![cookie])),
            }
        }

        Ok(by_host)
    }
}

// Parses "host:name=value"
fn parse_cookie_flag(flag: &str) -> Result<(String, Cookie)> {
    let (host, cookie) = flag
        .split_once(':')
        .ok_or_else(|| anyhow!("Invalid --cookie '{}': expected HOST:NAME=VALUE", flag))?;

    if host.is_empty() {
        return Err(anyhow!("Invalid --cookie '{}': missing host", flag));
    }

    let cookie = Cookie::parse(cookie)
        .ok_or_else(|| anyhow!("Invalid --cookie '{}': expected NAME=VALUE after the host", flag))?;

    Ok((host.to_string(), cookie))
}
