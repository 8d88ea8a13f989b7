// src/error.rs
// =============================================================================
// Error types for the crawl engine.
//
// - FetchError: one page could not be fetched (network problem or a non-2xx
//   status). These are recoverable: a worker reports them and moves on.
// - CrawlError: a whole crawl, or one worker, could not continue.
// =============================================================================

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Why a fetch failed. All kinds are handled the same way by the crawler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// Transport-level failure (DNS, connect, TLS, timeout, body read)
    Transport(String),
    /// The server answered with a non-success status code
    Status(u16),
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchErrorKind::Transport(msg) => write!(f, "{msg}"),
            FetchErrorKind::Status(code) => write!(f, "HTTP {code}"),
        }
    }
}

/// A failed fetch, carrying the URL that was requested.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("failed to fetch {url}: {kind}")]
pub struct FetchError {
    pub url: String,
    pub kind: FetchErrorKind,
}

impl FetchError {
    pub fn transport(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: FetchErrorKind::Transport(msg.into()),
        }
    }

    pub fn status(url: impl Into<String>, code: u16) -> Self {
        Self {
            url: url.into(),
            kind: FetchErrorKind::Status(code),
        }
    }
}

#[derive(Debug, Error)]
pub enum CrawlError {
    /// The seed page could not be fetched, so there is nothing to crawl.
    #[error("seed unreachable: {0}")]
    Seed(#[source] FetchError),

    /// A worker's current fetch failed and its queue had nothing left to try.
    #[error("worker for {seed} ran out of URLs to try, last failure at {last_url}")]
    FrontierExhausted { seed: String, last_url: String },

    /// A spawned worker task panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Join(String),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),
}
