// src/fetch.rs
// =============================================================================
// Fetching pages.
//
// The crawler never talks to reqwest directly. It goes through the Fetcher
// trait, so the network can be swapped for an in-memory site in tests.
//
// HttpFetcher is the real implementation:
// - one reqwest Client, reused for every request (connection pooling)
// - our CookieStore is plugged in as the client's cookie provider, so stored
//   cookies for a host are attached to each request and Set-Cookie headers
//   on each response are recorded
// - any non-2xx status counts as a failed fetch
// =============================================================================

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{redirect, Client, StatusCode};

use crate::config::BotConfig;
use crate::cookies::CookieStore;
use crate::error::{CrawlError, FetchError};

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct Page {
    /// The URL that was requested (before any redirect)
    pub url: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Fetches one URL.
pub trait Fetcher: Send + Sync + Clone + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Page, FetchError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &BotConfig, cookies: Arc<CookieStore>) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .redirect(redirect::Policy::limited(config.max_redirects))
            .cookie_provider(cookies)
            .build()
            .map_err(|e| CrawlError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, describe_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(url, status.as_u16()));
        }

        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(url, describe_error(&e)))?;

        Ok(Page {
            url: url.to_string(),
            status,
            headers,
            body,
        })
    }
}

// Turns a reqwest error into a short human-readable reason
fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        "connection failed".to_string()
    } else if error.is_builder() {
        format!("invalid request: {error}")
    } else {
        error.to_string()
    }
}
