// src/testutil.rs
// =============================================================================
// An in-memory website for crawl tests.
//
// FakeSite maps URLs to HTML bodies. Fetching a known URL returns its body
// with a 200 status, anything else fails with a 404. Every fetch is recorded
// so tests can assert on what was requested and in which order.
// =============================================================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use crate::error::FetchError;
use crate::fetch::{Fetcher, Page};

#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    pages: Arc<HashMap<String, String>>,
    fetched: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    // Builds a site from (url, html) pairs
    pub fn with_pages<'a>(pages: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let pages = pages
            .into_iter()
            .map(|(url, html)| (url.to_string(), html.to_string()))
            .collect();
        Self {
            pages: Arc::new(pages),
            ..Default::default()
        }
    }

    // Makes every fetch yield to the runtime for a while, so that workers
    // on other tasks get a chance to interleave
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetched.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

impl Fetcher for FakeSite {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.pages.get(url) {
            Some(html) => Ok(Page {
                url: url.to_string(),
                status: StatusCode::OK,
                headers: HeaderMap::new(),
                body: Bytes::from(html.clone()),
            }),
            None => Err(FetchError::status(url, 404)),
        }
    }
}

// Builds an HTML page whose anchors point at `links`
pub fn html_with_links(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{link}">{link}</a>"#))
        .collect();
    format!("<html><body>{anchors}</body></html>")
}
