// src/bot.rs
// =============================================================================
// The Bot: callbacks plus the state shared by every crawl worker.
//
// A Bot owns:
// - Hooks: what to do when a page is visited, a URL is found, an image is
//   found or a fetch fails, and whether a found URL should be crawled
// - the VisitedSet and the CookieStore (one per bot, shared by its workers)
// - the Fetcher used to download pages
//
// Cloning a Bot is cheap: everything lives behind an Arc, and every clone
// sees the same visited set, cookies and page budget. That is how the
// orchestrator hands the bot to workers running on other tasks.
//
// Callbacks run synchronously on the worker that triggered them, in
// traversal order, and the worker waits for each one to return. A callback
// that wants to do slow work should spawn its own task.
// =============================================================================

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::BotConfig;
use crate::cookies::CookieStore;
use crate::error::{CrawlError, FetchError};
use crate::fetch::{Fetcher, HttpFetcher, Page};
use crate::visited::VisitedSet;

pub type VisitAction = Arc<dyn Fn(&Page) + Send + Sync>;
pub type FoundAction = Arc<dyn Fn(&str) + Send + Sync>;
pub type ImageAction = Arc<dyn Fn(&str) + Send + Sync>;
pub type ErrorAction = Arc<dyn Fn(&FetchError) + Send + Sync>;
pub type VisitDecision = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// The user-replaceable callbacks of a bot.
#[derive(Clone)]
pub struct Hooks {
    pub on_visit: VisitAction,
    pub on_found: FoundAction,
    pub on_image: ImageAction,
    pub on_error: ErrorAction,
    pub should_visit: VisitDecision,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            on_visit: Arc::new(|page: &Page| log::info!("{}", page.url)),
            on_found: Arc::new(|_: &str| {}),
            on_image: Arc::new(|_: &str| {}),
            on_error: Arc::new(|_: &FetchError| {}),
            should_visit: Arc::new(|_: &str| true),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Bot<F = HttpFetcher> {
    pub(crate) hooks: Hooks,
    pub(crate) config: Arc<BotConfig>,
    pub(crate) fetcher: F,
    pub(crate) visited: Arc<VisitedSet>,
    pub(crate) cookies: Arc<CookieStore>,
    pages_fetched: Arc<AtomicUsize>,
}

impl Bot<HttpFetcher> {
    /// A bot with default settings that fetches over HTTP.
    pub fn new() -> Result<Self, CrawlError> {
        Self::with_config(BotConfig::default())
    }

    /// A bot that fetches over HTTP, sending and recording cookies through
    /// its own cookie store.
    pub fn with_config(config: BotConfig) -> Result<Self, CrawlError> {
        let cookies = Arc::new(CookieStore::new());
        let fetcher = HttpFetcher::new(&config, cookies.clone())?;
        Ok(Self::from_parts(fetcher, config, cookies))
    }
}

impl<F: Fetcher> Bot<F> {
    /// A bot using a custom fetcher and a fresh cookie store.
    pub fn with_fetcher(fetcher: F, config: BotConfig) -> Self {
        Self::from_parts(fetcher, config, Arc::new(CookieStore::new()))
    }

    /// A bot using a custom fetcher and an existing cookie store, typically
    /// the same store the fetcher reads from.
    pub fn from_parts(fetcher: F, config: BotConfig, cookies: Arc<CookieStore>) -> Self {
        Self {
            hooks: Hooks::default(),
            config: Arc::new(config),
            fetcher,
            visited: Arc::new(VisitedSet::new()),
            cookies,
            pages_fetched: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn on_visit(mut self, action: impl Fn(&Page) + Send + Sync + 'static) -> Self {
        self.hooks.on_visit = Arc::new(action);
        self
    }

    pub fn on_found(mut self, action: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.hooks.on_found = Arc::new(action);
        self
    }

    pub fn on_image(mut self, action: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.hooks.on_image = Arc::new(action);
        self
    }

    pub fn on_error(mut self, action: impl Fn(&FetchError) + Send + Sync + 'static) -> Self {
        self.hooks.on_error = Arc::new(action);
        self
    }

    /// Decides whether a newly found, non-image URL is queued for crawling.
    /// Rejected URLs are still marked visited and still reported as found.
    pub fn should_visit(mut self, decision: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.hooks.should_visit = Arc::new(decision);
        self
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn cookies(&self) -> &CookieStore {
        &self.cookies
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    // Counts one fetch against the page budget.
    //
    // Returns false once `max_pages` fetches have been made.
    pub(crate) fn reserve_fetch(&self) -> bool {
        let done = self.pages_fetched.fetch_add(1, Ordering::SeqCst);
        match self.config.max_pages {
            Some(max) => done < max,
            None => true,
        }
    }
}
