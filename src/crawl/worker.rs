// src/crawl/worker.rs
// =============================================================================
// One crawl worker: a single sequential walk starting from one seed URL.
//
// How it works:
// 1. Fetch the current URL (the seed, at first)
// 2. Call on_visit, then extract the page's links
// 3. For each link the shared VisitedSet hasn't seen yet:
//    - mark it visited and call on_found
//    - if it's an image: call on_image, never queue it
//    - otherwise: queue it if should_visit() agrees
// 4. Pop the next URL off the local queue and repeat until the queue is empty
//
// When a fetch fails we call on_error and fall back to the next queued URL.
// If a fetch fails and the queue is empty, the worker stops with
// CrawlError::FrontierExhausted. Sibling workers are not affected.
//
// The queue (VecDeque) is local to the worker: workers only share the
// VisitedSet, so two workers never crawl the same discovered URL.
// =============================================================================

use std::collections::VecDeque;

use serde::Serialize;

use crate::bot::Bot;
use crate::error::CrawlError;
use crate::extract::{extract_links, is_image};
use crate::fetch::{Fetcher, Page};

/// What one worker did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    /// The URL the worker started from
    pub seed: String,
    pub pages_visited: usize,
    /// URLs this worker discovered first
    pub urls_found: usize,
    pub images_found: usize,
    pub fetch_errors: usize,
    /// The worker stopped because the bot's page budget ran out
    pub budget_exhausted: bool,
}

impl WorkerStats {
    pub fn new(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            ..Default::default()
        }
    }
}

// The full result of a worker run: its stats even when it failed
pub(crate) struct WorkerRun {
    pub stats: WorkerStats,
    pub error: Option<CrawlError>,
}

impl<F: Fetcher> Bot<F> {
    /// Crawls from `seed` until the local queue is empty.
    ///
    /// Fails only when a fetch fails with nothing left in the queue to fall
    /// back on.
    pub async fn crawl(&self, seed: &str) -> Result<WorkerStats, CrawlError> {
        let run = self.run_worker(seed).await;
        match run.error {
            Some(err) => Err(err),
            None => Ok(run.stats),
        }
    }

    pub(crate) async fn run_worker(&self, seed: &str) -> WorkerRun {
        log::debug!("Worker starting at {seed}");

        // The seed counts as discovered: nobody else should queue it again
        self.visited.insert(seed);

        let mut stats = WorkerStats::new(seed);
        let mut queue = VecDeque::new();

        match self.fetch_next(seed.to_string(), &mut queue, &mut stats).await {
            Ok(Some(page)) => self.traverse(page, queue, stats).await,
            Ok(None) => WorkerRun { stats, error: None },
            Err(err) => WorkerRun {
                stats,
                error: Some(err),
            },
        }
    }

    // Walks from an already-fetched page until the queue is empty
    pub(crate) async fn traverse(
        &self,
        first: Page,
        mut queue: VecDeque<String>,
        mut stats: WorkerStats,
    ) -> WorkerRun {
        let mut page = first;

        loop {
            self.visit(&page, &mut queue, &mut stats);

            let Some(next) = queue.pop_front() else {
                break;
            };

            match self.fetch_next(next, &mut queue, &mut stats).await {
                Ok(Some(fetched)) => page = fetched,
                Ok(None) => break,
                Err(err) => {
                    log::warn!("{err}");
                    return WorkerRun {
                        stats,
                        error: Some(err),
                    };
                }
            }
        }

        log::debug!(
            "Worker from {} done: {} page(s), {} new URL(s)",
            stats.seed,
            stats.pages_visited,
            stats.urls_found
        );
        WorkerRun { stats, error: None }
    }

    // Fetches `url`, falling back to queued URLs while fetches fail
    //
    // Returns:
    //   Ok(Some(page)) = a fetch succeeded
    //   Ok(None)       = the page budget is spent, stop normally
    //   Err(..)        = a fetch failed and the queue is empty
    async fn fetch_next(
        &self,
        url: String,
        queue: &mut VecDeque<String>,
        stats: &mut WorkerStats,
    ) -> Result<Option<Page>, CrawlError> {
        let mut current = url;

        loop {
            if !self.reserve_fetch() {
                log::debug!("Page budget spent, worker from {} stops", stats.seed);
                stats.budget_exhausted = true;
                return Ok(None);
            }

            match self.fetcher.fetch(&current).await {
                Ok(page) => return Ok(Some(page)),
                Err(err) => {
                    log::warn!("{err}");
                    stats.fetch_errors += 1;
                    (self.hooks.on_error)(&err);

                    match queue.pop_front() {
                        Some(next) => current = next,
                        None => {
                            return Err(CrawlError::FrontierExhausted {
                                seed: stats.seed.clone(),
                                last_url: current,
                            })
                        }
                    }
                }
            }
        }
    }

    // Handles one successfully fetched page
    fn visit(&self, page: &Page, queue: &mut VecDeque<String>, stats: &mut WorkerStats) {
        stats.pages_visited += 1;
        (self.hooks.on_visit)(page);

        for url in extract_links(&page.body) {
            self.discover(url, queue, stats);
        }
    }

    // Records a link found on a page, queueing it if it should be crawled
    //
    // Returns true if the URL was queued.
    pub(crate) fn discover(
        &self,
        url: String,
        queue: &mut VecDeque<String>,
        stats: &mut WorkerStats,
    ) -> bool {
        if !self.visited.insert(&url) {
            return false;
        }

        stats.urls_found += 1;
        (self.hooks.on_found)(&url);

        if is_image(&url) {
            stats.images_found += 1;
            (self.hooks.on_image)(&url);
            false
        } else if (self.hooks.should_visit)(&url) {
            queue.push_back(url);
            true
        } else {
            false
        }
    }
}
