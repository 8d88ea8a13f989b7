// src/crawl/orchestrator.rs
// =============================================================================
// Starting a crawl: fan out from the seed page to several parallel workers.
//
// How it works:
// 1. Fetch the seed page once
// 2. Walk its links in document order, recording each new one (on_found /
//    on_image), and pick up to P-1 crawlable links as roots for new workers,
//    where P is the configured parallelism (one per CPU by default)
// 3. Spawn one worker task per root
// 4. Continue crawling from the seed page on the calling task (this worker
//    queues whatever links the roots didn't take)
// 5. Wait for every spawned worker before returning the report
//
// A worker that fails does not stop the others. Its failure is recorded in
// the report and the caller decides what to do about it.
// =============================================================================

use std::collections::VecDeque;

use serde::Serialize;

use crate::bot::Bot;
use crate::crawl::worker::{WorkerRun, WorkerStats};
use crate::error::CrawlError;
use crate::extract::extract_links;
use crate::fetch::{Fetcher, Page};

/// How one worker ended.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerReport {
    #[serde(flatten)]
    pub stats: WorkerStats,
    /// Set when the worker stopped on an error instead of an empty queue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkerReport {
    fn from_run(run: WorkerRun) -> Self {
        Self {
            stats: run.stats,
            error: run.error.map(|e| e.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// The outcome of a whole crawl. The seed worker comes first.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub seed: String,
    pub workers: Vec<WorkerReport>,
}

impl CrawlReport {
    pub fn pages_visited(&self) -> usize {
        self.workers.iter().map(|w| w.stats.pages_visited).sum()
    }

    pub fn urls_found(&self) -> usize {
        self.workers.iter().map(|w| w.stats.urls_found).sum()
    }

    pub fn images_found(&self) -> usize {
        self.workers.iter().map(|w| w.stats.images_found).sum()
    }

    pub fn fetch_errors(&self) -> usize {
        self.workers.iter().map(|w| w.stats.fetch_errors).sum()
    }

    pub fn failed_workers(&self) -> usize {
        self.workers.iter().filter(|w| !w.is_ok()).count()
    }

    /// True when every worker drained its queue without a terminal failure
    pub fn is_complete(&self) -> bool {
        self.failed_workers() == 0
    }
}

impl<F: Fetcher> Bot<F> {
    /// Crawls from `seed` with up to `parallelism` workers and waits for all
    /// of them to finish.
    ///
    /// Fails only if the seed page itself can't be fetched.
    pub async fn start_crawl(&self, seed: &str) -> Result<CrawlReport, CrawlError> {
        log::info!("Starting crawl at {seed}");

        self.visited.insert(seed);
        // The seed is always fetched, even with a budget of zero, but it still
        // uses up one page of that budget
        let _ = self.reserve_fetch();

        let page = match self.fetcher.fetch(seed).await {
            Ok(page) => page,
            Err(err) => {
                log::error!("{err}");
                (self.hooks.on_error)(&err);
                return Err(CrawlError::Seed(err));
            }
        };

        let parallelism = self.config.effective_parallelism();
        let mut seed_stats = WorkerStats::new(seed);
        let roots = self.pick_roots(&page, parallelism - 1, &mut seed_stats);
        log::debug!(
            "Spawning {} worker(s) alongside the seed worker (parallelism {parallelism})",
            roots.len()
        );

        let handles: Vec<_> = roots
            .into_iter()
            .map(|root| {
                let bot = self.clone();
                let task_root = root.clone();
                let handle = tokio::spawn(async move { bot.run_worker(&task_root).await });
                (root, handle)
            })
            .collect();

        // The seed worker picks up from the page we already have
        let seed_run = self.traverse(page, VecDeque::new(), seed_stats).await;

        let mut workers = vec![WorkerReport::from_run(seed_run)];
        for (root, handle) in handles {
            let report = match handle.await {
                Ok(run) => WorkerReport::from_run(run),
                Err(e) => WorkerReport {
                    stats: WorkerStats::new(&root),
                    error: Some(CrawlError::Join(e.to_string()).to_string()),
                },
            };
            workers.push(report);
        }

        let report = CrawlReport {
            seed: seed.to_string(),
            workers,
        };
        log::info!(
            "Crawl from {} finished: {} page(s) visited, {} URL(s) found, {} failed worker(s)",
            report.seed,
            report.pages_visited(),
            report.urls_found(),
            report.failed_workers()
        );
        Ok(report)
    }

    // Records the seed page's links and chooses at most `max_roots` of the
    // crawlable ones to start workers from. Links past the last chosen root
    // are left untouched for the seed worker to discover.
    fn pick_roots(&self, page: &Page, max_roots: usize, stats: &mut WorkerStats) -> Vec<String> {
        if max_roots == 0 {
            return Vec::new();
        }

        let mut roots = VecDeque::new();
        for url in extract_links(&page.body) {
            self.discover(url, &mut roots, stats);
            if roots.len() == max_roots {
                break;
            }
        }

        roots.into()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::config::BotConfig;
    use crate::testutil::{html_with_links, FakeSite};

    fn config(parallelism: usize) -> BotConfig {
        BotConfig {
            parallelism: Some(parallelism),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_seed_failure_is_an_error() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let errors_c = errors.clone();
        let bot = Bot::with_fetcher(FakeSite::new(), config(4))
            .on_error(move |err| errors_c.lock().unwrap().push(err.url.clone()));

        let err = bot.start_crawl("http://gone.com/").await.unwrap_err();

        assert!(matches!(err, CrawlError::Seed(ref e) if e.url == "http://gone.com/"));
        assert_eq!(*errors.lock().unwrap(), vec!["http://gone.com/"]);
    }

    #[tokio::test]
    async fn test_spawns_up_to_parallelism_minus_one_workers() {
        let root = html_with_links(&[
            "http://a.com/1",
            "http://a.com/2",
            "http://a.com/3",
            "http://a.com/4",
        ]);
        let site = FakeSite::with_pages([
            ("http://a.com/", root.as_str()),
            ("http://a.com/1", ""),
            ("http://a.com/2", ""),
            ("http://a.com/3", ""),
            ("http://a.com/4", ""),
        ]);
        let bot = Bot::with_fetcher(site.clone(), config(3));

        let report = bot.start_crawl("http://a.com/").await.unwrap();

        let seeds: Vec<_> = report.workers.iter().map(|w| w.stats.seed.as_str()).collect();
        assert_eq!(seeds, vec!["http://a.com/", "http://a.com/1", "http://a.com/2"]);
        assert!(report.is_complete());
        // Every page fetched exactly once, the seed included
        assert_eq!(report.pages_visited(), 5);
        for url in [
            "http://a.com/",
            "http://a.com/1",
            "http://a.com/2",
            "http://a.com/3",
            "http://a.com/4",
        ] {
            assert_eq!(site.fetch_count(url), 1, "{url}");
        }
    }

    #[tokio::test]
    async fn test_fewer_links_than_parallelism() {
        let root = html_with_links(&["http://a.com/only"]);
        let site = FakeSite::with_pages([
            ("http://a.com/", root.as_str()),
            ("http://a.com/only", ""),
        ]);
        let bot = Bot::with_fetcher(site, config(8));

        let report = bot.start_crawl("http://a.com/").await.unwrap();

        assert_eq!(report.workers.len(), 2);
        assert_eq!(report.pages_visited(), 2);
    }

    #[tokio::test]
    async fn test_parallelism_one_runs_only_the_seed_worker() {
        let root = html_with_links(&["http://a.com/1", "http://a.com/2"]);
        let site = FakeSite::with_pages([
            ("http://a.com/", root.as_str()),
            ("http://a.com/1", ""),
            ("http://a.com/2", ""),
        ]);
        let bot = Bot::with_fetcher(site.clone(), config(1));

        let report = bot.start_crawl("http://a.com/").await.unwrap();

        assert_eq!(report.workers.len(), 1);
        assert_eq!(report.workers[0].stats.pages_visited, 3);
        assert_eq!(site.fetch_count("http://a.com/"), 1);
    }

    #[tokio::test]
    async fn test_images_are_not_worker_roots() {
        let root = html_with_links(&["http://a.com/logo.png", "http://a.com/page"]);
        let site = FakeSite::with_pages([
            ("http://a.com/", root.as_str()),
            ("http://a.com/page", ""),
        ]);
        let images = Arc::new(Mutex::new(Vec::new()));
        let images_c = images.clone();
        let bot = Bot::with_fetcher(site.clone(), config(4))
            .on_image(move |url| images_c.lock().unwrap().push(url.to_string()));

        let report = bot.start_crawl("http://a.com/").await.unwrap();

        assert_eq!(*images.lock().unwrap(), vec!["http://a.com/logo.png"]);
        assert_eq!(site.fetch_count("http://a.com/logo.png"), 0);
        assert_eq!(report.workers.len(), 2);
        assert_eq!(report.images_found(), 1);
        assert_eq!(report.urls_found(), 2);
    }

    #[tokio::test]
    async fn test_waits_for_every_worker() {
        // Each root leads to a chain of pages; all of them must be visited
        // by the time start_crawl returns
        let root = html_with_links(&["http://a.com/x", "http://a.com/y"]);
        let x = html_with_links(&["http://a.com/x/1"]);
        let x1 = html_with_links(&["http://a.com/x/2"]);
        let y = html_with_links(&["http://a.com/y/1"]);
        let site = FakeSite::with_pages([
            ("http://a.com/", root.as_str()),
            ("http://a.com/x", x.as_str()),
            ("http://a.com/x/1", x1.as_str()),
            ("http://a.com/x/2", ""),
            ("http://a.com/y", y.as_str()),
            ("http://a.com/y/1", ""),
        ])
        .with_delay(std::time::Duration::from_millis(5));
        let visits = Arc::new(Mutex::new(Vec::new()));
        let visits_c = visits.clone();
        let bot = Bot::with_fetcher(site, config(3))
            .on_visit(move |page| visits_c.lock().unwrap().push(page.url.clone()));

        let report = bot.start_crawl("http://a.com/").await.unwrap();

        assert_eq!(report.pages_visited(), 6);
        assert_eq!(visits.lock().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_failed_worker_does_not_stop_siblings() {
        let root = html_with_links(&["http://a.com/dead", "http://a.com/alive"]);
        let alive = html_with_links(&["http://a.com/alive/next"]);
        let site = FakeSite::with_pages([
            ("http://a.com/", root.as_str()),
            ("http://a.com/alive", alive.as_str()),
            ("http://a.com/alive/next", ""),
        ]);
        let bot = Bot::with_fetcher(site, config(3));

        let report = bot.start_crawl("http://a.com/").await.unwrap();

        assert_eq!(report.failed_workers(), 1);
        assert!(!report.is_complete());
        let dead = report
            .workers
            .iter()
            .find(|w| w.stats.seed == "http://a.com/dead")
            .unwrap();
        assert!(dead.error.as_deref().unwrap().contains("http://a.com/dead"));
        assert_eq!(report.pages_visited(), 3);
    }

    #[tokio::test]
    async fn test_rejected_link_is_found_but_never_crawled() {
        let root = html_with_links(&["http://other.com/out", "http://a.com/in"]);
        let site = FakeSite::with_pages([
            ("http://a.com/", root.as_str()),
            ("http://a.com/in", ""),
            ("http://other.com/out", ""),
        ]);
        let found = Arc::new(Mutex::new(Vec::new()));
        let found_c = found.clone();
        let bot = Bot::with_fetcher(site.clone(), config(3))
            .on_found(move |url| found_c.lock().unwrap().push(url.to_string()))
            .should_visit(|url| url.starts_with("http://a.com/"));

        let report = bot.start_crawl("http://a.com/").await.unwrap();

        assert_eq!(site.fetch_count("http://other.com/out"), 0);
        let seeds: Vec<_> = report.workers.iter().map(|w| w.stats.seed.as_str()).collect();
        assert_eq!(seeds, vec!["http://a.com/", "http://a.com/in"]);
        let found = found.lock().unwrap();
        assert_eq!(found.iter().filter(|u| *u == "http://other.com/out").count(), 1);
        assert!(bot.visited().contains("http://other.com/out"));
        assert_eq!(report.urls_found(), 2);
        assert_eq!(report.pages_visited(), 2);
    }

    #[tokio::test]
    async fn test_seed_is_fetched_with_zero_page_budget() {
        let root = html_with_links(&["http://a.com/1"]);
        let site = FakeSite::with_pages([("http://a.com/", root.as_str()), ("http://a.com/1", "")]);
        let config = BotConfig {
            parallelism: Some(1),
            max_pages: Some(0),
            ..Default::default()
        };
        let bot = Bot::with_fetcher(site.clone(), config);

        let report = bot.start_crawl("http://a.com/").await.unwrap();

        assert_eq!(site.fetched(), vec!["http://a.com/"]);
        assert_eq!(report.workers.len(), 1);
        assert_eq!(report.workers[0].stats.pages_visited, 1);
        assert!(report.workers[0].stats.budget_exhausted);
        assert!(report.is_complete());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_worker_reports_keep_their_root() {
        let root = html_with_links(&["http://a.com/x", "http://a.com/y"]);
        let site = FakeSite::with_pages([
            ("http://a.com/", root.as_str()),
            ("http://a.com/x", ""),
            ("http://a.com/y", ""),
        ]);
        let bot = Bot::with_fetcher(site, config(3));

        let report = bot.start_crawl("http://a.com/").await.unwrap();

        let seeds: Vec<_> = report.workers.iter().map(|w| w.stats.seed.as_str()).collect();
        assert_eq!(seeds, vec!["http://a.com/", "http://a.com/x", "http://a.com/y"]);
        assert_eq!(report.pages_visited(), 3);
    }

    #[tokio::test]
    async fn test_report_serializes() {
        let site = FakeSite::with_pages([("http://a.com/", "")]);
        let bot = Bot::with_fetcher(site, config(2));

        let report = bot.start_crawl("http://a.com/").await.unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["seed"], "http://a.com/");
        assert_eq!(json["workers"][0]["pages_visited"], 1);
        assert!(json["workers"][0].get("error").is_none());
    }
}
