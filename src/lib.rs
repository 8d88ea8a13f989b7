// src/lib.rs
// =============================================================================
// webbot: a small framework for writing your own web robots.
//
// Give a Bot a seed URL and it will fetch pages, pull out their links, make
// sure each URL is handled once, and tell you about everything it sees
// through callbacks:
//
//   let bot = Bot::new()?
//       .on_visit(|page| println!("{}", page.url))
//       .should_visit(|url| url.starts_with("http://example.com/"));
//   let report = bot.start_crawl("http://example.com/").await?;
//
// Modules (leaves first):
// - extract: Finds links in HTML, spots image URLs
// - cookies: Per-host cookie table used by the HTTP client
// - visited: The shared "already seen" set
// - fetch: The Fetcher trait and its reqwest implementation
// - bot: Callbacks and shared state
// - crawl: Workers and the orchestrator that runs them in parallel
// =============================================================================

pub mod bot;
pub mod config;
pub mod cookies;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod visited;

#[cfg(test)]
mod testutil;

pub use bot::{Bot, Hooks};
pub use config::BotConfig;
pub use cookies::{Cookie, CookieStore};
pub use crawl::{CrawlReport, WorkerReport, WorkerStats};
pub use error::{CrawlError, FetchError, FetchErrorKind};
pub use extract::{extract_links, is_image};
pub use fetch::{Fetcher, HttpFetcher, Page};
pub use visited::VisitedSet;
