// src/crawl/mod.rs
// =============================================================================
// The crawl engine.
//
// Submodules:
// - worker: One sequential walk from a seed URL through a local queue
// - orchestrator: Fans a crawl out over several workers and waits for them
//
// Both are implemented as methods on Bot, so a crawl is just:
//   let report = bot.start_crawl("http://example.com/").await?;
// =============================================================================

mod orchestrator;
mod worker;

pub use orchestrator::{CrawlReport, WorkerReport};
pub use worker::WorkerStats;
