// src/visited.rs
// =============================================================================
// The set of URLs already discovered during one crawl run.
//
// Every worker shares one VisitedSet. The only mutating operation is
// insert(), which checks and marks in a single locked step, so two workers
// that find the same link at the same moment can't both think they were
// first. URLs are compared by exact string equality and are never removed.
// =============================================================================

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    // Marks `url` as present
    //
    // Returns true if this call was the first to see the URL.
    pub fn insert(&self, url: &str) -> bool {
        let mut urls = self.lock();
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
