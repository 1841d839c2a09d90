//! Scheduler for managing the crawl frontier and concurrency
//!
//! This module handles:
//! - Breadth-first frontier of URLs with their link depth
//! - Visited/queued bookkeeping so no URL is fetched twice
//! - Global concurrency limiting via a semaphore

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use url::Url;

/// A URL waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Normalized URL to fetch
    pub url: Url,

    /// Link distance from the entry page (0 for the entry page itself)
    pub depth: u32,
}

/// Scheduler manages the frontier queue and the concurrency limit
///
/// A URL moves from queued to visited when it is handed out in a batch. It is never
/// queued again after that, whichever page links to it.
pub struct Scheduler {
    /// Global semaphore for limiting concurrent page processing
    semaphore: Arc<Semaphore>,

    /// URLs in breadth-first order
    frontier: VecDeque<FrontierEntry>,

    /// Keys of URLs currently in the frontier
    queued: HashSet<String>,

    /// Keys of URLs already handed out
    visited: HashSet<String>,
}

impl Scheduler {
    /// Creates a scheduler allowing `concurrency` pages in flight
    pub fn new(concurrency: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
            frontier: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
        }
    }

    /// Adds a URL to the back of the frontier
    ///
    /// Returns false if the URL was already queued or visited.
    pub fn add_to_frontier(&mut self, url: Url, depth: u32) -> bool {
        let key = url.to_string();
        if self.visited.contains(&key) || self.queued.contains(&key) {
            return false;
        }

        self.queued.insert(key);
        self.frontier.push_back(FrontierEntry { url, depth });
        true
    }

    /// Marks a URL visited without queueing it
    ///
    /// Returns false if it was already visited.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        let key = url.to_string();
        self.queued.remove(&key);
        self.visited.insert(key)
    }

    /// Takes up to `max` entries from the front of the frontier and marks them visited
    pub fn next_batch(&mut self, max: usize) -> Vec<FrontierEntry> {
        let mut batch = Vec::with_capacity(max.min(self.frontier.len()));

        while batch.len() < max {
            let Some(entry) = self.frontier.pop_front() else {
                break;
            };
            let key = entry.url.to_string();
            self.queued.remove(&key);
            if self.visited.insert(key) {
                batch.push(entry);
            }
        }

        batch
    }

    /// Waits for a processing slot
    ///
    /// Returns None only if the semaphore was closed.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.semaphore).acquire_owned().await.ok()
    }

    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://x.com{}", path)).unwrap()
    }

    #[test]
    fn test_scheduler_creation() {
        let scheduler = Scheduler::new(4);
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.frontier_size(), 0);
        assert_eq!(scheduler.semaphore.available_permits(), 4);
    }

    #[test]
    fn test_zero_concurrency_still_allows_one() {
        let scheduler = Scheduler::new(0);
        assert_eq!(scheduler.semaphore.available_permits(), 1);
    }

    #[test]
    fn test_add_to_frontier_deduplicates() {
        let mut scheduler = Scheduler::new(2);
        assert!(scheduler.add_to_frontier(url("/docs/a"), 1));
        assert!(!scheduler.add_to_frontier(url("/docs/a"), 2));
        assert_eq!(scheduler.frontier_size(), 1);
    }

    #[test]
    fn test_batches_are_fifo() {
        let mut scheduler = Scheduler::new(2);
        for path in ["/docs/a", "/docs/b", "/docs/c"] {
            scheduler.add_to_frontier(url(path), 1);
        }

        let first = scheduler.next_batch(2);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].url, url("/docs/a"));
        assert_eq!(first[1].url, url("/docs/b"));

        let second = scheduler.next_batch(2);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].url, url("/docs/c"));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_visited_urls_never_requeued() {
        let mut scheduler = Scheduler::new(2);
        scheduler.add_to_frontier(url("/docs/a"), 0);
        scheduler.next_batch(1);

        assert!(scheduler.visited.contains(url("/docs/a").as_str()));
        assert!(!scheduler.add_to_frontier(url("/docs/a"), 1));
        assert_eq!(scheduler.visited.len(), 1);
    }

    #[test]
    fn test_mark_visited() {
        let mut scheduler = Scheduler::new(2);
        assert!(scheduler.mark_visited(&url("/docs/")));
        assert!(!scheduler.mark_visited(&url("/docs/")));
        assert!(!scheduler.add_to_frontier(url("/docs/"), 1));
    }

    #[tokio::test]
    async fn test_acquire_limits_permits() {
        let scheduler = Scheduler::new(1);
        let permit = scheduler.acquire().await.unwrap();
        assert_eq!(scheduler.semaphore.available_permits(), 0);
        drop(permit);
        assert_eq!(scheduler.semaphore.available_permits(), 1);
    }
}
