//! Breadth-first frontier with a visited set
//!
//! URLs are served in the order they were discovered. Membership checks for
//! both the queue and the visited set are hash lookups, so a URL is never
//! queued twice and never queued after it has been visited.

use std::collections::{HashSet, VecDeque};

/// FIFO queue of URLs awaiting a fetch, paired with the set of visited URLs
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier holding only `seed`
    pub fn with_seed(seed: impl Into<String>) -> Self {
        let mut frontier = Self::new();
        frontier.push(seed);
        frontier
    }

    /// Appends a URL unless it was already visited or is already waiting
    ///
    /// Returns true if the URL was added.
    pub fn push(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.is_visited(&url) || self.is_queued(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Takes the oldest waiting URL
    pub fn pop(&mut self) -> Option<String> {
        let url = self.queue.pop_front()?;
        self.queued.remove(&url);
        Some(url)
    }

    /// Records a URL as visited
    ///
    /// Returns false if it had been visited before.
    pub fn mark_visited(&mut self, url: impl Into<String>) -> bool {
        self.visited.insert(url.into())
    }

    /// Returns true if the URL has been visited
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Returns true if the URL is waiting in the queue
    pub fn is_queued(&self, url: &str) -> bool {
        self.queued.contains(url)
    }

    /// Number of URLs waiting
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of distinct URLs marked visited
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
