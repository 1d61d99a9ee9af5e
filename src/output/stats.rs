//! Statistics for a single crawl run
//!
//! Counts are gathered by the coordinator as pages are processed and printed by
//! the command-line interface when the run ends.

use crate::state::PageOutcome;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// When the crawl loop started
    pub started_at: DateTime<Utc>,

    /// When the crawl loop exited
    pub finished_at: Option<DateTime<Utc>>,

    /// Count of dequeued URLs by outcome
    pub pages_by_outcome: HashMap<PageOutcome, u64>,

    /// Total number of links appended to the frontier
    pub links_enqueued: u64,

    /// URLs still waiting in the frontier when the loop exited
    pub frontier_remaining: usize,

    /// True if the run stopped because of a cancellation request
    pub cancelled: bool,
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlStatistics {
    /// Creates empty statistics stamped with the current time
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            pages_by_outcome: HashMap::new(),
            links_enqueued: 0,
            frontier_remaining: 0,
            cancelled: false,
        }
    }

    /// Records the outcome of one dequeued URL
    pub fn record(&mut self, outcome: PageOutcome) {
        *self.pages_by_outcome.entry(outcome).or_insert(0) += 1;
    }

    /// Returns the count for a single outcome
    pub fn count(&self, outcome: PageOutcome) -> u64 {
        self.pages_by_outcome.get(&outcome).copied().unwrap_or(0)
    }

    /// Number of fetch attempts (every outcome except an already-visited skip)
    pub fn pages_requested(&self) -> u64 {
        self.pages_by_outcome
            .iter()
            .filter(|(outcome, _)| **outcome != PageOutcome::AlreadyVisited)
            .map(|(_, count)| count)
            .sum()
    }

    /// Number of pages whose body was retrieved
    pub fn pages_fetched(&self) -> u64 {
        self.sum_where(PageOutcome::was_fetched)
    }

    /// Number of records produced
    pub fn records(&self) -> u64 {
        self.sum_where(PageOutcome::produced_record)
    }

    /// Number of fetch failures
    pub fn errors(&self) -> u64 {
        self.sum_where(PageOutcome::is_error)
    }

    fn sum_where(&self, predicate: impl Fn(&PageOutcome) -> bool) -> u64 {
        self.pages_by_outcome
            .iter()
            .filter(|(outcome, _)| predicate(outcome))
            .map(|(_, count)| count)
            .sum()
    }

    /// Marks the end of the crawl loop
    pub fn finish(&mut self, frontier_remaining: usize) {
        self.finished_at = Some(Utc::now());
        self.frontier_remaining = frontier_remaining;
    }

    /// Elapsed seconds between start and finish, if finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages requested: {}", stats.pages_requested());
    println!("  Pages fetched: {}", stats.pages_fetched());
    println!("  Fetch errors: {}", stats.errors());
    println!("  Records collected: {}", stats.records());
    println!("  Links enqueued: {}", stats.links_enqueued);
    println!("  Still in frontier: {}", stats.frontier_remaining);
    if let Some(seconds) = stats.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    if stats.cancelled {
        println!("  Stopped early: cancelled");
    }
    println!();

    println!("Pages by Outcome:");
    let mut outcome_counts: Vec<_> = stats.pages_by_outcome.iter().collect();
    outcome_counts.sort_by(|a, b| b.1.cmp(a.1));

    for (outcome, count) in outcome_counts {
        println!("  {}: {}", outcome, count);
    }
    println!();

    let generated = stats.count(PageOutcome::Generated);
    let records = stats.records();
    let generation_rate = if records > 0 {
        (generated as f64 / records as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Generation Rate: {:.1}% ({} / {} records with generated Q&A)",
        generation_rate, generated, records
    );
}
