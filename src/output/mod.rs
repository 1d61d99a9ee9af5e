//! Output module for the collected records
//!
//! This module handles:
//! - The `Record` type written for every harvested page
//! - Writing the record collection as indented JSON
//! - Recording crawl statistics for the end-of-run summary

mod json;
pub mod stats;

pub use json::{load_records, write_records};
pub use stats::{print_statistics, CrawlStatistics};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Question and answer value used when generation was skipped or failed
pub const FALLBACK_SENTINEL: &str = "N/A (generation failed or skipped)";

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One harvested page: its text plus a question/answer pair about it
///
/// Field order is the serialization order (`context`, `question`, `answer`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Extracted page text, truncated to the configured character limit
    pub context: String,

    /// Generated question, or [`FALLBACK_SENTINEL`]
    pub question: String,

    /// Generated answer, or [`FALLBACK_SENTINEL`]
    pub answer: String,
}

impl Record {
    /// Creates a record whose question and answer are the fallback sentinel
    pub fn fallback(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            question: FALLBACK_SENTINEL.to_string(),
            answer: FALLBACK_SENTINEL.to_string(),
        }
    }

    /// Returns true if this record carries the fallback sentinel
    pub fn is_fallback(&self) -> bool {
        self.question == FALLBACK_SENTINEL && self.answer == FALLBACK_SENTINEL
    }
}
