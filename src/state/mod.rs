//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `RunState`: lifecycle of a single crawl run (idle, crawling, completed, failed)
//! - `PageOutcome`: what happened to an individual dequeued URL

mod page_outcome;
mod run_state;

// Re-export main types
pub use page_outcome::PageOutcome;
pub use run_state::{FailureReason, RunState};
