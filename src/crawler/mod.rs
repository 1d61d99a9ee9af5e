//! Crawler module for fetching pages and turning them into records
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a fixed identification header and timeout
//! - Main-content extraction and same-site link discovery
//! - The breadth-first frontier and visited set
//! - Record synthesis with an optional question/answer generator
//! - Overall crawl coordination, progress reporting and cancellation

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;
mod links;
mod progress;
mod synthesizer;

pub use coordinator::{run_crawl, Coordinator, CrawlReport, RunRequest};
pub use extractor::{extract_main_text, ContentExtractor, DEFAULT_MIN_CONTENT_CHARS};
pub use fetcher::{build_http_client, fetch_page, FetchResult};
pub use frontier::Frontier;
pub use links::discover_links;
pub use progress::{Progress, ProgressCallback};
pub use synthesizer::{synthesize, truncate_chars, Synthesis};

use crate::config::Config;
use crate::generation::QaGenerator;
use crate::HarvestError;
use std::sync::Arc;

/// Runs a complete crawl operation from configuration
///
/// This is the main library entry point. It will:
/// 1. Build a run request from `config` for `seed`
/// 2. Attach `generator`, if any
/// 3. Crawl until the page quota is met or the frontier is exhausted
/// 4. Write the collected records to the configured output path
///
/// # Arguments
///
/// * `config` - The loaded configuration
/// * `seed` - Raw seed URL; normalized before use
/// * `generator` - Question/answer generator, or `None` for fallback records
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The run finished (check `state` and `persisted`)
/// * `Err(HarvestError)` - The HTTP client could not be built
pub async fn crawl(
    config: &Config,
    seed: &str,
    generator: Option<Arc<dyn QaGenerator>>,
) -> Result<CrawlReport, HarvestError> {
    let mut request = RunRequest::from_config(config, seed);
    request.generator = generator;
    run_crawl(request).await
}
