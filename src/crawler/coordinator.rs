//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the pipeline together:
//! - Validating and normalizing the seed
//! - Managing the breadth-first frontier and visited set
//! - Fetching, extracting, synthesizing records and discovering links
//! - Rate limiting, cancellation and progress reporting
//! - Persisting the collected records
//!
//! The loop is strictly sequential: each page is fully handled, including the
//! inter-request delay, before the next one is taken from the frontier.

use crate::config::{Config, UserAgentConfig};
use crate::crawler::extractor::ContentExtractor;
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchResult};
use crate::crawler::frontier::Frontier;
use crate::crawler::links::discover_links;
use crate::crawler::progress::{Progress, ProgressCallback};
use crate::crawler::synthesizer::synthesize;
use crate::generation::{QaGenerator, RetryPolicy};
use crate::output::{write_records, CrawlStatistics, OutputResult, Record};
use crate::state::{FailureReason, PageOutcome, RunState};
use crate::url::{normalize_url, origin_of, validate_seed, Origin};
use crate::HarvestError;
use reqwest::Client;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Everything a single crawl run needs
///
/// The generator is owned by the request, so two runs in one process can use
/// different generators (or none).
#[derive(Clone)]
pub struct RunRequest {
    /// Raw seed URL as supplied by the caller
    pub seed: String,

    /// Maximum number of records to collect
    pub page_quota: usize,

    /// Where the records are written when the loop ends
    pub output_path: PathBuf,

    /// Question/answer generator; `None` produces fallback records
    pub generator: Option<Arc<dyn QaGenerator>>,

    /// Retry policy applied around every generation call
    pub retry: RetryPolicy,

    /// Pause after every processed URL
    pub request_delay: Duration,

    /// Characters of extracted text kept per page
    pub max_chars: usize,

    /// Upper bound for a single page fetch
    pub fetch_timeout: Duration,

    /// Minimum extracted text length for a page to count as having content
    pub min_content_chars: usize,

    /// Identification sent with every request
    pub user_agent: UserAgentConfig,
}

impl fmt::Debug for RunRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunRequest")
            .field("seed", &self.seed)
            .field("page_quota", &self.page_quota)
            .field("output_path", &self.output_path)
            .field("generator", &self.generator.as_ref().map(|g| g.name().to_string()))
            .field("retry", &self.retry)
            .field("request_delay", &self.request_delay)
            .field("max_chars", &self.max_chars)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("min_content_chars", &self.min_content_chars)
            .finish()
    }
}

impl RunRequest {
    /// Creates a request for `seed` with default settings and no generator
    pub fn new(seed: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        let mut request = Self::from_config(&Config::default(), seed);
        request.output_path = output_path.into();
        request
    }

    /// Creates a request for `seed` from loaded configuration
    ///
    /// The generator is not built here; attach one with
    /// [`RunRequest::with_generator`].
    pub fn from_config(config: &Config, seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            page_quota: config.crawler.max_pages,
            output_path: PathBuf::from(&config.output.path),
            generator: None,
            retry: RetryPolicy::new(
                config.generator.max_attempts,
                Duration::from_millis(config.generator.backoff_ms),
            ),
            request_delay: Duration::from_millis(config.crawler.request_delay_ms),
            max_chars: config.crawler.max_chars_per_page,
            fetch_timeout: Duration::from_secs(config.crawler.fetch_timeout_secs),
            min_content_chars: config.crawler.min_content_chars,
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn QaGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_page_quota(mut self, page_quota: usize) -> Self {
        self.page_quota = page_quota;
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Outcome of a crawl run
#[derive(Debug)]
pub struct CrawlReport {
    /// Final run state (`Completed` or `Failed`)
    pub state: RunState,

    /// Records collected, in collection order
    pub records: Vec<Record>,

    /// Counters gathered during the run
    pub statistics: CrawlStatistics,

    /// Result of writing the records; `None` if the run failed before crawling
    pub persisted: Option<OutputResult<()>>,
}

impl CrawlReport {
    /// Returns true if the records reached the output destination
    pub fn is_persisted(&self) -> bool {
        matches!(self.persisted, Some(Ok(())))
    }

    /// Writes the collected records to another destination
    ///
    /// Used to retry persistence after the end-of-run write failed.
    pub fn save_to(&self, path: &Path) -> OutputResult<()> {
        write_records(&self.records, path)?;
        tracing::info!("Re-saved {} records to {}", self.records.len(), path.display());
        Ok(())
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    request: RunRequest,
    client: Client,
    extractor: ContentExtractor,
    progress: Progress,
    cancel: Option<Arc<AtomicBool>>,
    state: RunState,
}

impl Coordinator {
    /// Creates a coordinator for one run request
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(request: RunRequest) -> Result<Self, HarvestError> {
        let client = build_http_client(&request.user_agent, request.fetch_timeout)?;
        let extractor = ContentExtractor::new(request.min_content_chars);

        Ok(Self {
            request,
            client,
            extractor,
            progress: Progress::silent(),
            cancel: None,
            state: RunState::Idle,
        })
    }

    /// Installs a progress callback
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Progress::with_callback(callback);
        self
    }

    /// Installs a cancellation flag, checked before every page and every delay
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Current run state
    pub fn state(&self) -> &RunState {
        &self.state
    }

    fn transition(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "illegal run state change {} -> {}",
            self.state,
            next
        );
        tracing::debug!("Run state {} -> {}", self.state, next);
        self.state = next;
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::SeqCst))
    }

    /// Runs the crawl to completion
    ///
    /// Per-page failures are reported on the progress channel and never end the
    /// run. Only a rejected seed produces a `Failed` report, before any request
    /// is made.
    pub async fn run(&mut self) -> CrawlReport {
        self.state = RunState::Idle;
        let mut statistics = CrawlStatistics::new();

        let seed = match validate_seed(&self.request.seed) {
            Ok(seed) => seed,
            Err(e) => {
                self.progress.error(format!(
                    "Invalid starting URL {}: {}. Aborting.",
                    self.request.seed, e
                ));
                self.transition(RunState::Failed(FailureReason::from(e)));
                statistics.finish(0);
                return CrawlReport {
                    state: self.state.clone(),
                    records: Vec::new(),
                    statistics,
                    persisted: None,
                };
            }
        };

        self.transition(RunState::Crawling);
        self.announce(&seed);

        let mut records = Vec::new();
        let mut frontier = Frontier::with_seed(seed.clone());
        let site_origin = origin_of(&seed);

        self.crawl_loop(&site_origin, &mut frontier, &mut records, &mut statistics)
            .await;

        statistics.finish(frontier.len());
        self.transition(RunState::Completed);
        self.progress.info(format!(
            "Crawl finished: {} records from {} requested pages ({} URLs visited)",
            records.len(),
            statistics.pages_requested(),
            frontier.visited_count()
        ));

        let persisted = self.persist(&records);

        CrawlReport {
            state: self.state.clone(),
            records,
            statistics,
            persisted: Some(persisted),
        }
    }

    /// Runs the crawl on a fresh current-thread runtime, blocking the caller
    ///
    /// Must not be called from inside an async context.
    pub fn run_blocking(&mut self) -> Result<CrawlReport, HarvestError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(runtime.block_on(self.run()))
    }

    fn announce(&self, seed: &str) {
        let request = &self.request;
        self.progress.info(format!("Starting crawl from: {}", seed));
        self.progress
            .info(format!("Max pages to retrieve: {}", request.page_quota));
        match &request.generator {
            Some(generator) => self
                .progress
                .info(format!("Using generator: {}", generator.name())),
            None => self
                .progress
                .warn("No generator configured. Proceeding without Q&A generation."),
        }
        self.progress.info(format!(
            "Request delay: {}ms",
            request.request_delay.as_millis()
        ));
        self.progress
            .info(format!("Max chars per page: {}", request.max_chars));
    }

    async fn crawl_loop(
        &self,
        site_origin: &Origin,
        frontier: &mut Frontier,
        records: &mut Vec<Record>,
        statistics: &mut CrawlStatistics,
    ) {
        let quota = self.request.page_quota;

        while records.len() < quota {
            if self.is_cancelled() {
                self.stop_for_cancellation(statistics);
                break;
            }

            let Some(url) = frontier.pop() else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };

            if frontier.is_visited(&url) {
                tracing::debug!("Skipping already visited {}", url);
                statistics.record(PageOutcome::AlreadyVisited);
                continue;
            }

            self.progress.info(format!("Fetching {}", url));
            let fetched = fetch_page(&self.client, &url).await;

            frontier.mark_visited(url.clone());
            let (page_url, body) = match fetched {
                FetchResult::Success {
                    final_url, body, ..
                } => {
                    let final_url = normalize_url(&final_url);
                    if final_url != url {
                        tracing::debug!("{} redirected to {}", url, final_url);
                        frontier.mark_visited(final_url.clone());
                    }
                    (final_url, body)
                }
                failure => {
                    if let FetchResult::HttpError { final_url, .. } = &failure {
                        let final_url = normalize_url(final_url);
                        if final_url != url {
                            frontier.mark_visited(final_url);
                        }
                    }
                    let outcome = match failure {
                        FetchResult::HttpError { .. } => PageOutcome::HttpError,
                        _ => PageOutcome::NetworkError,
                    };
                    statistics.record(outcome);
                    self.progress.warn(format!(
                        "Failed to fetch {}: {}",
                        url,
                        failure.failure_description().unwrap_or_default()
                    ));
                    if !self.pause(statistics).await {
                        break;
                    }
                    continue;
                }
            };

            let outcome = self.harvest_page(&page_url, &body, records).await;
            statistics.record(outcome);

            if records.len() >= quota {
                break;
            }

            for link in discover_links(&body, &page_url, site_origin) {
                if frontier.push(link) {
                    statistics.links_enqueued += 1;
                }
            }

            self.progress.info(format!(
                "Collected {}/{} pages. URLs in queue: {}",
                records.len(),
                quota,
                frontier.len()
            ));

            if !self.pause(statistics).await {
                break;
            }
        }
    }

    /// Extracts and synthesizes the record for one fetched page
    async fn harvest_page(
        &self,
        page_url: &str,
        body: &str,
        records: &mut Vec<Record>,
    ) -> PageOutcome {
        let Some(text) = self.extractor.extract(body) else {
            self.progress
                .info(format!("Could not extract main content from {}", page_url));
            return PageOutcome::NoContent;
        };
        self.progress
            .info(format!("Successfully extracted content from {}", page_url));

        let synthesis = synthesize(
            &text,
            page_url,
            self.request.max_chars,
            self.request.generator.as_deref(),
            &self.request.retry,
            &self.progress,
        )
        .await;

        match synthesis {
            None => {
                self.progress.info(format!(
                    "Extracted text from {} is blank; no record created",
                    page_url
                ));
                PageOutcome::BlankContent
            }
            Some(synthesis) => {
                records.push(synthesis.record);
                if synthesis.generated {
                    PageOutcome::Generated
                } else {
                    if self.request.generator.is_none() {
                        self.progress
                            .info(format!("Generation skipped for {}", page_url));
                    }
                    PageOutcome::Fallback
                }
            }
        }
    }

    /// Waits the inter-request delay; returns false if the run was cancelled
    async fn pause(&self, statistics: &mut CrawlStatistics) -> bool {
        if self.is_cancelled() {
            self.stop_for_cancellation(statistics);
            return false;
        }
        if !self.request.request_delay.is_zero() {
            tokio::time::sleep(self.request.request_delay).await;
        }
        true
    }

    fn stop_for_cancellation(&self, statistics: &mut CrawlStatistics) {
        statistics.cancelled = true;
        self.progress.warn("Cancellation requested; stopping crawl");
    }

    fn persist(&self, records: &[Record]) -> OutputResult<()> {
        let path = &self.request.output_path;
        match write_records(records, path) {
            Ok(()) => {
                self.progress.info(format!(
                    "Successfully saved {} records to {}",
                    records.len(),
                    path.display()
                ));
                Ok(())
            }
            Err(e) => {
                self.progress
                    .error(format!("Error saving data to {}: {}", path.display(), e));
                Err(e)
            }
        }
    }
}

/// Runs a complete crawl for `request`
///
/// # Example
///
/// ```no_run
/// use harvest_qa::crawler::{run_crawl, RunRequest};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let request = RunRequest::new("example.com", "out.json").with_page_quota(3);
/// let report = run_crawl(request).await?;
/// println!("{} records", report.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(request: RunRequest) -> Result<CrawlReport, HarvestError> {
    let mut coordinator = Coordinator::new(request)?;
    Ok(coordinator.run().await)
}
