//! Harvest-QA main entry point
//!
//! This is the command-line interface for the Harvest-QA site harvester.

use anyhow::{anyhow, Context};
use clap::Parser;
use harvest_qa::config::{load_config, validate, Config};
use harvest_qa::crawler::crawl;
use harvest_qa::generation::{GeminiGenerator, QaGenerator};
use harvest_qa::output::print_statistics;
use harvest_qa::url::validate_seed;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Harvest-QA: build question/answer datasets from a website
///
/// Harvest-QA crawls a single site breadth-first from a seed URL, extracts the
/// main text of every page, optionally asks a text-generation service for a
/// question/answer pair about it, and writes the records to a JSON file.
#[derive(Parser, Debug)]
#[command(name = "harvest-qa")]
#[command(version = "1.0.0")]
#[command(about = "Crawl a website into a question/answer dataset", long_about = None)]
struct Cli {
    /// The starting URL to crawl
    #[arg(value_name = "START_URL")]
    start_url: String,

    /// Maximum number of pages to collect
    #[arg(short = 'n', long, value_name = "COUNT")]
    num_pages: Option<usize>,

    /// Path of the JSON file to write
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// API key for the generation service
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    /// Model used for question/answer generation
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    /// Delay between requests in milliseconds
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Characters of page text kept per record
    #[arg(long, value_name = "CHARS")]
    max_chars: Option<usize>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(pages) = self.num_pages {
            config.crawler.max_pages = pages;
        }
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if let Some(key) = &self.api_key {
            config.generator.api_key = Some(key.clone());
        }
        if let Some(model) = &self.model {
            config.generator.model = model.clone();
        }
        if let Some(delay) = self.delay_ms {
            config.crawler.request_delay_ms = delay;
        }
        if let Some(chars) = self.max_chars {
            config.crawler.max_chars_per_page = chars;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load configuration, falling back to defaults without a file
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid configuration")?;

    // Reject unusable seeds before any network activity
    let seed = validate_seed(&cli.start_url)?;

    handle_crawl(config, seed, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("harvest_qa=info,warn"),
            1 => EnvFilter::new("harvest_qa=debug,info"),
            2 => EnvFilter::new("harvest_qa=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the generator, or `None` when it cannot be configured
fn build_generator(config: &Config) -> Option<Arc<dyn QaGenerator>> {
    match GeminiGenerator::from_config(&config.generator, None) {
        Ok(generator) => {
            tracing::info!("Using Gemini model: {}", generator.model());
            Some(Arc::new(generator))
        }
        Err(e) => {
            tracing::warn!("{}. Proceeding without Q&A generation.", e);
            None
        }
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, seed: String, quiet: bool) -> anyhow::Result<()> {
    let generator = build_generator(&config);

    let report = crawl(&config, &seed, generator).await?;

    if let Some(reason) = report.state.failure() {
        return Err(anyhow!("Crawl failed: {}", reason));
    }

    if !quiet {
        println!();
        print_statistics(&report.statistics);
    }

    match report.persisted {
        Some(Err(e)) => Err(e).context("Records were collected but could not be saved"),
        _ => {
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
    }
}
