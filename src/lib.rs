//! Harvest-QA: a breadth-first site harvester for question/answer datasets
//!
//! This crate crawls a single website starting from a seed URL, extracts the main
//! text of each page, optionally asks a text-generation service for a
//! question/answer pair about that text, and writes the collected
//! `{context, question, answer}` records to a JSON file.

pub mod config;
pub mod crawler;
pub mod generation;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Harvest-QA operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Generation error: {0}")]
    Generation(#[from] generation::GenerationError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Invalid URL scheme for {0}: must be http or https")]
    InvalidScheme(String),

    #[error("Ambiguous URL {0}: looks like a local path, not a web address")]
    Ambiguous(String),
}

/// Result type alias for Harvest-QA operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlReport, RunRequest};
pub use generation::{GeminiGenerator, QaGenerator, QaPair, RetryPolicy};
pub use output::{Record, FALLBACK_SENTINEL};
pub use state::{PageOutcome, RunState};
pub use crate::url::{normalize_url, origin_of, validate_seed, Origin};
