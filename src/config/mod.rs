//! Configuration module for Harvest-QA
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A configuration file is optional: `Config::default()` is a valid setup and the
//! command line overrides individual values on top of it.
//!
//! # Example
//!
//! ```no_run
//! use harvest_qa::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Will collect up to {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, GeneratorConfig, OutputConfig, UserAgentConfig,
    DEFAULT_GENERATOR_ENDPOINT,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
