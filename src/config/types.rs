use serde::Deserialize;

/// Default Gemini REST endpoint
pub const DEFAULT_GENERATOR_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Main configuration structure for Harvest-QA
///
/// Every section is optional in the TOML file; missing keys fall back to the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub generator: GeneratorConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of records to collect
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Delay between consecutive requests (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Number of characters of extracted text kept per page
    #[serde(rename = "max-chars-per-page")]
    pub max_chars_per_page: usize,

    /// Timeout for a single page fetch (seconds)
    #[serde(rename = "fetch-timeout-secs")]
    pub fetch_timeout_secs: u64,

    /// Minimum number of characters the extractor must find to report content
    #[serde(rename = "min-content-chars")]
    pub min_content_chars: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            request_delay_ms: 2000,
            max_chars_per_page: 28000,
            fetch_timeout_secs: 10,
            min_content_chars: 25,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "WebToJsonAgent".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "http://example.com/botinfo".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the identification header: `Name/Version (Rust; +ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (Rust; +{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the JSON file receiving the records
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "fine_tuning_data.json".to_string(),
        }
    }
}

/// Question/answer generator configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Model identifier passed to the generation service
    pub model: String,

    /// Credential for the generation service; generation is skipped without one
    #[serde(rename = "api-key")]
    pub api_key: Option<String>,

    /// Base URL of the generation service
    pub endpoint: String,

    /// Attempts per page before falling back
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Base backoff between attempts (milliseconds), multiplied by the attempt number
    #[serde(rename = "backoff-ms")]
    pub backoff_ms: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash-latest".to_string(),
            api_key: None,
            endpoint: DEFAULT_GENERATOR_ENDPOINT.to_string(),
            max_attempts: 3,
            backoff_ms: 2000,
        }
    }
}
