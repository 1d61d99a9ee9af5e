//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the crawler's identification header
//! - GET requests with a bounded timeout, following redirects
//! - Error classification into HTTP and network failures
//!
//! Fetch failures are values, not errors: the coordinator skips the page and
//! keeps crawling.

use crate::config::UserAgentConfig;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Maximum number of redirects followed for one fetch
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// Final URL after redirects
        final_url: String,
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body decoding, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Human-readable failure description, `None` on success
    pub fn failure_description(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::HttpError { status_code, .. } => Some(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Some(error.clone()),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Upper bound for a whole request, body included
///
/// # Example
///
/// ```no_run
/// use harvest_qa::config::UserAgentConfig;
/// use harvest_qa::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with a single GET request
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Success` with body and final URL |
/// | any other status | `HttpError` |
/// | timeout | `NetworkError` ("Request timeout") |
/// | connection failure | `NetworkError` ("Connection failed: ...") |
/// | redirect limit, body read, other | `NetworkError` |
pub async fn fetch_page(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return FetchResult::HttpError {
            final_url,
            status_code: status.as_u16(),
        };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => classify_error(e),
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else if e.is_redirect() {
        format!("Too many redirects: {}", e)
    } else {
        e.to_string()
    };
    FetchResult::NetworkError { error }
}
