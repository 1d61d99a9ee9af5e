//! Question/answer generation
//!
//! This module defines the capability the crawler uses to turn page text into a
//! question/answer pair, a Gemini-backed implementation of it, and the retry
//! policy applied around every generation call.
//!
//! A generator is configured per run and handed to the coordinator inside the
//! run request; nothing here is global.

mod gemini;
mod retry;

pub use gemini::{build_prompt, parse_qa_response, GeminiGenerator};
pub use retry::RetryPolicy;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by a generator
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generator not configured: {0}")]
    NotConfigured(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Generation service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed generator response: {0}")]
    MalformedResponse(String),
}

impl GenerationError {
    /// Returns true if another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::NotConfigured(_))
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// A generated question and its answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// Turns page text into a question/answer pair
///
/// Implementations perform a single attempt; retries are the caller's concern
/// (see [`RetryPolicy`]). On success both fields must be non-empty.
#[async_trait]
pub trait QaGenerator: Send + Sync {
    /// Generates a question/answer pair about `text`, which came from `source_url`
    async fn generate(&self, text: &str, source_url: &str) -> Result<QaPair, GenerationError>;

    /// Human-readable name used in progress messages
    fn name(&self) -> &str {
        "generator"
    }
}
