/// Per-page outcome definitions for tracking crawl progress
use std::fmt;

/// What happened to a URL taken from the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageOutcome {
    // ===== Record-producing outcomes =====
    /// Extracted text was turned into a generated question/answer record
    Generated,

    /// Extracted text was recorded with fallback question/answer values
    Fallback,

    // ===== Pages without a record =====
    /// The extractor found no main content
    NoContent,

    /// Extracted text was blank after truncation
    BlankContent,

    // ===== Errors =====
    /// Fetch returned a non-success HTTP status
    HttpError,

    /// Fetch failed at the transport level (DNS, connect, timeout, body read)
    NetworkError,

    // ===== Skips =====
    /// URL was already visited (for example reached earlier through a redirect)
    AlreadyVisited,
}

impl PageOutcome {
    /// Returns true if this outcome appended a record to the output
    pub fn produced_record(&self) -> bool {
        matches!(self, Self::Generated | Self::Fallback)
    }

    /// Returns true if the page was fetched successfully
    pub fn was_fetched(&self) -> bool {
        matches!(
            self,
            Self::Generated | Self::Fallback | Self::NoContent | Self::BlankContent
        )
    }

    /// Returns true if this represents a fetch failure
    pub fn is_error(&self) -> bool {
        matches!(self, Self::HttpError | Self::NetworkError)
    }

    /// Short machine-friendly label used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::Fallback => "fallback",
            Self::NoContent => "no_content",
            Self::BlankContent => "blank_content",
            Self::HttpError => "http_error",
            Self::NetworkError => "network_error",
            Self::AlreadyVisited => "already_visited",
        }
    }

    /// Returns all possible outcomes
    pub fn all() -> [Self; 7] {
        [
            Self::Generated,
            Self::Fallback,
            Self::NoContent,
            Self::BlankContent,
            Self::HttpError,
            Self::NetworkError,
            Self::AlreadyVisited,
        ]
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
