/// Run lifecycle definitions
///
/// A run moves `Idle -> Crawling -> Completed`, or `Idle -> Failed` when the seed
/// is rejected before any network activity.
use crate::UrlError;
use std::fmt;

/// Why a run failed before crawling started
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The normalized seed does not use `http` or `https`
    InvalidScheme(String),

    /// The seed looks like a bare local path rather than a web address
    AmbiguousSeed(String),
}

impl From<UrlError> for FailureReason {
    fn from(err: UrlError) -> Self {
        match err {
            UrlError::InvalidScheme(url) => Self::InvalidScheme(url),
            UrlError::Ambiguous(raw) => Self::AmbiguousSeed(raw),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidScheme(url) => write!(f, "invalid scheme: {}", url),
            Self::AmbiguousSeed(raw) => write!(f, "ambiguous seed (bare path?): {}", raw),
        }
    }
}

/// Represents the current state of a crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    /// Run requested but not started
    Idle,

    /// Frontier is being processed
    Crawling,

    /// Loop exited (quota met, frontier exhausted, or cancelled)
    Completed,

    /// Seed rejected up front; no pages were fetched
    Failed(FailureReason),
}

impl RunState {
    /// Returns the failure reason, if the run failed
    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Checks whether moving to `next` is a legal transition
    pub fn can_transition_to(&self, next: &RunState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Crawling)
                | (Self::Idle, Self::Failed(_))
                | (Self::Crawling, Self::Completed)
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Crawling => write!(f, "crawling"),
            Self::Completed => write!(f, "completed"),
            Self::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}
