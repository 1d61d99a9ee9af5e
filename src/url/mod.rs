//! URL handling module for Harvest-QA
//!
//! This module provides scheme repair for raw URLs, origin computation for
//! same-site checks, and validation of crawl seeds.

mod normalize;
mod origin;

use crate::{UrlError, UrlResult};

// Re-export main functions
pub use normalize::{classify_url, has_web_scheme, normalize_url, SchemeRepair};
pub(crate) use normalize::after_authority;
pub use origin::{origin_of, Origin};

/// Normalizes a crawl seed and checks that it can be fetched
///
/// # Returns
///
/// * `Ok(String)` - The normalized `http`/`https` seed
/// * `Err(UrlError::Ambiguous)` - The input reads as a bare local path
/// * `Err(UrlError::InvalidScheme)` - Any other non-web scheme
///
/// # Examples
///
/// ```
/// use harvest_qa::url::validate_seed;
///
/// assert_eq!(validate_seed("example.com").unwrap(), "https://example.com");
/// assert!(validate_seed("file:///tmp/index.html").is_err());
/// ```
pub fn validate_seed(raw: &str) -> UrlResult<String> {
    let trimmed = raw.trim();
    if classify_url(trimmed) == SchemeRepair::FilePath {
        return Err(UrlError::Ambiguous(trimmed.to_string()));
    }

    let normalized = normalize_url(trimmed);
    if !has_web_scheme(&normalized) {
        return Err(UrlError::InvalidScheme(normalized));
    }

    Ok(normalized)
}
