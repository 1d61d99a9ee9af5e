use crate::url::normalize::normalize_url;
use std::fmt;
use url::Url;

/// Scheme plus host (and non-default port) of a URL, used for same-site checks
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin(String);

impl Origin {
    /// Returns the origin as `scheme://host[:port]`
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the origin of a URL
///
/// The URL is normalized first, so `example.com` and `https://example.com/x`
/// share an origin. The host is lowercased and default ports are dropped.
/// Input that cannot be parsed is returned as its own origin.
///
/// # Examples
///
/// ```
/// use harvest_qa::url::origin_of;
///
/// let origin = origin_of("https://Example.com/path?q=1");
/// assert_eq!(origin.as_str(), "https://example.com");
/// assert_eq!(origin_of("example.com"), origin);
/// ```
pub fn origin_of(url: &str) -> Origin {
    let normalized = normalize_url(url);
    match Url::parse(&normalized) {
        Ok(parsed) => {
            let mut origin = format!("{}://{}", parsed.scheme(), parsed.host_str().unwrap_or(""));
            if let Some(port) = parsed.port() {
                origin.push_str(&format!(":{}", port));
            }
            Origin(origin)
        }
        Err(_) => Origin(normalized),
    }
}
