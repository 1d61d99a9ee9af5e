//! Link discovery for same-site crawling
//!
//! This module extracts anchor targets from a fetched page and keeps only
//! those worth queueing:
//! - `<a href="...">` targets resolved against the page URL, then normalized
//! - `http`/`https` links on the crawl's origin
//! - links with a path that does not name a non-document resource
//!
//! Links carrying a fragment marker (`#`) are dropped entirely. Deduplication
//! against visited or queued URLs is left to the frontier.

use crate::url::{after_authority, has_web_scheme, normalize_url, origin_of, Origin};
use scraper::{Html, Selector};
use url::Url;

/// Path suffixes that never lead to a document
const SKIPPED_EXTENSIONS: &[&str] = &[".pdf", ".jpg", ".png", ".css", ".js"];

/// Discovers crawlable links on a page
///
/// # Arguments
///
/// * `html` - The page body
/// * `page_url` - The URL the body was served from, used to resolve relative links
/// * `site_origin` - The origin of the crawl seed
///
/// # Returns
///
/// Normalized absolute URLs in document order. The same URL may appear more
/// than once if the page links to it repeatedly.
///
/// # Example
///
/// ```
/// use harvest_qa::crawler::discover_links;
/// use harvest_qa::url::origin_of;
///
/// let html = r#"<a href="/about">About</a><a href="https://other.org/x">Elsewhere</a>"#;
/// let links = discover_links(html, "https://example.com/", &origin_of("https://example.com"));
/// assert_eq!(links, vec!["https://example.com/about".to_string()]);
/// ```
pub fn discover_links(html: &str, page_url: &str, site_origin: &Origin) -> Vec<String> {
    let base = match Url::parse(page_url) {
        Ok(base) => base,
        Err(e) => {
            tracing::debug!("Cannot resolve links against {}: {}", page_url, e);
            return Vec::new();
        }
    };

    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let document = Html::parse_document(html);
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| accept_link(href, &base, site_origin))
        .collect()
}

/// Resolves `href` and returns it if it passes every crawl filter
fn accept_link(href: &str, base: &Url, site_origin: &Origin) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || !has_explicit_path(href) {
        return None;
    }

    let resolved = base.join(href).ok()?;
    let link = normalize_url(resolved.as_str());

    if !has_web_scheme(&link) {
        tracing::debug!("Skipping non-web link {}", link);
        return None;
    }

    if link.contains('#') {
        return None;
    }

    if &origin_of(&link) != site_origin {
        tracing::debug!("Skipping off-site link {}", link);
        return None;
    }

    let parsed = Url::parse(&link).ok()?;
    let path = parsed.path().to_ascii_lowercase();
    if path.is_empty() || SKIPPED_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return None;
    }

    Some(link)
}

/// Returns false for hrefs that stop at the authority (`https://host`,
/// `https://host?q`, `//host`)
///
/// Resolution always yields at least `/`, so the empty-path case has to be
/// caught on the raw attribute.
fn has_explicit_path(href: &str) -> bool {
    after_authority(href).map_or(true, |rest| rest.starts_with('/'))
}
