//! Scheme repair for user-supplied and discovered URLs
//!
//! Raw input is classified into exactly one [`SchemeRepair`] rule before any
//! rewriting happens, so each branch of the heuristic can be exercised on its own.
//! Normalization is string based: a URL that already carries a web scheme is
//! returned byte-for-byte, which keeps `normalize_url` idempotent.

/// Characters allowed after the first letter of a URL scheme
fn is_scheme_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.'
}

/// The rule that applies to a raw URL string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeRepair {
    /// `http` or `https`: left unchanged
    WebScheme,

    /// `file` scheme: passed through unmodified
    FileScheme,

    /// No scheme, no host, and a dot in the last path segment (`example.com`):
    /// `https://` is prepended
    BareToken,

    /// No scheme but the input carries an authority, query or fragment
    /// (`//example.com/a`, `example.com?q=1`): `https` is added
    HostWithoutScheme,

    /// No scheme and no dot in the last segment (`docs/intro`): left unchanged.
    /// The result is not crawlable and callers should reject it as ambiguous.
    FilePath,

    /// Any other scheme with a host (`ftp://x.com/a`): the scheme is forced to
    /// `https`, everything after it is preserved
    ForeignSchemeWithHost,

    /// Any other scheme without a host (`mailto:someone`): left unchanged
    ForeignSchemeNoHost,
}

/// Splits `raw` into its lowercase scheme and the remainder after the colon
///
/// A scheme is a leading ASCII letter followed by letters, digits, `+`, `-` or
/// `.`, terminated by the first `:`.
fn split_scheme(raw: &str) -> Option<(String, &str)> {
    let colon = raw.find(':')?;
    let candidate = &raw[..colon];
    let mut chars = candidate.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() || !chars.all(is_scheme_char) {
        return None;
    }
    Some((candidate.to_ascii_lowercase(), &raw[colon + 1..]))
}

/// Returns the authority part of a scheme-less remainder (`//host:port/...`)
fn authority(rest: &str) -> Option<&str> {
    let after = rest.strip_prefix("//")?;
    let end = after.find(['/', '?', '#']).unwrap_or(after.len());
    Some(&after[..end]).filter(|host| !host.is_empty())
}

/// Returns what follows the authority of `raw` (`https://host/a?q` gives `/a?q`)
///
/// `None` when `raw` has no authority, as with relative references or
/// `mailto:` style URLs. Only a leading scheme counts, so a `://` inside a
/// query string is ignored.
pub(crate) fn after_authority(raw: &str) -> Option<&str> {
    let rest = split_scheme(raw).map_or(raw, |(_, rest)| rest);
    let after = rest.strip_prefix("//")?;
    let end = after.find(['/', '?', '#']).unwrap_or(after.len());
    Some(&after[end..])
}

/// Classifies a raw URL string into the repair rule that applies to it
pub fn classify_url(raw: &str) -> SchemeRepair {
    match split_scheme(raw) {
        Some((scheme, _)) if scheme == "http" || scheme == "https" => SchemeRepair::WebScheme,
        Some((scheme, _)) if scheme == "file" => SchemeRepair::FileScheme,
        Some((_, rest)) => {
            if authority(rest).is_some() {
                SchemeRepair::ForeignSchemeWithHost
            } else {
                SchemeRepair::ForeignSchemeNoHost
            }
        }
        None => {
            if authority(raw).is_some() || raw.contains(['?', '#']) {
                return SchemeRepair::HostWithoutScheme;
            }
            let last_segment = raw.rsplit('/').next().unwrap_or(raw);
            if last_segment.contains('.') {
                SchemeRepair::BareToken
            } else {
                SchemeRepair::FilePath
            }
        }
    }
}

/// Canonicalizes a raw URL string into a scheme-qualified URL
///
/// Unparseable or ambiguous input is returned as given; this function never fails.
///
/// # Examples
///
/// ```
/// use harvest_qa::url::normalize_url;
///
/// assert_eq!(normalize_url("example.com"), "https://example.com");
/// assert_eq!(normalize_url("ftp://x.com/a"), "https://x.com/a");
/// assert_eq!(normalize_url("file:///tmp/page.html"), "file:///tmp/page.html");
/// ```
pub fn normalize_url(raw: &str) -> String {
    match classify_url(raw) {
        SchemeRepair::WebScheme
        | SchemeRepair::FileScheme
        | SchemeRepair::FilePath
        | SchemeRepair::ForeignSchemeNoHost => raw.to_string(),
        SchemeRepair::BareToken => format!("https://{}", raw),
        SchemeRepair::HostWithoutScheme => {
            if raw.starts_with("//") {
                format!("https:{}", raw)
            } else {
                format!("https://{}", raw)
            }
        }
        SchemeRepair::ForeignSchemeWithHost => match split_scheme(raw) {
            Some((_, rest)) => format!("https:{}", rest),
            None => raw.to_string(),
        },
    }
}

/// Returns true if the URL carries an `http` or `https` scheme
pub fn has_web_scheme(url: &str) -> bool {
    matches!(classify_url(url), SchemeRepair::WebScheme)
}
