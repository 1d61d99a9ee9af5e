//! Main-content extraction
//!
//! Reduces an HTML document to the plain text of its primary content using
//! readability-style heuristics:
//!
//! 1. Semantic containers (`<article>`, `<main>`, `[role="main"]`) win when they
//!    hold enough text.
//! 2. Otherwise every paragraph-like element scores its parent (and half of that
//!    its grandparent) by length and comma count; the best-scoring container is
//!    used.
//! 3. Navigation, headers, footers, asides, scripts, forms and elements whose
//!    class or id marks them as ads, menus, comments and similar are skipped.
//!
//! When nothing reaches the minimum length the page is reported as having no
//! main content.

use scraper::{ElementRef, Html, Selector};

/// Elements that never contribute text
const BOILERPLATE_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside", "form",
    "iframe", "svg", "button", "select", "textarea", "dialog",
];

/// ARIA roles that mark page chrome
const BOILERPLATE_ROLES: &[&str] = &[
    "navigation",
    "banner",
    "contentinfo",
    "complementary",
    "search",
    "dialog",
];

/// Class/id tokens that mark page chrome
const NEGATIVE_TOKENS: &[&str] = &[
    "ad",
    "ads",
    "advert",
    "advertisement",
    "banner",
    "breadcrumb",
    "breadcrumbs",
    "comment",
    "comments",
    "cookie",
    "footer",
    "menu",
    "nav",
    "navbar",
    "popup",
    "promo",
    "related",
    "share",
    "sidebar",
    "social",
    "sponsored",
];

/// Containers never judged by class/id hints
const STRUCTURAL_TAGS: &[&str] = &["html", "body", "main", "article"];

/// Elements that start a new line in the extracted text
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure", "h1",
    "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section", "table",
    "tbody", "td", "th", "thead", "tr", "ul",
];

/// Paragraphs shorter than this are ignored when scoring containers
const MIN_PARAGRAPH_CHARS: usize = 25;

/// Default minimum length of extracted text
pub const DEFAULT_MIN_CONTENT_CHARS: usize = 25;

/// Boilerplate-removing text extractor
#[derive(Debug, Clone, Copy)]
pub struct ContentExtractor {
    min_chars: usize,
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CONTENT_CHARS)
    }
}

impl ContentExtractor {
    /// Creates an extractor that reports content only when at least `min_chars`
    /// characters of text were found
    pub fn new(min_chars: usize) -> Self {
        Self {
            min_chars: min_chars.max(1),
        }
    }

    /// Extracts the main text of `html`, or `None` if no content passes the threshold
    pub fn extract(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);

        if let Some(text) = self.from_semantic_container(&document) {
            return Some(text);
        }

        let candidate = best_scored_container(&document)?;
        let text = element_text(candidate);
        self.accept(text)
    }

    fn from_semantic_container(&self, document: &Html) -> Option<String> {
        let selector = Selector::parse(r#"article, main, [role="main"]"#).ok()?;
        document
            .select(&selector)
            .filter(|el| !in_boilerplate(*el, 0))
            .map(element_text)
            .find_map(|text| self.accept(text))
    }

    fn accept(&self, text: String) -> Option<String> {
        if text.chars().count() >= self.min_chars {
            Some(text)
        } else {
            None
        }
    }
}

/// Extracts main text with the default threshold
pub fn extract_main_text(html: &str) -> Option<String> {
    ContentExtractor::default().extract(html)
}

/// Returns true if the element itself is page chrome
fn is_boilerplate(element: ElementRef<'_>) -> bool {
    is_chrome(element) || has_negative_hint(element)
}

/// Returns true if the tag, role or hidden state marks the element as chrome
fn is_chrome(element: ElementRef<'_>) -> bool {
    let value = element.value();

    if BOILERPLATE_TAGS.contains(&value.name()) {
        return true;
    }

    if let Some(role) = value.attr("role") {
        if BOILERPLATE_ROLES.contains(&role.trim().to_ascii_lowercase().as_str()) {
            return true;
        }
    }

    value.attr("hidden").is_some() || value.attr("aria-hidden") == Some("true")
}

/// Returns true if a class or id token marks the element as chrome
fn has_negative_hint(element: ElementRef<'_>) -> bool {
    let value = element.value();
    if STRUCTURAL_TAGS.contains(&value.name()) {
        return false;
    }

    let hints = [value.attr("class"), value.attr("id")];
    hints.iter().flatten().any(|hint| {
        hint.to_ascii_lowercase()
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .any(|token| NEGATIVE_TOKENS.contains(&token))
    })
}

/// Returns true if the element is chrome or sits inside chrome
///
/// Class/id hints are honored only on the `hint_depth` nearest ancestors.
/// Layout wrappers higher up often carry tokens such as `has-sidebar`.
fn in_boilerplate(element: ElementRef<'_>, hint_depth: usize) -> bool {
    is_boilerplate(element)
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .enumerate()
            .any(|(depth, ancestor)| {
                is_chrome(ancestor) || (depth < hint_depth && has_negative_hint(ancestor))
            })
}

/// Picks the container whose paragraphs score highest
fn best_scored_container(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("p, pre, blockquote, td").ok()?;
    let mut scores: Vec<(ElementRef<'_>, f64)> = Vec::new();

    for paragraph in document.select(&selector) {
        if in_boilerplate(paragraph, 1) {
            continue;
        }

        let text = element_text(paragraph);
        let length = text.chars().count();
        if length < MIN_PARAGRAPH_CHARS {
            continue;
        }

        let commas = text.matches(',').count() as f64;
        let score = 1.0 + commas + (length as f64 / 100.0).min(3.0);

        let parent = paragraph.parent().and_then(ElementRef::wrap);
        let grandparent = parent.and_then(|p| p.parent()).and_then(ElementRef::wrap);

        for (container, weight) in [(parent, 1.0), (grandparent, 0.5)] {
            let Some(container) = container.filter(|el| !is_boilerplate(*el)) else {
                continue;
            };
            match scores.iter_mut().find(|(el, _)| *el == container) {
                Some((_, total)) => *total += score * weight,
                None => scores.push((container, score * weight)),
            }
        }
    }

    // Earliest container wins ties so the choice is stable
    let mut best: Option<(ElementRef<'_>, f64)> = None;
    for (element, score) in scores {
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((element, score));
        }
    }

    best.map(|(element, _)| element)
}

/// Collects the visible text below `element`, one line per block element
fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    clean_whitespace(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }

        let Some(child_element) = ElementRef::wrap(child) else {
            continue;
        };
        if is_boilerplate(child_element) {
            continue;
        }

        let tag = child_element.value().name();
        if tag == "br" {
            out.push('\n');
            continue;
        }

        let block = BLOCK_TAGS.contains(&tag);
        if block {
            out.push('\n');
        }
        collect_text(child_element, out);
        if block {
            out.push('\n');
        }
    }
}

/// Collapses runs of whitespace inside lines and drops empty lines
fn clean_whitespace(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
