//! HTML parsing for visible text, page shape, and links
//!
//! # Link Extraction Rules
//!
//! **Include:** every `<a href="...">`, resolved against the page URL, in
//! document order, with its anchor text.
//!
//! **Exclude:**
//! - empty hrefs and fragment-only (`#...`) hrefs
//! - `javascript:`, `mailto:`, `tel:` and `data:` targets
//! - anything that does not resolve to an http(s) URL

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Elements whose text never reaches the reader
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// A link discovered on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    /// Absolute URL the anchor points to
    pub url: Url,
    /// Whitespace-trimmed anchor text
    pub anchor_text: String,
}

/// Extracts the visible text of a document
///
/// Text nodes are trimmed and joined by single spaces; line breaks inside a
/// text node (e.g. in `<pre>`) are preserved.
pub fn visible_text(document: &Html) -> String {
    let mut pieces = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|element| INVISIBLE_ELEMENTS.contains(&element.name()))
                .unwrap_or(false)
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed);
        }
    }

    pieces.join(" ")
}

/// Returns true if the document contains at least one element matching `selector`
pub fn has_element(document: &Html, selector: &str) -> bool {
    match Selector::parse(selector) {
        Ok(selector) => document.select(&selector).next().is_some(),
        Err(_) => false,
    }
}

/// Extracts all followable links with their anchor text
///
/// # Example
///
/// ```
/// use leakwatch::analysis::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/vendor/1">Top <b>Vendor</b></a><a href="mailto:x@y.z">mail</a>"#;
/// let base = Url::parse("https://market.example/").unwrap();
/// let links = extract_links(html, &base);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].url.as_str(), "https://market.example/vendor/1");
/// assert_eq!(links[0].anchor_text, "Top Vendor");
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<DiscoveredLink> {
    let document = Html::parse_document(html);
    extract_links_from(&document, base_url)
}

/// Same as [`extract_links`] over an already parsed document
pub fn extract_links_from(document: &Html, base_url: &Url) -> Vec<DiscoveredLink> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(url) = resolve_link(href, base_url) {
                    links.push(DiscoveredLink {
                        url,
                        anchor_text: anchor_text(&element),
                    });
                }
            }
        }
    }

    links
}

fn anchor_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves a link href to an absolute URL and validates it
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url)
        }
        _ => None,
    }
}
