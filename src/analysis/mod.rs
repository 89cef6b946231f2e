//! Content analysis of fetched pages
//!
//! Turns raw HTML into a [`PageFinding`]: visible text, keyword hits, leak
//! signals, and the DOM-derived page type. Link extraction lives here too
//! since it shares the same parsed document.

mod html;
mod signals;

pub use html::{extract_links, extract_links_from, visible_text, DiscoveredLink};
pub use signals::{detect_leak_signals, LeakSignal, LeakSignals, DUMP_LINE_THRESHOLD};

use crate::scoring::LinkCategory;
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Page shape derived from the DOM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Listing,
    Forum,
    Other,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Listing => "listing",
            Self::Forum => "forum",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one analyzed page yielded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFinding {
    pub url: String,
    pub page_type: PageType,
    /// Lexical label of the link that led here
    pub category: LinkCategory,
    pub leak_signals: LeakSignals,
    /// Matched keywords, in request order
    pub found_keywords: Vec<String>,
}

impl PageFinding {
    pub fn has_leak_signals(&self) -> bool {
        !self.leak_signals.is_empty()
    }
}

/// Classifies a document by shape: any `<table>` makes it a listing, any
/// `<article>` a forum
pub fn detect_page_type(document: &Html) -> PageType {
    if html::has_element(document, "table") {
        PageType::Listing
    } else if html::has_element(document, "article") {
        PageType::Forum
    } else {
        PageType::Other
    }
}

/// Keywords occurring anywhere in `text`, case-insensitively
///
/// Matching is a plain substring test, so "leak" also hits "leaked".
/// Duplicate keywords are reported once.
pub fn match_keywords(text: &str, keywords: &[String]) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut found: Vec<String> = Vec::new();

    for keyword in keywords {
        let needle = keyword.to_lowercase();
        if needle.is_empty() || found.iter().any(|k| k.to_lowercase() == needle) {
            continue;
        }
        if lowered.contains(&needle) {
            found.push(keyword.clone());
        }
    }

    found
}

/// Analyzes one fetched page
pub fn analyze_page(
    url: &str,
    html: &str,
    keywords: &[String],
    category: LinkCategory,
) -> PageFinding {
    let document = Html::parse_document(html);
    analyze_document(url, &document, keywords, category)
}

/// Same as [`analyze_page`] over an already parsed document
pub fn analyze_document(
    url: &str,
    document: &Html,
    keywords: &[String],
    category: LinkCategory,
) -> PageFinding {
    let text = visible_text(document);

    PageFinding {
        url: url.to_string(),
        page_type: detect_page_type(document),
        category,
        leak_signals: detect_leak_signals(&text),
        found_keywords: match_keywords(&text, keywords),
    }
}
