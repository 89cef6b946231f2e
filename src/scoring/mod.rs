//! Link scoring and classification
//!
//! Cheap lexical heuristics over a (normalized URL, anchor text) pair. They
//! steer the crawl toward marketplace, vendor, forum and dump pages and away
//! from boilerplate, before any of those pages is fetched.
//!
//! Every function here is pure: the same inputs always give the same output.

mod classify;

pub use classify::{classify_link, LinkCategory};

/// Tokens suggesting a page likely to carry leak indicators
pub const HIGH_RISK_TOKENS: &[&str] = &[
    "market", "shop", "store", "buy", "sell", "listing", "product", "vendor", "seller", "profile",
    "dump", "leak", "paste", "forum", "thread",
];

/// Tokens marking boilerplate, gated, or pagination URLs
pub const LOW_VALUE_TOKENS: &[&str] = &[
    "login", "signin", "signup", "captcha", "about", "faq", "rules", "terms", "privacy", "contact",
    "help", "filter", "sort=", "page=", "p=", "/page/",
];

/// Points added when a high-risk token appears in the URL
const URL_TOKEN_WEIGHT: i32 = 3;

/// Points added when a high-risk token appears in the anchor text
const ANCHOR_TOKEN_WEIGHT: i32 = 2;

/// Flat penalty for low-value URLs
const LOW_VALUE_PENALTY: i32 = 5;

/// Returns true if the URL matches the low-value token set
///
/// Matching is a case-insensitive substring test.
pub fn is_low_value_url(url: &str) -> bool {
    let lowered = url.to_lowercase();
    LOW_VALUE_TOKENS.iter().any(|token| lowered.contains(token))
}

/// Scores a link by its URL and anchor text
///
/// Each high-risk token adds 3 when it occurs in the URL and 2 when it occurs
/// in the anchor text (case-insensitive substring tests). A low-value URL
/// loses 5 points. The result may be negative.
///
/// # Examples
///
/// ```
/// use leakwatch::scoring::score_link;
///
/// assert_eq!(score_link("https://example.com/vendor/123", "Vendor Profile"), 7);
/// assert!(score_link("https://example.com/login?next=/x", "") < 0);
/// ```
pub fn score_link(url: &str, anchor_text: &str) -> i32 {
    let url_lower = url.to_lowercase();
    let anchor_lower = anchor_text.to_lowercase();

    let mut score = 0;
    for token in HIGH_RISK_TOKENS {
        if url_lower.contains(token) {
            score += URL_TOKEN_WEIGHT;
        }
        if anchor_lower.contains(token) {
            score += ANCHOR_TOKEN_WEIGHT;
        }
    }

    if is_low_value_url(url) {
        score -= LOW_VALUE_PENALTY;
    }

    score
}
