use serde::{Deserialize, Serialize};
use std::fmt;

/// Lexical category of a link, derived from its URL and anchor text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkCategory {
    Vendor,
    Listing,
    Marketplace,
    Dump,
    Forum,
    Other,
}

impl LinkCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vendor => "vendor",
            Self::Listing => "listing",
            Self::Marketplace => "marketplace",
            Self::Dump => "dump",
            Self::Forum => "forum",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for LinkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered rules tested against the URL
const URL_RULES: &[(&[&str], LinkCategory)] = &[
    (&["vendor", "seller", "profile"], LinkCategory::Vendor),
    (&["listing", "product", "item"], LinkCategory::Listing),
    (&["market", "shop", "store"], LinkCategory::Marketplace),
    (&["dump", "leak", "paste"], LinkCategory::Dump),
    (&["forum", "thread", "post"], LinkCategory::Forum),
];

/// Ordered rules tested against the anchor text; the forum rule is URL-only
const ANCHOR_RULES: &[(&[&str], LinkCategory)] = &[
    (&["vendor", "seller", "profile"], LinkCategory::Vendor),
    (&["listing", "product", "item"], LinkCategory::Listing),
    (&["market", "shop", "store"], LinkCategory::Marketplace),
    (&["dump", "leak", "paste"], LinkCategory::Dump),
];

/// Classifies a link by the first matching rule
///
/// All URL rules are evaluated before any anchor rule, so a URL match always
/// wins over an anchor match. Falls back to [`LinkCategory::Other`].
///
/// # Examples
///
/// ```
/// use leakwatch::scoring::{classify_link, LinkCategory};
///
/// assert_eq!(classify_link("https://example.com/shop/vendor/9", ""), LinkCategory::Vendor);
/// assert_eq!(classify_link("https://example.com/x/1", "Fresh paste"), LinkCategory::Dump);
/// ```
pub fn classify_link(url: &str, anchor_text: &str) -> LinkCategory {
    let url_lower = url.to_lowercase();
    let anchor_lower = anchor_text.to_lowercase();

    first_match(URL_RULES, &url_lower)
        .or_else(|| first_match(ANCHOR_RULES, &anchor_lower))
        .unwrap_or(LinkCategory::Other)
}

fn first_match(rules: &[(&[&str], LinkCategory)], haystack: &str) -> Option<LinkCategory> {
    rules
        .iter()
        .find(|(tokens, _)| tokens.iter().any(|token| haystack.contains(token)))
        .map(|(_, category)| *category)
}
