/// Checks if a domain matches a wildcard pattern
///
/// This function supports two types of patterns:
/// 1. Exact match: "example.com" matches only "example.com"
/// 2. Wildcard match: "*.example.com" matches the bare domain and any
///    subdomain at any depth
///
/// # Examples
///
/// ```
/// use leakwatch::url::matches_wildcard;
///
/// assert!(matches_wildcard("example.com", "example.com"));
/// assert!(!matches_wildcard("example.com", "other.com"));
///
/// assert!(matches_wildcard("*.example.com", "example.com"));
/// assert!(matches_wildcard("*.example.com", "api.v2.example.com"));
/// assert!(!matches_wildcard("*.example.com", "example.org"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}

/// Decides whether a discovered host belongs to the crawl of `site_host`
///
/// The site host itself is always in scope; its subdomains only when
/// `include_subdomains` is set.
pub fn in_crawl_scope(site_host: &str, candidate: &str, include_subdomains: bool) -> bool {
    let site_host = site_host.to_lowercase();
    let candidate = candidate.to_lowercase();

    if include_subdomains {
        matches_wildcard(&format!("*.{}", site_host), &candidate)
    } else {
        matches_wildcard(&site_host, &candidate)
    }
}
