use crate::UrlError;
use url::Url;

/// Normalizes a URL for cache keys, visited sets, and frontier entries
///
/// Normalization only removes the fragment; everything else (host case,
/// query order, trailing slashes) is left as the `url` crate parses it, so
/// two links differing only in their `#anchor` share one cache entry.
///
/// # Examples
///
/// ```
/// use leakwatch::url::normalize_url;
///
/// let url = normalize_url("https://example.com/thread/9#post-3").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/thread/9");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    url.set_fragment(None);
    Ok(url)
}

/// Validates and normalizes a seed URL submitted for scanning
///
/// A seed must parse, use the `http` or `https` scheme, and carry a
/// non-empty host.
pub fn validate_seed_url(url_str: &str) -> Result<Url, UrlError> {
    let url = normalize_url(url_str.trim())?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingDomain),
    }
}
