use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use leakwatch::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the site origin (`scheme://host[:port]`) of a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use leakwatch::url::origin_of;
///
/// let url = Url::parse("https://forum.example.com:8443/t/1?x=y").unwrap();
/// assert_eq!(origin_of(&url), "https://forum.example.com:8443");
/// ```
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Returns the home page of the site a URL belongs to
pub fn home_url(url: &Url) -> Url {
    let mut home = url.clone();
    home.set_path("/");
    home.set_query(None);
    home.set_fragment(None);
    home
}
