use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use lemmaseek::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Strips a leading `www.` so that `www.example.com` and `example.com` compare equal
pub fn bare_host(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Returns true if both URLs point at the same site host
///
/// Hosts are compared case-insensitively with any `www.` prefix ignored.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_host(a), extract_host(b)) {
        (Some(a), Some(b)) => bare_host(&a) == bare_host(&b),
        _ => false,
    }
}

/// Returns true if both URLs belong to the same site
///
/// Same host as in [`same_host`], and the same explicit port. A scheme's
/// default port counts as no port, so `http://example.com` and
/// `https://example.com` are one site while `example.com:8080` is another.
pub fn same_site(a: &Url, b: &Url) -> bool {
    same_host(a, b) && a.port() == b.port()
}
