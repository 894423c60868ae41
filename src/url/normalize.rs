use crate::UrlError;
use url::Url;

/// Parses a crawlable URL, rejecting anything that is not http(s) with a host
pub fn parse_http_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Normalizes a configured site URL into the form stored on the Site row
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject non-http(s) schemes and URLs without a host
/// 2. Lowercase the host, drop the default port
/// 3. Resolve dot segments in the path and drop query and fragment
/// 4. Remove the trailing slash, including the root one
///
/// # Examples
///
/// ```
/// use lemmaseek::url::normalize_site_root;
///
/// let root = normalize_site_root("https://WWW.Example.com/").unwrap();
/// assert_eq!(root, "https://www.example.com");
///
/// let root = normalize_site_root("http://example.com:8080/blog/").unwrap();
/// assert_eq!(root, "http://example.com:8080/blog");
/// ```
pub fn normalize_site_root(url_str: &str) -> Result<String, UrlError> {
    let url = parse_http_url(url_str)?;
    let origin = url.origin().ascii_serialization();
    let path = normalize_path(url.path());

    if path == "/" {
        Ok(origin)
    } else {
        Ok(format!("{}{}", origin, path))
    }
}

/// Returns the site-relative path stored on a Page row
///
/// Only the URL path is kept; query and fragment are dropped and the trailing
/// slash is trimmed except for the root `/`.
pub fn site_relative_path(url: &Url) -> String {
    normalize_path(url.path())
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}
