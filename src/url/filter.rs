//! Link filtering for discovered hrefs
//!
//! The filter is a pure predicate: it decides whether an href found on a page
//! of a site is worth crawling. It holds no state and touches no storage.

use super::domain::same_site;
use url::Url;

/// Schemes that never lead to a crawlable page
const EXCLUDED_PREFIXES: &[&str] = &["javascript:", "tel:", "mailto:", "data:"];

/// Image extensions
const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".webp", ".tiff", ".ico",
];

/// Document, archive, executable and media extensions
const FILE_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".zip", ".rar", ".7z", ".tar",
    ".gz", ".exe", ".mp3", ".mp4", ".avi", ".mov", ".wav", ".webm",
];

/// Markers of an absolute URL embedded in a query string
const REDIRECT_MARKERS: &[&str] = &["http://", "https://", "http%3a"];

/// Returns true if `link`, found on a page of the site rooted at `site_root`,
/// must not be crawled
///
/// Excludes fragment-only links, `javascript:`/`tel:`/`mailto:`/`data:` links,
/// binary resources by extension, links to another host or port and links whose
/// query string embeds an absolute URL.
///
/// # Examples
///
/// ```
/// use lemmaseek::url::should_exclude;
/// use url::Url;
///
/// let root = Url::parse("https://example.com").unwrap();
/// assert!(should_exclude("#section", &root));
/// assert!(should_exclude("/img/a.png", &root));
/// assert!(!should_exclude("/catalog/42.html", &root));
/// ```
pub fn should_exclude(link: &str, site_root: &Url) -> bool {
    let trimmed = link.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return true;
    }

    let lower = trimmed.to_lowercase();
    if EXCLUDED_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return true;
    }

    let resolved = match site_root.join(trimmed) {
        Ok(url) => url,
        Err(_) => return true,
    };

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return true;
    }

    if is_binary_resource(&resolved) {
        return true;
    }

    if !same_site(&resolved, site_root) {
        return true;
    }

    has_embedded_redirect(&resolved)
}

fn is_binary_resource(url: &Url) -> bool {
    let path = url.path().to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .chain(FILE_EXTENSIONS.iter())
        .any(|ext| path.ends_with(ext))
}

fn has_embedded_redirect(url: &Url) -> bool {
    match url.query() {
        Some(query) => {
            let query = query.to_lowercase();
            REDIRECT_MARKERS.iter().any(|m| query.contains(m))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Url {
        Url::parse("https://example.com").unwrap()
    }

    #[test]
    fn test_rejects_fragment_and_script() {
        assert!(should_exclude("#section", &root()));
        assert!(should_exclude("#", &root()));
        assert!(should_exclude("javascript:void(0)", &root()));
        assert!(should_exclude("JavaScript:alert(1)", &root()));
        assert!(should_exclude("", &root()));
    }

    #[test]
    fn test_rejects_tel_and_mailto() {
        assert!(should_exclude("mailto:x@y.com", &root()));
        assert!(should_exclude("tel:+15551234", &root()));
    }

    #[test]
    fn test_rejects_binary_extensions() {
        assert!(should_exclude("/img/a.png", &root()));
        assert!(should_exclude("/img/A.JPG", &root()));
        assert!(should_exclude("/files/report.pdf", &root()));
        assert!(should_exclude("/dist/app.tar.gz", &root()));
        assert!(should_exclude("/media/clip.mp4?autoplay=1", &root()));
    }

    #[test]
    fn test_rejects_other_hosts() {
        assert!(should_exclude("https://other.com/page", &root()));
        assert!(should_exclude("//cdn.example.org/page", &root()));
        assert!(should_exclude("https://blog.example.com/", &root()));
    }

    #[test]
    fn test_rejects_other_port_on_same_host() {
        let local = Url::parse("http://127.0.0.1:4001").unwrap();
        assert!(should_exclude("http://127.0.0.1:4002/secret", &local));
        assert!(should_exclude("http://127.0.0.1/secret", &local));
        assert!(!should_exclude("http://127.0.0.1:4001/public", &local));
        assert!(should_exclude("https://example.com:8443/page", &root()));
    }

    #[test]
    fn test_accepts_same_host_variants() {
        assert!(!should_exclude("https://www.example.com/about", &root()));
        assert!(!should_exclude("https://EXAMPLE.com/about", &root()));
        assert!(!should_exclude("http://example.com/about", &root()));
    }

    #[test]
    fn test_rejects_embedded_redirect() {
        assert!(should_exclude("/go?to=https://evil.com", &root()));
        assert!(should_exclude("/go?to=http%3A%2F%2Fevil.com", &root()));
        assert!(!should_exclude("/search?q=rust", &root()));
    }

    #[test]
    fn test_accepts_internal_pages() {
        assert!(!should_exclude("/catalog/42.html", &root()));
        assert!(!should_exclude("catalog/", &root()));
        assert!(!should_exclude("/news#latest", &root()));
        assert!(!should_exclude("https://example.com/contacts", &root()));
    }
}
