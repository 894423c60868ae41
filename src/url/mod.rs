//! URL handling module for Lemmaseek
//!
//! This module provides site-root normalization, site-relative page paths,
//! host comparison and the link filter used by the crawler.

mod domain;
mod filter;
mod normalize;

pub use domain::{bare_host, extract_host, same_host, same_site};
pub use filter::should_exclude;
pub use normalize::{normalize_site_root, parse_http_url, site_relative_path};

use url::Url;

/// Finds the configured site root a page URL belongs to
///
/// Returns the first root on the same site as the page (see [`same_site`]).
/// Roots that fail to parse are skipped.
pub fn owning_site_root<'a, I>(page: &Url, roots: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    roots.into_iter().find(|root| {
        Url::parse(root)
            .map(|root_url| same_site(page, &root_url))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owning_site_root() {
        let roots = ["https://example.com", "https://other.org"];
        let page = Url::parse("https://www.other.org/news/1").unwrap();
        assert_eq!(
            owning_site_root(&page, roots.iter().copied()),
            Some("https://other.org")
        );

        let stranger = Url::parse("https://unknown.net/").unwrap();
        assert_eq!(owning_site_root(&stranger, roots.iter().copied()), None);
    }

    #[test]
    fn test_owning_site_root_matches_port() {
        let roots = ["http://127.0.0.1:4001", "http://127.0.0.1:4002"];
        let page = Url::parse("http://127.0.0.1:4002/a").unwrap();
        assert_eq!(
            owning_site_root(&page, roots.iter().copied()),
            Some("http://127.0.0.1:4002")
        );

        let elsewhere = Url::parse("http://127.0.0.1:4003/a").unwrap();
        assert_eq!(owning_site_root(&elsewhere, roots.iter().copied()), None);
    }
}
