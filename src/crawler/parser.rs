//! HTML parser for extracting links and the page title
//!
//! Parsing is synchronous and returns owned data, so it can run between two
//! await points of a crawl task.

use crate::url::{should_exclude, site_relative_path};
use lazy_static::lazy_static;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

lazy_static! {
    static ref TITLE: Selector = Selector::parse("title").expect("valid selector");
    static ref ANCHOR: Selector = Selector::parse("a[href]").expect("valid selector");
}

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from the first `<title>` tag)
    pub title: Option<String>,

    /// Crawlable links, absolute and without fragment, in document order
    pub links: Vec<Url>,
}

/// Parses HTML content and extracts the title and crawlable links
///
/// Every `<a href>` not marked `download` is checked with the link filter
/// against `site_root`, then resolved against `page_url` (RFC 3986). Fragments
/// are dropped and links leading to the same site-relative path are kept once.
///
/// # Example
///
/// ```
/// use lemmaseek::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let root = Url::parse("https://example.com").unwrap();
/// let parsed = parse_html(html, &root, &root);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links[0].as_str(), "https://example.com/page");
/// ```
pub fn parse_html(html: &str, page_url: &Url, site_root: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: title_of(&document),
        links: extract_links(&document, page_url, site_root),
    }
}

/// Extracts the first non-empty `<title>` of an HTML document
pub fn extract_title(html: &str) -> Option<String> {
    title_of(&Html::parse_document(html))
}

fn title_of(document: &Html) -> Option<String> {
    document
        .select(&TITLE)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_links(document: &Html, page_url: &Url, site_root: &Url) -> Vec<Url> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&ANCHOR) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let href = match element.value().attr("href") {
            Some(href) => href.trim(),
            None => continue,
        };

        if should_exclude(href, site_root) {
            continue;
        }

        if let Ok(mut absolute) = page_url.join(href) {
            absolute.set_fragment(None);
            if seen.insert(site_relative_path(&absolute)) {
                links.push(absolute);
            }
        }
    }

    links
}
