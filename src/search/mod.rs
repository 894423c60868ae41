//! Search over the lemma index
//!
//! Queries are reduced to lemmas with the same pipeline used for indexing.
//! Results carry a title, a snippet and a relevance relative to the best match.

mod ranker;
mod snippet;

pub use ranker::{SearchRanker, UNTITLED};
pub use snippet::build_snippet;

use serde::Serialize;

/// One ranked page
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// Root URL of the page's site
    pub site: String,
    #[serde(rename = "siteName")]
    pub site_name: String,
    /// Site-relative path of the page
    pub uri: String,
    pub title: String,
    pub snippet: String,
    /// Relevance relative to the best match, in (0, 1]
    pub relevance: f64,
}

/// A page of search results
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResponse {
    /// Total number of matching pages, before offset and limit
    pub count: usize,
    pub results: Vec<SearchResult>,
}

impl SearchResponse {
    pub fn empty() -> Self {
        Self::default()
    }
}
