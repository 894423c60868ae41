use crate::crawler::extract_title;
use crate::lemma::{visible_text, LemmaExtractor};
use crate::search::snippet::build_snippet;
use crate::search::{SearchResponse, SearchResult};
use crate::storage::{SiteRecord, Storage};
use crate::url::normalize_site_root;
use crate::{LemmaseekError, Result};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Title used when a page has no usable `<title>`
pub const UNTITLED: &str = "Untitled";

/// A query lemma with its document frequency and lemma rows
struct QueryTerm {
    lemma: String,
    frequency: u64,
    /// One lemma row per site in scope
    lemma_ids: Vec<i64>,
}

/// Answers free-text queries against the lemma index
///
/// Every query lemma must occur on a page for the page to match. Candidate
/// pages are narrowed starting from the rarest lemma; relevance is the sum of
/// the lemma ranks on the page divided by the best such sum.
pub struct SearchRanker {
    storage: Arc<dyn Storage>,
    extractor: LemmaExtractor,
    snippet_words: usize,
}

impl SearchRanker {
    pub fn new(storage: Arc<dyn Storage>, extractor: LemmaExtractor, snippet_words: usize) -> Self {
        Self {
            storage,
            extractor,
            snippet_words,
        }
    }

    /// Runs a query, optionally restricted to one site
    ///
    /// `count` in the response is the number of matching pages before
    /// `offset` and `limit` are applied.
    pub fn search(
        &self,
        query: &str,
        site: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> Result<SearchResponse> {
        if query.trim().is_empty() {
            return Err(LemmaseekError::EmptyQuery);
        }

        let site_id = match site {
            Some(url) => {
                let root = normalize_site_root(url)?;
                let record = self
                    .storage
                    .find_site_by_url(&root)?
                    .ok_or(LemmaseekError::SiteNotIndexed { url: root })?;
                Some(record.id)
            }
            None => None,
        };

        let lemmas = self.extractor.lemma_set(query);
        let terms = match self.load_terms(&lemmas, site_id)? {
            Some(terms) => terms,
            None => {
                debug!(query = %query, "Query lemma missing from index");
                return Ok(SearchResponse::empty());
            }
        };

        let ranked = rank(self.match_pages(&terms)?);
        let count = ranked.len();

        let mut sites: HashMap<i64, SiteRecord> = HashMap::new();
        let mut results = Vec::new();
        for (page_id, relevance) in ranked.into_iter().skip(offset).take(limit) {
            let page = self.storage.get_page(page_id)?;
            if !sites.contains_key(&page.site_id) {
                let record = self.storage.get_site(page.site_id)?;
                sites.insert(page.site_id, record);
            }
            let (site_url, site_name) = match sites.get(&page.site_id) {
                Some(record) => (record.url.clone(), record.name.clone()),
                None => continue,
            };

            let title = extract_title(&page.content).unwrap_or_else(|| UNTITLED.to_string());
            let snippet = build_snippet(
                &visible_text(&page.content),
                &lemmas,
                &self.extractor,
                self.snippet_words,
            );

            results.push(SearchResult {
                site: site_url,
                site_name,
                uri: page.path,
                title,
                snippet,
                relevance,
            });
        }

        info!(query = %query, count, returned = results.len(), "Search completed");
        Ok(SearchResponse { count, results })
    }

    /// Looks up every query lemma, rarest first; None if any lemma is unknown
    ///
    /// Only lemma rows are read here. Index rows are loaded by
    /// [`SearchRanker::match_pages`].
    fn load_terms(
        &self,
        lemmas: &HashSet<String>,
        site_id: Option<i64>,
    ) -> Result<Option<Vec<QueryTerm>>> {
        if lemmas.is_empty() {
            return Ok(None);
        }

        let mut terms = Vec::with_capacity(lemmas.len());
        for lemma in lemmas {
            let rows = self.storage.find_lemmas(lemma, site_id)?;
            if rows.is_empty() {
                return Ok(None);
            }

            terms.push(QueryTerm {
                lemma: lemma.clone(),
                frequency: rows.iter().map(|row| row.frequency as u64).sum(),
                lemma_ids: rows.iter().map(|row| row.id).collect(),
            });
        }

        terms.sort_by(|a, b| {
            a.frequency
                .cmp(&b.frequency)
                .then_with(|| a.lemma.cmp(&b.lemma))
        });
        Ok(Some(terms))
    }

    /// Pages carrying every term, with the summed rank of the terms on each
    ///
    /// The candidate set starts as the pages of the rarest term and each
    /// further term is only looked up on the pages still in it.
    fn match_pages(&self, terms: &[QueryTerm]) -> Result<HashMap<i64, f64>> {
        let (rarest, rest) = match terms.split_first() {
            Some(split) => split,
            None => return Ok(HashMap::new()),
        };

        let mut candidates: HashMap<i64, f64> = HashMap::new();
        for lemma_id in &rarest.lemma_ids {
            for entry in self.storage.index_entries(*lemma_id)? {
                *candidates.entry(entry.page_id).or_insert(0.0) += entry.rank;
            }
        }

        for term in rest {
            if candidates.is_empty() {
                break;
            }
            let page_ids: Vec<i64> = candidates.keys().copied().collect();
            let ranks = self.storage.ranks_for_pages(&term.lemma_ids, &page_ids)?;
            candidates.retain(|page_id, absolute| match ranks.get(page_id) {
                Some(rank) => {
                    *absolute += rank;
                    true
                }
                None => false,
            });
            debug!(lemma = %term.lemma, candidates = candidates.len(), "Narrowed candidates");
        }

        Ok(candidates)
    }
}

/// Normalizes absolute relevance by the best page
///
/// Returns (page id, relative relevance) sorted by relevance descending, ties
/// by page id ascending.
fn rank(candidates: HashMap<i64, f64>) -> Vec<(i64, f64)> {
    let max = candidates.values().cloned().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return Vec::new();
    }

    let mut ranked: Vec<(i64, f64)> = candidates
        .into_iter()
        .map(|(page_id, absolute)| (page_id, absolute / max))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked
}
