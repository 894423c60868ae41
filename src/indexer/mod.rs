//! Index building
//!
//! Merges the lemma counts of one page into the shared lemma/index tables.
//! Pages of the same site are indexed concurrently by many crawl tasks; the
//! storage backend applies each page as one atomic increment-or-insert batch,
//! so no document-frequency update is lost under contention.

use crate::lemma::LemmaExtractor;
use crate::storage::{PageRecord, Storage, StorageResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Merges pages into the inverted index
#[derive(Clone)]
pub struct IndexBuilder {
    storage: Arc<dyn Storage>,
    extractor: LemmaExtractor,
}

impl IndexBuilder {
    pub fn new(storage: Arc<dyn Storage>, extractor: LemmaExtractor) -> Self {
        Self { storage, extractor }
    }

    /// Merges precomputed lemma counts for `page`
    pub fn index(&self, page: &PageRecord, counts: &HashMap<String, u32>) -> StorageResult<()> {
        if counts.is_empty() {
            return Ok(());
        }
        self.storage
            .index_page_lemmas(page.site_id, page.id, counts)?;
        debug!(
            page_id = page.id,
            path = %page.path,
            lemmas = counts.len(),
            "Page indexed"
        );
        Ok(())
    }

    /// Extracts lemmas from the stored content of `page` and indexes them
    ///
    /// Returns the number of distinct lemmas merged.
    pub fn index_page(&self, page: &PageRecord) -> StorageResult<usize> {
        let counts = self.extractor.extract_html(&page.content);
        self.index(page, &counts)?;
        Ok(counts.len())
    }

    /// Removes a page and its contribution to lemma frequencies
    pub fn remove_page(&self, page_id: i64) -> StorageResult<()> {
        self.storage.delete_page(page_id)
    }

    pub fn extractor(&self) -> &LemmaExtractor {
        &self.extractor
    }
}
