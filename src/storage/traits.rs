//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::SiteStatus;
use crate::storage::{IndexRecord, LemmaRecord, PageRecord, SiteRecord};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Site not found: {0}")]
    SiteNotFound(i64),

    #[error("Page not found: {0}")]
    PageNotFound(i64),

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every method takes `&self`: one storage is shared by all crawl tasks, the
/// indexer and the search ranker at the same time. The uniqueness invariants
/// (site+path, site+lemma, lemma+page) are enforced by the backend, and races
/// on them are reported as "already exists" rather than as errors.
pub trait Storage: Send + Sync {
    // ===== Sites =====

    /// Creates a site in status INDEXING and returns its ID
    fn create_site(&self, url: &str, name: &str) -> StorageResult<i64>;

    /// Deletes a site and, by cascade, its pages, lemmas and index rows
    ///
    /// Returns false if no site has this URL.
    fn delete_site_by_url(&self, url: &str) -> StorageResult<bool>;

    fn get_site(&self, site_id: i64) -> StorageResult<SiteRecord>;

    fn find_site_by_url(&self, url: &str) -> StorageResult<Option<SiteRecord>>;

    fn list_sites(&self) -> StorageResult<Vec<SiteRecord>>;

    /// Refreshes the status time of a site (crawl heartbeat)
    fn touch_site(&self, site_id: i64) -> StorageResult<()>;

    /// Sets the terminal status of a site that is still INDEXING
    ///
    /// Returns false if the site had already left INDEXING.
    fn finish_site(
        &self,
        site_id: i64,
        status: SiteStatus,
        error: Option<&str>,
    ) -> StorageResult<bool>;

    /// Marks every INDEXING site as FAILED with `error`, returning how many changed
    fn fail_indexing_sites(&self, error: &str) -> StorageResult<usize>;

    // ===== Pages =====

    /// Inserts a page unless (site, path) already exists
    ///
    /// Returns the new page ID, or None if another task already owns the path.
    fn insert_page(
        &self,
        site_id: i64,
        path: &str,
        code: u16,
        content: &str,
    ) -> StorageResult<Option<i64>>;

    fn page_exists(&self, site_id: i64, path: &str) -> StorageResult<bool>;

    fn get_page(&self, page_id: i64) -> StorageResult<PageRecord>;

    fn find_page(&self, site_id: i64, path: &str) -> StorageResult<Option<PageRecord>>;

    /// Deletes a page with its index rows, decrementing the document
    /// frequency of every lemma it contributed and dropping lemmas that
    /// reach zero
    fn delete_page(&self, page_id: i64) -> StorageResult<()>;

    /// Number of pages, for one site or all sites
    fn count_pages(&self, site_id: Option<i64>) -> StorageResult<u64>;

    // ===== Lemmas & index =====

    /// Merges the lemma counts of one page into the index atomically
    ///
    /// Each lemma's frequency grows by one per page, regardless of its count;
    /// the index row carries the count as rank. Indexing the same page twice
    /// leaves frequencies unchanged.
    fn index_page_lemmas(
        &self,
        site_id: i64,
        page_id: i64,
        counts: &HashMap<String, u32>,
    ) -> StorageResult<()>;

    /// Lemma rows for `lemma`, for one site or all sites
    fn find_lemmas(&self, lemma: &str, site_id: Option<i64>) -> StorageResult<Vec<LemmaRecord>>;

    /// Index rows of one lemma
    fn index_entries(&self, lemma_id: i64) -> StorageResult<Vec<IndexRecord>>;

    /// Summed rank of the given lemma rows on each of the given pages
    ///
    /// Pages carrying none of the lemmas are absent from the map.
    fn ranks_for_pages(
        &self,
        lemma_ids: &[i64],
        page_ids: &[i64],
    ) -> StorageResult<HashMap<i64, f64>>;

    /// Number of lemmas, for one site or all sites
    fn count_lemmas(&self, site_id: Option<i64>) -> StorageResult<u64>;

    /// Number of distinct pages of a site indexed under `lemma`
    fn count_pages_with_lemma(&self, site_id: i64, lemma: &str) -> StorageResult<u64>;
}
