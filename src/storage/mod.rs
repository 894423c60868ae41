//! Storage module for persisting the index
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Site lifecycle (creation, heartbeat, terminal status)
//! - Page deduplication by (site, path)
//! - Lemma document frequencies and the lemma -> page inverted index

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::SiteStatus;
use crate::LemmaseekError;

use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, LemmaseekError> {
    SqliteStorage::new(path)
}

/// A crawled site
#[derive(Debug, Clone)]
pub struct SiteRecord {
    pub id: i64,
    /// Normalized root URL, without trailing slash
    pub url: String,
    pub name: String,
    pub status: SiteStatus,
    /// RFC 3339 timestamp of the last heartbeat or status change
    pub status_time: String,
    pub last_error: Option<String>,
}

/// A fetched page, unique per (site, path)
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub id: i64,
    pub site_id: i64,
    /// Site-relative path, `/` for the root
    pub path: String,
    pub code: u16,
    /// Raw fetched body; empty for unreachable and non-HTML pages
    pub content: String,
}

/// A lemma of one site with its document frequency
#[derive(Debug, Clone)]
pub struct LemmaRecord {
    pub id: i64,
    pub site_id: i64,
    pub lemma: String,
    /// Number of distinct pages of the site containing the lemma
    pub frequency: u32,
}

/// An inverted-index edge: the lemma occurs `rank` times on the page
#[derive(Debug, Clone)]
pub struct IndexRecord {
    pub lemma_id: i64,
    pub page_id: i64,
    pub rank: f64,
}
