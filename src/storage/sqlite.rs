//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::SiteStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{IndexRecord, LemmaRecord, PageRecord, SiteRecord};
use crate::LemmaseekError;
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SITE_COLUMNS: &str = "id, url, name, status, status_time, last_error";
const PAGE_COLUMNS: &str = "id, site_id, path, code, content";

/// Page IDs bound per `IN (...)` query, well under SQLite's variable limit
const PAGE_ID_CHUNK: usize = 500;

/// SQLite storage backend
///
/// A single connection behind a mutex. Each trait method holds the lock for
/// one statement or one transaction.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens or creates the database file at `path` and initializes the schema
    pub fn new(path: &Path) -> Result<Self, LemmaseekError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, LemmaseekError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn site_from_row(row: &Row<'_>) -> rusqlite::Result<SiteRecord> {
    Ok(SiteRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        name: row.get(2)?,
        status: SiteStatus::from_db_string(&row.get::<_, String>(3)?)
            .unwrap_or(SiteStatus::Failed),
        status_time: row.get(4)?,
        last_error: row.get(5)?,
    })
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        id: row.get(0)?,
        site_id: row.get(1)?,
        path: row.get(2)?,
        code: row.get(3)?,
        content: row.get(4)?,
    })
}

fn scope_clause(site_id: Option<i64>) -> (&'static str, i64) {
    match site_id {
        Some(id) => ("site_id = ?1", id),
        None => ("?1 IS NOT NULL", 0),
    }
}

impl Storage for SqliteStorage {
    // ===== Sites =====

    fn create_site(&self, url: &str, name: &str) -> StorageResult<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sites (url, name, status, status_time) VALUES (?1, ?2, ?3, ?4)",
            params![url, name, SiteStatus::Indexing.to_db_string(), now()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn delete_site_by_url(&self, url: &str) -> StorageResult<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM sites WHERE url = ?1", params![url])?;
        Ok(deleted > 0)
    }

    fn get_site(&self, site_id: i64) -> StorageResult<SiteRecord> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM sites WHERE id = ?1", SITE_COLUMNS),
            params![site_id],
            site_from_row,
        )
        .optional()?
        .ok_or(StorageError::SiteNotFound(site_id))
    }

    fn find_site_by_url(&self, url: &str) -> StorageResult<Option<SiteRecord>> {
        let conn = self.conn()?;
        let site = conn
            .query_row(
                &format!("SELECT {} FROM sites WHERE url = ?1", SITE_COLUMNS),
                params![url],
                site_from_row,
            )
            .optional()?;
        Ok(site)
    }

    fn list_sites(&self) -> StorageResult<Vec<SiteRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM sites ORDER BY id", SITE_COLUMNS))?;
        let sites = stmt
            .query_map([], site_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sites)
    }

    fn touch_site(&self, site_id: i64) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE sites SET status_time = ?1 WHERE id = ?2",
            params![now(), site_id],
        )?;
        Ok(())
    }

    fn finish_site(
        &self,
        site_id: i64,
        status: SiteStatus,
        error: Option<&str>,
    ) -> StorageResult<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE sites SET status = ?1, last_error = ?2, status_time = ?3
             WHERE id = ?4 AND status = ?5",
            params![
                status.to_db_string(),
                error,
                now(),
                site_id,
                SiteStatus::Indexing.to_db_string()
            ],
        )?;
        Ok(updated > 0)
    }

    fn fail_indexing_sites(&self, error: &str) -> StorageResult<usize> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE sites SET status = ?1, last_error = ?2, status_time = ?3 WHERE status = ?4",
            params![
                SiteStatus::Failed.to_db_string(),
                error,
                now(),
                SiteStatus::Indexing.to_db_string()
            ],
        )?;
        Ok(updated)
    }

    // ===== Pages =====

    fn insert_page(
        &self,
        site_id: i64,
        path: &str,
        code: u16,
        content: &str,
    ) -> StorageResult<Option<i64>> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT INTO pages (site_id, path, code, content) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(site_id, path) DO NOTHING",
            params![site_id, path, code, content],
        )?;

        if inserted == 0 {
            Ok(None)
        } else {
            Ok(Some(conn.last_insert_rowid()))
        }
    }

    fn page_exists(&self, site_id: i64, path: &str) -> StorageResult<bool> {
        let conn = self.conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM pages WHERE site_id = ?1 AND path = ?2",
                params![site_id, path],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn get_page(&self, page_id: i64) -> StorageResult<PageRecord> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM pages WHERE id = ?1", PAGE_COLUMNS),
            params![page_id],
            page_from_row,
        )
        .optional()?
        .ok_or(StorageError::PageNotFound(page_id))
    }

    fn find_page(&self, site_id: i64, path: &str) -> StorageResult<Option<PageRecord>> {
        let conn = self.conn()?;
        let page = conn
            .query_row(
                &format!(
                    "SELECT {} FROM pages WHERE site_id = ?1 AND path = ?2",
                    PAGE_COLUMNS
                ),
                params![site_id, path],
                page_from_row,
            )
            .optional()?;
        Ok(page)
    }

    fn delete_page(&self, page_id: i64) -> StorageResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let site_id: i64 = tx
            .query_row(
                "SELECT site_id FROM pages WHERE id = ?1",
                params![page_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StorageError::PageNotFound(page_id))?;

        tx.execute(
            "UPDATE lemmas SET frequency = frequency - 1
             WHERE id IN (SELECT lemma_id FROM search_index WHERE page_id = ?1)",
            params![page_id],
        )?;
        tx.execute("DELETE FROM pages WHERE id = ?1", params![page_id])?;
        tx.execute(
            "DELETE FROM lemmas WHERE site_id = ?1 AND frequency <= 0",
            params![site_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn count_pages(&self, site_id: Option<i64>) -> StorageResult<u64> {
        let conn = self.conn()?;
        let (clause, value) = scope_clause(site_id);
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM pages WHERE {}", clause),
            params![value],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ===== Lemmas & index =====

    fn index_page_lemmas(
        &self,
        site_id: i64,
        page_id: i64,
        counts: &HashMap<String, u32>,
    ) -> StorageResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        {
            let mut insert_lemma = tx.prepare_cached(
                "INSERT INTO lemmas (site_id, lemma, frequency) VALUES (?1, ?2, 0)
                 ON CONFLICT(site_id, lemma) DO NOTHING",
            )?;
            let mut select_lemma =
                tx.prepare_cached("SELECT id FROM lemmas WHERE site_id = ?1 AND lemma = ?2")?;
            let mut insert_edge = tx.prepare_cached(
                "INSERT INTO search_index (lemma_id, page_id, rank) VALUES (?1, ?2, ?3)
                 ON CONFLICT(lemma_id, page_id) DO NOTHING",
            )?;
            let mut bump_frequency =
                tx.prepare_cached("UPDATE lemmas SET frequency = frequency + 1 WHERE id = ?1")?;

            for (lemma, count) in counts {
                insert_lemma.execute(params![site_id, lemma])?;
                let lemma_id: i64 =
                    select_lemma.query_row(params![site_id, lemma], |row| row.get(0))?;

                if insert_edge.execute(params![lemma_id, page_id, *count as f64])? > 0 {
                    bump_frequency.execute(params![lemma_id])?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn find_lemmas(&self, lemma: &str, site_id: Option<i64>) -> StorageResult<Vec<LemmaRecord>> {
        let conn = self.conn()?;
        let (clause, value) = scope_clause(site_id);
        let mut stmt = conn.prepare(&format!(
            "SELECT id, site_id, lemma, frequency FROM lemmas WHERE lemma = ?2 AND {} ORDER BY id",
            clause
        ))?;
        let lemmas = stmt
            .query_map(params![value, lemma], |row| {
                Ok(LemmaRecord {
                    id: row.get(0)?,
                    site_id: row.get(1)?,
                    lemma: row.get(2)?,
                    frequency: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lemmas)
    }

    fn index_entries(&self, lemma_id: i64) -> StorageResult<Vec<IndexRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT lemma_id, page_id, rank FROM search_index WHERE lemma_id = ?1 ORDER BY page_id",
        )?;
        let entries = stmt
            .query_map(params![lemma_id], |row| {
                Ok(IndexRecord {
                    lemma_id: row.get(0)?,
                    page_id: row.get(1)?,
                    rank: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn ranks_for_pages(
        &self,
        lemma_ids: &[i64],
        page_ids: &[i64],
    ) -> StorageResult<HashMap<i64, f64>> {
        let mut ranks = HashMap::new();
        if lemma_ids.is_empty() || page_ids.is_empty() {
            return Ok(ranks);
        }

        let conn = self.conn()?;
        for chunk in page_ids.chunks(PAGE_ID_CHUNK) {
            let sql = format!(
                "SELECT page_id, SUM(rank) FROM search_index \
                 WHERE lemma_id IN ({}) AND page_id IN ({}) GROUP BY page_id",
                placeholders(lemma_ids.len()),
                placeholders(chunk.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(lemma_ids.iter().chain(chunk)), |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?))
            })?;
            for row in rows {
                let (page_id, rank) = row?;
                ranks.insert(page_id, rank);
            }
        }
        Ok(ranks)
    }

    fn count_lemmas(&self, site_id: Option<i64>) -> StorageResult<u64> {
        let conn = self.conn()?;
        let (clause, value) = scope_clause(site_id);
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM lemmas WHERE {}", clause),
            params![value],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_pages_with_lemma(&self, site_id: i64, lemma: &str) -> StorageResult<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT si.page_id) FROM search_index si
             JOIN lemmas l ON l.id = si.lemma_id
             WHERE l.site_id = ?1 AND l.lemma = ?2",
            params![site_id, lemma],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

/// `?` list for an SQL `IN (...)` of `n` values
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u32)]) -> HashMap<String, u32> {
        pairs.iter().map(|(l, c)| (l.to_string(), *c)).collect()
    }

    fn lemma(storage: &SqliteStorage, site_id: i64, name: &str) -> Option<LemmaRecord> {
        storage
            .find_lemmas(name, Some(site_id))
            .unwrap()
            .into_iter()
            .next()
    }

    #[test]
    fn test_create_in_memory() {
        assert!(SqliteStorage::new_in_memory().is_ok());
    }

    #[test]
    fn test_create_site_starts_indexing() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let id = storage.create_site("https://example.com", "Example").unwrap();

        let site = storage.get_site(id).unwrap();
        assert_eq!(site.url, "https://example.com");
        assert_eq!(site.status, SiteStatus::Indexing);
        assert!(site.last_error.is_none());
        assert!(!site.status_time.is_empty());
    }

    #[test]
    fn test_insert_duplicate_page() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let site = storage.create_site("https://example.com", "Example").unwrap();

        let first = storage.insert_page(site, "/about", 200, "<p>hi</p>").unwrap();
        let second = storage.insert_page(site, "/about", 200, "<p>hi</p>").unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        assert!(storage.page_exists(site, "/about").unwrap());
        assert_eq!(storage.count_pages(Some(site)).unwrap(), 1);
    }

    #[test]
    fn test_same_path_on_two_sites() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let a = storage.create_site("https://a.com", "A").unwrap();
        let b = storage.create_site("https://b.com", "B").unwrap();

        assert!(storage.insert_page(a, "/", 200, "").unwrap().is_some());
        assert!(storage.insert_page(b, "/", 200, "").unwrap().is_some());
        assert_eq!(storage.count_pages(None).unwrap(), 2);
    }

    #[test]
    fn test_document_frequency_counts_pages_not_occurrences() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let site = storage.create_site("https://example.com", "Example").unwrap();
        let p1 = storage.insert_page(site, "/1", 200, "").unwrap().unwrap();
        let p2 = storage.insert_page(site, "/2", 200, "").unwrap().unwrap();

        storage
            .index_page_lemmas(site, p1, &counts(&[("cat", 5), ("dog", 1)]))
            .unwrap();
        storage
            .index_page_lemmas(site, p2, &counts(&[("cat", 2)]))
            .unwrap();

        let cat = lemma(&storage, site, "cat").unwrap();
        assert_eq!(cat.frequency, 2);
        assert_eq!(lemma(&storage, site, "dog").unwrap().frequency, 1);

        let entries = storage.index_entries(cat.id).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].rank, 5.0);
        assert_eq!(entries[1].rank, 2.0);
    }

    #[test]
    fn test_reindexing_same_page_is_idempotent() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let site = storage.create_site("https://example.com", "Example").unwrap();
        let page = storage.insert_page(site, "/", 200, "").unwrap().unwrap();

        storage.index_page_lemmas(site, page, &counts(&[("cat", 1)])).unwrap();
        storage.index_page_lemmas(site, page, &counts(&[("cat", 1)])).unwrap();

        assert_eq!(lemma(&storage, site, "cat").unwrap().frequency, 1);
    }

    #[test]
    fn test_delete_page_decrements_and_prunes_lemmas() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let site = storage.create_site("https://example.com", "Example").unwrap();
        let p1 = storage.insert_page(site, "/1", 200, "").unwrap().unwrap();
        let p2 = storage.insert_page(site, "/2", 200, "").unwrap().unwrap();

        storage
            .index_page_lemmas(site, p1, &counts(&[("cat", 1), ("owl", 3)]))
            .unwrap();
        storage.index_page_lemmas(site, p2, &counts(&[("cat", 1)])).unwrap();

        storage.delete_page(p1).unwrap();

        assert_eq!(lemma(&storage, site, "cat").unwrap().frequency, 1);
        assert!(lemma(&storage, site, "owl").is_none());
        assert!(matches!(
            storage.get_page(p1),
            Err(StorageError::PageNotFound(_))
        ));
        assert!(matches!(
            storage.delete_page(p1),
            Err(StorageError::PageNotFound(_))
        ));
    }

    #[test]
    fn test_delete_site_cascades() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let site = storage.create_site("https://example.com", "Example").unwrap();
        let page = storage.insert_page(site, "/", 200, "").unwrap().unwrap();
        storage.index_page_lemmas(site, page, &counts(&[("cat", 1)])).unwrap();

        assert!(storage.delete_site_by_url("https://example.com").unwrap());
        assert!(!storage.delete_site_by_url("https://example.com").unwrap());

        assert_eq!(storage.count_pages(None).unwrap(), 0);
        assert_eq!(storage.count_lemmas(None).unwrap(), 0);
        assert!(storage.find_lemmas("cat", None).unwrap().is_empty());
    }

    #[test]
    fn test_finish_site_only_from_indexing() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let site = storage.create_site("https://example.com", "Example").unwrap();

        assert_eq!(storage.fail_indexing_sites("stopped by operator").unwrap(), 1);
        assert!(!storage
            .finish_site(site, SiteStatus::Indexed, None)
            .unwrap());

        let record = storage.get_site(site).unwrap();
        assert_eq!(record.status, SiteStatus::Failed);
        assert_eq!(record.last_error.as_deref(), Some("stopped by operator"));
    }

    #[test]
    fn test_find_lemmas_across_sites() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let a = storage.create_site("https://a.com", "A").unwrap();
        let b = storage.create_site("https://b.com", "B").unwrap();
        let pa = storage.insert_page(a, "/", 200, "").unwrap().unwrap();
        let pb = storage.insert_page(b, "/", 200, "").unwrap().unwrap();

        storage.index_page_lemmas(a, pa, &counts(&[("cat", 1)])).unwrap();
        storage.index_page_lemmas(b, pb, &counts(&[("cat", 1)])).unwrap();

        assert_eq!(storage.find_lemmas("cat", None).unwrap().len(), 2);
        assert_eq!(storage.find_lemmas("cat", Some(b)).unwrap().len(), 1);
        assert_eq!(storage.count_lemmas(Some(a)).unwrap(), 1);
        assert_eq!(storage.count_pages_with_lemma(a, "cat").unwrap(), 1);
    }

    #[test]
    fn test_ranks_for_pages_limits_to_candidates() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let a = storage.create_site("https://a.com", "A").unwrap();
        let b = storage.create_site("https://b.com", "B").unwrap();
        let a1 = storage.insert_page(a, "/1", 200, "").unwrap().unwrap();
        let a2 = storage.insert_page(a, "/2", 200, "").unwrap().unwrap();
        let b1 = storage.insert_page(b, "/1", 200, "").unwrap().unwrap();

        storage.index_page_lemmas(a, a1, &counts(&[("cat", 3)])).unwrap();
        storage.index_page_lemmas(a, a2, &counts(&[("cat", 1), ("dog", 2)])).unwrap();
        storage.index_page_lemmas(b, b1, &counts(&[("cat", 7)])).unwrap();

        let cat: Vec<i64> = storage
            .find_lemmas("cat", None)
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();

        let ranks = storage.ranks_for_pages(&cat, &[a1, b1]).unwrap();
        assert_eq!(ranks.len(), 2);
        assert_eq!(ranks[&a1], 3.0);
        assert_eq!(ranks[&b1], 7.0);

        let dog = lemma(&storage, a, "dog").unwrap().id;
        let ranks = storage.ranks_for_pages(&[dog], &[a1, a2, b1]).unwrap();
        assert_eq!(ranks.keys().copied().collect::<Vec<_>>(), vec![a2]);

        assert!(storage.ranks_for_pages(&cat, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_ranks_for_pages_over_many_candidates() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let site = storage.create_site("https://example.com", "Example").unwrap();
        let mut pages = Vec::new();
        for i in 0..(PAGE_ID_CHUNK + 20) {
            let id = storage
                .insert_page(site, &format!("/{}", i), 200, "")
                .unwrap()
                .unwrap();
            if i % 2 == 0 {
                storage.index_page_lemmas(site, id, &counts(&[("owl", 1)])).unwrap();
            }
            pages.push(id);
        }

        let owl = lemma(&storage, site, "owl").unwrap().id;
        let ranks = storage.ranks_for_pages(&[owl], &pages).unwrap();
        assert_eq!(ranks.len(), (PAGE_ID_CHUNK + 20 + 1) / 2);
    }

    #[test]
    fn test_get_missing_site() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert!(matches!(
            storage.get_site(42),
            Err(StorageError::SiteNotFound(42))
        ));
        assert!(storage.find_site_by_url("https://nope.com").unwrap().is_none());
    }
}
