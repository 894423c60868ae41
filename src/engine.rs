//! The caller-facing surface
//!
//! [`Engine`] wires storage, morphology, the crawl orchestrator and the search
//! ranker together from one [`Config`].
//!
//! # Example
//!
//! ```no_run
//! use lemmaseek::config::load_config;
//! use lemmaseek::Engine;
//! use std::path::Path;
//!
//! # async fn example() -> lemmaseek::Result<()> {
//! let config = load_config(Path::new("lemmaseek.toml"))?;
//! let engine = Engine::open(config)?;
//!
//! engine.start_indexing().await?;
//! engine.wait_until_idle().await;
//!
//! let response = engine.search("rust compiler", None, 0, None)?;
//! println!("{} pages match", response.count);
//! # Ok(())
//! # }
//! ```

use crate::config::Config;
use crate::crawler::{fetch_url, FetchResult, Orchestrator};
use crate::indexer::IndexBuilder;
use crate::lemma::LemmaExtractor;
use crate::morphology::{MorphologyAdapter, StemmerMorphology};
use crate::output::{load_statistics, Statistics};
use crate::search::{SearchRanker, SearchResponse};
use crate::state::CrawlState;
use crate::storage::{PageRecord, SqliteStorage, Storage};
use crate::url::{owning_site_root, parse_http_url, same_site, site_relative_path};
use crate::{LemmaseekError, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Crawler, indexer and search engine over the configured sites
pub struct Engine {
    config: Config,
    storage: Arc<dyn Storage>,
    indexer: IndexBuilder,
    orchestrator: Orchestrator,
    ranker: SearchRanker,
}

impl Engine {
    /// Opens the SQLite database named in the configuration
    pub fn open(config: Config) -> Result<Self> {
        let storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;
        Self::with_storage(config, Arc::new(storage))
    }

    /// Builds an engine over any storage backend
    pub fn with_storage(config: Config, storage: Arc<dyn Storage>) -> Result<Self> {
        let language = config.morphology.language;
        let morphology: Arc<dyn MorphologyAdapter> = Arc::new(StemmerMorphology::new(language));
        let extractor = LemmaExtractor::new(morphology, language);

        let indexer = IndexBuilder::new(Arc::clone(&storage), extractor.clone());
        let orchestrator = Orchestrator::new(&config, Arc::clone(&storage), indexer.clone())?;
        let ranker = SearchRanker::new(
            Arc::clone(&storage),
            extractor,
            config.search.snippet_words,
        );

        Ok(Self {
            config,
            storage,
            indexer,
            orchestrator,
            ranker,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Starts crawling every configured site; fails with `AlreadyRunning`
    /// while a previous session is still settling
    pub async fn start_indexing(&self) -> Result<()> {
        self.orchestrator.start().await
    }

    /// Stops the running session; fails with `NotRunning` when idle
    pub fn stop_indexing(&self) -> Result<()> {
        self.orchestrator.stop()
    }

    pub fn is_indexing(&self) -> bool {
        self.orchestrator.is_running()
    }

    pub fn crawl_state(&self) -> CrawlState {
        self.orchestrator.state()
    }

    /// Waits until every site of the current session has settled
    pub async fn wait_until_idle(&self) {
        self.orchestrator.wait_until_idle().await
    }

    /// Re-fetches and re-indexes one page of an already crawled site
    ///
    /// The previous version of the page, if any, is removed together with its
    /// contribution to lemma frequencies before the fresh copy is stored.
    /// Returns the number of distinct lemmas indexed.
    pub async fn index_single_page(&self, url: &str) -> Result<usize> {
        let page_url = parse_http_url(url)?;

        let root = owning_site_root(&page_url, self.orchestrator.site_roots()).ok_or_else(|| {
            LemmaseekError::OutsideConfiguredSites {
                url: url.to_string(),
            }
        })?;
        let site = self
            .storage
            .find_site_by_url(root)?
            .ok_or_else(|| LemmaseekError::SiteNotIndexed {
                url: root.to_string(),
            })?;

        let result = fetch_url(
            self.orchestrator.client(),
            &page_url,
            self.orchestrator.referrer(),
        )
        .await;

        let (path, code, content) = match result {
            FetchResult::Success {
                final_url,
                status_code,
                body,
            } => {
                if !same_site(&final_url, &page_url) {
                    return Err(LemmaseekError::Fetch {
                        url: url.to_string(),
                        message: format!("redirected off site to {}", final_url),
                    });
                }
                (site_relative_path(&final_url), status_code, body)
            }
            FetchResult::HttpStatus { status_code } => {
                (site_relative_path(&page_url), status_code, String::new())
            }
            FetchResult::NotHtml { status_code, .. } => {
                (site_relative_path(&page_url), status_code, String::new())
            }
            FetchResult::Connectivity { error } | FetchResult::Broken { error } => {
                return Err(LemmaseekError::Fetch {
                    url: url.to_string(),
                    message: error,
                });
            }
        };

        if let Some(previous) = self.storage.find_page(site.id, &path)? {
            self.indexer.remove_page(previous.id)?;
            debug!(site = %site.url, path = %path, "Removed previous version of page");
        }

        let page_id = match self.storage.insert_page(site.id, &path, code, &content)? {
            Some(id) => id,
            None => {
                debug!(site = %site.url, path = %path, "Page re-created concurrently");
                return Ok(0);
            }
        };

        let page = PageRecord {
            id: page_id,
            site_id: site.id,
            path,
            code,
            content,
        };
        let indexer = self.indexer.clone();
        let lemmas = tokio::task::spawn_blocking(move || indexer.index_page(&page))
            .await
            .map_err(|e| LemmaseekError::TaskJoin(e.to_string()))??;

        info!(url = %page_url, status = code, lemmas, "Page indexed on demand");
        Ok(lemmas)
    }

    /// Searches the index; `limit` defaults to the configured page size
    pub fn search(
        &self,
        query: &str,
        site: Option<&str>,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<SearchResponse> {
        let limit = limit.unwrap_or(self.config.search.default_limit);
        self.ranker.search(query, site, offset, limit)
    }

    /// Per-site and total statistics
    pub fn statistics(&self) -> Result<Statistics> {
        load_statistics(self.storage.as_ref(), self.is_indexing())
    }
}
