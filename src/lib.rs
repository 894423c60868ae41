//! Lemmaseek: a site crawler with a lemma-based inverted index
//!
//! This crate crawls a configured set of websites, reduces the visible text of
//! every page to dictionary base forms (lemmas), keeps a per-site inverted index
//! of lemma -> page with term-frequency weights, and answers free-text queries
//! by ranking pages against that index.

pub mod config;
pub mod crawler;
pub mod engine;
pub mod indexer;
pub mod lemma;
pub mod morphology;
pub mod output;
pub mod search;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Lemmaseek operations
#[derive(Debug, Error)]
pub enum LemmaseekError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Indexing is already running")]
    AlreadyRunning,

    #[error("Indexing is not running")]
    NotRunning,

    #[error("Search query is empty")]
    EmptyQuery,

    #[error("Page {url} is outside the configured sites")]
    OutsideConfiguredSites { url: String },

    #[error("Site for {url} has not been indexed yet")]
    SiteNotIndexed { url: String },

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Index storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Bad URL: {0}")]
    Url(#[from] UrlError),

    #[error("Unparseable URL: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client setup failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Background task failed: {0}")]
    TaskJoin(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading `lemmaseek.toml`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Site URL rejected: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Cannot parse {0}")]
    Parse(String),

    #[error("Only http and https are crawled, got {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Lemmaseek operations
pub type Result<T> = std::result::Result<T, LemmaseekError>;

/// Result of configuration loading
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result of URL parsing and normalization
pub type UrlResult<T> = std::result::Result<T, UrlError>;

pub use config::Config;
pub use engine::Engine;
pub use search::{SearchResponse, SearchResult};
pub use state::{CrawlState, SiteStatus};
