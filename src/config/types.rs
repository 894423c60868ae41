use crate::morphology::Language;
use serde::Deserialize;

/// Main configuration structure for Lemmaseek
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub identity: IdentityConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub morphology: MorphologyConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of fetches in flight across all sites
    pub parallelism: u32,

    /// Politeness delay applied before every fetch (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

/// Identity the crawler presents to the sites it fetches
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Value of the User-Agent header
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Value of the Referer header, if any
    #[serde(default)]
    pub referrer: Option<String>,
}

/// Persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Morphology configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MorphologyConfig {
    #[serde(default)]
    pub language: Language,
}

/// Search presentation settings
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Number of words in a result snippet
    #[serde(rename = "snippet-words", default = "default_snippet_words")]
    pub snippet_words: usize,

    /// Page size used when the caller does not give one
    #[serde(rename = "default-limit", default = "default_limit")]
    pub default_limit: usize,
}

fn default_snippet_words() -> usize {
    25
}

fn default_limit() -> usize {
    20
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            snippet_words: default_snippet_words(),
            default_limit: default_limit(),
        }
    }
}

/// A site to crawl
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    /// Root URL the crawl starts from
    pub url: String,

    /// Human readable site name
    pub name: String,
}
