//! Site status definitions
//!
//! A Site row moves `Indexing -> Indexed` when every branch of its crawl
//! succeeded, or `Indexing -> Failed` on a connectivity failure or an operator
//! stop. Both end states hold until the next crawl recreates the site.
use serde::Serialize;
use std::fmt;

/// Lifecycle status of a crawled site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SiteStatus {
    /// Crawl of the site is in progress
    Indexing,

    /// Every branch of the crawl succeeded
    Indexed,

    /// The crawl was stopped or hit a connectivity failure
    Failed,
}

impl SiteStatus {
    /// Returns true if the site will not change until it is recreated
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Indexing)
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Indexing => "INDEXING",
            Self::Indexed => "INDEXED",
            Self::Failed => "FAILED",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "INDEXING" => Some(Self::Indexing),
            "INDEXED" => Some(Self::Indexed),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
