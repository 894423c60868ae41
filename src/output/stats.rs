//! Index statistics
//!
//! This module provides functionality for extracting and displaying
//! per-site and total index statistics from the storage layer.

use crate::state::SiteStatus;
use crate::storage::Storage;
use crate::LemmaseekError;
use serde::Serialize;

/// Totals over every site
#[derive(Debug, Clone, Default, Serialize)]
pub struct TotalStatistics {
    pub sites: u64,
    pub pages: u64,
    pub lemmas: u64,
    /// True while a crawl session is running
    pub indexing: bool,
}

/// Statistics of one site
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStatistics {
    pub url: String,
    pub name: String,
    pub status: SiteStatus,
    /// RFC 3339 time of the last heartbeat or status change
    pub status_time: String,
    pub error: Option<String>,
    pub pages: u64,
    pub lemmas: u64,
}

/// Index statistics summary
#[derive(Debug, Clone, Default, Serialize)]
pub struct Statistics {
    pub total: TotalStatistics,
    pub detailed: Vec<SiteStatistics>,
}

/// Loads statistics from storage
///
/// `indexing` is reported as given; storage has no notion of a running session.
pub fn load_statistics(storage: &dyn Storage, indexing: bool) -> Result<Statistics, LemmaseekError> {
    let sites = storage.list_sites()?;

    let mut detailed = Vec::with_capacity(sites.len());
    for site in sites {
        detailed.push(SiteStatistics {
            pages: storage.count_pages(Some(site.id))?,
            lemmas: storage.count_lemmas(Some(site.id))?,
            url: site.url,
            name: site.name,
            status: site.status,
            status_time: site.status_time,
            error: site.last_error,
        });
    }

    let total = TotalStatistics {
        sites: detailed.len() as u64,
        pages: detailed.iter().map(|s| s.pages).sum(),
        lemmas: detailed.iter().map(|s| s.lemmas).sum(),
        indexing,
    };

    Ok(Statistics { total, detailed })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &Statistics) {
    println!("=== Index Statistics ===\n");

    println!("Overview:");
    println!("  Sites: {}", stats.total.sites);
    println!("  Pages: {}", stats.total.pages);
    println!("  Lemmas: {}", stats.total.lemmas);
    println!(
        "  Indexing: {}",
        if stats.total.indexing { "running" } else { "idle" }
    );
    println!();

    if stats.detailed.is_empty() {
        println!("No sites indexed yet.");
        return;
    }

    println!("Sites:");
    for site in &stats.detailed {
        println!("  {} ({})", site.name, site.url);
        println!("    Status: {} at {}", site.status, site.status_time);
        println!("    Pages: {}, Lemmas: {}", site.pages, site.lemmas);
        if let Some(error) = &site.error {
            println!("    Error: {}", error);
        }
    }
}
