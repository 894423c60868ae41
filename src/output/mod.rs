//! Output module for reporting on the index
//!
//! This module handles:
//! - Loading per-site and total statistics
//! - Printing statistics and search results for the command line

pub mod stats;

pub use stats::{load_statistics, print_statistics, SiteStatistics, Statistics, TotalStatistics};

use crate::search::SearchResponse;

/// Prints a page of search results to stdout
pub fn print_search_results(query: &str, response: &SearchResponse, offset: usize) {
    println!("=== Results for \"{}\" ===\n", query);

    if response.results.is_empty() {
        println!("No matches.");
        return;
    }

    for (i, result) in response.results.iter().enumerate() {
        println!(
            "{}. {} [{:.3}]",
            offset + i + 1,
            result.title,
            result.relevance
        );
        println!("   {}{} ({})", result.site, result.uri, result.site_name);
        println!("   {}", result.snippet);
        println!();
    }

    println!(
        "Showing {}-{} of {} matches",
        offset + 1,
        offset + response.results.len(),
        response.count
    );
}
