//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with failure classification
//! - HTML parsing, link filtering and title extraction
//! - Fetch throttling (parallelism and politeness delay)
//! - The recursive crawl task and the session orchestrator

mod fetcher;
mod orchestrator;
mod parser;
mod task;
mod throttle;

pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use orchestrator::{Orchestrator, STOPPED_BY_OPERATOR};
pub use parser::{extract_title, parse_html, ParsedPage};
pub use task::{CrawlOutcome, CrawlTask, SiteContext};
pub use throttle::{FetchPermit, Throttle};
