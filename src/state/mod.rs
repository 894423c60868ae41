//! State module for tracking indexing progress
//!
//! # Components
//!
//! - `CrawlState`: global Idle/Running/Stopping lifecycle, held in a `CrawlStateCell`
//! - `SiteStatus`: per-site INDEXING/INDEXED/FAILED status stored on the Site row

mod crawl_state;
mod site_status;

pub use crawl_state::{CrawlState, CrawlStateCell};
pub use site_status::SiteStatus;
