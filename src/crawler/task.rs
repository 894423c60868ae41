//! The recursive crawl unit
//!
//! A [`CrawlTask`] fetches one URL, records it as a page of its site, hands
//! the page to the indexer, forks a child task for every new link and joins
//! them all before reporting the least successful outcome of its subtree.

use crate::crawler::fetcher::{fetch_url, FetchResult};
use crate::crawler::parser::parse_html;
use crate::crawler::throttle::Throttle;
use crate::indexer::IndexBuilder;
use crate::storage::{PageRecord, Storage};
use crate::url::{same_site, site_relative_path};
use reqwest::Client;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use url::Url;

/// Terminal outcome of a crawl task and, through joins, of its whole subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    Succeeded,
    /// Cancellation was observed before or after a fetch
    Stopped,
    /// A connectivity failure (or a storage fault) doomed the site
    Failed(String),
}

impl CrawlOutcome {
    fn severity(&self) -> u8 {
        match self {
            Self::Succeeded => 0,
            Self::Stopped => 1,
            Self::Failed(_) => 2,
        }
    }

    /// The less successful of two outcomes; the first one wins ties
    pub fn worst(self, other: Self) -> Self {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for CrawlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Stopped => write!(f, "stopped"),
            Self::Failed(cause) => write!(f, "failed: {}", cause),
        }
    }
}

/// Everything the tasks of one site share
pub struct SiteContext {
    pub site_id: i64,
    pub site_root: Url,
    pub storage: Arc<dyn Storage>,
    pub indexer: IndexBuilder,
    pub client: Client,
    pub throttle: Throttle,
    pub referrer: Option<String>,
    /// Cancelled by an operator stop (through the session token) or by a
    /// connectivity failure on this site
    pub cancel: CancellationToken,
}

/// One URL's fetch-parse-persist-recurse unit
pub struct CrawlTask {
    ctx: Arc<SiteContext>,
    url: Url,
}

impl CrawlTask {
    /// The root task of a site, starting at its root URL
    pub fn root(ctx: Arc<SiteContext>) -> Self {
        let url = ctx.site_root.clone();
        Self { ctx, url }
    }

    pub fn new(ctx: Arc<SiteContext>, url: Url) -> Self {
        Self { ctx, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Runs the task and its whole subtree
    pub fn run(self) -> Pin<Box<dyn Future<Output = CrawlOutcome> + Send>> {
        Box::pin(self.crawl())
    }

    async fn crawl(self) -> CrawlOutcome {
        let ctx = self.ctx;
        let url = self.url;

        if ctx.cancel.is_cancelled() {
            return CrawlOutcome::Stopped;
        }

        if let Err(e) = ctx.storage.touch_site(ctx.site_id) {
            warn!(site = %ctx.site_root, error = %e, "Failed to refresh site status time");
        }

        let permit = match ctx.throttle.acquire(&ctx.cancel).await {
            Some(permit) => permit,
            None => return CrawlOutcome::Stopped,
        };
        let result = fetch_url(&ctx.client, &url, ctx.referrer.as_deref()).await;
        drop(permit);

        if ctx.cancel.is_cancelled() {
            return CrawlOutcome::Stopped;
        }

        let path = site_relative_path(&url);

        match result {
            FetchResult::Success {
                final_url,
                status_code,
                body,
            } => {
                if !same_site(&final_url, &ctx.site_root) {
                    warn!(site = %ctx.site_root, url = %url, landed = %final_url, "Redirected off site");
                    return CrawlOutcome::Succeeded;
                }
                // A redirected page is stored under the path it landed on
                let path = site_relative_path(&final_url);
                crawl_page(ctx, path, final_url, status_code, body).await
            }

            FetchResult::HttpStatus { status_code } => {
                warn!(site = %ctx.site_root, path = %path, status = status_code, "Page unreachable");
                record_empty_page(&ctx, &path, status_code)
            }

            FetchResult::NotHtml {
                status_code,
                content_type,
            } => {
                debug!(site = %ctx.site_root, path = %path, content_type = %content_type, "Skipping non-HTML page");
                record_empty_page(&ctx, &path, status_code)
            }

            FetchResult::Connectivity { error } => {
                error!(site = %ctx.site_root, url = %url, error = %error, "Site unreachable");
                ctx.cancel.cancel();
                CrawlOutcome::Failed(format!("{}: {}", url, error))
            }

            FetchResult::Broken { error } => {
                warn!(site = %ctx.site_root, url = %url, error = %error, "Broken response");
                CrawlOutcome::Succeeded
            }
        }
    }
}

/// Records a page without content; it is deduplicated but never indexed
fn record_empty_page(ctx: &SiteContext, path: &str, status_code: u16) -> CrawlOutcome {
    match ctx.storage.insert_page(ctx.site_id, path, status_code, "") {
        Ok(_) => CrawlOutcome::Succeeded,
        Err(e) => CrawlOutcome::Failed(format!("storage error on {}: {}", path, e)),
    }
}

async fn crawl_page(
    ctx: Arc<SiteContext>,
    path: String,
    final_url: Url,
    status_code: u16,
    body: String,
) -> CrawlOutcome {
    let page_id = match ctx
        .storage
        .insert_page(ctx.site_id, &path, status_code, &body)
    {
        Ok(Some(id)) => id,
        Ok(None) => {
            debug!(site = %ctx.site_root, path = %path, "Page already claimed");
            return CrawlOutcome::Succeeded;
        }
        Err(e) => return CrawlOutcome::Failed(format!("storage error on {}: {}", path, e)),
    };
    debug!(site = %ctx.site_root, path = %path, status = status_code, "Page fetched");

    let parsed = parse_html(&body, &final_url, &ctx.site_root);

    let page = PageRecord {
        id: page_id,
        site_id: ctx.site_id,
        path,
        code: status_code,
        content: body,
    };
    let indexer = ctx.indexer.clone();
    let indexing = tokio::task::spawn_blocking(move || indexer.index_page(&page));

    let mut children = JoinSet::new();
    for link in parsed.links {
        if ctx.cancel.is_cancelled() {
            break;
        }
        match ctx.storage.page_exists(ctx.site_id, &site_relative_path(&link)) {
            Ok(true) => continue,
            Ok(false) => {}
            Err(e) => {
                warn!(site = %ctx.site_root, url = %link, error = %e, "Page lookup failed");
            }
        }
        children.spawn(CrawlTask::new(Arc::clone(&ctx), link).run());
    }

    let mut outcome = match indexing.await {
        Ok(Ok(_)) => CrawlOutcome::Succeeded,
        Ok(Err(e)) => CrawlOutcome::Failed(format!("indexing failed: {}", e)),
        Err(e) => CrawlOutcome::Failed(format!("indexing task failed: {}", e)),
    };

    while let Some(joined) = children.join_next().await {
        let child = joined.unwrap_or_else(|e| CrawlOutcome::Failed(format!("crawl task failed: {}", e)));
        outcome = outcome.worst(child);
    }

    if outcome.is_success() && ctx.cancel.is_cancelled() {
        return CrawlOutcome::Stopped;
    }
    outcome
}
