//! Crawl orchestration
//!
//! Owns the global indexing lifecycle. `start` recreates every configured
//! site and launches one root task per site on the shared runtime; a
//! supervisor settles each site as its root task completes and returns the
//! orchestrator to `Idle` once all of them have.

use crate::config::Config;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::task::{CrawlOutcome, CrawlTask, SiteContext};
use crate::crawler::throttle::Throttle;
use crate::indexer::IndexBuilder;
use crate::state::{CrawlState, CrawlStateCell, SiteStatus};
use crate::storage::Storage;
use crate::url::normalize_site_root;
use crate::{LemmaseekError, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use url::Url;

/// Error recorded on sites that were still indexing when a stop was requested
pub const STOPPED_BY_OPERATOR: &str = "stopped by operator";

/// A configured site ready to be crawled
#[derive(Debug, Clone)]
struct SiteTarget {
    root: String,
    name: String,
}

/// Drives crawl sessions over the configured sites
pub struct Orchestrator {
    targets: Vec<SiteTarget>,
    parallelism: usize,
    request_delay: Duration,
    referrer: Option<String>,
    client: Client,
    storage: Arc<dyn Storage>,
    indexer: IndexBuilder,
    state: Arc<CrawlStateCell>,
    /// Cancellation token of the current session
    session: std::sync::Mutex<Option<CancellationToken>>,
    supervisor: Mutex<Option<JoinHandle<()>>>,
}

impl Orchestrator {
    pub fn new(config: &Config, storage: Arc<dyn Storage>, indexer: IndexBuilder) -> Result<Self> {
        let targets = config
            .sites
            .iter()
            .map(|site| {
                Ok(SiteTarget {
                    root: normalize_site_root(&site.url)?,
                    name: site.name.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let client = build_http_client(&config.identity, config.crawler.request_timeout_secs)?;

        Ok(Self {
            targets,
            parallelism: config.crawler.parallelism as usize,
            request_delay: Duration::from_millis(config.crawler.request_delay_ms),
            referrer: config.identity.referrer.clone(),
            client,
            storage,
            indexer,
            state: Arc::new(CrawlStateCell::new()),
            session: std::sync::Mutex::new(None),
            supervisor: Mutex::new(None),
        })
    }

    /// Normalized roots of the configured sites, in configuration order
    pub fn site_roots(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(|t| t.root.as_str())
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn referrer(&self) -> Option<&str> {
        self.referrer.as_deref()
    }

    pub fn state(&self) -> CrawlState {
        self.state.get()
    }

    /// True until every root task of the last session has settled
    pub fn is_running(&self) -> bool {
        self.state.get().is_busy()
    }

    /// Starts a crawl session over every configured site
    ///
    /// Prior rows of each site are deleted and a fresh site is created in
    /// status INDEXING before any root task runs. Fails with `AlreadyRunning`
    /// while any task of a previous session is still unwinding.
    pub async fn start(&self) -> Result<()> {
        // The new token is published under the same lock `stop` cancels under
        let cancel = {
            let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
            self.state
                .transition(CrawlState::Idle, CrawlState::Running)
                .map_err(|_| LemmaseekError::AlreadyRunning)?;
            let cancel = CancellationToken::new();
            *session = Some(cancel.clone());
            cancel
        };

        let sites = match self.recreate_sites() {
            Ok(sites) => sites,
            Err(e) => {
                self.state.reset();
                return Err(e);
            }
        };

        let throttle = Throttle::new(self.parallelism, self.request_delay);

        let roots: Vec<(i64, String, CrawlTask)> = sites
            .into_iter()
            .map(|(site_id, site_root)| {
                let ctx = Arc::new(SiteContext {
                    site_id,
                    site_root: site_root.clone(),
                    storage: Arc::clone(&self.storage),
                    indexer: self.indexer.clone(),
                    client: self.client.clone(),
                    throttle: throttle.clone(),
                    referrer: self.referrer.clone(),
                    cancel: cancel.child_token(),
                });
                (site_id, site_root.to_string(), CrawlTask::root(ctx))
            })
            .collect();

        info!(sites = roots.len(), parallelism = self.parallelism, "Indexing started");

        let storage = Arc::clone(&self.storage);
        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(supervise(roots, storage, state));
        *self.supervisor.lock().await = Some(handle);

        Ok(())
    }

    /// Requests a stop of the running session
    ///
    /// Every site still INDEXING is marked FAILED right away; in-flight
    /// fetches finish but no new fetch or fork happens. Does not wait for the
    /// tasks to unwind (see [`Orchestrator::wait_until_idle`]).
    pub fn stop(&self) -> Result<()> {
        {
            let session = self.session.lock().unwrap_or_else(|e| e.into_inner());
            self.state
                .transition(CrawlState::Running, CrawlState::Stopping)
                .map_err(|_| LemmaseekError::NotRunning)?;
            if let Some(cancel) = session.as_ref() {
                cancel.cancel();
            }
        }

        let failed = self.storage.fail_indexing_sites(STOPPED_BY_OPERATOR)?;
        info!(sites = failed, "Indexing stop requested");
        Ok(())
    }

    /// Waits until every root task of the current session has settled
    pub async fn wait_until_idle(&self) {
        let mut supervisor = self.supervisor.lock().await;
        if let Some(handle) = supervisor.as_mut() {
            if let Err(e) = handle.await {
                error!(error = %e, "Crawl supervisor failed");
                self.state.reset();
            }
        }
        *supervisor = None;
    }

    fn recreate_sites(&self) -> Result<Vec<(i64, Url)>> {
        let mut sites = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            if self.storage.delete_site_by_url(&target.root)? {
                info!(site = %target.root, "Discarded previous index of site");
            }
            let site_id = self.storage.create_site(&target.root, &target.name)?;
            sites.push((site_id, Url::parse(&target.root)?));
        }
        Ok(sites)
    }
}

/// Runs every root task to completion, settles its site and resets the state
async fn supervise(
    roots: Vec<(i64, String, CrawlTask)>,
    storage: Arc<dyn Storage>,
    state: Arc<CrawlStateCell>,
) {
    let mut set = JoinSet::new();
    for (site_id, site_root, task) in roots {
        let storage = Arc::clone(&storage);
        set.spawn(async move {
            let outcome = match tokio::spawn(task.run()).await {
                Ok(outcome) => outcome,
                Err(e) => CrawlOutcome::Failed(format!("crawl task failed: {}", e)),
            };
            settle_site(storage.as_ref(), site_id, &site_root, &outcome);
        });
    }

    while let Some(joined) = set.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "Site supervisor failed");
        }
    }

    state.reset();
    info!("Indexing finished");
}

/// Maps a root outcome onto the terminal status of its site
fn settle_site(storage: &dyn Storage, site_id: i64, site_root: &str, outcome: &CrawlOutcome) {
    let (status, error) = match outcome {
        CrawlOutcome::Succeeded => (SiteStatus::Indexed, None),
        CrawlOutcome::Stopped => (SiteStatus::Failed, Some(STOPPED_BY_OPERATOR)),
        CrawlOutcome::Failed(cause) => (SiteStatus::Failed, Some(cause.as_str())),
    };

    match storage.finish_site(site_id, status, error) {
        Ok(true) => info!(site = %site_root, status = %status, outcome = %outcome, "Site settled"),
        Ok(false) => info!(site = %site_root, outcome = %outcome, "Site already settled"),
        Err(e) => warn!(site = %site_root, error = %e, "Failed to record site status"),
    }
}
