//! Fetch throttling
//!
//! Bounds the number of fetches in flight across all sites with a semaphore
//! and applies the politeness delay before every fetch. The permit covers the
//! delay and the fetch only; a task never holds it while joining children.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// Permission to issue one fetch
pub struct FetchPermit {
    _permit: OwnedSemaphorePermit,
}

/// Global fetch limiter shared by every crawl task of a session
#[derive(Debug, Clone)]
pub struct Throttle {
    semaphore: Arc<Semaphore>,
    delay: Duration,
}

impl Throttle {
    pub fn new(parallelism: usize, delay: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(parallelism.max(1))),
            delay,
        }
    }

    /// Waits for a free slot, then for the politeness delay
    ///
    /// Returns None as soon as `cancel` fires, so a stopped crawl never
    /// issues another fetch.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Option<FetchPermit> {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            permit = Arc::clone(&self.semaphore).acquire_owned() => permit.ok()?,
        };

        if !self.delay.is_zero() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return None,
                _ = tokio::time::sleep(self.delay) => {}
            }
        }

        if cancel.is_cancelled() {
            return None;
        }

        Some(FetchPermit { _permit: permit })
    }

    /// Number of free fetch slots
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
