use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Global lifecycle of the indexing process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// No crawl is running; `start` is allowed
    Idle,

    /// Root tasks are in flight
    Running,

    /// A stop was requested; root tasks are still unwinding
    Stopping,
}

impl CrawlState {
    fn to_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Running => 1,
            Self::Stopping => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Stopping,
            _ => Self::Idle,
        }
    }

    /// Returns true while any root task may still be running
    pub fn is_busy(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
        };
        write!(f, "{}", name)
    }
}

/// Atomically checked holder of the [`CrawlState`]
///
/// Every transition is a compare-and-swap, so two concurrent `start` calls can
/// never both succeed and `stop` on an idle crawler is always rejected.
#[derive(Debug)]
pub struct CrawlStateCell {
    inner: AtomicU8,
}

impl Default for CrawlStateCell {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlStateCell {
    pub fn new() -> Self {
        Self {
            inner: AtomicU8::new(CrawlState::Idle.to_u8()),
        }
    }

    /// Current state
    pub fn get(&self) -> CrawlState {
        CrawlState::from_u8(self.inner.load(Ordering::Acquire))
    }

    /// Moves `from -> to` if the current state is `from`
    ///
    /// On failure returns the state that was actually observed.
    pub fn transition(&self, from: CrawlState, to: CrawlState) -> Result<(), CrawlState> {
        self.inner
            .compare_exchange(from.to_u8(), to.to_u8(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(CrawlState::from_u8)
    }

    /// Unconditionally returns to `Idle` once every root task has settled
    pub fn reset(&self) {
        self.inner.store(CrawlState::Idle.to_u8(), Ordering::Release);
    }
}
