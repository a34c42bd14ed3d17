//! Engine-owned state: snapshot, control state, and consumer views.

use opsboard_domain::{Domain, DomainPayload};
use std::time::Duration;
use tokio::time::Instant;

/// The lifecycle phase of a sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    /// Created, first fetch not yet started.
    Uninitialized,
    /// The very first fetch is in flight.
    Loading,
    /// Holding a settled snapshot, no fetch in flight.
    Ready,
    /// A subsequent fetch (manual or scheduled) is in flight.
    Refreshing,
    /// Waiting out a retry delay after a failed fetch.
    Retrying,
    /// Disposed. Terminal.
    Disposed,
}

impl EnginePhase {
    /// Returns true while a fetch or retry wait is active.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            EnginePhase::Loading | EnginePhase::Refreshing | EnginePhase::Retrying
        )
    }

    /// Returns true when a new refresh may start.
    pub fn can_start_refresh(&self) -> bool {
        matches!(self, EnginePhase::Ready)
    }
}

/// The authoritative value for one domain.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Latest committed payload; absent until the first successful fetch
    /// (or a fallback substitution).
    pub payload: Option<DomainPayload>,
    /// Time of the last successful commit. Fallback substitutions do not
    /// advance this.
    pub last_updated: Option<Instant>,
    /// Issuance token of the committed fetch; orders competing completions.
    pub(crate) token: u64,
}

impl Snapshot {
    pub(crate) fn empty() -> Self {
        Self {
            payload: None,
            last_updated: None,
            token: 0,
        }
    }

    /// Returns true when the payload is absent or older than twice the
    /// refresh interval.
    pub fn is_stale(&self, refresh_interval: Duration, now: Instant) -> bool {
        match (&self.payload, self.last_updated) {
            (Some(_), Some(at)) => now.saturating_duration_since(at) > refresh_interval * 2,
            _ => true,
        }
    }
}

/// Engine-owned control state for one domain.
#[derive(Debug, Clone)]
pub struct SyncState {
    /// Current lifecycle phase.
    pub phase: EnginePhase,
    /// Last user-facing error message.
    pub error: Option<String>,
    /// Last known device reachability.
    pub is_online: bool,
    /// Last known server reachability, independent of device connectivity.
    pub is_backend_healthy: bool,
    /// Consecutive failures since the last success, clamped to the retry
    /// ceiling.
    pub retry_count: u32,
}

impl SyncState {
    pub(crate) fn new(is_online: bool) -> Self {
        Self {
            phase: EnginePhase::Uninitialized,
            error: None,
            is_online,
            is_backend_healthy: true,
            retry_count: 0,
        }
    }

    /// True only during the very first fetch after initialization.
    pub fn is_loading(&self) -> bool {
        self.phase == EnginePhase::Loading
    }

    /// True during any subsequent fetch or retry wait.
    pub fn is_refreshing(&self) -> bool {
        matches!(self.phase, EnginePhase::Refreshing | EnginePhase::Retrying)
    }
}

/// Read-only projection of Snapshot and SyncState pushed to subscribers.
///
/// This is the entire surface a view consumer may depend on; subscribers
/// never hold references into engine-owned state.
#[derive(Debug, Clone)]
pub struct DomainView {
    /// The domain this view describes.
    pub domain: Domain,
    /// Latest committed payload.
    pub payload: Option<DomainPayload>,
    /// Time of the last successful commit.
    pub last_updated: Option<Instant>,
    /// True only during the very first fetch.
    pub is_loading: bool,
    /// True during any subsequent fetch or retry wait.
    pub is_refreshing: bool,
    /// Last user-facing error message.
    pub error: Option<String>,
    /// Last known device reachability.
    pub is_online: bool,
    /// Last known server reachability.
    pub is_backend_healthy: bool,
    /// Consecutive failures since the last success, clamped to the retry
    /// ceiling.
    pub retry_count: u32,
    /// True when the payload is absent or past twice the refresh interval.
    pub is_stale: bool,
}
