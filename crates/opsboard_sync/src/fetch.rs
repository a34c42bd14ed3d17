//! Fetcher abstraction: one remote call per data domain.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use opsboard_domain::{Domain, DomainPayload};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// A fetcher performs one remote call for a named data domain.
///
/// Implementations classify failures into the [`SyncError`] taxonomy and must
/// be cancel-safe: the engine enforces its own deadline and may drop the
/// future at any await point. The engine stamps each issuance with a token,
/// so a fetcher never needs to reason about ordering.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the current payload for `domain`.
    async fn fetch(&self, domain: Domain) -> SyncResult<DomainPayload>;
}

/// One queued outcome for a [`ScriptedFetcher`].
#[derive(Debug, Clone)]
pub struct ScriptedOutcome {
    /// The result to return.
    pub result: SyncResult<DomainPayload>,
    /// How long the fetch appears to take.
    pub delay: Duration,
}

/// A scripted fetcher for tests and demos.
///
/// Outcomes are queued per domain and replayed in order. An exhausted queue
/// yields a network error, so tests control exactly how many fetches can
/// succeed.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<Domain, VecDeque<ScriptedOutcome>>>,
    issued: Mutex<Vec<Domain>>,
}

impl ScriptedFetcher {
    /// Creates a fetcher with no scripted outcomes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful outcome for `domain`.
    pub fn push_ok(&self, domain: Domain, payload: DomainPayload) {
        self.push(domain, Ok(payload), Duration::ZERO);
    }

    /// Queues a failed outcome for `domain`.
    pub fn push_err(&self, domain: Domain, error: SyncError) {
        self.push(domain, Err(error), Duration::ZERO);
    }

    /// Queues an outcome that resolves only after `delay` elapses.
    pub fn push_after(&self, domain: Domain, delay: Duration, result: SyncResult<DomainPayload>) {
        self.push(domain, result, delay);
    }

    fn push(&self, domain: Domain, result: SyncResult<DomainPayload>, delay: Duration) {
        self.scripts
            .lock()
            .entry(domain)
            .or_default()
            .push_back(ScriptedOutcome { result, delay });
    }

    /// Number of fetches issued for `domain` so far.
    pub fn calls(&self, domain: Domain) -> usize {
        self.issued.lock().iter().filter(|d| **d == domain).count()
    }

    /// Number of fetches issued across all domains.
    pub fn total_calls(&self) -> usize {
        self.issued.lock().len()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, domain: Domain) -> SyncResult<DomainPayload> {
        let outcome = {
            self.issued.lock().push(domain);
            self.scripts
                .lock()
                .get_mut(&domain)
                .and_then(VecDeque::pop_front)
        };
        match outcome {
            Some(outcome) => {
                if !outcome.delay.is_zero() {
                    tokio::time::sleep(outcome.delay).await;
                }
                outcome.result
            }
            None => Err(SyncError::Network("no scripted outcome queued".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsboard_domain::{DashboardStats, DomainPayload};

    fn stats() -> DomainPayload {
        DomainPayload::Dashboard(DashboardStats {
            open_reports: 1,
            resolved_today: 2,
            flagged_accounts: 3,
            moderators_online: 4,
        })
    }

    #[tokio::test]
    async fn replays_outcomes_in_order() {
        let fetcher = ScriptedFetcher::new();
        fetcher.push_err(Domain::DashboardStats, SyncError::Timeout);
        fetcher.push_ok(Domain::DashboardStats, stats());

        assert!(matches!(
            fetcher.fetch(Domain::DashboardStats).await,
            Err(SyncError::Timeout)
        ));
        assert_eq!(fetcher.fetch(Domain::DashboardStats).await.unwrap(), stats());
        assert_eq!(fetcher.calls(Domain::DashboardStats), 2);
    }

    #[tokio::test]
    async fn exhausted_queue_is_a_network_error() {
        let fetcher = ScriptedFetcher::new();
        assert!(matches!(
            fetcher.fetch(Domain::Whitelist).await,
            Err(SyncError::Network(_))
        ));
    }

    #[tokio::test]
    async fn domains_are_scripted_independently() {
        let fetcher = ScriptedFetcher::new();
        fetcher.push_ok(Domain::DashboardStats, stats());

        assert!(fetcher.fetch(Domain::DashboardStats).await.is_ok());
        assert!(fetcher.fetch(Domain::Whitelist).await.is_err());
        assert_eq!(fetcher.calls(Domain::DashboardStats), 1);
        assert_eq!(fetcher.calls(Domain::Whitelist), 1);
        assert_eq!(fetcher.total_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_outcome_waits() {
        let fetcher = ScriptedFetcher::new();
        fetcher.push_after(
            Domain::DashboardStats,
            Duration::from_secs(5),
            Ok(stats()),
        );

        let started = tokio::time::Instant::now();
        fetcher.fetch(Domain::DashboardStats).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
