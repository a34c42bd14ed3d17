//! Fallback payloads for offline operation.

use opsboard_domain::{
    DashboardStats, Domain, DomainPayload, OperationsBudgets, PerformanceMetrics, WhitelistPage,
};

/// Supplies substitute data when live fetches are unavailable.
///
/// Consulted only when offline mode is enabled and retries are exhausted or
/// the device is offline; never while a fetch is successfully completing.
/// The engine prefers last-known-good data and asks the provider only when no
/// live payload has ever been committed.
pub trait FallbackProvider: Send + Sync {
    /// Returns the fallback payload for `domain`.
    ///
    /// Must be a pure function of the domain identifier.
    fn provide(&self, domain: Domain) -> DomainPayload;
}

/// Fixed synthetic payloads, one per domain.
///
/// Everything reads as empty or zero, which view code already renders
/// sensibly; staleness flags tell consumers the data is not live.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticFallback;

impl FallbackProvider for StaticFallback {
    fn provide(&self, domain: Domain) -> DomainPayload {
        match domain {
            Domain::DashboardStats => DomainPayload::Dashboard(DashboardStats {
                open_reports: 0,
                resolved_today: 0,
                flagged_accounts: 0,
                moderators_online: 0,
            }),
            Domain::OperationsBudgets => DomainPayload::Budgets(OperationsBudgets {
                window_hours: 24,
                lines: Vec::new(),
            }),
            Domain::Whitelist => DomainPayload::Whitelist(WhitelistPage {
                entries: Vec::new(),
                page: 1,
                page_size: 25,
                total: 0,
            }),
            Domain::PerformanceMetrics => DomainPayload::Performance(PerformanceMetrics {
                p50_latency_ms: 0.0,
                p95_latency_ms: 0.0,
                error_rate: 0.0,
                requests_per_minute: 0.0,
            }),
        }
    }
}
