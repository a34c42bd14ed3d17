//! Typed payloads returned by the backend, one shape per domain.

use crate::domain::Domain;
use serde::{Deserialize, Serialize};

/// Headline moderation counters for the dashboard screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Reports currently open.
    pub open_reports: u64,
    /// Reports resolved since midnight, backend-local time.
    pub resolved_today: u64,
    /// Accounts currently flagged for review.
    pub flagged_accounts: u64,
    /// Moderators with an active session.
    pub moderators_online: u32,
}

/// One action-budget line on the operations screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetLine {
    /// Budget category, e.g. `"takedowns"`.
    pub category: String,
    /// Actions allocated for the current window.
    pub allocated: u64,
    /// Actions consumed so far.
    pub consumed: u64,
}

impl BudgetLine {
    /// Actions still available in this line.
    pub fn remaining(&self) -> u64 {
        self.allocated.saturating_sub(self.consumed)
    }
}

/// Action budgets for the current review window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationsBudgets {
    /// Length of the budget window in hours.
    pub window_hours: u32,
    /// Budget lines, one per category.
    pub lines: Vec<BudgetLine>,
}

/// A single whitelist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    /// Server-assigned entry id.
    pub id: u64,
    /// The whitelisted pattern.
    pub pattern: String,
    /// Account name that added the entry.
    pub added_by: String,
    /// Optional operator note.
    #[serde(default)]
    pub note: Option<String>,
}

/// One page of whitelist entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistPage {
    /// Entries on this page.
    pub entries: Vec<WhitelistEntry>,
    /// 1-based page number.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Total entries across all pages.
    pub total: u64,
}

/// Backend latency and throughput metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Median request latency in milliseconds.
    pub p50_latency_ms: f64,
    /// 95th percentile request latency in milliseconds.
    pub p95_latency_ms: f64,
    /// Fraction of requests that failed, 0.0 to 1.0.
    pub error_rate: f64,
    /// Requests served per minute.
    pub requests_per_minute: f64,
}

/// A payload for exactly one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainPayload {
    /// Payload for [`Domain::DashboardStats`].
    Dashboard(DashboardStats),
    /// Payload for [`Domain::OperationsBudgets`].
    Budgets(OperationsBudgets),
    /// Payload for [`Domain::Whitelist`].
    Whitelist(WhitelistPage),
    /// Payload for [`Domain::PerformanceMetrics`].
    Performance(PerformanceMetrics),
}

impl DomainPayload {
    /// The domain this payload belongs to.
    pub fn domain(&self) -> Domain {
        match self {
            DomainPayload::Dashboard(_) => Domain::DashboardStats,
            DomainPayload::Budgets(_) => Domain::OperationsBudgets,
            DomainPayload::Whitelist(_) => Domain::Whitelist,
            DomainPayload::Performance(_) => Domain::PerformanceMetrics,
        }
    }

    /// Decodes a raw backend response body for the given domain.
    ///
    /// The backend returns the bare payload object per endpoint; the domain
    /// selects which shape to expect.
    pub fn decode(domain: Domain, body: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(match domain {
            Domain::DashboardStats => DomainPayload::Dashboard(serde_json::from_slice(body)?),
            Domain::OperationsBudgets => DomainPayload::Budgets(serde_json::from_slice(body)?),
            Domain::Whitelist => DomainPayload::Whitelist(serde_json::from_slice(body)?),
            Domain::PerformanceMetrics => DomainPayload::Performance(serde_json::from_slice(body)?),
        })
    }
}
