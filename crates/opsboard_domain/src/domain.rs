//! Domain identifiers for synchronized data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a domain name does not match any known domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown domain: {0}")]
pub struct UnknownDomain(pub String);

/// A named category of remote data the client keeps in sync.
///
/// Each domain maps to exactly one backend endpoint and one payload shape.
/// Exactly one sync engine exists per domain per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    /// Headline moderation counters shown on the dashboard screen.
    DashboardStats,
    /// Action budgets for the operations screen.
    OperationsBudgets,
    /// Paged whitelist listings.
    Whitelist,
    /// Backend latency and throughput metrics.
    PerformanceMetrics,
}

impl Domain {
    /// All known domains, in display order.
    pub const ALL: [Domain; 4] = [
        Domain::DashboardStats,
        Domain::OperationsBudgets,
        Domain::Whitelist,
        Domain::PerformanceMetrics,
    ];

    /// Stable name for this domain, used in CLI arguments and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::DashboardStats => "dashboard-stats",
            Domain::OperationsBudgets => "operations-budgets",
            Domain::Whitelist => "whitelist",
            Domain::PerformanceMetrics => "performance-metrics",
        }
    }

    /// Backend endpoint path serving this domain's payload.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Domain::DashboardStats => "/api/v1/dashboard/stats",
            Domain::OperationsBudgets => "/api/v1/operations/budgets",
            Domain::Whitelist => "/api/v1/whitelist",
            Domain::PerformanceMetrics => "/api/v1/metrics/performance",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .iter()
            .find(|d| d.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownDomain(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trip() {
        for domain in Domain::ALL {
            let parsed: Domain = domain.as_str().parse().unwrap();
            assert_eq!(parsed, domain);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "dashboard".parse::<Domain>().unwrap_err();
        assert_eq!(err, UnknownDomain("dashboard".to_string()));
        assert!(err.to_string().contains("dashboard"));
    }

    #[test]
    fn endpoints_are_distinct() {
        for a in Domain::ALL {
            for b in Domain::ALL {
                if a != b {
                    assert_ne!(a.endpoint(), b.endpoint());
                }
            }
        }
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&Domain::DashboardStats).unwrap();
        assert_eq!(json, "\"dashboard-stats\"");
    }
}
