//! Sample payloads and scheduler helpers.

use opsboard_domain::{
    BudgetLine, DashboardStats, Domain, DomainPayload, OperationsBudgets, PerformanceMetrics,
    WhitelistEntry, WhitelistPage,
};

/// Sample dashboard counters.
pub fn dashboard_stats() -> DomainPayload {
    DomainPayload::Dashboard(DashboardStats {
        open_reports: 12,
        resolved_today: 48,
        flagged_accounts: 3,
        moderators_online: 5,
    })
}

/// Sample operations budgets with two lines.
pub fn operations_budgets() -> DomainPayload {
    DomainPayload::Budgets(OperationsBudgets {
        window_hours: 24,
        lines: vec![
            BudgetLine {
                category: "takedowns".into(),
                allocated: 100,
                consumed: 37,
            },
            BudgetLine {
                category: "warnings".into(),
                allocated: 250,
                consumed: 114,
            },
        ],
    })
}

/// Sample whitelist page with one entry.
pub fn whitelist_page() -> DomainPayload {
    DomainPayload::Whitelist(WhitelistPage {
        entries: vec![WhitelistEntry {
            id: 7,
            pattern: "*.trusted.example".into(),
            added_by: "ana".into(),
            note: Some("partner network".into()),
        }],
        page: 1,
        page_size: 25,
        total: 1,
    })
}

/// Sample performance metrics.
pub fn performance_metrics() -> DomainPayload {
    DomainPayload::Performance(PerformanceMetrics {
        p50_latency_ms: 41.5,
        p95_latency_ms: 187.0,
        error_rate: 0.004,
        requests_per_minute: 912.0,
    })
}

/// Sample payload for any domain.
pub fn payload_for(domain: Domain) -> DomainPayload {
    match domain {
        Domain::DashboardStats => dashboard_stats(),
        Domain::OperationsBudgets => operations_budgets(),
        Domain::Whitelist => whitelist_page(),
        Domain::PerformanceMetrics => performance_metrics(),
    }
}

/// Raw JSON body the backend would return for a domain's endpoint.
///
/// Decoding it with [`DomainPayload::decode`] yields [`payload_for`] exactly.
pub fn sample_body(domain: Domain) -> Vec<u8> {
    match payload_for(domain) {
        DomainPayload::Dashboard(inner) => serde_json::to_vec(&inner),
        DomainPayload::Budgets(inner) => serde_json::to_vec(&inner),
        DomainPayload::Whitelist(inner) => serde_json::to_vec(&inner),
        DomainPayload::Performance(inner) => serde_json::to_vec(&inner),
    }
    .expect("fixture payloads always serialize")
}

/// Yields to the scheduler enough times for spawned engine drivers to settle.
///
/// With a paused clock, pair with `tokio::time::sleep`/`advance` to cross
/// timer boundaries; this helper only drains ready tasks.
pub async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bodies_decode_back_to_fixtures() {
        for domain in Domain::ALL {
            let decoded = DomainPayload::decode(domain, &sample_body(domain)).unwrap();
            assert_eq!(decoded, payload_for(domain));
        }
    }
}
