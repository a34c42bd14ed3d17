//! One-shot fetch of a domain's payload.

use crate::client::ReqwestClient;
use opsboard_domain::{Domain, DomainPayload};
use opsboard_sync::{Fetcher, HttpFetcher};
use std::time::Duration;

/// Fetches `domain_name` from the backend once and prints the payload.
pub async fn run(
    base_url: &str,
    domain_name: &str,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let domain: Domain = domain_name.parse()?;
    let fetcher = HttpFetcher::new(base_url, ReqwestClient::new());

    let payload =
        tokio::time::timeout(Duration::from_secs(10), fetcher.fetch(domain)).await??;

    println!("✓ Fetched {}", domain);
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&payload)?),
        _ => print_text(&payload),
    }

    Ok(())
}

fn print_text(payload: &DomainPayload) {
    match payload {
        DomainPayload::Dashboard(stats) => {
            println!("  Open reports:      {}", stats.open_reports);
            println!("  Resolved today:    {}", stats.resolved_today);
            println!("  Flagged accounts:  {}", stats.flagged_accounts);
            println!("  Moderators online: {}", stats.moderators_online);
        }
        DomainPayload::Budgets(budgets) => {
            println!("  Window: {}h", budgets.window_hours);
            for line in &budgets.lines {
                println!(
                    "  {:<16} {}/{} ({} remaining)",
                    line.category,
                    line.consumed,
                    line.allocated,
                    line.remaining()
                );
            }
        }
        DomainPayload::Whitelist(page) => {
            println!(
                "  Page {} ({} of {} entries)",
                page.page,
                page.entries.len(),
                page.total
            );
            for entry in &page.entries {
                println!("  #{:<6} {:<30} by {}", entry.id, entry.pattern, entry.added_by);
            }
        }
        DomainPayload::Performance(metrics) => {
            println!("  p50 latency: {:.1} ms", metrics.p50_latency_ms);
            println!("  p95 latency: {:.1} ms", metrics.p95_latency_ms);
            println!("  Error rate:  {:.2}%", metrics.error_rate * 100.0);
            println!("  Throughput:  {:.0} req/min", metrics.requests_per_minute);
        }
    }
}
