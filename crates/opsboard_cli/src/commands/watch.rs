//! Subscribe to a domain and stream view updates.

use crate::client::ReqwestClient;
use opsboard_domain::Domain;
use opsboard_sync::{DomainView, HttpFetcher, NetworkMonitor, StaticFallback, SyncConfig, SyncRegistry};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Subscribes to `domain_name` and prints one line per delivered view until
/// `count` updates have been seen or the process is interrupted.
pub async fn run(
    base_url: &str,
    domain_name: &str,
    interval: u64,
    count: u64,
    no_offline: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let domain: Domain = domain_name.parse()?;

    let config = SyncConfig::new()
        .with_refresh_interval(Duration::from_secs(interval.max(1)))
        .with_offline_mode(!no_offline);
    let fetcher = Arc::new(HttpFetcher::new(base_url, ReqwestClient::new()));
    let monitor = Arc::new(NetworkMonitor::new());
    let registry = SyncRegistry::new(config, fetcher, Arc::new(StaticFallback), monitor)?;

    info!("Watching {} at {}", domain, base_url);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let _subscription = registry.subscribe(domain, move |view| {
        let _ = tx.send(render(view));
    });

    let mut printed = 0u64;
    loop {
        tokio::select! {
            line = rx.recv() => match line {
                Some(line) => {
                    println!("{}", line);
                    printed += 1;
                    if count != 0 && printed >= count {
                        break;
                    }
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                println!("Interrupted.");
                break;
            }
        }
    }

    registry.shutdown();
    Ok(())
}

fn render(view: &DomainView) -> String {
    let activity = if view.is_loading {
        "loading"
    } else if view.is_refreshing {
        "refreshing"
    } else {
        "idle"
    };
    let age = view
        .last_updated
        .map(|at| format!("{}s", at.elapsed().as_secs()))
        .unwrap_or_else(|| "never".to_string());

    format!(
        "[{}] {:<10} payload={} age={} stale={} online={} backend={} error={}",
        view.domain,
        activity,
        if view.payload.is_some() { "yes" } else { "no" },
        age,
        view.is_stale,
        view.is_online,
        if view.is_backend_healthy { "healthy" } else { "unreachable" },
        view.error.as_deref().unwrap_or("-"),
    )
}
