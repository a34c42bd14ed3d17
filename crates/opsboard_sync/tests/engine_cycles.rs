//! End-to-end engine cycles: initial load, retry sequences, single-flight.

use opsboard_domain::{DashboardStats, Domain, DomainPayload};
use opsboard_sync::{
    FallbackProvider, NetworkMonitor, RetryPolicy, ScriptedFetcher, StaticFallback, SyncConfig,
    SyncError, SyncRegistry,
};
use opsboard_testkit::prelude::*;
use std::sync::Arc;
use std::time::Duration;

const DOMAIN: Domain = Domain::DashboardStats;

fn stats(open_reports: u64) -> DomainPayload {
    DomainPayload::Dashboard(DashboardStats {
        open_reports,
        resolved_today: 0,
        flagged_accounts: 0,
        moderators_online: 0,
    })
}

fn harness(config: SyncConfig) -> (Arc<ScriptedFetcher>, Arc<NetworkMonitor>, Arc<SyncRegistry>) {
    let fetcher = Arc::new(ScriptedFetcher::new());
    let monitor = Arc::new(NetworkMonitor::new());
    let registry = SyncRegistry::new(
        config,
        Arc::clone(&fetcher) as Arc<dyn opsboard_sync::Fetcher>,
        Arc::new(StaticFallback),
        Arc::clone(&monitor),
    )
    .unwrap();
    (fetcher, monitor, registry)
}

#[tokio::test(start_paused = true)]
async fn initial_load_commits_and_settles() {
    let (fetcher, _monitor, registry) = harness(SyncConfig::new());
    fetcher.push_ok(DOMAIN, dashboard_stats());

    let recorder = RecordingSubscriber::new();
    let _subscription = registry.subscribe(DOMAIN, recorder.listener());
    settle().await;

    let views = recorder.views();
    // Initial delivery precedes the first fetch, then loading, then commit.
    assert!(views[0].payload.is_none());
    assert!(!views[0].is_loading);
    assert!(views[1].is_loading);

    let last = recorder.last().unwrap();
    assert_eq!(last.payload, Some(dashboard_stats()));
    assert!(!last.is_loading);
    assert!(!last.is_refreshing);
    assert_eq!(last.error, None);
    assert!(!last.is_stale);
    assert!(last.is_backend_healthy);
    assert!(last.last_updated.is_some());
    assert_eq!(fetcher.calls(DOMAIN), 1);
}

#[tokio::test(start_paused = true)]
async fn two_failures_then_success_walks_the_documented_states() {
    let config = SyncConfig::new()
        .with_refresh_interval(Duration::from_millis(1000))
        .with_auto_refresh(false)
        .with_retry(
            RetryPolicy::new(2)
                .with_base_delay(Duration::from_millis(100))
                .with_max_delay(Duration::from_secs(30)),
        );
    let (fetcher, _monitor, registry) = harness(config);
    fetcher.push_err(DOMAIN, SyncError::Network("connection reset".into()));
    fetcher.push_err(DOMAIN, SyncError::Network("connection reset".into()));
    fetcher.push_ok(DOMAIN, stats(5));

    let recorder = RecordingSubscriber::new();
    let _subscription = registry.subscribe(DOMAIN, recorder.listener());
    tokio::time::sleep(Duration::from_secs(2)).await;
    settle().await;

    let views = recorder.views();
    assert_eq!(views.len(), 7, "views: {:#?}", views);

    // v0 initial delivery, v1 loading.
    assert!(views[1].is_loading);

    // First failure: ready with error, one failure recorded, then retrying.
    assert!(views[2].error.is_some());
    assert_eq!(views[2].retry_count, 1);
    assert!(!views[2].is_refreshing);
    assert!(views[3].is_refreshing);

    // Second failure: ready with error, two failures recorded, then retrying.
    assert!(views[4].error.is_some());
    assert_eq!(views[4].retry_count, 2);
    assert!(views[5].is_refreshing);

    // Third attempt commits and resets the failure count.
    let last = &views[6];
    assert_eq!(last.error, None);
    assert_eq!(last.retry_count, 0);
    assert_eq!(last.payload, Some(stats(5)));
    assert!(!last.is_refreshing);

    assert_eq!(fetcher.calls(DOMAIN), 3);
}

#[tokio::test(start_paused = true)]
async fn all_failures_performs_exactly_max_retries_then_stops() {
    let config = SyncConfig::new()
        .with_auto_refresh(false)
        .with_retry(RetryPolicy::new(2).with_base_delay(Duration::from_millis(100)));
    // No scripted outcomes at all: every fetch fails with a network error.
    let (fetcher, _monitor, registry) = harness(config);

    let recorder = RecordingSubscriber::new();
    let _subscription = registry.subscribe(DOMAIN, recorder.listener());
    tokio::time::sleep(Duration::from_secs(5)).await;
    settle().await;

    // One initial attempt plus exactly two retries.
    assert_eq!(fetcher.calls(DOMAIN), 3);

    let last = recorder.last().unwrap();
    assert!(last.error.is_some());
    assert_eq!(last.retry_count, 2);
    assert!(!last.is_refreshing);
    assert!(!last.is_backend_healthy);
    // Offline mode is on by default, so the fallback payload is substituted
    // and flagged stale.
    assert_eq!(last.payload, Some(StaticFallback.provide(DOMAIN)));
    assert!(last.is_stale);

    // Nothing further happens without auto-refresh.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(fetcher.calls(DOMAIN), 3);
}

#[tokio::test(start_paused = true)]
async fn back_to_back_manual_refreshes_collapse_into_one_fetch() {
    let (fetcher, _monitor, registry) = harness(SyncConfig::new().with_auto_refresh(false));
    fetcher.push_ok(DOMAIN, dashboard_stats());
    fetcher.push_after(DOMAIN, Duration::from_millis(200), Ok(stats(9)));

    let recorder = RecordingSubscriber::new();
    let subscription = registry.subscribe(DOMAIN, recorder.listener());
    settle().await;
    assert_eq!(fetcher.calls(DOMAIN), 1);

    subscription.refresh();
    subscription.refresh();
    tokio::time::sleep(Duration::from_secs(1)).await;
    settle().await;

    assert_eq!(fetcher.calls(DOMAIN), 2);
    assert_eq!(recorder.last().unwrap().payload, Some(stats(9)));
}

#[tokio::test(start_paused = true)]
async fn refresh_while_in_flight_is_a_no_op() {
    let (fetcher, _monitor, registry) = harness(SyncConfig::new().with_auto_refresh(false));
    fetcher.push_ok(DOMAIN, dashboard_stats());
    fetcher.push_after(DOMAIN, Duration::from_millis(500), Ok(stats(2)));

    let recorder = RecordingSubscriber::new();
    let subscription = registry.subscribe(DOMAIN, recorder.listener());
    settle().await;

    subscription.refresh();
    settle().await; // refresh cycle is now in flight
    subscription.refresh(); // guard: already refreshing
    tokio::time::sleep(Duration::from_secs(1)).await;
    settle().await;

    assert_eq!(fetcher.calls(DOMAIN), 2);
}

#[tokio::test(start_paused = true)]
async fn scheduled_ticks_refresh_on_the_interval() {
    let config = SyncConfig::new().with_refresh_interval(Duration::from_secs(10));
    let (fetcher, _monitor, registry) = harness(config);
    fetcher.push_ok(DOMAIN, dashboard_stats());
    fetcher.push_ok(DOMAIN, stats(1));
    fetcher.push_ok(DOMAIN, stats(2));

    let recorder = RecordingSubscriber::new();
    let _subscription = registry.subscribe(DOMAIN, recorder.listener());
    settle().await;
    assert_eq!(fetcher.calls(DOMAIN), 1);

    tokio::time::sleep(Duration::from_secs(11)).await;
    settle().await;
    assert_eq!(fetcher.calls(DOMAIN), 2);

    tokio::time::sleep(Duration::from_secs(10)).await;
    settle().await;
    assert_eq!(fetcher.calls(DOMAIN), 3);
    assert_eq!(recorder.last().unwrap().payload, Some(stats(2)));
}

#[tokio::test(start_paused = true)]
async fn clear_error_notifies_with_error_absent() {
    let config = SyncConfig::new()
        .with_auto_refresh(false)
        .with_retry(RetryPolicy::no_retry());
    let (_fetcher, _monitor, registry) = harness(config);

    let recorder = RecordingSubscriber::new();
    let subscription = registry.subscribe(DOMAIN, recorder.listener());
    settle().await;
    assert!(recorder.last().unwrap().error.is_some());

    subscription.clear_error();
    let last = recorder.last().unwrap();
    assert_eq!(last.error, None);
}
