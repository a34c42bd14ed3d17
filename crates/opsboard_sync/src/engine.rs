//! The sync engine: scheduled refresh, manual refresh, retry, and offline
//! fallback for one data domain.

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::fallback::FallbackProvider;
use crate::fetch::Fetcher;
use crate::monitor::NetworkMonitor;
use crate::registry::{SubscriberId, SubscriberSet};
use crate::state::{DomainView, EnginePhase, Snapshot, SyncState};
use opsboard_domain::{Domain, DomainPayload};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

enum Command {
    Refresh,
    Dispose,
}

/// Why the driver loop woke up.
enum Wake {
    Command(Option<Command>),
    Connectivity { monitor_alive: bool },
    Tick,
}

/// Snapshot and control state shared between the engine handle and its
/// driver task. Mutated only by the driver and the dispose/clear-error
/// entry points; subscribers receive cloned views.
struct EngineShared {
    domain: Domain,
    config: SyncConfig,
    snapshot: RwLock<Snapshot>,
    state: RwLock<SyncState>,
    subscribers: SubscriberSet,
    /// Issuance counter for fetch tokens.
    issued: AtomicU64,
    /// Bumped on disposal; completions from an older epoch are discarded.
    epoch: AtomicU64,
}

impl EngineShared {
    fn view(&self) -> DomainView {
        let snapshot = self.snapshot.read().clone();
        let state = self.state.read().clone();
        DomainView {
            domain: self.domain,
            is_stale: snapshot.is_stale(self.config.refresh_interval, Instant::now()),
            payload: snapshot.payload,
            last_updated: snapshot.last_updated,
            is_loading: state.is_loading(),
            is_refreshing: state.is_refreshing(),
            error: state.error,
            is_online: state.is_online,
            is_backend_healthy: state.is_backend_healthy,
            retry_count: state.retry_count,
        }
    }

    fn notify(&self) {
        let view = self.view();
        self.subscribers.dispatch(&view);
    }

    fn phase(&self) -> EnginePhase {
        self.state.read().phase
    }

    fn set_phase(&self, phase: EnginePhase) {
        self.state.write().phase = phase;
    }

    /// Commits a successful fetch.
    ///
    /// Returns false when the completion lost the issuance-order race (its
    /// token is not newer than the committed one) or the engine was disposed;
    /// discarded completions notify nobody.
    fn commit(&self, token: u64, payload: DomainPayload) -> bool {
        {
            let mut snapshot = self.snapshot.write();
            let mut state = self.state.write();
            if state.phase == EnginePhase::Disposed {
                return false;
            }
            if token <= snapshot.token {
                debug!(domain = %self.domain, token, "discarded out-of-order completion");
                state.phase = EnginePhase::Ready;
                return false;
            }
            snapshot.token = token;
            snapshot.payload = Some(payload);
            snapshot.last_updated = Some(Instant::now());
            state.phase = EnginePhase::Ready;
            state.error = None;
            state.retry_count = 0;
            state.is_backend_healthy = true;
        }
        self.notify();
        true
    }
}

/// The synchronization engine for one data domain.
///
/// Owns the authoritative [`Snapshot`] and [`SyncState`] and pushes read-only
/// [`DomainView`]s to subscribers on every change. Exactly one engine exists
/// per domain per process; consumers share it through
/// [`SyncRegistry`](crate::SyncRegistry) rather than constructing their own.
pub struct SyncEngine {
    shared: Arc<EngineShared>,
    commands: mpsc::UnboundedSender<Command>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl SyncEngine {
    /// Creates the engine and starts its driver task, which immediately
    /// performs the first fetch. Must be called within a tokio runtime.
    pub fn spawn(
        domain: Domain,
        config: SyncConfig,
        fetcher: Arc<dyn Fetcher>,
        fallback: Arc<dyn FallbackProvider>,
        monitor: &NetworkMonitor,
    ) -> Arc<Self> {
        let online_rx = monitor.watch();
        let shared = Arc::new(EngineShared {
            domain,
            state: RwLock::new(SyncState::new(*online_rx.borrow())),
            config,
            snapshot: RwLock::new(Snapshot::empty()),
            subscribers: SubscriberSet::new(),
            issued: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
        });
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        let driver = Driver {
            shared: Arc::clone(&shared),
            fetcher,
            fallback,
            commands: commands_rx,
            online_rx,
            monitor_alive: true,
        };
        let handle = tokio::spawn(driver.run());

        Arc::new(Self {
            shared,
            commands: commands_tx,
            driver: Mutex::new(Some(handle)),
        })
    }

    /// The domain this engine synchronizes.
    pub fn domain(&self) -> Domain {
        self.shared.domain
    }

    /// Current consumer-facing view.
    pub fn view(&self) -> DomainView {
        self.shared.view()
    }

    /// Registers a listener. It immediately receives the current view, then
    /// every subsequent change, until unsubscribed.
    pub fn subscribe(
        &self,
        listener: impl Fn(&DomainView) + Send + Sync + 'static,
    ) -> SubscriberId {
        let listener: Arc<dyn Fn(&DomainView) + Send + Sync> = Arc::new(listener);
        listener(&self.shared.view());
        self.shared.subscribers.add_shared(listener)
    }

    /// Removes a listener; it is never invoked again.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.shared.subscribers.remove(id)
    }

    /// Number of registered listeners.
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.len()
    }

    /// Requests an immediate refresh.
    ///
    /// Uses the same guard as a scheduled tick: a no-op while offline, while
    /// any fetch or retry wait is active, or after disposal. Back-to-back
    /// calls while a fetch is in flight collapse into that one fetch.
    pub fn refresh(&self) {
        {
            let state = self.shared.state.read();
            if !state.is_online || !state.phase.can_start_refresh() {
                return;
            }
        }
        let _ = self.commands.send(Command::Refresh);
    }

    /// Clears the recorded error message and notifies subscribers.
    pub fn clear_error(&self) {
        {
            let mut state = self.shared.state.write();
            if state.phase == EnginePhase::Disposed || state.error.take().is_none() {
                return;
            }
        }
        self.shared.notify();
    }

    /// Cancels pending timers and any in-flight fetch. Valid from any state;
    /// terminal.
    ///
    /// Correctness rests on invalidating the commit epoch, not on stopping
    /// the transport: an in-flight request may still complete, but its result
    /// can no longer be committed or observed.
    pub fn dispose(&self) {
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        self.shared.set_phase(EnginePhase::Disposed);
        let _ = self.commands.send(Command::Dispose);
        if let Some(handle) = self.driver.lock().take() {
            handle.abort();
        }
        self.shared.subscribers.clear();
    }

    /// Returns true once the engine has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.shared.phase() == EnginePhase::Disposed
    }
}

/// The engine's driver task: one cooperative loop that owns all fetching.
///
/// Every fetch happens inline in this loop, so at most one is in flight per
/// domain by construction; suspension points are the fetch itself and retry
/// waits.
struct Driver {
    shared: Arc<EngineShared>,
    fetcher: Arc<dyn Fetcher>,
    fallback: Arc<dyn FallbackProvider>,
    commands: mpsc::UnboundedReceiver<Command>,
    online_rx: watch::Receiver<bool>,
    monitor_alive: bool,
}

impl Driver {
    async fn run(mut self) {
        // Initial load.
        self.run_cycle(true).await;

        let mut ticker = tokio::time::interval(self.shared.config.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.reset();

        loop {
            let wake = tokio::select! {
                command = self.commands.recv() => Wake::Command(command),
                result = self.online_rx.changed(), if self.monitor_alive => {
                    Wake::Connectivity { monitor_alive: result.is_ok() }
                }
                _ = ticker.tick(), if self.shared.config.enable_auto_refresh => Wake::Tick,
            };

            match wake {
                Wake::Command(Some(Command::Refresh)) => {
                    if self.drain_refreshes() {
                        break;
                    }
                    if self.can_refresh() {
                        self.run_cycle(false).await;
                        ticker.reset();
                    }
                }
                Wake::Command(Some(Command::Dispose)) | Wake::Command(None) => break,
                Wake::Connectivity { monitor_alive } => {
                    if !monitor_alive {
                        // Monitor dropped; keep the last known state.
                        self.monitor_alive = false;
                        continue;
                    }
                    let online = *self.online_rx.borrow_and_update();
                    self.on_connectivity(online);
                }
                Wake::Tick => {
                    if self.can_refresh() {
                        self.run_cycle(false).await;
                    }
                }
            }
        }

        self.shared.set_phase(EnginePhase::Disposed);
    }

    /// Collapses queued refresh requests into the one about to run.
    /// Returns true when a dispose was queued behind them.
    fn drain_refreshes(&mut self) -> bool {
        loop {
            match self.commands.try_recv() {
                Ok(Command::Refresh) => continue,
                Ok(Command::Dispose) => return true,
                Err(_) => return false,
            }
        }
    }

    /// Scheduled-tick guard: online, settled, and not disposed.
    fn can_refresh(&self) -> bool {
        let state = self.shared.state.read();
        state.is_online && state.phase.can_start_refresh()
    }

    fn on_connectivity(&self, online: bool) {
        let changed = {
            let mut state = self.shared.state.write();
            if state.phase == EnginePhase::Disposed || state.is_online == online {
                false
            } else {
                state.is_online = online;
                true
            }
        };
        if changed {
            debug!(domain = %self.shared.domain, online, "connectivity changed");
            self.shared.notify();
        }
    }

    /// One fetch cycle: a fetch attempt plus its retries, ending in a commit,
    /// a fallback settlement, or a fatal error.
    async fn run_cycle(&self, initial: bool) {
        let shared = &self.shared;
        {
            let mut state = shared.state.write();
            if state.phase == EnginePhase::Disposed {
                return;
            }
            state.phase = if initial {
                EnginePhase::Loading
            } else {
                EnginePhase::Refreshing
            };
        }
        shared.notify();

        // Each cycle gets the full retry budget; the displayed retry count
        // keeps accumulating until a success resets it.
        let mut failures: u32 = 0;

        loop {
            let epoch = shared.epoch.load(Ordering::SeqCst);
            let token = shared.issued.fetch_add(1, Ordering::SeqCst) + 1;

            let outcome = tokio::time::timeout(
                shared.config.fetch_timeout,
                self.fetcher.fetch(shared.domain),
            )
            .await;

            if shared.epoch.load(Ordering::SeqCst) != epoch {
                // Disposed while the fetch was in flight.
                return;
            }

            let error = match outcome {
                Ok(Ok(payload)) => {
                    shared.commit(token, payload);
                    return;
                }
                Ok(Err(error)) => error,
                Err(_elapsed) => SyncError::Timeout,
            };

            if matches!(error, SyncError::Cancelled) {
                return;
            }
            if !error.is_retryable() {
                warn!(domain = %shared.domain, %error, "fatal sync error");
                {
                    let mut state = shared.state.write();
                    if state.phase == EnginePhase::Disposed {
                        return;
                    }
                    state.phase = EnginePhase::Ready;
                    state.error = Some(error.to_string());
                }
                shared.notify();
                return;
            }

            failures += 1;
            let online = *self.online_rx.borrow();
            // Retries are pointless while the device is offline; settle with
            // fallback and let the resumed ticks try again.
            let delay = if online {
                shared.config.retry.next_delay(failures)
            } else {
                None
            };

            debug!(domain = %shared.domain, failures, %error, "fetch failed");
            {
                let mut state = shared.state.write();
                if state.phase == EnginePhase::Disposed {
                    return;
                }
                state.phase = EnginePhase::Ready;
                state.error = Some(error.to_string());
                state.retry_count =
                    (state.retry_count.saturating_add(1)).min(shared.config.retry.max_retries);
                state.is_online = online;
                state.is_backend_healthy = error.backend_responded();
            }

            match delay {
                Some(delay) => {
                    shared.notify();
                    shared.set_phase(EnginePhase::Retrying);
                    shared.notify();
                    tokio::time::sleep(delay).await;
                    if shared.epoch.load(Ordering::SeqCst) != epoch {
                        return;
                    }
                }
                None => {
                    warn!(domain = %shared.domain, failures, "giving up on fetch");
                    self.apply_fallback();
                    shared.notify();
                    return;
                }
            }
        }
    }

    /// Substitutes fallback data after retries are exhausted.
    ///
    /// Last-known-good data always wins; the provider is consulted only when
    /// no payload was ever committed. `last_updated` is left untouched so
    /// staleness keeps reporting the truth about live data.
    fn apply_fallback(&self) {
        if !self.shared.config.enable_offline_mode {
            return;
        }
        let mut snapshot = self.shared.snapshot.write();
        if snapshot.payload.is_none() {
            snapshot.payload = Some(self.fallback.provide(self.shared.domain));
        }
    }
}
