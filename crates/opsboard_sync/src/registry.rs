//! Subscriber dispatch and the per-domain engine registry.

use crate::config::SyncConfig;
use crate::engine::SyncEngine;
use crate::error::SyncResult;
use crate::fallback::FallbackProvider;
use crate::fetch::Fetcher;
use crate::monitor::NetworkMonitor;
use crate::state::DomainView;
use opsboard_domain::Domain;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Stable identifier for a registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type SharedListener = Arc<dyn Fn(&DomainView) + Send + Sync>;

struct Entry {
    id: SubscriberId,
    active: Arc<AtomicBool>,
    listener: SharedListener,
}

/// An ordered observer list with stable identifiers.
///
/// Dispatch visits listeners in registration order and delivers each view
/// exactly once per commit. Removing a listener during dispatch suppresses
/// any remaining delivery to it in the same cycle without disturbing the
/// others.
#[derive(Default)]
pub struct SubscriberSet {
    entries: Mutex<Vec<Entry>>,
    next_id: AtomicU64,
}

impl SubscriberSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener and returns its identifier.
    pub fn add(&self, listener: impl Fn(&DomainView) + Send + Sync + 'static) -> SubscriberId {
        self.add_shared(Arc::new(listener))
    }

    /// Registers an already-shared listener.
    pub fn add_shared(&self, listener: SharedListener) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.entries.lock().push(Entry {
            id,
            active: Arc::new(AtomicBool::new(true)),
            listener,
        });
        id
    }

    /// Removes a listener. Returns false if the id was already gone.
    pub fn remove(&self, id: SubscriberId) -> bool {
        let mut entries = self.entries.lock();
        match entries.iter().position(|e| e.id == id) {
            Some(index) => {
                let entry = entries.remove(index);
                entry.active.store(false, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true when no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Removes every listener.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        for entry in entries.iter() {
            entry.active.store(false, Ordering::SeqCst);
        }
        entries.clear();
    }

    /// Delivers `view` to every registered listener, in registration order.
    ///
    /// The entry list is snapshotted before the first call, so listeners may
    /// freely unsubscribe (themselves or others) mid-dispatch.
    pub fn dispatch(&self, view: &DomainView) {
        let snapshot: Vec<(Arc<AtomicBool>, SharedListener)> = self
            .entries
            .lock()
            .iter()
            .map(|e| (Arc::clone(&e.active), Arc::clone(&e.listener)))
            .collect();

        for (active, listener) in snapshot {
            if active.load(Ordering::SeqCst) {
                listener(view);
            }
        }
    }
}

/// Lazily constructs one sync engine per domain and shares it across
/// consumers.
///
/// Engines are reference-counted by subscriber count: the first subscription
/// for a domain creates its engine, the last unsubscribe disposes it. The
/// registry is an explicit injected dependency; there is no process-global
/// instance.
pub struct SyncRegistry {
    config: SyncConfig,
    fetcher: Arc<dyn Fetcher>,
    fallback: Arc<dyn FallbackProvider>,
    monitor: Arc<NetworkMonitor>,
    engines: Mutex<HashMap<Domain, Arc<SyncEngine>>>,
}

impl SyncRegistry {
    /// Creates a registry. Fails fast on invalid configuration.
    pub fn new(
        config: SyncConfig,
        fetcher: Arc<dyn Fetcher>,
        fallback: Arc<dyn FallbackProvider>,
        monitor: Arc<NetworkMonitor>,
    ) -> SyncResult<Arc<Self>> {
        config.validate()?;
        Ok(Arc::new(Self {
            config,
            fetcher,
            fallback,
            monitor,
            engines: Mutex::new(HashMap::new()),
        }))
    }

    /// Subscribes `listener` to `domain`, creating the engine on first use.
    ///
    /// The listener immediately receives the current view, then every
    /// subsequent change. Must be called within a tokio runtime.
    pub fn subscribe(
        self: &Arc<Self>,
        domain: Domain,
        listener: impl Fn(&DomainView) + Send + Sync + 'static,
    ) -> Subscription {
        let engine = {
            let mut engines = self.engines.lock();
            engines
                .entry(domain)
                .or_insert_with(|| {
                    SyncEngine::spawn(
                        domain,
                        self.config.clone(),
                        Arc::clone(&self.fetcher),
                        Arc::clone(&self.fallback),
                        &self.monitor,
                    )
                })
                .clone()
        };
        let id = engine.subscribe(listener);
        Subscription {
            registry: Arc::downgrade(self),
            engine,
            domain,
            id,
        }
    }

    /// Like [`subscribe`](Self::subscribe) but takes a domain name, as view
    /// adapters receive it. Unknown names are a fatal validation error.
    pub fn subscribe_named(
        self: &Arc<Self>,
        name: &str,
        listener: impl Fn(&DomainView) + Send + Sync + 'static,
    ) -> SyncResult<Subscription> {
        let domain: Domain = name.parse()?;
        Ok(self.subscribe(domain, listener))
    }

    /// Number of live engines.
    pub fn engine_count(&self) -> usize {
        self.engines.lock().len()
    }

    /// Disposes every engine and forgets them.
    pub fn shutdown(&self) {
        let mut engines = self.engines.lock();
        for engine in engines.values() {
            engine.dispose();
        }
        engines.clear();
    }

    fn release(&self, domain: Domain, id: SubscriberId) {
        let mut engines = self.engines.lock();
        if let Some(engine) = engines.get(&domain) {
            engine.unsubscribe(id);
            if engine.subscriber_count() == 0 {
                engine.dispose();
                engines.remove(&domain);
            }
        }
    }
}

/// A live subscription to one domain. Unsubscribes on drop.
pub struct Subscription {
    registry: Weak<SyncRegistry>,
    engine: Arc<SyncEngine>,
    domain: Domain,
    id: SubscriberId,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("domain", &self.domain)
            .field("id", &self.id)
            .finish()
    }
}

impl Subscription {
    /// The domain this subscription observes.
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Current view, without waiting for the next push.
    pub fn view(&self) -> DomainView {
        self.engine.view()
    }

    /// Requests an immediate refresh. No-op while a fetch is already active
    /// or the device is offline.
    pub fn refresh(&self) {
        self.engine.refresh();
    }

    /// Clears the recorded error message and notifies subscribers.
    pub fn clear_error(&self) {
        self.engine.clear_error();
    }

    /// Explicitly ends this subscription.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        match self.registry.upgrade() {
            Some(registry) => registry.release(self.domain, self.id),
            None => {
                // Registry already gone; release against the engine directly.
                self.engine.unsubscribe(self.id);
                if self.engine.subscriber_count() == 0 {
                    self.engine.dispose();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{DomainView, EnginePhase, SyncState};
    use parking_lot::Mutex as PlMutex;

    fn view() -> DomainView {
        let state = SyncState {
            phase: EnginePhase::Ready,
            ..SyncState::new(true)
        };
        DomainView {
            domain: Domain::DashboardStats,
            payload: None,
            last_updated: None,
            is_loading: state.is_loading(),
            is_refreshing: state.is_refreshing(),
            error: state.error,
            is_online: state.is_online,
            is_backend_healthy: state.is_backend_healthy,
            retry_count: state.retry_count,
            is_stale: true,
        }
    }

    #[test]
    fn dispatch_preserves_registration_order() {
        let set = SubscriberSet::new();
        let order = Arc::new(PlMutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            set.add(move |_| order.lock().push(label));
        }

        set.dispatch(&view());
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn removed_listener_is_never_invoked() {
        let set = SubscriberSet::new();
        let calls = Arc::new(PlMutex::new(0u32));

        let counted = {
            let calls = Arc::clone(&calls);
            set.add(move |_| *calls.lock() += 1)
        };

        set.dispatch(&view());
        assert!(set.remove(counted));
        set.dispatch(&view());
        assert_eq!(*calls.lock(), 1);

        // Removing again reports the id as gone.
        assert!(!set.remove(counted));
    }

    #[test]
    fn unsubscribing_later_listener_mid_dispatch_suppresses_it() {
        let set = Arc::new(SubscriberSet::new());
        let hits = Arc::new(PlMutex::new(Vec::new()));

        // The second listener's id is not known until after registration, so
        // park it in a cell the first listener can read.
        let victim: Arc<PlMutex<Option<SubscriberId>>> = Arc::new(PlMutex::new(None));

        {
            let set = Arc::clone(&set);
            let victim = Arc::clone(&victim);
            let hits = Arc::clone(&hits);
            set.add(move |_| {
                hits.lock().push("assassin");
                if let Some(id) = victim.lock().take() {
                    set.remove(id);
                }
            });
        }
        {
            let hits = Arc::clone(&hits);
            let id = set.add(move |_| hits.lock().push("victim"));
            *victim.lock() = Some(id);
        }

        set.dispatch(&view());
        assert_eq!(*hits.lock(), vec!["assassin"]);

        set.dispatch(&view());
        assert_eq!(*hits.lock(), vec!["assassin", "assassin"]);
    }

    #[test]
    fn listener_may_unsubscribe_itself_mid_dispatch() {
        let set = Arc::new(SubscriberSet::new());
        let calls = Arc::new(PlMutex::new(0u32));

        let own_id: Arc<PlMutex<Option<SubscriberId>>> = Arc::new(PlMutex::new(None));
        let id = {
            let set = Arc::clone(&set);
            let own_id = Arc::clone(&own_id);
            let calls = Arc::clone(&calls);
            set.add(move |_| {
                *calls.lock() += 1;
                if let Some(id) = own_id.lock().take() {
                    set.remove(id);
                }
            })
        };
        *own_id.lock() = Some(id);

        set.dispatch(&view());
        set.dispatch(&view());
        assert_eq!(*calls.lock(), 1);
        assert!(set.is_empty());
    }

    #[test]
    fn clear_deactivates_everything() {
        let set = SubscriberSet::new();
        let calls = Arc::new(PlMutex::new(0u32));
        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            set.add(move |_| *calls.lock() += 1);
        }

        set.clear();
        set.dispatch(&view());
        assert_eq!(*calls.lock(), 0);
        assert!(set.is_empty());
    }
}
