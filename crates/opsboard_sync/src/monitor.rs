//! Device connectivity monitor.

use tokio::sync::watch;

/// Publishes device reachability transitions to the sync engines.
///
/// The platform bridge calls [`set_online`](NetworkMonitor::set_online) on
/// every observed transition; engines subscribe via
/// [`watch`](NetworkMonitor::watch) and treat the monitor as a push source,
/// never polling the platform. Until the first observation arrives the
/// monitor reports online (optimistic default).
#[derive(Debug)]
pub struct NetworkMonitor {
    tx: watch::Sender<bool>,
}

impl NetworkMonitor {
    /// Creates a monitor reporting online.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(true);
        Self { tx }
    }

    /// Records a connectivity transition observed by the platform.
    ///
    /// Repeated observations of the same value emit nothing.
    pub fn set_online(&self, online: bool) {
        self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
    }

    /// Last observed reachability.
    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Subscribes to connectivity transitions.
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new()
    }
}
