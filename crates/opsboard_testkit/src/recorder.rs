//! A subscriber that records every view it receives.

use opsboard_sync::DomainView;
use parking_lot::Mutex;
use std::sync::Arc;

/// Captures every [`DomainView`] delivered to it, in order.
///
/// Clones share the same underlying log, so a test can keep one handle and
/// hand a listener to the engine.
#[derive(Clone, Default)]
pub struct RecordingSubscriber {
    views: Arc<Mutex<Vec<DomainView>>>,
}

impl RecordingSubscriber {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a listener closure that appends to this recorder.
    pub fn listener(&self) -> impl Fn(&DomainView) + Send + Sync + 'static {
        let views = Arc::clone(&self.views);
        move |view| views.lock().push(view.clone())
    }

    /// All recorded views, oldest first.
    pub fn views(&self) -> Vec<DomainView> {
        self.views.lock().clone()
    }

    /// The most recent view, if any.
    pub fn last(&self) -> Option<DomainView> {
        self.views.lock().last().cloned()
    }

    /// Number of views recorded so far.
    pub fn len(&self) -> usize {
        self.views.lock().len()
    }

    /// Returns true when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.views.lock().is_empty()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.views.lock().clear();
    }
}
