//! Debounced filter synchronization
//!
//! Mirrors the UI editing flow: a draft filter object updated synchronously,
//! one quiet window (300 ms) before the store fetch fires, an immediate
//! fetch on explicit apply, and query-string mirroring so a shared URL
//! reproduces the same result set. A new edit aborts and restarts the
//! pending timer; timers never stack.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;

use common::filters::{self, FilterError, FilterSet};

use crate::resource::{ResourceDesc, ResourceStore};

/// Quiet window applied after the last edit before fetching.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// Drives a [`ResourceStore`] from user-edited filter fields
pub struct FilterSync<R: ResourceDesc> {
    store: Arc<ResourceStore<R>>,
    draft: Mutex<R::Filter>,
    pending: Mutex<Option<JoinHandle<()>>>,
    window: Duration,
}

impl<R: ResourceDesc> FilterSync<R> {
    pub fn new(store: Arc<ResourceStore<R>>) -> Self {
        Self::with_window(store, DEBOUNCE_WINDOW)
    }

    pub fn with_window(store: Arc<ResourceStore<R>>, window: Duration) -> Self {
        Self {
            store,
            draft: Mutex::new(R::Filter::default()),
            pending: Mutex::new(None),
            window,
        }
    }

    /// Current draft filters, including edits not yet applied.
    pub fn draft(&self) -> R::Filter {
        self.draft_lock().clone()
    }

    /// Record an edit and restart the debounce timer.
    ///
    /// Must run inside a tokio runtime; the deferred fetch is spawned onto it.
    pub fn edit(&self, change: impl FnOnce(&mut R::Filter)) {
        let filters = {
            let mut draft = self.draft_lock();
            change(&mut draft);
            draft.clone()
        };
        self.schedule(filters);
    }

    /// Apply the draft immediately, bypassing the debounce window.
    pub async fn apply(&self) {
        self.cancel_pending();
        let filters = self.draft_lock().clone();
        self.store.fetch(filters).await;
    }

    /// Reset to the identity filter set (retaining a free-text query where
    /// the resource defines one) and fetch immediately.
    pub async fn clear(&self) {
        self.cancel_pending();
        let filters = {
            let mut draft = self.draft_lock();
            *draft = draft.cleared();
            draft.clone()
        };
        self.store.fetch(filters).await;
    }

    /// Query-string form of the draft filters for URL mirroring; keys with
    /// unset values are omitted.
    pub fn query_string(&self) -> Result<String, FilterError> {
        filters::to_query_string(&*self.draft_lock())
    }

    /// Restore filters from a shared URL's query string and fetch
    /// immediately, so the restored view shows the same result set.
    pub async fn restore(&self, query: &str) -> Result<(), FilterError> {
        let parsed: R::Filter = filters::from_query_string(query)?;
        {
            *self.draft_lock() = parsed.clone();
        }
        self.cancel_pending();
        self.store.fetch(parsed).await;
        Ok(())
    }

    fn schedule(&self, filters: R::Filter) {
        let store = Arc::clone(&self.store);
        let window = self.window;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            store.fetch(filters).await;
        });

        let mut pending = self.pending.lock().expect("pending timer lock poisoned");
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    fn cancel_pending(&self) {
        if let Some(handle) = self
            .pending
            .lock()
            .expect("pending timer lock poisoned")
            .take()
        {
            handle.abort();
        }
    }

    fn draft_lock(&self) -> MutexGuard<'_, R::Filter> {
        self.draft.lock().expect("draft filter lock poisoned")
    }
}

impl<R: ResourceDesc> Drop for FilterSync<R> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
