//! Generic paginated resource store
//!
//! One implementation of the fetch/mutate/remove contract shared by every
//! resource screen. Passive loads (`fetch`, `load_more`, `refresh`) never
//! return errors; they resolve into an updated snapshot whose `error` field
//! the UI inspects. Active mutations (`mutate`, `remove`) return `Result`
//! so the caller can show a one-shot failure.
//!
//! Responses are fenced with a per-store sequence number: a reply belonging
//! to anything but the latest issued request is discarded, so a slow stale
//! response can never overwrite a newer page.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use client::error::{ApiError, ApiResult};
use client::http::HttpClient;
use common::envelope::{Page, Pagination};
use common::filters::{self, FilterSet};

/// Static description of one server resource: collection path, filter type,
/// and the closed set of mutations the item-level endpoint accepts.
pub trait ResourceDesc: Clone + DeserializeOwned + Send + Sync + 'static {
    type Filter: FilterSet;
    type Mutation: ResourceMutation;

    /// Collection path relative to the API base, e.g. `admin/users`.
    const COLLECTION: &'static str;

    fn id(&self) -> u64;
}

/// A mutation variant maps to `PUT {collection}/{id}/{segment}` with a JSON
/// body; the server answers with the full updated item.
pub trait ResourceMutation: Send + Sync {
    fn segment(&self) -> &'static str;
    fn body(&self) -> serde_json::Value;
}

/// Immutable view of the held page
#[derive(Debug, Clone)]
pub struct PageSnapshot<R: ResourceDesc> {
    pub items: Vec<R>,
    pub pagination: Pagination,
    pub filters: R::Filter,
    pub loading: bool,
    pub error: Option<Arc<ApiError>>,
}

struct PageState<R: ResourceDesc> {
    items: Vec<R>,
    pagination: Pagination,
    filters: R::Filter,
    loading: bool,
    error: Option<Arc<ApiError>>,
    initialized: bool,
}

/// Paginated store over one server resource
pub struct ResourceStore<R: ResourceDesc> {
    http: HttpClient,
    state: Mutex<PageState<R>>,
    seq: AtomicU64,
}

impl<R: ResourceDesc> ResourceStore<R> {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            state: Mutex::new(PageState {
                items: Vec::new(),
                pagination: Pagination::default(),
                filters: R::Filter::default(),
                loading: false,
                error: None,
                initialized: false,
            }),
            seq: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> PageSnapshot<R> {
        let state = self.state();
        PageSnapshot {
            items: state.items.clone(),
            pagination: state.pagination.clone(),
            filters: state.filters.clone(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    /// Fetch page 1 for the given filter set, replacing the held page.
    pub async fn fetch(&self, filters: R::Filter) {
        self.fetch_page(filters, 1, false).await;
    }

    /// Re-fetch page 1 under the currently applied filters.
    pub async fn refresh(&self) {
        let filters = self.state().filters.clone();
        self.fetch_page(filters, 1, false).await;
    }

    /// Fetch the next page under the current filters, appending to the held
    /// items. Silent no-op when there is no next page.
    pub async fn load_more(&self) {
        let (filters, next_page) = {
            let state = self.state();
            if !state.pagination.has_more_pages {
                return;
            }
            (state.filters.clone(), state.pagination.current_page + 1)
        };
        self.fetch_page(filters, next_page, true).await;
    }

    /// Send a mutation; on success the cached item is patched with the
    /// server-confirmed representation, never with a client-side guess. On
    /// failure the held page is left untouched.
    pub async fn mutate(&self, id: u64, mutation: R::Mutation) -> ApiResult<R> {
        let path = format!("{}/{}/{}", R::COLLECTION, id, mutation.segment());
        let updated: R = self.http.put(&path, &mutation.body()).await?;

        let mut state = self.state();
        if let Some(slot) = state.items.iter_mut().find(|item| item.id() == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Delete an item; on success it leaves the held page and
    /// `pagination.total` drops by one.
    pub async fn remove(&self, id: u64) -> ApiResult<()> {
        self.http
            .delete(&format!("{}/{}", R::COLLECTION, id))
            .await?;

        let mut state = self.state();
        state.items.retain(|item| item.id() != id);
        state.pagination.total = state.pagination.total.saturating_sub(1);
        Ok(())
    }

    /// Create a file-bearing resource via multipart form.
    pub async fn create_multipart(&self, form: reqwest::multipart::Form) -> ApiResult<R> {
        let created: R = self.http.post_multipart(R::COLLECTION, form).await?;

        let mut state = self.state();
        state.items.insert(0, created.clone());
        state.pagination.total += 1;
        Ok(created)
    }

    /// Update a file-bearing resource via multipart POST with the
    /// `_method=PUT` override the API expects.
    pub async fn update_multipart(
        &self,
        id: u64,
        form: reqwest::multipart::Form,
    ) -> ApiResult<R> {
        let form = form.text("_method", "PUT");
        let updated: R = self
            .http
            .post_multipart(&format!("{}/{}", R::COLLECTION, id), form)
            .await?;

        let mut state = self.state();
        if let Some(slot) = state.items.iter_mut().find(|item| item.id() == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    async fn fetch_page(&self, filters: R::Filter, page: u32, append: bool) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state();
            state.loading = true;
            if !append {
                state.filters = filters.clone();
            }
        }

        let result = self.request_page(&filters, page).await;

        let mut state = self.state();
        if self.seq.load(Ordering::SeqCst) != seq {
            // A newer request was issued while this one was in flight; its
            // completion owns the loading flag and the page.
            debug!("discarding stale response for {}", R::COLLECTION);
            return;
        }
        state.loading = false;

        match result {
            Ok(page_data) => {
                if append {
                    state.items.extend(page_data.data);
                } else {
                    state.items = page_data.data;
                }
                state.pagination = page_data.pagination;
                state.error = None;
                state.initialized = true;
            }
            Err(e) => {
                warn!("fetch for {} failed: {e}", R::COLLECTION);
                if !state.initialized {
                    // First fetch: an explicit empty page, never placeholder
                    // data and never an ambiguous not-yet-loaded state.
                    state.items = Vec::new();
                    state.pagination = Pagination::default();
                    state.initialized = true;
                }
                state.error = Some(Arc::new(e));
            }
        }
    }

    async fn request_page(&self, filters: &R::Filter, page: u32) -> ApiResult<Page<R>> {
        let mut query =
            filters::to_query_pairs(filters).map_err(|e| ApiError::Decode(e.to_string()))?;
        query.push(("page".to_string(), page.to_string()));
        self.http.get(R::COLLECTION, &query).await
    }

    fn state(&self) -> MutexGuard<'_, PageState<R>> {
        self.state.lock().expect("resource page state lock poisoned")
    }
}
