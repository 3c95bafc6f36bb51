//! Generic paged list store.
//!
//! Every list screen in the app is backed by a [`ListStore`] specialized with
//! a [`PageSource`]: the source knows how to fetch one page for the current
//! filter, the store owns accumulation, status, pagination state, and the
//! concurrency rules. Those rules are:
//!
//! - exactly one request per store may be in flight; a load attempted while
//!   busy is skipped, not queued
//! - settlement is fenced by an epoch that reset-class operations bump, so a
//!   response belonging to a cleared session can never resurrect its data
//! - filter changes reload through a debounce window, and only the last
//!   change inside a burst actually fetches

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;

use bookstore_core::contract::{Cursor, Page, PageRequest};
use bookstore_core::error::StoreError;
use bookstore_core::model::UserId;
use bookstore_core::status::{ListSnapshot, ListStatus, OperationResponse};

use crate::config::SyncConfig;
use crate::debounce::Debouncer;

/// Where a [`ListStore`] gets its pages.
pub trait PageSource: Clone + Send + Sync + 'static {
    /// Item the store accumulates.
    type Item: Clone + Send + Sync + 'static;
    /// Filter pages are resolved against.
    type Filter: Clone + Default + Send + Sync + 'static;

    /// Fetches one page matching `filter`.
    fn fetch(
        &self,
        filter: &Self::Filter,
        page: PageRequest,
    ) -> impl Future<Output = Result<Page<Self::Item>, StoreError>> + Send;

    /// Whether the source can serve `filter` at all.
    ///
    /// Sources scoped to a user or parent entity return `false` while that
    /// scope is absent; the store then skips loads instead of failing them.
    fn is_ready(&self, filter: &Self::Filter) -> bool {
        let _ = filter;
        true
    }
}

/// Scope filter for per-user collections.
///
/// The default (no user) makes the source not ready, so signed-out sessions
/// skip loads rather than query with an empty owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserScope {
    /// Owning user, or `None` while signed out.
    pub user: Option<UserId>,
}

/// State owned by a [`ListStore`].
#[derive(Debug, Clone)]
pub struct ListState<T, F> {
    /// Accumulated items in backend order.
    pub items: Vec<T>,
    /// Resume point for the next page.
    pub cursor: Option<Cursor>,
    /// Current activity indicator.
    pub status: ListStatus,
    /// Outcome of the last settled load.
    pub response: Option<OperationResponse>,
    /// Whether another page is worth requesting.
    pub has_more: bool,
    /// Filter the list is currently scoped to.
    pub filter: F,
    epoch: u64,
}

impl<T, F: Default> Default for ListState<T, F> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            status: ListStatus::Idle,
            response: None,
            has_more: false,
            filter: F::default(),
            epoch: 0,
        }
    }
}

/// How a load entered the store, which decides status and accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadKind {
    Full,
    More,
    Refresh,
}

impl LoadKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "load",
            Self::More => "load-more",
            Self::Refresh => "refresh",
        }
    }

    const fn running_status(self) -> ListStatus {
        match self {
            Self::Full => ListStatus::Loading,
            Self::More => ListStatus::Fetching,
            Self::Refresh => ListStatus::Refreshing,
        }
    }
}

/// A paged, filterable, status-tracked list of `S::Item`.
pub struct ListStore<S: PageSource> {
    name: &'static str,
    source: S,
    config: SyncConfig,
    state: Arc<RwLock<ListState<S::Item, S::Filter>>>,
    debounce: Debouncer,
}

impl<S: PageSource> ListStore<S> {
    /// Creates an empty list over `source`.
    #[must_use]
    pub fn new(name: &'static str, source: S, config: SyncConfig) -> Self {
        Self {
            name,
            source,
            config,
            state: Arc::new(RwLock::new(ListState::default())),
            debounce: Debouncer::new(),
        }
    }

    /// Store name used in logs and metric labels.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Read current state via a closure
    ///
    /// Access state through a closure to ensure the lock is released promptly:
    ///
    /// ```ignore
    /// let count = store.state(|s| s.items.len()).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&ListState<S::Item, S::Filter>) -> T,
    {
        let state = self.state.read().await;
        f(&*state)
    }

    /// Value snapshot for the view layer.
    #[must_use]
    pub async fn snapshot(&self) -> ListSnapshot<S::Item> {
        self.state(|s| ListSnapshot {
            items: s.items.clone(),
            status: s.status,
            response: s.response.clone(),
            has_more: s.has_more,
        })
        .await
    }

    /// Current items.
    #[must_use]
    pub async fn items(&self) -> Vec<S::Item> {
        self.state(|s| s.items.clone()).await
    }

    /// Current status.
    #[must_use]
    pub async fn status(&self) -> ListStatus {
        self.state(|s| s.status).await
    }

    /// Whether another page is worth requesting.
    #[must_use]
    pub async fn has_more(&self) -> bool {
        self.state(|s| s.has_more).await
    }

    /// Outcome of the last settled load, if any.
    #[must_use]
    pub async fn response(&self) -> Option<OperationResponse> {
        self.state(|s| s.response.clone()).await
    }

    /// Current filter value.
    #[must_use]
    pub async fn filter(&self) -> S::Filter {
        self.state(|s| s.filter.clone()).await
    }

    /// Loads the first page as a reset-load: current items, cursor, and
    /// `has_more` are cleared before the request goes out, so a failure
    /// leaves the list empty rather than showing stale rows under the error.
    ///
    /// Skipped while another request is in flight or the source is not ready
    /// for the current filter.
    pub async fn load(&self) {
        self.run(LoadKind::Full).await;
    }

    /// Loads the page after the current cursor and appends it.
    ///
    /// Skipped when the list is exhausted, busy, or not ready.
    pub async fn load_more(&self) {
        self.run(LoadKind::More).await;
    }

    /// Re-fetches the first page without clearing current items first.
    pub async fn refresh(&self) {
        self.run(LoadKind::Refresh).await;
    }

    /// Updates the filter and schedules a debounced reload.
    ///
    /// The filter is visible to readers immediately; the reload fires after
    /// the debounce window, and only the last change in a burst fetches.
    pub async fn set_filter(&self, filter: S::Filter) {
        {
            let mut state = self.state.write().await;
            state.filter = filter;
        }
        let store = self.clone();
        self.debounce.schedule(self.config.debounce, self.name, async move {
            store.load().await;
        });
    }

    /// Clears the list back to its default filter.
    pub async fn reset(&self) {
        self.reset_with_filter(S::Filter::default()).await;
    }

    /// Clears items, cursor, status, and response, installs `filter`, and
    /// fences out every in-flight or debounced operation.
    ///
    /// The clear is synchronous: a load issued right after a reset that then
    /// fails leaves the list observably empty, it does not resurrect the old
    /// items.
    pub async fn reset_with_filter(&self, filter: S::Filter) {
        self.debounce.cancel();
        let mut state = self.state.write().await;
        state.items.clear();
        state.cursor = None;
        state.status = ListStatus::Idle;
        state.response = None;
        state.has_more = false;
        state.filter = filter;
        state.epoch += 1;
        tracing::debug!(store = self.name, "Store reset");
        metrics::counter!("sync.store.reset", "store" => self.name).increment(1);
    }

    /// Runs one load cycle: stage under the lock, fetch without it, settle
    /// under the lock again if the epoch still matches.
    async fn run(&self, kind: LoadKind) {
        let Some((epoch, filter, request)) = self.stage(kind).await else {
            return;
        };

        let started = Instant::now();
        let result = self.source.fetch(&filter, request).await;

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            tracing::warn!(
                store = self.name,
                operation = kind.as_str(),
                "Discarding settlement from a superseded operation"
            );
            metrics::counter!("sync.stale.dropped", "store" => self.name).increment(1);
            return;
        }
        state.status = ListStatus::Idle;
        match result {
            Ok(page) => {
                state.has_more = page.has_more(self.config.page_size);
                state.cursor = page.next_cursor;
                match kind {
                    LoadKind::More => state.items.extend(page.items),
                    LoadKind::Full | LoadKind::Refresh => state.items = page.items,
                }
                state.response = Some(OperationResponse::Success);
                tracing::debug!(
                    store = self.name,
                    operation = kind.as_str(),
                    items = state.items.len(),
                    has_more = state.has_more,
                    "Load completed"
                );
                metrics::counter!("sync.load.completed", "store" => self.name).increment(1);
                metrics::histogram!("sync.load.duration_seconds", "store" => self.name)
                    .record(started.elapsed().as_secs_f64());
            }
            Err(error) => {
                state.has_more = false;
                state.response = Some(OperationResponse::Failure(error.clone()));
                tracing::warn!(
                    store = self.name,
                    operation = kind.as_str(),
                    error = %error,
                    "Load failed"
                );
                metrics::counter!("sync.load.failed", "store" => self.name).increment(1);
            }
        }
    }

    /// Guards and stages a load, returning what the fetch needs.
    async fn stage(&self, kind: LoadKind) -> Option<(u64, S::Filter, PageRequest)> {
        let mut state = self.state.write().await;
        if state.status.is_busy() {
            self.skip(kind, "busy");
            return None;
        }
        if !self.source.is_ready(&state.filter) {
            self.skip(kind, "not-ready");
            return None;
        }
        if kind == LoadKind::More && !state.has_more {
            self.skip(kind, "exhausted");
            return None;
        }
        let request = match kind {
            LoadKind::Full | LoadKind::Refresh => PageRequest::first(self.config.page_size),
            // has_more implies a cursor; an absent one falls back to the
            // first page.
            LoadKind::More => match &state.cursor {
                Some(cursor) => PageRequest::after(self.config.page_size, cursor.clone()),
                None => PageRequest::first(self.config.page_size),
            },
        };
        state.status = kind.running_status();
        state.response = None;
        if kind == LoadKind::Full {
            // A full load is a reset-load: the previous rows go away before
            // the request is issued, so a failure settles over an empty list
            // instead of another filter's data. The epoch bump fences out
            // sibling mutations staged against the discarded rows.
            state.items.clear();
            state.cursor = None;
            state.has_more = false;
            state.epoch += 1;
        }
        Some((state.epoch, state.filter.clone(), request))
    }

    fn skip(&self, kind: LoadKind, reason: &'static str) {
        tracing::debug!(
            store = self.name,
            operation = kind.as_str(),
            reason,
            "Load skipped"
        );
        metrics::counter!("sync.load.skipped", "store" => self.name, "reason" => reason)
            .increment(1);
    }

    /// Current fencing epoch, for sibling mutations that settle later.
    pub(crate) async fn epoch(&self) -> u64 {
        self.state.read().await.epoch
    }

    /// Applies a mutation only if `epoch` is still current.
    ///
    /// Returns whether the mutation ran; a `false` means a reset-class
    /// operation fenced it out in the meantime.
    pub(crate) async fn apply_if<F>(&self, epoch: u64, f: F) -> bool
    where
        F: FnOnce(&mut ListState<S::Item, S::Filter>),
    {
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            tracing::debug!(store = self.name, "Discarding fenced mutation");
            metrics::counter!("sync.stale.dropped", "store" => self.name).increment(1);
            return false;
        }
        f(&mut *state);
        true
    }
}

impl<S: PageSource> Clone for ListStore<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            source: self.source.clone(),
            config: self.config.clone(),
            state: Arc::clone(&self.state),
            debounce: self.debounce.clone(),
        }
    }
}
