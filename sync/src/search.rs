//! Debounced full-text search over the catalog.

use bookstore_core::contract::{Collection, CollectionQuery, Page, PageRequest};
use bookstore_core::error::StoreError;
use bookstore_core::gateway::CatalogGateway;
use bookstore_core::model::Book;
use bookstore_core::status::ListSnapshot;

use crate::config::SyncConfig;
use crate::list::{ListState, ListStore, PageSource};

/// Free-text needle matched against title and author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    /// The raw text as typed.
    pub query: String,
}

/// Pages of books matching the current query.
#[derive(Clone)]
pub struct SearchPages<G> {
    gateway: G,
}

impl<G: CatalogGateway> SearchPages<G> {
    /// Creates the source.
    #[must_use]
    pub const fn new(gateway: G) -> Self {
        Self { gateway }
    }
}

impl<G: CatalogGateway> PageSource for SearchPages<G> {
    type Item = Book;
    type Filter = SearchFilter;

    async fn fetch(
        &self,
        filter: &SearchFilter,
        page: PageRequest,
    ) -> Result<Page<Book>, StoreError> {
        self.gateway
            .query(CollectionQuery::filtered(
                Collection::Books,
                &["title", "author"],
                filter.query.clone(),
                page,
            ))
            .await
    }

    fn is_ready(&self, filter: &SearchFilter) -> bool {
        !filter.query.trim().is_empty()
    }
}

/// Search results with a debounced query box on top.
///
/// An emptied query resets the store instead of firing a blank search,
/// so clearing the box immediately blanks the results.
pub struct SearchStore<G: CatalogGateway> {
    list: ListStore<SearchPages<G>>,
}

impl<G: CatalogGateway> SearchStore<G> {
    /// Creates an empty search store.
    #[must_use]
    pub fn new(gateway: G, config: SyncConfig) -> Self {
        Self {
            list: ListStore::new("search", SearchPages::new(gateway), config),
        }
    }

    /// Read current state via a closure.
    pub async fn state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ListState<Book, SearchFilter>) -> R,
    {
        self.list.state(f).await
    }

    /// Everything a results view renders.
    pub async fn snapshot(&self) -> ListSnapshot<Book> {
        self.list.snapshot().await
    }

    /// The query as last typed.
    pub async fn query(&self) -> String {
        self.list.state(|s| s.filter.query.clone()).await
    }

    /// Replaces the query; the reload fires after the debounce window.
    pub async fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        if query.trim().is_empty() {
            self.list.reset().await;
        } else {
            self.list.set_filter(SearchFilter { query }).await;
        }
    }

    /// Runs the current query immediately, bypassing the debounce.
    pub async fn load(&self) {
        self.list.load().await;
    }

    /// Appends the next page of results.
    pub async fn load_more(&self) {
        self.list.load_more().await;
    }

    /// Clears results and query.
    pub async fn reset(&self) {
        self.list.reset().await;
    }
}

impl<G: CatalogGateway> Clone for SearchStore<G> {
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
        }
    }
}
