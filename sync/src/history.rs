//! Viewing history: what the user opened, newest first.

use bookstore_core::contract::{Collection, CollectionQuery, Page, PageRequest};
use bookstore_core::error::StoreError;
use bookstore_core::gateway::CatalogGateway;
use bookstore_core::model::{Book, RecordId, UserId, ViewRecord};
use bookstore_core::status::ListSnapshot;
use bookstore_core::view::{group_by_date, DateBuckets};
use chrono::Utc;

use crate::config::SyncConfig;
use crate::list::{ListState, ListStore, PageSource, UserScope};

/// Pages of the scoped user's view records.
#[derive(Clone)]
pub struct ViewPages<G> {
    gateway: G,
}

impl<G: CatalogGateway> ViewPages<G> {
    /// Creates the source.
    #[must_use]
    pub const fn new(gateway: G) -> Self {
        Self { gateway }
    }
}

impl<G: CatalogGateway> PageSource for ViewPages<G> {
    type Item = ViewRecord;
    type Filter = UserScope;

    async fn fetch(
        &self,
        filter: &UserScope,
        page: PageRequest,
    ) -> Result<Page<ViewRecord>, StoreError> {
        let Some(user) = &filter.user else {
            return Ok(Page::empty());
        };
        self.gateway
            .query(CollectionQuery::filtered(
                Collection::ViewingHistory,
                &["userId"],
                user.as_str(),
                page,
            ))
            .await
    }

    fn is_ready(&self, filter: &UserScope) -> bool {
        filter.user.is_some()
    }
}

/// Viewing history plus best-effort [`record_view`](ViewingHistoryStore::record_view).
pub struct ViewingHistoryStore<G: CatalogGateway> {
    list: ListStore<ViewPages<G>>,
    gateway: G,
}

impl<G: CatalogGateway> ViewingHistoryStore<G> {
    /// Creates an unscoped history store.
    #[must_use]
    pub fn new(gateway: G, config: SyncConfig) -> Self {
        Self {
            list: ListStore::new("viewing-history", ViewPages::new(gateway.clone()), config),
            gateway,
        }
    }

    /// Read current state via a closure.
    pub async fn state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ListState<ViewRecord, UserScope>) -> R,
    {
        self.list.state(f).await
    }

    /// Everything a history view renders.
    pub async fn snapshot(&self) -> ListSnapshot<ViewRecord> {
        self.list.snapshot().await
    }

    /// Repoints the history at a user, discarding the previous user's pages.
    pub async fn set_user(&self, user: Option<UserId>) {
        self.list.reset_with_filter(UserScope { user }).await;
    }

    /// Loads the first page.
    pub async fn load(&self) {
        self.list.load().await;
    }

    /// Appends the next page.
    pub async fn load_more(&self) {
        self.list.load_more().await;
    }

    /// Reloads the first page while keeping items visible.
    pub async fn refresh(&self) {
        self.list.refresh().await;
    }

    /// Loaded records bucketed by calendar day, newest first.
    pub async fn grouped(&self) -> DateBuckets<ViewRecord> {
        let items = self.list.items().await;
        group_by_date(items, |record| record.viewed_at)
    }

    /// Clears scope and pages.
    pub async fn reset(&self) {
        self.list.reset().await;
    }

    /// Records that the user opened a book.
    ///
    /// Best-effort: a backend failure is logged and the list left alone.
    /// On success the book moves to the top of the loaded list, replacing
    /// any older entry for the same book.
    pub async fn record_view(&self, book: &Book) {
        let Some(user) = self.list.state(|s| s.filter.user.clone()).await else {
            tracing::debug!(book = %book.id, "View not recorded, no signed-in user");
            return;
        };
        let epoch = self.list.epoch().await;
        let record = ViewRecord {
            id: RecordId::generate(),
            user_id: user,
            book: book.clone(),
            viewed_at: Utc::now(),
        };
        match self
            .gateway
            .create(Collection::ViewingHistory, record.id.as_str(), &record)
            .await
        {
            Ok(()) => {
                tracing::debug!(book = %record.book.id, "View recorded");
                metrics::counter!(
                    "sync.mutation.completed",
                    "store" => "viewing-history",
                    "operation" => "record-view"
                )
                .increment(1);
                self.list
                    .apply_if(epoch, |state| {
                        state.items.retain(|item| item.book.id != record.book.id);
                        state.items.insert(0, record);
                    })
                    .await;
            }
            Err(error) => {
                tracing::warn!(book = %book.id, error = %error, "View recording failed");
                metrics::counter!(
                    "sync.mutation.failed",
                    "store" => "viewing-history",
                    "operation" => "record-view"
                )
                .increment(1);
            }
        }
    }
}

impl<G: CatalogGateway> Clone for ViewingHistoryStore<G> {
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
            gateway: self.gateway.clone(),
        }
    }
}
