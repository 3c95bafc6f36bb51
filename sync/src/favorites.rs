//! The signed-in user's favorites, with optimistic toggling.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use bookstore_core::contract::{Collection, CollectionQuery, Page, PageRequest};
use bookstore_core::error::StoreError;
use bookstore_core::gateway::CatalogGateway;
use bookstore_core::model::{Book, BookId, FavoriteRecord, RecordId, UserId};
use bookstore_core::status::ListSnapshot;
use chrono::Utc;

use crate::config::SyncConfig;
use crate::list::{ListState, ListStore, PageSource, UserScope};

/// Pages of the scoped user's favorite records.
#[derive(Clone)]
pub struct FavoritePages<G> {
    gateway: G,
}

impl<G: CatalogGateway> FavoritePages<G> {
    /// Creates the source.
    #[must_use]
    pub const fn new(gateway: G) -> Self {
        Self { gateway }
    }
}

impl<G: CatalogGateway> PageSource for FavoritePages<G> {
    type Item = FavoriteRecord;
    type Filter = UserScope;

    async fn fetch(
        &self,
        filter: &UserScope,
        page: PageRequest,
    ) -> Result<Page<FavoriteRecord>, StoreError> {
        let Some(user) = &filter.user else {
            return Ok(Page::empty());
        };
        self.gateway
            .query(CollectionQuery::filtered(
                Collection::Favorites,
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

/// Favorites list plus an optimistic [`toggle`](FavoritesStore::toggle).
///
/// A toggle mutates the loaded list first and reconciles with the backend
/// afterwards, rolling back on failure. A second tap on the same book while
/// the first is still in flight is dropped.
pub struct FavoritesStore<G: CatalogGateway> {
    list: ListStore<FavoritePages<G>>,
    gateway: G,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl<G: CatalogGateway> FavoritesStore<G> {
    /// Creates an unscoped favorites store.
    #[must_use]
    pub fn new(gateway: G, config: SyncConfig) -> Self {
        Self {
            list: ListStore::new("favorites", FavoritePages::new(gateway.clone()), config),
            gateway,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Read current state via a closure.
    pub async fn state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ListState<FavoriteRecord, UserScope>) -> R,
    {
        self.list.state(f).await
    }

    /// Everything a favorites view renders.
    pub async fn snapshot(&self) -> ListSnapshot<FavoriteRecord> {
        self.list.snapshot().await
    }

    /// Whether the loaded pages contain this book.
    pub async fn is_favorite(&self, id: &BookId) -> bool {
        self.list
            .state(|s| s.items.iter().any(|record| record.book.id == *id))
            .await
    }

    /// Ids of the loaded favorites, the lookup side of the catalog flag join.
    pub async fn favorite_ids(&self) -> HashSet<BookId> {
        self.list
            .state(|s| s.items.iter().map(|record| record.book.id.clone()).collect())
            .await
    }

    /// Repoints the list at a user, discarding the previous user's pages.
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

    /// Clears scope and pages.
    pub async fn reset(&self) {
        self.list.reset().await;
    }

    /// Adds the book to favorites, or removes it if already there.
    pub async fn toggle(&self, book: &Book) {
        let Some(user) = self.list.state(|s| s.filter.user.clone()).await else {
            tracing::warn!(book = %book.id, "Favorite toggle without a signed-in user");
            return;
        };
        {
            let mut in_flight = self
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !in_flight.insert(book.id.as_str().to_string()) {
                tracing::debug!(book = %book.id, "Favorite toggle already in flight");
                return;
            }
        }
        self.toggle_inner(user, book).await;
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(book.id.as_str());
    }

    async fn toggle_inner(&self, user: UserId, book: &Book) {
        let epoch = self.list.epoch().await;
        let existing = self
            .list
            .state(|s| {
                s.items
                    .iter()
                    .position(|record| record.book.id == book.id)
                    .map(|index| (index, s.items[index].clone()))
            })
            .await;
        match existing {
            Some((index, record)) => self.remove(epoch, index, record).await,
            None => self.add(epoch, user, book.clone()).await,
        }
    }

    async fn add(&self, epoch: u64, user: UserId, book: Book) {
        let record = FavoriteRecord {
            id: RecordId::generate(),
            user_id: user,
            book,
            created_at: Utc::now(),
        };
        let optimistic = record.clone();
        let applied = self
            .list
            .apply_if(epoch, |state| state.items.insert(0, optimistic))
            .await;
        if !applied {
            return;
        }
        match self
            .gateway
            .create(Collection::Favorites, record.id.as_str(), &record)
            .await
        {
            Ok(()) => {
                tracing::debug!(book = %record.book.id, "Favorite added");
                metrics::counter!(
                    "sync.mutation.completed",
                    "store" => "favorites",
                    "operation" => "add"
                )
                .increment(1);
            }
            Err(error) => {
                tracing::warn!(book = %record.book.id, error = %error, "Favorite add failed, rolling back");
                metrics::counter!(
                    "sync.mutation.failed",
                    "store" => "favorites",
                    "operation" => "add"
                )
                .increment(1);
                self.list
                    .apply_if(epoch, |state| {
                        state.items.retain(|item| item.id != record.id);
                    })
                    .await;
            }
        }
    }

    async fn remove(&self, epoch: u64, index: usize, record: FavoriteRecord) {
        let removed_id = record.id.clone();
        let applied = self
            .list
            .apply_if(epoch, |state| {
                state.items.retain(|item| item.id != removed_id);
            })
            .await;
        if !applied {
            return;
        }
        match self
            .gateway
            .delete(Collection::Favorites, record.id.as_str())
            .await
        {
            Ok(()) => {
                tracing::debug!(book = %record.book.id, "Favorite removed");
                metrics::counter!(
                    "sync.mutation.completed",
                    "store" => "favorites",
                    "operation" => "remove"
                )
                .increment(1);
            }
            Err(error) => {
                tracing::warn!(book = %record.book.id, error = %error, "Favorite removal failed, rolling back");
                metrics::counter!(
                    "sync.mutation.failed",
                    "store" => "favorites",
                    "operation" => "remove"
                )
                .increment(1);
                self.list
                    .apply_if(epoch, |state| {
                        let at = index.min(state.items.len());
                        state.items.insert(at, record);
                    })
                    .await;
            }
        }
    }
}

impl<G: CatalogGateway> Clone for FavoritesStore<G> {
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
            gateway: self.gateway.clone(),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}
