//! Catalog book list and the single-book detail store.

use bookstore_core::contract::{Collection, CollectionQuery, Page, PageRequest};
use bookstore_core::error::StoreError;
use bookstore_core::gateway::CatalogGateway;
use bookstore_core::model::{Book, BookField, BookId};

use crate::config::SyncConfig;
use crate::entity::{EntityCore, EntityOperation, EntityState};
use crate::list::{ListStore, PageSource};

/// Pages of the whole catalog in backend order.
#[derive(Clone)]
pub struct BookPages<G> {
    gateway: G,
}

impl<G: CatalogGateway> BookPages<G> {
    /// Creates the source.
    #[must_use]
    pub const fn new(gateway: G) -> Self {
        Self { gateway }
    }
}

impl<G: CatalogGateway> PageSource for BookPages<G> {
    type Item = Book;
    type Filter = ();

    async fn fetch(&self, _filter: &(), page: PageRequest) -> Result<Page<Book>, StoreError> {
        self.gateway
            .query(CollectionQuery::unfiltered(Collection::Books, page))
            .await
    }
}

/// The storefront's main catalog list.
pub type BooksStore<G> = ListStore<BookPages<G>>;

/// Creates the catalog list store.
#[must_use]
pub fn books_store<G: CatalogGateway>(gateway: G, config: SyncConfig) -> BooksStore<G> {
    ListStore::new("books", BookPages::new(gateway), config)
}

/// Detail store for one book.
///
/// The storefront uses the read side (point, fetch); the admin screens use
/// the write side (create, field edits, delete). Every operation keeps its
/// own status slot, so a slow fetch never blocks an edit.
pub struct BookStore<G: CatalogGateway> {
    gateway: G,
    core: EntityCore<BookId, Book>,
}

impl<G: CatalogGateway> BookStore<G> {
    /// Creates an unpointed detail store.
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            core: EntityCore::new("book"),
        }
    }

    /// Read current state via a closure.
    pub async fn state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&EntityState<BookId, Book>) -> R,
    {
        self.core.state(f).await
    }

    /// The book, once fetched.
    #[must_use]
    pub async fn book(&self) -> Option<Book> {
        self.core.state(|s| s.entity.clone()).await
    }

    /// Points the store at a book, clearing whatever it held before.
    pub async fn set_book(&self, id: Option<BookId>) {
        self.core.set_id(id).await;
    }

    /// Fetches the pointed-at book.
    pub async fn fetch(&self) {
        let Some((epoch, id)) = self.core.begin_for_id(EntityOperation::Fetch).await else {
            return;
        };
        match self.gateway.get::<Book>(Collection::Books, id.as_str()).await {
            Ok(book) => {
                self.core
                    .settle(epoch, EntityOperation::Fetch, Ok(()), |state| {
                        state.entity = Some(book);
                    })
                    .await;
            }
            Err(error) => {
                self.core
                    .settle(epoch, EntityOperation::Fetch, Err(error), |_| {})
                    .await;
            }
        }
    }

    /// Creates a book and points the store at it.
    pub async fn create(&self, book: Book) {
        let Some(epoch) = self.core.begin(EntityOperation::Create).await else {
            return;
        };
        match self
            .gateway
            .create(Collection::Books, book.id.as_str(), &book)
            .await
        {
            Ok(()) => {
                self.core
                    .settle(epoch, EntityOperation::Create, Ok(()), |state| {
                        state.id = Some(book.id.clone());
                        state.entity = Some(book);
                    })
                    .await;
            }
            Err(error) => {
                self.core
                    .settle(epoch, EntityOperation::Create, Err(error), |_| {})
                    .await;
            }
        }
    }

    /// Applies field edits optimistically and reconciles with the backend.
    ///
    /// Same flow as the profile store: merge locally, write the changed
    /// fields, refetch for anything the backend derived. A failed write
    /// rolls the merge back; a failed refetch keeps the merged copy.
    pub async fn update(&self, fields: Vec<BookField>) {
        if fields.is_empty() {
            tracing::debug!(store = "book", "Empty edit ignored");
            return;
        }
        let Some((epoch, id)) = self.core.begin_for_id(EntityOperation::Update).await else {
            return;
        };
        let mut previous = None;
        self.core
            .apply(epoch, |state| {
                if let Some(book) = &mut state.entity {
                    previous = Some(book.clone());
                    for field in &fields {
                        field.apply(book);
                    }
                }
            })
            .await;
        match self
            .gateway
            .update_fields(Collection::Books, id.as_str(), BookField::patch(&fields))
            .await
        {
            Ok(()) => {
                match self.gateway.get::<Book>(Collection::Books, id.as_str()).await {
                    Ok(fresh) => {
                        self.core
                            .settle(epoch, EntityOperation::Update, Ok(()), |state| {
                                state.entity = Some(fresh);
                            })
                            .await;
                    }
                    Err(error) => {
                        tracing::warn!(
                            store = "book",
                            error = %error,
                            "Reconciling refetch failed, keeping merged copy"
                        );
                        self.core
                            .settle(epoch, EntityOperation::Update, Ok(()), |_| {})
                            .await;
                    }
                }
            }
            Err(error) => {
                if let Some(book) = previous {
                    self.core
                        .apply(epoch, |state| state.entity = Some(book))
                        .await;
                }
                self.core
                    .settle(epoch, EntityOperation::Update, Err(error), |_| {})
                    .await;
            }
        }
    }

    /// Flips whether the pointed-at book can be ordered.
    pub async fn set_availability(&self, available: bool) {
        self.update(vec![BookField::Available(available)]).await;
    }

    /// Deletes the pointed-at book.
    ///
    /// On success the entity clears but the pointer stays, so the screen
    /// can still read the settled response before it unmounts and resets.
    pub async fn delete(&self) {
        let Some((epoch, id)) = self.core.begin_for_id(EntityOperation::Delete).await else {
            return;
        };
        match self.gateway.delete(Collection::Books, id.as_str()).await {
            Ok(()) => {
                self.core
                    .settle(epoch, EntityOperation::Delete, Ok(()), |state| {
                        state.entity = None;
                    })
                    .await;
            }
            Err(error) => {
                self.core
                    .settle(epoch, EntityOperation::Delete, Err(error), |_| {})
                    .await;
            }
        }
    }

    /// Clears one settled operation banner.
    pub async fn reset_operation(&self, op: EntityOperation) {
        self.core.reset_operation(op).await;
    }

    /// Clears the store entirely.
    pub async fn reset(&self) {
        self.core.set_id(None).await;
    }
}

impl<G: CatalogGateway> Clone for BookStore<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            core: self.core.clone(),
        }
    }
}
