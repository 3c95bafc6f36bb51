//! Cover gallery for one book: paged listing plus upload and delete.

use std::sync::Arc;

use bookstore_core::contract::{Collection, CollectionQuery, ImageUpload, Page, PageRequest};
use bookstore_core::error::StoreError;
use bookstore_core::gateway::{CatalogGateway, ImageHost};
use bookstore_core::model::{BookId, BookImage, ImageId};
use bookstore_core::status::{EntityStatus, ListSnapshot};
use chrono::Utc;
use tokio::sync::RwLock;

use crate::config::SyncConfig;
use crate::entity::OperationSlot;
use crate::list::{ListState, ListStore, PageSource};

/// Which book's gallery is open, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryScope {
    /// The open book.
    pub book: Option<BookId>,
}

/// Pages of the scoped book's images.
#[derive(Clone)]
pub struct ImagePages<G> {
    gateway: G,
}

impl<G: CatalogGateway> ImagePages<G> {
    /// Creates the source.
    #[must_use]
    pub const fn new(gateway: G) -> Self {
        Self { gateway }
    }
}

impl<G: CatalogGateway> PageSource for ImagePages<G> {
    type Item = BookImage;
    type Filter = GalleryScope;

    async fn fetch(
        &self,
        filter: &GalleryScope,
        page: PageRequest,
    ) -> Result<Page<BookImage>, StoreError> {
        let Some(book) = &filter.book else {
            return Ok(Page::empty());
        };
        self.gateway
            .query(CollectionQuery::filtered(
                Collection::BookImages,
                &["bookId"],
                book.as_str(),
                page,
            ))
            .await
    }

    fn is_ready(&self, filter: &GalleryScope) -> bool {
        filter.book.is_some()
    }
}

/// Upload and delete progress, tracked apart from the list status so a
/// running upload never blocks pagination.
#[derive(Debug, Clone, Default)]
pub struct GalleryState {
    /// The upload slot.
    pub upload: OperationSlot,
    /// The delete slot.
    pub delete: OperationSlot,
    epoch: u64,
}

#[derive(Clone, Copy)]
enum GalleryOp {
    Upload,
    Delete,
}

impl GalleryOp {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Delete => "delete",
        }
    }

    const fn running_status(self) -> EntityStatus {
        match self {
            Self::Upload => EntityStatus::Creating,
            Self::Delete => EntityStatus::Deleting,
        }
    }
}

/// Gallery store: the image list plus blob-then-document mutations.
///
/// An upload stores the blob first and writes the catalog document second;
/// if the document write fails the blob is deleted again so the host does
/// not accumulate orphans. A delete removes the document first and the blob
/// second, leaving at worst an orphaned blob behind.
pub struct BookImagesStore<G: CatalogGateway, H: ImageHost> {
    list: ListStore<ImagePages<G>>,
    gateway: G,
    host: H,
    slots: Arc<RwLock<GalleryState>>,
}

impl<G: CatalogGateway, H: ImageHost> BookImagesStore<G, H> {
    /// Creates an unscoped gallery store.
    #[must_use]
    pub fn new(gateway: G, host: H, config: SyncConfig) -> Self {
        Self {
            list: ListStore::new("book-images", ImagePages::new(gateway.clone()), config),
            gateway,
            host,
            slots: Arc::new(RwLock::new(GalleryState::default())),
        }
    }

    /// Read current list state via a closure.
    pub async fn state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ListState<BookImage, GalleryScope>) -> R,
    {
        self.list.state(f).await
    }

    /// Everything a gallery view renders from the list side.
    pub async fn snapshot(&self) -> ListSnapshot<BookImage> {
        self.list.snapshot().await
    }

    /// Upload and delete slots.
    pub async fn gallery(&self) -> GalleryState {
        self.slots.read().await.clone()
    }

    /// The open book.
    pub async fn book(&self) -> Option<BookId> {
        self.list.state(|s| s.filter.book.clone()).await
    }

    /// Repoints the gallery, discarding the previous book's pages and slots.
    pub async fn set_book(&self, book: Option<BookId>) {
        self.list.reset_with_filter(GalleryScope { book }).await;
        let mut slots = self.slots.write().await;
        slots.upload = OperationSlot::default();
        slots.delete = OperationSlot::default();
        slots.epoch += 1;
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

    /// Clears scope, pages, and slots.
    pub async fn reset(&self) {
        self.set_book(None).await;
    }

    /// Stores the blob, writes the catalog document, and prepends the record.
    pub async fn add_image(&self, upload: ImageUpload) {
        let Some(book) = self.book().await else {
            tracing::warn!("Image upload without an open book");
            return;
        };
        let Some(slot_epoch) = self.begin(GalleryOp::Upload).await else {
            return;
        };
        let list_epoch = self.list.epoch().await;
        let stored = match self.host.upload(upload).await {
            Ok(stored) => stored,
            Err(error) => {
                self.settle(slot_epoch, GalleryOp::Upload, Err(error)).await;
                return;
            }
        };
        let record = BookImage {
            id: ImageId::generate(),
            book_id: book,
            image: stored.clone(),
            created_at: Utc::now(),
        };
        match self
            .gateway
            .create(Collection::BookImages, record.id.as_str(), &record)
            .await
        {
            Ok(()) => {
                self.list
                    .apply_if(list_epoch, |state| state.items.insert(0, record))
                    .await;
                self.settle(slot_epoch, GalleryOp::Upload, Ok(())).await;
            }
            Err(error) => {
                if let Err(cleanup) = self.host.delete(&stored.storage_path).await {
                    tracing::warn!(
                        path = %stored.storage_path,
                        error = %cleanup,
                        "Orphaned blob cleanup failed"
                    );
                }
                self.settle(slot_epoch, GalleryOp::Upload, Err(error)).await;
            }
        }
    }

    /// Deletes the catalog document, then the blob, then drops the row.
    pub async fn remove_image(&self, id: &ImageId) {
        let record = self
            .list
            .state(|s| s.items.iter().find(|item| item.id == *id).cloned())
            .await;
        let Some(record) = record else {
            tracing::warn!(image = %id, "Removal of an image that is not loaded");
            return;
        };
        let Some(slot_epoch) = self.begin(GalleryOp::Delete).await else {
            return;
        };
        let list_epoch = self.list.epoch().await;
        match self
            .gateway
            .delete(Collection::BookImages, record.id.as_str())
            .await
        {
            Ok(()) => {
                if let Err(error) = self.host.delete(&record.image.storage_path).await {
                    tracing::warn!(
                        path = %record.image.storage_path,
                        error = %error,
                        "Blob deletion failed, leaving an orphan"
                    );
                }
                self.list
                    .apply_if(list_epoch, |state| {
                        state.items.retain(|item| item.id != record.id);
                    })
                    .await;
                self.settle(slot_epoch, GalleryOp::Delete, Ok(())).await;
            }
            Err(error) => {
                self.settle(slot_epoch, GalleryOp::Delete, Err(error)).await;
            }
        }
    }

    async fn begin(&self, op: GalleryOp) -> Option<u64> {
        let mut slots = self.slots.write().await;
        let slot = match op {
            GalleryOp::Upload => &mut slots.upload,
            GalleryOp::Delete => &mut slots.delete,
        };
        if slot.status != EntityStatus::Idle {
            tracing::debug!(operation = op.as_str(), "Gallery operation already running");
            metrics::counter!(
                "sync.load.skipped",
                "store" => "book-images",
                "reason" => "busy"
            )
            .increment(1);
            return None;
        }
        slot.status = op.running_status();
        slot.response = None;
        Some(slots.epoch)
    }

    async fn settle(&self, epoch: u64, op: GalleryOp, result: Result<(), StoreError>) {
        let mut slots = self.slots.write().await;
        if slots.epoch != epoch {
            tracing::warn!(
                operation = op.as_str(),
                "Discarding gallery settlement from a superseded operation"
            );
            metrics::counter!("sync.stale.dropped", "store" => "book-images").increment(1);
            return;
        }
        let succeeded = result.is_ok();
        if let Err(error) = &result {
            tracing::warn!(operation = op.as_str(), error = %error, "Gallery operation failed");
        } else {
            tracing::debug!(operation = op.as_str(), "Gallery operation completed");
        }
        let metric = if succeeded {
            "sync.mutation.completed"
        } else {
            "sync.mutation.failed"
        };
        metrics::counter!(
            metric,
            "store" => "book-images",
            "operation" => op.as_str()
        )
        .increment(1);
        let slot = match op {
            GalleryOp::Upload => &mut slots.upload,
            GalleryOp::Delete => &mut slots.delete,
        };
        slot.status = EntityStatus::Idle;
        slot.response = Some(result.into());
    }
}

impl<G: CatalogGateway, H: ImageHost> Clone for BookImagesStore<G, H> {
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
            gateway: self.gateway.clone(),
            host: self.host.clone(),
            slots: Arc::clone(&self.slots),
        }
    }
}
