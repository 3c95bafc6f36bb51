//! Service seams the stores depend on.
//!
//! Stores receive these as generic parameters instead of reaching for
//! globals, so a test wires in-memory fakes and production wires real
//! backends without touching store code. Implementations are expected to be
//! cheap to clone (an `Arc` handle) because the service container hands one
//! clone to every store.

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::contract::{Collection, CollectionQuery, ImageUpload, Page, StoredImage};
use crate::error::StoreError;
use crate::model::{City, Warehouse};

/// Document backend the catalog stores read and write through.
pub trait CatalogGateway: Clone + Send + Sync + 'static {
    /// Runs a paged, optionally filtered read against one collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] when a stored document does not match
    /// `T`, and the backend's classified error otherwise.
    fn query<T>(
        &self,
        query: CollectionQuery,
    ) -> impl Future<Output = Result<Page<T>, StoreError>> + Send
    where
        T: DeserializeOwned + Send;

    /// Fetches a single document by id.
    ///
    /// # Errors
    ///
    /// Returns the collection's not-found error when the id is unknown.
    fn get<T>(
        &self,
        collection: Collection,
        id: &str,
    ) -> impl Future<Output = Result<T, StoreError>> + Send
    where
        T: DeserializeOwned + Send;

    /// Creates or replaces the document at `id`.
    ///
    /// # Errors
    ///
    /// Returns the backend's classified error when the write is rejected.
    fn create<T>(
        &self,
        collection: Collection,
        id: &str,
        document: &T,
    ) -> impl Future<Output = Result<(), StoreError>> + Send
    where
        T: Serialize + Sync;

    /// Merges `fields` into the document at `id`, leaving other fields alone.
    ///
    /// # Errors
    ///
    /// Returns the collection's not-found error when the id is unknown, and
    /// the backend's classified error when the write is rejected.
    fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: serde_json::Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deletes the document at `id`. Deleting an absent document succeeds.
    ///
    /// # Errors
    ///
    /// Returns the backend's classified error when the delete is rejected.
    fn delete(
        &self,
        collection: Collection,
        id: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Blob host for book images.
pub trait ImageHost: Clone + Send + Sync + 'static {
    /// Uploads an image and returns where it landed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidImage`] when the payload is not a usable
    /// image, and the host's classified error otherwise.
    fn upload(
        &self,
        upload: ImageUpload,
    ) -> impl Future<Output = Result<StoredImage, StoreError>> + Send;

    /// Deletes a previously uploaded blob.
    ///
    /// # Errors
    ///
    /// Returns the host's classified error when the delete is rejected.
    fn delete(&self, storage_path: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Shipping directory the checkout flow looks cities and warehouses up in.
pub trait ShippingDirectory: Clone + Send + Sync + 'static {
    /// Searches cities by name prefix or fragment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CitiesNotFound`] when nothing matched.
    fn search_cities(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<City>, StoreError>> + Send;

    /// Searches warehouses within the city identified by `city_ref`.
    ///
    /// An empty `query` lists the city's warehouses up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WarehousesNotFound`] when nothing matched.
    fn search_warehouses(
        &self,
        city_ref: &str,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Warehouse>, StoreError>> + Send;
}
