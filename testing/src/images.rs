//! In-memory image host.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use bookstore_core::contract::{ImageUpload, StoredImage};
use bookstore_core::error::StoreError;
use bookstore_core::gateway::ImageHost;

/// Host operations that can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageOp {
    /// Blob uploads.
    Upload,
    /// Blob deletions.
    Delete,
}

#[derive(Default)]
struct HostState {
    blobs: HashMap<String, Vec<u8>>,
    failures: HashMap<ImageOp, VecDeque<StoreError>>,
    uploaded: usize,
}

/// An in-memory [`ImageHost`] for tests.
///
/// Uploads land under `uploads/{n}-{file_name}` with a public URL derived
/// from the storage path, so a test can assert both what was stored and that
/// failed flows cleaned their blobs up again.
#[derive(Clone, Default)]
pub struct InMemoryImageHost {
    state: Arc<Mutex<HostState>>,
}

impl InMemoryImageHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an error for the next call of `op`.
    pub fn fail_next(&self, op: ImageOp, error: StoreError) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Number of blobs currently stored.
    #[must_use]
    pub fn blob_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .blobs
            .len()
    }

    /// Whether a blob exists at `storage_path`.
    #[must_use]
    pub fn contains(&self, storage_path: &str) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .blobs
            .contains_key(storage_path)
    }

    fn take_failure(&self, op: ImageOp) -> Option<StoreError> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .failures
            .get_mut(&op)
            .and_then(VecDeque::pop_front)
    }
}

impl ImageHost for InMemoryImageHost {
    async fn upload(&self, upload: ImageUpload) -> Result<StoredImage, StoreError> {
        if let Some(error) = self.take_failure(ImageOp::Upload) {
            return Err(error);
        }
        if upload.bytes.is_empty() || !upload.content_type.starts_with("image/") {
            return Err(StoreError::InvalidImage);
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.uploaded += 1;
        let storage_path = format!("uploads/{}-{}", state.uploaded, upload.file_name);
        let url = format!("https://images.test/{storage_path}");
        state.blobs.insert(storage_path.clone(), upload.bytes);
        Ok(StoredImage { url, storage_path })
    }

    async fn delete(&self, storage_path: &str) -> Result<(), StoreError> {
        if let Some(error) = self.take_failure(ImageOp::Delete) {
            return Err(error);
        }
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .blobs
            .remove(storage_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    fn jpeg(name: &str) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    #[tokio::test]
    async fn upload_stores_and_delete_removes() {
        let host = InMemoryImageHost::new();
        let stored = host.upload(jpeg("cover.jpg")).await.expect("upload");
        assert_eq!(stored.storage_path, "uploads/1-cover.jpg");
        assert!(stored.url.ends_with("uploads/1-cover.jpg"));
        assert!(host.contains(&stored.storage_path));

        host.delete(&stored.storage_path).await.expect("delete");
        assert_eq!(host.blob_count(), 0);
        host.delete(&stored.storage_path).await.expect("redelete");
    }

    #[tokio::test]
    async fn rejects_non_images() {
        let host = InMemoryImageHost::new();
        let upload = ImageUpload {
            file_name: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            bytes: vec![1, 2, 3],
        };
        assert_eq!(host.upload(upload).await, Err(StoreError::InvalidImage));

        let empty = ImageUpload {
            file_name: "cover.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: Vec::new(),
        };
        assert_eq!(host.upload(empty).await, Err(StoreError::InvalidImage));
    }

    #[tokio::test]
    async fn scripted_failure_leaves_no_blob() {
        let host = InMemoryImageHost::new();
        host.fail_next(ImageOp::Upload, StoreError::Network("offline".to_string()));
        assert_eq!(
            host.upload(jpeg("cover.jpg")).await,
            Err(StoreError::Network("offline".to_string()))
        );
        assert_eq!(host.blob_count(), 0);
    }
}
