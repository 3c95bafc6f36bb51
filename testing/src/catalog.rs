//! In-memory document backend.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use bookstore_core::contract::{Collection, CollectionQuery, Cursor, Page};
use bookstore_core::error::StoreError;
use bookstore_core::gateway::CatalogGateway;

/// Gateway operations that can be counted and scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogOp {
    /// Paged collection reads.
    Query,
    /// Single-document fetches.
    Get,
    /// Document creation.
    Create,
    /// Partial document updates.
    Update,
    /// Document deletion.
    Delete,
}

#[derive(Default)]
struct Script {
    failures: HashMap<CatalogOp, VecDeque<StoreError>>,
    calls: HashMap<CatalogOp, usize>,
    latency: Option<Duration>,
}

/// An in-memory [`CatalogGateway`] for tests.
///
/// Documents live in insertion order per collection, which doubles as the
/// backend sort order. Pagination cursors are the string form of the offset
/// into the filtered result set, so a full page that ends exactly at the last
/// match comes back without a continuation cursor.
///
/// Failure injection is per operation: [`fail_next`](Self::fail_next) queues
/// an error that the next call of that operation returns instead of touching
/// the data. Injected latency (driven by tokio's clock) elapses before the
/// failure check, so paused-clock tests still control interleaving.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    collections: Arc<RwLock<HashMap<Collection, Vec<(String, Value)>>>>,
    script: Arc<Mutex<Script>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the document at `id`, keeping insertion order for
    /// new documents.
    ///
    /// # Panics
    ///
    /// Panics if `document` does not serialize, which cannot happen for the
    /// domain model types.
    #[allow(clippy::expect_used)]
    pub fn insert<T: Serialize>(&self, collection: Collection, id: impl Into<String>, document: &T) {
        let id = id.into();
        let value = serde_json::to_value(document).expect("fixture documents always serialize");
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let documents = collections.entry(collection).or_default();
        if let Some(slot) = documents.iter_mut().find(|(doc_id, _)| *doc_id == id) {
            slot.1 = value;
        } else {
            documents.push((id, value));
        }
    }

    /// Queues an error for the next call of `op`.
    ///
    /// Multiple queued errors for the same operation are consumed in order.
    pub fn fail_next(&self, op: CatalogOp, error: StoreError) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Sets the simulated backend latency for every subsequent call.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .latency = latency;
    }

    /// How many times `op` has been called, failures included.
    #[must_use]
    pub fn calls(&self, op: CatalogOp) -> usize {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .calls
            .get(&op)
            .copied()
            .unwrap_or(0)
    }

    /// The raw document at `id`, if present.
    #[must_use]
    pub fn document(&self, collection: Collection, id: &str) -> Option<Value> {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&collection)
            .and_then(|documents| {
                documents
                    .iter()
                    .find(|(doc_id, _)| doc_id == id)
                    .map(|(_, value)| value.clone())
            })
    }

    /// Number of documents currently in `collection`.
    #[must_use]
    pub fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&collection)
            .map_or(0, Vec::len)
    }

    /// Waits out injected latency, records the call, and pops any scripted
    /// failure for `op`.
    async fn admit(&self, op: CatalogOp) -> Result<(), StoreError> {
        let latency = {
            let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
            *script.calls.entry(op).or_insert(0) += 1;
            script.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let failure = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .failures
            .get_mut(&op)
            .and_then(VecDeque::pop_front);
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn not_found(collection: Collection) -> StoreError {
        match collection {
            Collection::Books => StoreError::BookNotFound,
            Collection::Orders => StoreError::OrderNotFound,
            Collection::Profiles => StoreError::ProfileNotFound,
            other => StoreError::Backend(format!("{}-not-found", other.as_str())),
        }
    }

    fn matches(document: &Value, keys: &[String], value: &str) -> bool {
        let needles: Vec<String> = value
            .split(',')
            .map(|needle| needle.trim().to_lowercase())
            .filter(|needle| !needle.is_empty())
            .collect();
        if needles.is_empty() {
            return true;
        }
        keys.iter().any(|key| {
            document.get(key).is_some_and(|field| {
                let haystack = match field {
                    Value::String(text) => text.to_lowercase(),
                    other => other.to_string().to_lowercase(),
                };
                needles.iter().any(|needle| haystack.contains(needle))
            })
        })
    }
}

impl CatalogGateway for InMemoryCatalog {
    async fn query<T>(&self, query: CollectionQuery) -> Result<Page<T>, StoreError>
    where
        T: DeserializeOwned + Send,
    {
        self.admit(CatalogOp::Query).await?;

        let collections = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let documents = collections
            .get(&query.collection)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let matched: Vec<&Value> = match &query.filter_value {
            Some(value) if !query.filter_keys.is_empty() => documents
                .iter()
                .filter(|(_, document)| Self::matches(document, &query.filter_keys, value))
                .map(|(_, document)| document)
                .collect(),
            _ => documents.iter().map(|(_, document)| document).collect(),
        };

        let offset: usize = match &query.page.cursor {
            Some(cursor) => cursor
                .as_str()
                .parse()
                .map_err(|_| StoreError::Backend(format!("invalid cursor: {cursor}")))?,
            None => 0,
        };

        let slice: Vec<&Value> = matched
            .iter()
            .skip(offset)
            .take(query.page.page_size)
            .copied()
            .collect();
        let consumed = offset + slice.len();
        let next_cursor = (consumed < matched.len()).then(|| Cursor::new(consumed.to_string()));

        let mut items = Vec::with_capacity(slice.len());
        for document in slice {
            let item = serde_json::from_value(document.clone()).map_err(|error| {
                StoreError::Decode {
                    collection: query.collection.as_str(),
                    detail: error.to_string(),
                }
            })?;
            items.push(item);
        }

        Ok(Page { items, next_cursor })
    }

    async fn get<T>(&self, collection: Collection, id: &str) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Send,
    {
        self.admit(CatalogOp::Get).await?;

        let document = self
            .document(collection, id)
            .ok_or_else(|| Self::not_found(collection))?;
        serde_json::from_value(document).map_err(|error| StoreError::Decode {
            collection: collection.as_str(),
            detail: error.to_string(),
        })
    }

    async fn create<T>(&self, collection: Collection, id: &str, document: &T) -> Result<(), StoreError>
    where
        T: Serialize + Sync,
    {
        self.admit(CatalogOp::Create).await?;

        let value = serde_json::to_value(document)
            .map_err(|error| StoreError::Backend(format!("document serialization failed: {error}")))?;
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let documents = collections.entry(collection).or_default();
        if let Some(slot) = documents.iter_mut().find(|(doc_id, _)| doc_id == id) {
            slot.1 = value;
        } else {
            documents.push((id.to_string(), value));
        }
        Ok(())
    }

    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: Value,
    ) -> Result<(), StoreError> {
        self.admit(CatalogOp::Update).await?;

        let Value::Object(patch) = fields else {
            return Err(StoreError::Backend(
                "update payload must be an object".to_string(),
            ));
        };
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let documents = collections.entry(collection).or_default();
        let Some((_, document)) = documents.iter_mut().find(|(doc_id, _)| doc_id == id) else {
            return Err(Self::not_found(collection));
        };
        let Value::Object(target) = document else {
            return Err(StoreError::Backend(format!(
                "document {id} in {collection} is not an object"
            )));
        };
        for (key, value) in patch {
            target.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        self.admit(CatalogOp::Delete).await?;

        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(documents) = collections.get_mut(&collection) {
            documents.retain(|(doc_id, _)| doc_id != id);
        }
        Ok(())
    }
}
