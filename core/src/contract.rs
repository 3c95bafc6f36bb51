//! Backend-agnostic contracts for paged collection access.
//!
//! Stores describe what they want with a [`CollectionQuery`] and get back a
//! [`Page`]; how those travel to a concrete backend is the gateway's problem.
//! Cursors are opaque end to end: the backend mints them, the store hands the
//! newest one back on the next request, and nothing in between inspects them.

use serde::{Deserialize, Serialize};

/// Named collections the catalog gateway can page through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Collection {
    /// The book catalog.
    Books,
    /// Catalog categories.
    Categories,
    /// Orders placed by any user.
    Orders,
    /// Per-user favorite records.
    Favorites,
    /// Per-user viewing-history records.
    ViewingHistory,
    /// Image records attached to books.
    BookImages,
    /// User profiles.
    Profiles,
}

impl Collection {
    /// Wire name of the collection.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Books => "books",
            Self::Categories => "categories",
            Self::Orders => "orders",
            Self::Favorites => "favorites",
            Self::ViewingHistory => "viewing-history",
            Self::BookImages => "book-images",
            Self::Profiles => "profiles",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque pagination cursor minted by the backend.
///
/// Stores never construct cursor content themselves; they only carry the most
/// recent one forward. Two cursors compare equal exactly when their backend
/// representation is identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wraps a backend-issued cursor token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Backend representation of the cursor.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which page of a collection to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Maximum number of items the backend should return.
    pub page_size: usize,
    /// Resume point from the previous page, or `None` for the first page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
}

impl PageRequest {
    /// Requests the first page of a collection.
    #[must_use]
    pub const fn first(page_size: usize) -> Self {
        Self {
            page_size,
            cursor: None,
        }
    }

    /// Requests the page after `cursor`.
    #[must_use]
    pub const fn after(page_size: usize, cursor: Cursor) -> Self {
        Self {
            page_size,
            cursor: Some(cursor),
        }
    }
}

/// A filtered, paged read against one collection.
///
/// `filter_keys` name the document fields the backend should match
/// `filter_value` against; an empty key set (or `None` value) means the whole
/// collection in its natural order. How matching works is backend-defined;
/// the catalog backend treats the value as a comma-separated set of needles
/// and matches a document when any keyed field contains any needle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionQuery {
    /// Collection to read.
    pub collection: Collection,
    /// Document fields to match against.
    pub filter_keys: Vec<String>,
    /// Value to match, or `None` for an unfiltered read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_value: Option<String>,
    /// Page to fetch.
    #[serde(flatten)]
    pub page: PageRequest,
}

impl CollectionQuery {
    /// Reads a collection without filtering.
    #[must_use]
    pub const fn unfiltered(collection: Collection, page: PageRequest) -> Self {
        Self {
            collection,
            filter_keys: Vec::new(),
            filter_value: None,
            page,
        }
    }

    /// Reads a collection filtered on `keys` matching `value`.
    #[must_use]
    pub fn filtered(
        collection: Collection,
        keys: &[&str],
        value: impl Into<String>,
        page: PageRequest,
    ) -> Self {
        Self {
            collection,
            filter_keys: keys.iter().map(ToString::to_string).collect(),
            filter_value: Some(value.into()),
            page,
        }
    }
}

/// One page of results plus the resume point for the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items in backend order.
    pub items: Vec<T>,
    /// Cursor for the page after this one, if the backend issued one.
    pub next_cursor: Option<Cursor>,
}

impl<T> Page<T> {
    /// A page with no items and no continuation.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    /// Whether the backend filled the page to the requested size.
    #[must_use]
    pub fn is_full(&self, page_size: usize) -> bool {
        self.items.len() >= page_size
    }

    /// Whether another page is worth requesting.
    ///
    /// A short page means the collection is exhausted; a full page without a
    /// continuation cursor means the backend cannot resume, so it counts as
    /// exhausted too.
    #[must_use]
    pub fn has_more(&self, page_size: usize) -> bool {
        self.is_full(page_size) && self.next_cursor.is_some()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Payload handed to an image host for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name, used to derive the storage path.
    pub file_name: String,
    /// MIME type of `bytes`.
    pub content_type: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

/// Where an uploaded image ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    /// Public URL for display.
    pub url: String,
    /// Host-internal path, kept so the blob can be deleted later.
    pub storage_path: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn collection_wire_names() {
        assert_eq!(Collection::Books.as_str(), "books");
        assert_eq!(Collection::ViewingHistory.as_str(), "viewing-history");
        assert_eq!(Collection::BookImages.as_str(), "book-images");
        let encoded = serde_json::to_value(Collection::ViewingHistory).expect("serialize");
        assert_eq!(encoded, json!("viewing-history"));
    }

    #[test]
    fn filtered_query_serializes_flat() {
        let query = CollectionQuery::filtered(
            Collection::Books,
            &["title", "author"],
            "tolkien",
            PageRequest::after(10, Cursor::new("20")),
        );
        let encoded = serde_json::to_value(&query).expect("serialize");
        assert_eq!(
            encoded,
            json!({
                "collection": "books",
                "filterKeys": ["title", "author"],
                "filterValue": "tolkien",
                "pageSize": 10,
                "cursor": "20",
            })
        );
    }

    #[test]
    fn unfiltered_query_omits_absent_fields() {
        let query = CollectionQuery::unfiltered(Collection::Categories, PageRequest::first(25));
        let encoded = serde_json::to_value(&query).expect("serialize");
        assert_eq!(
            encoded,
            json!({
                "collection": "categories",
                "filterKeys": [],
                "pageSize": 25,
            })
        );
    }

    #[test]
    fn has_more_requires_full_page_and_cursor() {
        let full_with_cursor = Page {
            items: vec![1, 2, 3],
            next_cursor: Some(Cursor::new("3")),
        };
        assert!(full_with_cursor.has_more(3));

        let full_without_cursor = Page {
            items: vec![1, 2, 3],
            next_cursor: None,
        };
        assert!(!full_without_cursor.has_more(3));

        let short_with_cursor = Page {
            items: vec![1],
            next_cursor: Some(Cursor::new("1")),
        };
        assert!(!short_with_cursor.has_more(3));

        assert!(!Page::<i32>::empty().has_more(3));
    }

    #[test]
    fn page_round_trips() {
        let page = Page {
            items: vec!["a".to_string(), "b".to_string()],
            next_cursor: Some(Cursor::new("2")),
        };
        let encoded = serde_json::to_string(&page).expect("serialize");
        let decoded: Page<String> = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(decoded, page);
    }
}
