//! # Bookstore Testing
//!
//! In-memory implementations of the bookstore gateway traits, plus fixture
//! builders for the domain documents.
//!
//! This crate provides:
//! - [`InMemoryCatalog`]: a document backend with scriptable failures,
//!   optional latency, and call counting
//! - [`InMemoryDirectory`]: a shipping directory seeded with cities and
//!   warehouses
//! - [`InMemoryImageHost`]: a blob host that records what was uploaded and
//!   deleted
//! - [`fixtures`]: deterministic sample documents pinned to a fixed clock
//!
//! Everything here is deterministic: latency is injected through tokio's
//! clock (pair it with `#[tokio::test(start_paused = true)]`), ids and
//! timestamps come from fixtures, and failure injection is explicit.
//!
//! ## Example
//!
//! ```
//! use bookstore_core::contract::{Collection, CollectionQuery, PageRequest};
//! use bookstore_core::gateway::CatalogGateway;
//! use bookstore_core::model::Book;
//! use bookstore_testing::{InMemoryCatalog, fixtures};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let catalog = InMemoryCatalog::new();
//! fixtures::seed_books(&catalog, 3);
//!
//! let page: bookstore_core::contract::Page<Book> = catalog
//!     .query(CollectionQuery::unfiltered(
//!         Collection::Books,
//!         PageRequest::first(10),
//!     ))
//!     .await
//!     .expect("seeded catalog");
//! assert_eq!(page.items.len(), 3);
//! # }
//! ```

pub mod catalog;
pub mod directory;
pub mod fixtures;
pub mod images;

pub use catalog::{CatalogOp, InMemoryCatalog};
pub use directory::{InMemoryDirectory, LookupOp};
pub use images::{ImageOp, InMemoryImageHost};
