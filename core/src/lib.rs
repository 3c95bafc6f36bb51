//! # Bookstore Core
//!
//! Contracts, domain model, and pure helpers for the bookstore storefront's
//! client-side data layer.
//!
//! This crate holds everything the synchronization stores depend on that does
//! not itself perform I/O:
//!
//! - **Contracts**: typed request/response shapes for the remote collaborators
//!   (collection queries, paging cursors, shipping-lookup envelopes)
//! - **Gateways**: the traits behind which the remote document database, the
//!   image host, and the shipping directory live
//! - **Model**: the storefront's entities (books, categories, orders, profiles)
//!   and the typed field patches used for partial updates
//! - **Status**: the per-store lifecycle enums and the tagged operation
//!   response views branch on
//! - **Errors**: the structured [`error::StoreError`] every remote failure is
//!   converted into at the gateway boundary
//! - **Derived state**: pure projections (favorite/cart flag joins, date
//!   grouping, price/discount reconciliation) consumed by stores and views
//!
//! ## Architecture Principles
//!
//! - Views never construct remote requests; they call named store operations
//!   and read state exclusively through selectors
//! - Every remote failure is caught at the store boundary and surfaced as a
//!   response value, never re-thrown to the view layer
//! - External services are injected through the gateway traits, so the whole
//!   data layer runs against in-memory collaborators in tests
//!
//! ## Example
//!
//! ```
//! use bookstore_core::contract::{Collection, CollectionQuery, PageRequest};
//!
//! let query = CollectionQuery::filtered(
//!     Collection::Books,
//!     &["title", "author"],
//!     "tolkien",
//!     PageRequest::first(10),
//! );
//! assert_eq!(query.collection.as_str(), "books");
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};

pub mod contract;
pub mod error;
pub mod gateway;
pub mod model;
pub mod pricing;
pub mod status;
pub mod view;

pub use contract::{Collection, CollectionQuery, Cursor, Page, PageRequest};
pub use error::StoreError;
pub use status::{EntityStatus, ListSnapshot, ListStatus, OperationResponse};
