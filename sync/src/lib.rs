//! # Bookstore Sync
//!
//! Client-side data layer for the storefront: every screen renders from a
//! store in this crate, and every backend interaction goes through one.
//!
//! Two engines carry the weight. [`ListStore`] drives paged, filterable
//! lists (catalog, search, per-user collections) with cursor pagination,
//! debounced filter changes, and a single-request-in-flight rule. The entity
//! stores ([`books::BookStore`], [`orders::OrderStore`],
//! [`profile::ProfileStore`]) track one document with per-operation status
//! slots and optimistic mutations that roll back on failure.
//!
//! Both engines fence settlement with an epoch: reset-class operations
//! (reset, repointing at another user/book/order) bump it, and any response
//! staged before the bump is discarded instead of resurrecting cleared data.
//!
//! [`Services`] bundles the full store set over a
//! [`CatalogGateway`](bookstore_core::gateway::CatalogGateway), an
//! [`ImageHost`](bookstore_core::gateway::ImageHost), and a
//! [`ShippingDirectory`](bookstore_core::gateway::ShippingDirectory).
//!
//! ```
//! use bookstore_sync::{Services, SyncConfig};
//! use bookstore_testing::{fixtures, InMemoryCatalog, InMemoryDirectory, InMemoryImageHost};
//!
//! # tokio_test::block_on(async {
//! let catalog = InMemoryCatalog::default();
//! fixtures::seed_books(&catalog, 12);
//!
//! let services = Services::new(
//!     catalog,
//!     InMemoryImageHost::default(),
//!     InMemoryDirectory::default(),
//!     SyncConfig::default(),
//! );
//!
//! services.books.load().await;
//! assert_eq!(services.books.items().await.len(), 10);
//! assert!(services.books.has_more().await);
//! # });
//! ```

pub mod books;
pub mod cart;
pub mod categories;
pub mod config;
pub mod debounce;
pub mod entity;
pub mod favorites;
pub mod history;
pub mod images;
pub mod list;
pub mod orders;
pub mod profile;
pub mod search;
pub mod services;
pub mod shipping;

pub use config::SyncConfig;
pub use entity::{EntityOperation, EntityState, OperationSlot, OperationSlots};
pub use list::{ListState, ListStore, PageSource, UserScope};
pub use services::Services;
