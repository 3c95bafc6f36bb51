//! The bundle of stores a running app shares.
//!
//! Screens receive one [`Services`] value and clone the stores they need;
//! every clone shares state with its siblings, so a favorite toggled on the
//! detail screen is already toggled when the favorites tab renders.

use bookstore_core::gateway::{CatalogGateway, ImageHost, ShippingDirectory};
use bookstore_core::model::UserId;

use crate::books::{books_store, BookStore, BooksStore};
use crate::cart::CartStore;
use crate::categories::{categories_store, CategoriesStore, CategoryBooksStore};
use crate::config::SyncConfig;
use crate::favorites::FavoritesStore;
use crate::history::ViewingHistoryStore;
use crate::images::BookImagesStore;
use crate::orders::{orders_store, OrderHistoryStore, OrderStore, OrdersStore};
use crate::profile::ProfileStore;
use crate::search::SearchStore;
use crate::shipping::ShippingLookupStore;

/// Every store the storefront runs on, built over one gateway, one image
/// host, and one shipping directory.
pub struct Services<G: CatalogGateway, H: ImageHost, D: ShippingDirectory> {
    /// Shared tuning knobs.
    pub config: SyncConfig,
    /// Whole-catalog list.
    pub books: BooksStore<G>,
    /// Debounced catalog search.
    pub search: SearchStore<G>,
    /// Category list.
    pub categories: CategoriesStore<G>,
    /// Books of the open category.
    pub category_books: CategoryBooksStore<G>,
    /// Staff-side order list.
    pub orders: OrdersStore<G>,
    /// The signed-in user's orders.
    pub order_history: OrderHistoryStore<G>,
    /// The signed-in user's favorites.
    pub favorites: FavoritesStore<G>,
    /// The signed-in user's viewing history.
    pub viewing_history: ViewingHistoryStore<G>,
    /// Gallery of the open book.
    pub book_images: BookImagesStore<G, H>,
    /// The signed-in user's profile.
    pub profile: ProfileStore<G>,
    /// Detail store for the open book.
    pub book: BookStore<G>,
    /// Detail store for the open order.
    pub order: OrderStore<G>,
    /// Checkout shipping picker.
    pub shipping: ShippingLookupStore<D>,
    /// Local cart.
    pub cart: CartStore,
}

impl<G, H, D> Services<G, H, D>
where
    G: CatalogGateway,
    H: ImageHost,
    D: ShippingDirectory,
{
    /// Builds the full store set.
    #[must_use]
    pub fn new(gateway: G, images: H, directory: D, config: SyncConfig) -> Self {
        Self {
            books: books_store(gateway.clone(), config.clone()),
            search: SearchStore::new(gateway.clone(), config.clone()),
            categories: categories_store(gateway.clone(), config.clone()),
            category_books: CategoryBooksStore::new(gateway.clone(), config.clone()),
            orders: orders_store(gateway.clone(), config.clone()),
            order_history: OrderHistoryStore::new(gateway.clone(), config.clone()),
            favorites: FavoritesStore::new(gateway.clone(), config.clone()),
            viewing_history: ViewingHistoryStore::new(gateway.clone(), config.clone()),
            book_images: BookImagesStore::new(gateway.clone(), images, config.clone()),
            profile: ProfileStore::new(gateway.clone()),
            book: BookStore::new(gateway.clone()),
            order: OrderStore::new(gateway),
            shipping: ShippingLookupStore::new(directory, config.clone()),
            cart: CartStore::new(),
            config,
        }
    }

    /// Repoints every user-scoped store at once.
    ///
    /// Sign-in and sign-out both land here; each repoint bumps that store's
    /// epoch, so whatever the previous user still had in flight settles into
    /// the void.
    pub async fn set_user(&self, user: Option<UserId>) {
        tracing::info!(signed_in = user.is_some(), "Session user changed");
        tokio::join!(
            self.favorites.set_user(user.clone()),
            self.viewing_history.set_user(user.clone()),
            self.order_history.set_user(user.clone()),
            self.profile.set_user(user),
        );
    }

    /// Clears every store back to its initial state.
    pub async fn reset_session(&self) {
        tracing::info!("Session reset");
        tokio::join!(
            self.books.reset(),
            self.search.reset(),
            self.categories.reset(),
            self.category_books.reset(),
            self.orders.reset(),
            self.order_history.reset(),
            self.favorites.reset(),
            self.viewing_history.reset(),
            self.book_images.reset(),
            self.profile.reset(),
            self.book.reset(),
            self.order.reset(),
            self.shipping.reset(),
            self.cart.clear(),
        );
    }
}

impl<G: CatalogGateway, H: ImageHost, D: ShippingDirectory> Clone for Services<G, H, D> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            books: self.books.clone(),
            search: self.search.clone(),
            categories: self.categories.clone(),
            category_books: self.category_books.clone(),
            orders: self.orders.clone(),
            order_history: self.order_history.clone(),
            favorites: self.favorites.clone(),
            viewing_history: self.viewing_history.clone(),
            book_images: self.book_images.clone(),
            profile: self.profile.clone(),
            book: self.book.clone(),
            order: self.order.clone(),
            shipping: self.shipping.clone(),
            cart: self.cart.clone(),
        }
    }
}
