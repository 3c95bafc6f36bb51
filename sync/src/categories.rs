//! Category list and the category-scoped book list.

use bookstore_core::contract::{Collection, CollectionQuery, Page, PageRequest};
use bookstore_core::error::StoreError;
use bookstore_core::gateway::CatalogGateway;
use bookstore_core::model::{Book, Category, CategoryId};
use bookstore_core::status::ListSnapshot;

use crate::config::SyncConfig;
use crate::list::{ListState, ListStore, PageSource};

/// Pages of all categories.
#[derive(Clone)]
pub struct CategoryPages<G> {
    gateway: G,
}

impl<G: CatalogGateway> CategoryPages<G> {
    /// Creates the source.
    #[must_use]
    pub const fn new(gateway: G) -> Self {
        Self { gateway }
    }
}

impl<G: CatalogGateway> PageSource for CategoryPages<G> {
    type Item = Category;
    type Filter = ();

    async fn fetch(&self, _filter: &(), page: PageRequest) -> Result<Page<Category>, StoreError> {
        self.gateway
            .query(CollectionQuery::unfiltered(Collection::Categories, page))
            .await
    }
}

/// The browse screen's category list.
pub type CategoriesStore<G> = ListStore<CategoryPages<G>>;

/// Creates the category list store.
#[must_use]
pub fn categories_store<G: CatalogGateway>(gateway: G, config: SyncConfig) -> CategoriesStore<G> {
    ListStore::new("categories", CategoryPages::new(gateway), config)
}

/// Which category's shelf is open, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryScope {
    /// The open category.
    pub category: Option<CategoryId>,
}

/// Pages of books belonging to the scoped category.
#[derive(Clone)]
pub struct CategoryBookPages<G> {
    gateway: G,
}

impl<G: CatalogGateway> CategoryBookPages<G> {
    /// Creates the source.
    #[must_use]
    pub const fn new(gateway: G) -> Self {
        Self { gateway }
    }
}

impl<G: CatalogGateway> PageSource for CategoryBookPages<G> {
    type Item = Book;
    type Filter = CategoryScope;

    async fn fetch(
        &self,
        filter: &CategoryScope,
        page: PageRequest,
    ) -> Result<Page<Book>, StoreError> {
        let Some(category) = &filter.category else {
            return Ok(Page::empty());
        };
        self.gateway
            .query(CollectionQuery::filtered(
                Collection::Books,
                &["categoryId"],
                category.as_str(),
                page,
            ))
            .await
    }

    fn is_ready(&self, filter: &CategoryScope) -> bool {
        filter.category.is_some()
    }
}

/// Books of one category, repointable as the user browses.
pub struct CategoryBooksStore<G: CatalogGateway> {
    list: ListStore<CategoryBookPages<G>>,
}

impl<G: CatalogGateway> CategoryBooksStore<G> {
    /// Creates an unscoped store.
    #[must_use]
    pub fn new(gateway: G, config: SyncConfig) -> Self {
        Self {
            list: ListStore::new("category-books", CategoryBookPages::new(gateway), config),
        }
    }

    /// Read current state via a closure.
    pub async fn state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ListState<Book, CategoryScope>) -> R,
    {
        self.list.state(f).await
    }

    /// Everything a shelf view renders.
    pub async fn snapshot(&self) -> ListSnapshot<Book> {
        self.list.snapshot().await
    }

    /// The open category.
    pub async fn category(&self) -> Option<CategoryId> {
        self.list.state(|s| s.filter.category.clone()).await
    }

    /// Repoints the shelf; the reload fires after the debounce window, so
    /// rapid taps across categories fetch once, for the last one.
    ///
    /// Clearing the scope resets immediately instead, a scopeless shelf has
    /// nothing to fetch.
    pub async fn set_category(&self, category: Option<CategoryId>) {
        match category {
            Some(category) => {
                self.list
                    .set_filter(CategoryScope {
                        category: Some(category),
                    })
                    .await;
            }
            None => self.list.reset().await,
        }
    }

    /// Loads the first page of the scoped category, bypassing the debounce.
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

    /// Clears scope and pages.
    pub async fn reset(&self) {
        self.list.reset().await;
    }
}

impl<G: CatalogGateway> Clone for CategoryBooksStore<G> {
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
        }
    }
}
