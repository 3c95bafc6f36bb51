//! Order lists (staff-wide and per-user history) and the single-order store.

use bookstore_core::contract::{Collection, CollectionQuery, Page, PageRequest};
use bookstore_core::error::StoreError;
use bookstore_core::gateway::CatalogGateway;
use bookstore_core::model::{Order, OrderId, OrderStatus, UserId};
use bookstore_core::status::ListSnapshot;
use bookstore_core::view::{group_by_date, DateBuckets};

use crate::config::SyncConfig;
use crate::entity::{EntityCore, EntityOperation, EntityState};
use crate::list::{ListState, ListStore, PageSource, UserScope};

/// Staff-side status filter; empty means every order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Statuses to show. Matched as any-of.
    pub statuses: Vec<OrderStatus>,
}

/// Pages of orders, optionally narrowed by status.
#[derive(Clone)]
pub struct OrderPages<G> {
    gateway: G,
}

impl<G: CatalogGateway> OrderPages<G> {
    /// Creates the source.
    #[must_use]
    pub const fn new(gateway: G) -> Self {
        Self { gateway }
    }
}

impl<G: CatalogGateway> PageSource for OrderPages<G> {
    type Item = Order;
    type Filter = OrderFilter;

    async fn fetch(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, StoreError> {
        let query = if filter.statuses.is_empty() {
            CollectionQuery::unfiltered(Collection::Orders, page)
        } else {
            let statuses = filter
                .statuses
                .iter()
                .copied()
                .map(OrderStatus::as_str)
                .collect::<Vec<_>>()
                .join(",");
            CollectionQuery::filtered(Collection::Orders, &["status"], statuses, page)
        };
        self.gateway.query(query).await
    }
}

/// The staff dashboard's order list.
pub type OrdersStore<G> = ListStore<OrderPages<G>>;

/// Creates the staff order list store.
#[must_use]
pub fn orders_store<G: CatalogGateway>(gateway: G, config: SyncConfig) -> OrdersStore<G> {
    ListStore::new("orders", OrderPages::new(gateway), config)
}

impl<G: CatalogGateway> ListStore<OrderPages<G>> {
    /// Replaces the status filter; the reload fires after the debounce window.
    pub async fn set_status_filter(&self, statuses: Vec<OrderStatus>) {
        self.set_filter(OrderFilter { statuses }).await;
    }
}

/// Pages of the scoped user's own orders.
#[derive(Clone)]
pub struct OrderHistoryPages<G> {
    gateway: G,
}

impl<G: CatalogGateway> OrderHistoryPages<G> {
    /// Creates the source.
    #[must_use]
    pub const fn new(gateway: G) -> Self {
        Self { gateway }
    }
}

impl<G: CatalogGateway> PageSource for OrderHistoryPages<G> {
    type Item = Order;
    type Filter = UserScope;

    async fn fetch(
        &self,
        filter: &UserScope,
        page: PageRequest,
    ) -> Result<Page<Order>, StoreError> {
        let Some(user) = &filter.user else {
            return Ok(Page::empty());
        };
        self.gateway
            .query(CollectionQuery::filtered(
                Collection::Orders,
                &["userId"],
                user.as_str(),
                page,
            ))
            .await
    }

    fn is_ready(&self, filter: &UserScope) -> bool {
        filter.user.is_some()
    }
}

/// The signed-in user's order history, grouped by day for display.
pub struct OrderHistoryStore<G: CatalogGateway> {
    list: ListStore<OrderHistoryPages<G>>,
}

impl<G: CatalogGateway> OrderHistoryStore<G> {
    /// Creates an unscoped history store.
    #[must_use]
    pub fn new(gateway: G, config: SyncConfig) -> Self {
        Self {
            list: ListStore::new("order-history", OrderHistoryPages::new(gateway), config),
        }
    }

    /// Read current state via a closure.
    pub async fn state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ListState<Order, UserScope>) -> R,
    {
        self.list.state(f).await
    }

    /// Everything a history view renders.
    pub async fn snapshot(&self) -> ListSnapshot<Order> {
        self.list.snapshot().await
    }

    /// Repoints the history at a user, discarding the previous user's pages.
    pub async fn set_user(&self, user: Option<UserId>) {
        self.list.reset_with_filter(UserScope { user }).await;
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

    /// Loaded orders bucketed by calendar day, newest first.
    pub async fn grouped(&self) -> DateBuckets<Order> {
        let items = self.list.items().await;
        group_by_date(items, |order| order.created_at)
    }

    /// Clears scope and pages.
    pub async fn reset(&self) {
        self.list.reset().await;
    }
}

impl<G: CatalogGateway> Clone for OrderHistoryStore<G> {
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
        }
    }
}

/// Detail store for one order, with optimistic status transitions.
pub struct OrderStore<G: CatalogGateway> {
    gateway: G,
    core: EntityCore<OrderId, Order>,
}

impl<G: CatalogGateway> OrderStore<G> {
    /// Creates an unpointed order store.
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            core: EntityCore::new("order"),
        }
    }

    /// Read current state via a closure.
    pub async fn state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&EntityState<OrderId, Order>) -> R,
    {
        self.core.state(f).await
    }

    /// The order, once fetched or placed.
    pub async fn order(&self) -> Option<Order> {
        self.core.state(|s| s.entity.clone()).await
    }

    /// Points the store at an order, clearing whatever it held before.
    pub async fn set_order(&self, id: Option<OrderId>) {
        self.core.set_id(id).await;
    }

    /// Fetches the pointed-at order.
    pub async fn fetch(&self) {
        let Some((epoch, id)) = self.core.begin_for_id(EntityOperation::Fetch).await else {
            return;
        };
        match self
            .gateway
            .get::<Order>(Collection::Orders, id.as_str())
            .await
        {
            Ok(order) => {
                self.core
                    .settle(epoch, EntityOperation::Fetch, Ok(()), |state| {
                        state.entity = Some(order);
                    })
                    .await;
            }
            Err(error) => {
                self.core
                    .settle(epoch, EntityOperation::Fetch, Err(error), |_| {})
                    .await;
            }
        }
    }

    /// Submits a new order and points the store at it on success.
    pub async fn place(&self, order: Order) {
        let Some(epoch) = self.core.begin(EntityOperation::Create).await else {
            return;
        };
        match self
            .gateway
            .create(Collection::Orders, order.id.as_str(), &order)
            .await
        {
            Ok(()) => {
                self.core
                    .settle(epoch, EntityOperation::Create, Ok(()), |state| {
                        state.id = Some(order.id.clone());
                        state.entity = Some(order);
                    })
                    .await;
            }
            Err(error) => {
                self.core
                    .settle(epoch, EntityOperation::Create, Err(error), |_| {})
                    .await;
            }
        }
    }

    /// Moves the order to a new status, optimistically.
    ///
    /// The local copy flips first; a backend failure flips it back and
    /// surfaces the error in the `update_status` slot.
    pub async fn update_status(&self, status: OrderStatus) {
        let Some((epoch, id)) = self.core.begin_for_id(EntityOperation::UpdateStatus).await else {
            return;
        };
        let mut previous = None;
        self.core
            .apply(epoch, |state| {
                if let Some(order) = &mut state.entity {
                    previous = Some(order.status);
                    order.status = status;
                }
            })
            .await;
        let patch = serde_json::json!({ "status": status });
        match self
            .gateway
            .update_fields(Collection::Orders, id.as_str(), patch)
            .await
        {
            Ok(()) => {
                self.core
                    .settle(epoch, EntityOperation::UpdateStatus, Ok(()), |_| {})
                    .await;
            }
            Err(error) => {
                if let Some(status) = previous {
                    self.core
                        .apply(epoch, |state| {
                            if let Some(order) = &mut state.entity {
                                order.status = status;
                            }
                        })
                        .await;
                }
                self.core
                    .settle(epoch, EntityOperation::UpdateStatus, Err(error), |_| {})
                    .await;
            }
        }
    }

    /// Cancels the order.
    pub async fn cancel(&self) {
        self.update_status(OrderStatus::Cancelled).await;
    }

    /// Clears one settled operation banner.
    pub async fn reset_operation(&self, op: EntityOperation) {
        self.core.reset_operation(op).await;
    }

    /// Clears the store entirely.
    pub async fn reset(&self) {
        self.core.set_id(None).await;
    }
}

impl<G: CatalogGateway> Clone for OrderStore<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            core: self.core.clone(),
        }
    }
}
