//! Local shopping cart. Nothing here talks to the backend; checkout turns
//! the cart into an [`Order`] for [`OrderStore::place`](crate::orders::OrderStore::place).

use std::collections::HashMap;
use std::sync::Arc;

use bookstore_core::model::{
    Book, BookId, Order, OrderId, OrderItem, OrderStatus, ShippingSelection, UserId,
};
use bookstore_core::pricing;
use chrono::Utc;
use tokio::sync::RwLock;

/// One cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    /// The book as it was when added.
    pub book: Book,
    /// How many copies.
    pub quantity: u32,
}

/// Cart contents.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    /// Lines in insertion order.
    pub items: Vec<CartItem>,
}

/// In-memory cart, shared across screens like every other store.
#[derive(Clone, Default)]
pub struct CartStore {
    state: Arc<RwLock<CartState>>,
}

impl CartStore {
    /// Creates an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read current state via a closure.
    pub async fn state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartState) -> R,
    {
        let state = self.state.read().await;
        f(&*state)
    }

    /// Current lines.
    pub async fn items(&self) -> Vec<CartItem> {
        self.state(|s| s.items.clone()).await
    }

    /// Total number of copies across all lines.
    pub async fn count(&self) -> u32 {
        self.state(|s| s.items.iter().map(|item| item.quantity).sum())
            .await
    }

    /// Per-book quantities, the lookup side of the catalog flag join.
    pub async fn quantities(&self) -> HashMap<BookId, u32> {
        self.state(|s| {
            s.items
                .iter()
                .map(|item| (item.book.id.clone(), item.quantity))
                .collect()
        })
        .await
    }

    /// Cart total at current selling prices.
    pub async fn total(&self) -> f64 {
        self.state(|s| {
            pricing::round2(
                s.items
                    .iter()
                    .map(|item| pricing::line_total(item.book.price, item.quantity))
                    .sum(),
            )
        })
        .await
    }

    /// Adds one copy, creating the line if needed.
    pub async fn add(&self, book: Book) {
        let mut state = self.state.write().await;
        if let Some(item) = state.items.iter_mut().find(|item| item.book.id == book.id) {
            item.quantity += 1;
            tracing::debug!(book = %book.id, quantity = item.quantity, "Cart quantity bumped");
        } else {
            tracing::debug!(book = %book.id, "Cart line added");
            state.items.push(CartItem { book, quantity: 1 });
        }
    }

    /// Drops the line for this book.
    pub async fn remove(&self, id: &BookId) {
        let mut state = self.state.write().await;
        state.items.retain(|item| item.book.id != *id);
    }

    /// Sets a line's quantity; zero drops the line.
    pub async fn set_quantity(&self, id: &BookId, quantity: u32) {
        if quantity == 0 {
            self.remove(id).await;
            return;
        }
        let mut state = self.state.write().await;
        if let Some(item) = state.items.iter_mut().find(|item| item.book.id == *id) {
            item.quantity = quantity;
        } else {
            tracing::debug!(book = %id, "Quantity change for a book not in the cart");
        }
    }

    /// Empties the cart.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.items.clear();
    }

    /// Builds the order a checkout submits, or `None` for an empty cart.
    ///
    /// Unit prices are frozen at their current selling value, so a discount
    /// that ends after checkout does not change what the customer pays.
    pub async fn to_order(
        &self,
        user: Option<&UserId>,
        customer_name: impl Into<String>,
        phone: impl Into<String>,
        shipping: Option<&ShippingSelection>,
    ) -> Option<Order> {
        let items = self
            .state(|s| {
                s.items
                    .iter()
                    .map(|item| OrderItem {
                        book_id: item.book.id.clone(),
                        title: item.book.title.clone(),
                        quantity: item.quantity,
                        unit_price: item.book.price,
                    })
                    .collect::<Vec<_>>()
            })
            .await;
        if items.is_empty() {
            return None;
        }
        let total = pricing::order_total(&items);
        Some(Order {
            id: OrderId::generate(),
            user_id: user.cloned(),
            items,
            status: OrderStatus::Pending,
            total,
            customer_name: customer_name.into(),
            phone: phone.into(),
            shipping_city: shipping.map(|s| s.city.name.clone()),
            shipping_warehouse: shipping.map(|s| s.warehouse.name.clone()),
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_testing::fixtures;

    #[tokio::test]
    async fn add_merges_lines_and_counts_copies() {
        let cart = CartStore::new();
        let book = fixtures::book(1);

        cart.add(book.clone()).await;
        cart.add(book.clone()).await;
        cart.add(fixtures::book(2)).await;

        assert_eq!(cart.items().await.len(), 2);
        assert_eq!(cart.count().await, 3);
    }

    #[tokio::test]
    async fn total_uses_selling_prices() {
        let cart = CartStore::new();
        // 20.0 marked down 20% to 16.0, twice, plus 11.0 once.
        let discounted = fixtures::discounted_book(10);
        cart.add(discounted.clone()).await;
        cart.set_quantity(&discounted.id, 2).await;
        cart.add(fixtures::book(1)).await;

        let expected = pricing::round2(discounted.price * 2.0 + 11.0);
        assert!((cart.total().await - expected).abs() < f64::EPSILON);
        assert!(discounted.is_discounted());
    }

    #[tokio::test]
    async fn quantities_map_by_book_id() {
        let cart = CartStore::new();
        cart.add(fixtures::book(1)).await;
        cart.add(fixtures::book(1)).await;
        cart.add(fixtures::book(4)).await;

        let quantities = cart.quantities().await;
        assert_eq!(quantities.len(), 2);
        assert_eq!(quantities.get(&fixtures::book(1).id), Some(&2));
        assert_eq!(quantities.get(&fixtures::book(4).id), Some(&1));
        assert_eq!(quantities.get(&fixtures::book(9).id), None);
    }

    #[tokio::test]
    async fn zero_quantity_drops_the_line() {
        let cart = CartStore::new();
        let book = fixtures::book(1);
        cart.add(book.clone()).await;

        cart.set_quantity(&book.id, 0).await;

        assert!(cart.items().await.is_empty());
    }

    #[tokio::test]
    async fn to_order_freezes_discounted_unit_prices() {
        let cart = CartStore::new();
        let book = fixtures::discounted_book(5);
        cart.add(book.clone()).await;

        let user = fixtures::user();
        let order = cart
            .to_order(Some(&user), "Reader", "+380501112233", None)
            .await
            .unwrap_or_else(|| unreachable!("cart is not empty"));

        assert_eq!(order.items.len(), 1);
        assert!((order.items[0].unit_price - book.price).abs() < f64::EPSILON);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.user_id.as_ref(), Some(&user));
        assert!((order.total - cart.total().await).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn empty_cart_builds_no_order() {
        let cart = CartStore::new();
        assert!(cart.to_order(None, "Reader", "000", None).await.is_none());
    }
}
