//! Deterministic sample documents.
//!
//! Every fixture derives its ids and timestamps from its index and the fixed
//! clock, so tests can predict exactly what a seeded backend returns.

use chrono::{DateTime, Duration, Utc};

use bookstore_core::contract::{Collection, ImageUpload, StoredImage};
use bookstore_core::model::{
    Book, BookId, BookImage, Category, CategoryId, City, FavoriteRecord, ImageId, Order, OrderId,
    OrderItem, OrderStatus, Profile, RecordId, UserId, ViewRecord, Warehouse,
};
use bookstore_core::pricing;

use crate::catalog::InMemoryCatalog;

/// Fixed test time (2025-01-01 00:00:00 UTC).
///
/// # Panics
///
/// This function will panic if the hardcoded timestamp fails to parse,
/// which should never happen in practice.
#[must_use]
#[allow(clippy::expect_used)]
pub fn fixed_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
        .expect("hardcoded timestamp should always parse")
        .with_timezone(&Utc)
}

/// The default test user.
#[must_use]
pub fn user() -> UserId {
    UserId::new("user-1")
}

/// Book `n`, alternating between categories `cat-1` and `cat-2`.
///
/// Creation times step backwards one minute per index, so insertion order is
/// also newest-first order.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
pub fn book(n: usize) -> Book {
    Book {
        id: BookId::new(format!("book-{n}")),
        title: format!("Book {n:02}"),
        author: format!("Author {n:02}"),
        description: Some(format!("Description of book {n}")),
        price: 10.0 + n as f64,
        original_price: 10.0 + n as f64,
        discount_percent: None,
        category_id: Some(CategoryId::new(if n % 2 == 0 { "cat-1" } else { "cat-2" })),
        cover_url: None,
        available: true,
        created_at: fixed_time() - Duration::minutes(n as i64),
    }
}

/// Book `n` with a 20% discount off its original price.
#[must_use]
pub fn discounted_book(n: usize) -> Book {
    let base = book(n);
    Book {
        price: pricing::price_from(base.original_price, 20.0),
        discount_percent: Some(20.0),
        ..base
    }
}

/// A book with explicit search fields and no category.
#[must_use]
pub fn book_with(id: &str, title: &str, author: &str) -> Book {
    Book {
        id: BookId::new(id),
        title: title.to_string(),
        author: author.to_string(),
        description: None,
        price: 25.0,
        original_price: 25.0,
        discount_percent: None,
        category_id: None,
        cover_url: None,
        available: true,
        created_at: fixed_time(),
    }
}

/// Category `n`.
#[must_use]
pub fn category(n: usize) -> Category {
    Category {
        id: CategoryId::new(format!("cat-{n}")),
        name: format!("Category {n}"),
        image_url: None,
    }
}

/// Order `n` with a single line for book `n`.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
pub fn order(n: usize, user: Option<&UserId>) -> Order {
    let items = vec![OrderItem {
        book_id: BookId::new(format!("book-{n}")),
        title: format!("Book {n:02}"),
        quantity: 1,
        unit_price: 10.0 + n as f64,
    }];
    Order {
        id: OrderId::new(format!("order-{n}")),
        user_id: user.cloned(),
        total: pricing::order_total(&items),
        items,
        status: OrderStatus::Pending,
        customer_name: "Olena Bondarenko".to_string(),
        phone: "+380501234567".to_string(),
        shipping_city: None,
        shipping_warehouse: None,
        created_at: fixed_time() - Duration::minutes(n as i64),
    }
}

/// Profile document for `user`.
#[must_use]
pub fn profile(user: &UserId) -> Profile {
    Profile {
        id: user.clone(),
        name: "Olena Bondarenko".to_string(),
        email: "olena@example.com".to_string(),
        phone: Some("+380501234567".to_string()),
        city: Some("Kyiv".to_string()),
    }
}

/// Favorite record `n` owned by `user`.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn favorite(n: usize, user: &UserId, book: Book) -> FavoriteRecord {
    FavoriteRecord {
        id: RecordId::new(format!("fav-{n}")),
        user_id: user.clone(),
        book,
        created_at: fixed_time() - Duration::minutes(n as i64),
    }
}

/// Viewing-history record `n` owned by `user`.
#[must_use]
pub fn view_record(n: usize, user: &UserId, book: Book, viewed_at: DateTime<Utc>) -> ViewRecord {
    ViewRecord {
        id: RecordId::new(format!("view-{n}")),
        user_id: user.clone(),
        book,
        viewed_at,
    }
}

/// Image record `n` attached to `book_id`.
#[must_use]
pub fn book_image(n: usize, book_id: &BookId) -> BookImage {
    BookImage {
        id: ImageId::new(format!("img-{n}")),
        book_id: book_id.clone(),
        image: StoredImage {
            url: format!("https://images.test/uploads/{n}.jpg"),
            storage_path: format!("uploads/{n}.jpg"),
        },
        created_at: fixed_time(),
    }
}

/// A small JPEG upload payload.
#[must_use]
pub fn image_upload(file_name: &str) -> ImageUpload {
    ImageUpload {
        file_name: file_name.to_string(),
        content_type: "image/jpeg".to_string(),
        bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
    }
}

/// City named `name`, with a reference derived from the name.
#[must_use]
pub fn city(name: &str) -> City {
    City {
        reference: format!("city-{}", name.to_lowercase()),
        name: name.to_string(),
        region: Some(format!("{name} Oblast")),
    }
}

/// Warehouse `n`.
#[must_use]
pub fn warehouse(n: usize) -> Warehouse {
    Warehouse {
        reference: format!("wh-{n}"),
        name: format!("Warehouse #{n}"),
    }
}

/// Seeds `count` books (`book-0` .. `book-{count-1}`) into the catalog.
pub fn seed_books(catalog: &InMemoryCatalog, count: usize) {
    for n in 0..count {
        let book = book(n);
        catalog.insert(Collection::Books, book.id.as_str(), &book);
    }
}

/// Seeds categories `cat-1` .. `cat-{count}` into the catalog.
pub fn seed_categories(catalog: &InMemoryCatalog, count: usize) {
    for n in 1..=count {
        let category = category(n);
        catalog.insert(Collection::Categories, category.id.as_str(), &category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_are_deterministic() {
        assert_eq!(book(3), book(3));
        assert_eq!(fixed_time(), fixed_time());
        assert_eq!(city("Kyiv").reference, "city-kyiv");
    }

    #[test]
    fn seeded_books_count() {
        let catalog = InMemoryCatalog::new();
        seed_books(&catalog, 7);
        assert_eq!(catalog.count(Collection::Books), 7);
    }
}
