//! Domain documents stored in the catalog backend.
//!
//! These are wire shapes: serde attributes pin the camelCase field names the
//! backend already holds, so changing a field here is a data migration, not a
//! refactor. Identifier newtypes keep the id spaces apart at compile time;
//! they all wrap the backend's string ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::contract::StoredImage;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing backend id.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Mints a fresh id for a document created on this device.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Backend representation of the id.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id! {
    /// Identifier of a book document.
    BookId
}

string_id! {
    /// Identifier of a category document.
    CategoryId
}

string_id! {
    /// Identifier of an order document.
    OrderId
}

string_id! {
    /// Identifier of a user, also the id of their profile document.
    UserId
}

string_id! {
    /// Identifier of an image attached to a book.
    ImageId
}

string_id! {
    /// Identifier of a per-user record (favorite, viewing-history entry).
    RecordId
}

const fn default_available() -> bool {
    true
}

/// A book in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Document id.
    pub id: BookId,
    /// Title shown in lists and detail views.
    pub title: String,
    /// Author name, searchable alongside the title.
    pub author: String,
    /// Long-form description for the detail view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Price the customer pays.
    pub price: f64,
    /// Strike-through price before the discount. Equal to `price` when the
    /// book is not on sale.
    pub original_price: f64,
    /// Discount in percent of the original price, when the book is on sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<f64>,
    /// Category the book belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    /// Cover image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    /// Whether the book can currently be ordered.
    #[serde(default = "default_available")]
    pub available: bool,
    /// When the book entered the catalog.
    pub created_at: DateTime<Utc>,
}

/// One editable field of a [`Book`], carrying its new value.
///
/// The wire name, the patch value, and the local merge live together so the
/// optimistic update and the backend write cannot disagree about what was
/// edited.
#[derive(Debug, Clone, PartialEq)]
pub enum BookField {
    /// New title.
    Title(String),
    /// New author.
    Author(String),
    /// New description, or `None` to clear it.
    Description(Option<String>),
    /// New selling price.
    Price(f64),
    /// New strike-through price.
    OriginalPrice(f64),
    /// New discount percentage, or `None` when the sale ends.
    DiscountPercent(Option<f64>),
    /// New category, or `None` to file the book under no category.
    Category(Option<CategoryId>),
    /// New cover URL, or `None` to clear it.
    CoverUrl(Option<String>),
    /// New availability flag.
    Available(bool),
}

impl BookField {
    /// Backend field name this edit targets.
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::Title(_) => "title",
            Self::Author(_) => "author",
            Self::Description(_) => "description",
            Self::Price(_) => "price",
            Self::OriginalPrice(_) => "originalPrice",
            Self::DiscountPercent(_) => "discountPercent",
            Self::Category(_) => "categoryId",
            Self::CoverUrl(_) => "coverUrl",
            Self::Available(_) => "available",
        }
    }

    /// Wire value of the edit. Cleared optional fields become `null`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Title(value) | Self::Author(value) => Value::String(value.clone()),
            Self::Description(value) | Self::CoverUrl(value) => {
                value.clone().map_or(Value::Null, Value::String)
            }
            Self::Price(value) | Self::OriginalPrice(value) => Value::from(*value),
            Self::DiscountPercent(value) => value.map_or(Value::Null, Value::from),
            Self::Category(value) => value
                .as_ref()
                .map_or(Value::Null, |id| Value::String(id.as_str().to_string())),
            Self::Available(value) => Value::Bool(*value),
        }
    }

    /// Merges the edit into a local copy of the book.
    pub fn apply(&self, book: &mut Book) {
        match self {
            Self::Title(value) => book.title = value.clone(),
            Self::Author(value) => book.author = value.clone(),
            Self::Description(value) => book.description = value.clone(),
            Self::Price(value) => book.price = *value,
            Self::OriginalPrice(value) => book.original_price = *value,
            Self::DiscountPercent(value) => book.discount_percent = *value,
            Self::Category(value) => book.category_id = value.clone(),
            Self::CoverUrl(value) => book.cover_url = value.clone(),
            Self::Available(value) => book.available = *value,
        }
    }

    /// Collapses `fields` into one backend patch object.
    ///
    /// When two edits target the same field the later one wins, matching
    /// what applying them in order does locally.
    #[must_use]
    pub fn patch(fields: &[Self]) -> Value {
        let mut object = serde_json::Map::new();
        for field in fields {
            object.insert(field.field_name().to_string(), field.to_value());
        }
        Value::Object(object)
    }
}

/// A catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Document id.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Banner image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Lifecycle of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    /// Placed, not yet picked up by staff.
    Pending,
    /// Being assembled.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Cancelled before delivery.
    Cancelled,
}

impl OrderStatus {
    /// Wire name of the status, also the value order filters match on.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Book being ordered.
    pub book_id: BookId,
    /// Title snapshot at order time.
    pub title: String,
    /// Number of copies.
    pub quantity: u32,
    /// Price per copy at order time, after discount.
    pub unit_price: f64,
}

/// An order document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Document id.
    pub id: OrderId,
    /// Owning user, absent for guest checkouts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Ordered lines.
    pub items: Vec<OrderItem>,
    /// Current lifecycle state.
    pub status: OrderStatus,
    /// Total charged, including discounts.
    pub total: f64,
    /// Recipient name.
    pub customer_name: String,
    /// Recipient phone.
    pub phone: String,
    /// Delivery city name, when shipping was chosen at checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_city: Option<String>,
    /// Delivery warehouse name, when shipping was chosen at checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_warehouse: Option<String>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// A user profile document. The document id is the user's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Document id, equal to the owning user's id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Default delivery city.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// One editable field of a [`Profile`], carrying its new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileField {
    /// New display name.
    Name(String),
    /// New contact email.
    Email(String),
    /// New contact phone, or `None` to clear it.
    Phone(Option<String>),
    /// New default delivery city, or `None` to clear it.
    City(Option<String>),
}

impl ProfileField {
    /// Backend field name this edit targets.
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Email(_) => "email",
            Self::Phone(_) => "phone",
            Self::City(_) => "city",
        }
    }

    /// Wire value of the edit. Cleared optional fields become `null`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Name(value) | Self::Email(value) => Value::String(value.clone()),
            Self::Phone(value) | Self::City(value) => {
                value.clone().map_or(Value::Null, Value::String)
            }
        }
    }

    /// Merges the edit into a local copy of the profile.
    pub fn apply(&self, profile: &mut Profile) {
        match self {
            Self::Name(value) => profile.name = value.clone(),
            Self::Email(value) => profile.email = value.clone(),
            Self::Phone(value) => profile.phone = value.clone(),
            Self::City(value) => profile.city = value.clone(),
        }
    }

    /// Collapses `fields` into one backend patch object.
    #[must_use]
    pub fn patch(fields: &[Self]) -> Value {
        let mut object = serde_json::Map::new();
        for field in fields {
            object.insert(field.field_name().to_string(), field.to_value());
        }
        Value::Object(object)
    }
}

/// A user's favorite, with the book snapshot embedded for list display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    /// Document id.
    pub id: RecordId,
    /// Owning user.
    pub user_id: UserId,
    /// Favorited book at the time it was added.
    pub book: Book,
    /// When the favorite was added.
    pub created_at: DateTime<Utc>,
}

/// One entry of a user's viewing history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRecord {
    /// Document id.
    pub id: RecordId,
    /// Owning user.
    pub user_id: UserId,
    /// Viewed book at the time of the visit.
    pub book: Book,
    /// When the book was opened.
    pub viewed_at: DateTime<Utc>,
}

/// An image attached to a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookImage {
    /// Document id.
    pub id: ImageId,
    /// Book the image belongs to.
    pub book_id: BookId,
    /// Uploaded blob location.
    #[serde(flatten)]
    pub image: StoredImage,
    /// When the image was attached.
    pub created_at: DateTime<Utc>,
}

/// A city known to the shipping directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    /// Directory reference, the key warehouse lookups scope on.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Display name.
    pub name: String,
    /// Administrative region, when the directory provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// A carrier warehouse within a city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    /// Directory reference.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Display name, usually the street address.
    pub name: String,
}

/// A completed shipping choice: a city and a warehouse within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingSelection {
    /// Chosen city.
    pub city: City,
    /// Chosen warehouse.
    pub warehouse: Warehouse,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use serde_json::json;

    fn hobbit() -> Book {
        Book {
            id: BookId::new("b1"),
            title: "The Hobbit".to_string(),
            author: "J.R.R. Tolkien".to_string(),
            description: None,
            price: 20.0,
            original_price: 25.0,
            discount_percent: Some(20.0),
            category_id: Some(CategoryId::new("c1")),
            cover_url: None,
            available: true,
            created_at: "2024-03-01T10:00:00Z".parse().expect("timestamp"),
        }
    }

    #[test]
    fn book_uses_camel_case_field_names() {
        let encoded = serde_json::to_value(hobbit()).expect("serialize");
        assert_eq!(
            encoded,
            json!({
                "id": "b1",
                "title": "The Hobbit",
                "author": "J.R.R. Tolkien",
                "price": 20.0,
                "originalPrice": 25.0,
                "discountPercent": 20.0,
                "categoryId": "c1",
                "available": true,
                "createdAt": "2024-03-01T10:00:00Z",
            })
        );
    }

    #[test]
    fn books_without_an_availability_field_decode_as_available() {
        let book: Book = serde_json::from_value(json!({
            "id": "b1",
            "title": "The Hobbit",
            "author": "J.R.R. Tolkien",
            "price": 25.0,
            "originalPrice": 25.0,
            "createdAt": "2024-03-01T10:00:00Z",
        }))
        .expect("deserialize");
        assert!(book.available);
        assert_eq!(book.discount_percent, None);
    }

    #[test]
    fn book_field_edits_patch_and_apply_consistently() {
        let fields = vec![
            BookField::Title("The Hobbit, Revised".to_string()),
            BookField::Price(22.5),
            BookField::Category(None),
            BookField::Available(false),
        ];
        assert_eq!(
            BookField::patch(&fields),
            json!({
                "title": "The Hobbit, Revised",
                "price": 22.5,
                "categoryId": null,
                "available": false,
            })
        );

        let mut book = hobbit();
        for field in &fields {
            field.apply(&mut book);
        }
        assert_eq!(book.title, "The Hobbit, Revised");
        assert!((book.price - 22.5).abs() < 1e-9);
        assert_eq!(book.category_id, None);
        assert!(!book.available);
        assert_eq!(book.author, "J.R.R. Tolkien");
    }

    #[test]
    fn later_edits_to_the_same_field_win() {
        let fields = vec![
            BookField::Price(30.0),
            BookField::Price(27.0),
        ];
        assert_eq!(BookField::patch(&fields), json!({ "price": 27.0 }));
    }

    #[test]
    fn profile_field_edits_patch_and_apply_consistently() {
        let fields = vec![
            ProfileField::Name("Olena B.".to_string()),
            ProfileField::Phone(None),
        ];
        assert_eq!(
            ProfileField::patch(&fields),
            json!({ "name": "Olena B.", "phone": null })
        );

        let mut profile = Profile {
            id: UserId::new("u1"),
            name: "Olena".to_string(),
            email: "olena@example.com".to_string(),
            phone: Some("+380501234567".to_string()),
            city: Some("Kyiv".to_string()),
        };
        for field in &fields {
            field.apply(&mut profile);
        }
        assert_eq!(profile.name, "Olena B.");
        assert_eq!(profile.phone, None);
        assert_eq!(profile.city.as_deref(), Some("Kyiv"));
    }

    #[test]
    fn city_serializes_reference_as_ref() {
        let city = City {
            reference: "city-1".to_string(),
            name: "Kyiv".to_string(),
            region: None,
        };
        let encoded = serde_json::to_value(&city).expect("serialize");
        assert_eq!(encoded, json!({ "ref": "city-1", "name": "Kyiv" }));
    }

    #[test]
    fn book_image_flattens_stored_image() {
        let image = BookImage {
            id: ImageId::new("r1"),
            book_id: BookId::new("b1"),
            image: StoredImage {
                url: "https://img.example/1.jpg".to_string(),
                storage_path: "books/b1/1.jpg".to_string(),
            },
            created_at: "2024-03-01T10:00:00Z".parse().expect("timestamp"),
        };
        let encoded = serde_json::to_value(&image).expect("serialize");
        assert_eq!(
            encoded,
            json!({
                "id": "r1",
                "bookId": "b1",
                "url": "https://img.example/1.jpg",
                "storagePath": "books/b1/1.jpg",
                "createdAt": "2024-03-01T10:00:00Z",
            })
        );
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(BookId::generate(), BookId::generate());
    }

    #[test]
    fn order_round_trips() {
        let order = Order {
            id: OrderId::new("o1"),
            user_id: Some(UserId::new("u1")),
            items: vec![OrderItem {
                book_id: BookId::new("b1"),
                title: "The Hobbit".to_string(),
                quantity: 2,
                unit_price: 20.0,
            }],
            status: OrderStatus::Pending,
            total: 40.0,
            customer_name: "Olena".to_string(),
            phone: "+380501234567".to_string(),
            shipping_city: Some("Kyiv".to_string()),
            shipping_warehouse: Some("Warehouse #1".to_string()),
            created_at: "2024-03-01T10:00:00Z".parse().expect("timestamp"),
        };
        let encoded = serde_json::to_string(&order).expect("serialize");
        let decoded: Order = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(decoded, order);
        assert_eq!(
            serde_json::to_value(OrderStatus::Pending).expect("serialize"),
            json!("pending")
        );
    }
}
