//! Pure price arithmetic.
//!
//! All money in the data layer is `f64` hryvnia rounded to two decimals at
//! every boundary, matching what the backend stores. A book carries the
//! triple (price, original price, discount percent); the helpers here derive
//! any one leg from the other two and keep the rounding in one place.
//!
//! Bad numeric input is never an error. Non-finite and negative values are
//! coerced to safe defaults so a half-typed form field cannot poison the
//! document, only produce a zero.

use crate::model::{Book, BookField, OrderItem};

/// Rounds to two decimal places, half away from zero.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn sanitize_money(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

fn sanitize_discount(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Selling price derived from an original price and a discount percentage.
#[must_use]
pub fn price_from(original: f64, discount_percent: f64) -> f64 {
    let original = sanitize_money(original);
    let discount = sanitize_discount(discount_percent);
    round2(original * (1.0 - discount / 100.0))
}

/// Discount percentage derived from a selling price and an original price.
///
/// A selling price at or above the original means no discount, as does an
/// original price of zero.
#[must_use]
pub fn discount_from(price: f64, original: f64) -> f64 {
    let price = sanitize_money(price);
    let original = sanitize_money(original);
    if original <= 0.0 || price >= original {
        return 0.0;
    }
    round2((original - price) / original * 100.0)
}

/// Price of `quantity` copies at `unit_price`.
#[must_use]
pub fn line_total(unit_price: f64, quantity: u32) -> f64 {
    round2(unit_price * f64::from(quantity))
}

/// Sum of an order's line totals.
#[must_use]
pub fn order_total(items: &[OrderItem]) -> f64 {
    round2(
        items
            .iter()
            .map(|item| line_total(item.unit_price, item.quantity))
            .sum(),
    )
}

/// Whether the admin price form derives fields or passes typed values through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PricingMode {
    /// Editing one leg of the price triple recomputes the dependent leg.
    #[default]
    Auto,
    /// Every field holds exactly what was typed, no derivation.
    Manual,
}

/// Form state for editing a book's price triple.
///
/// In [`PricingMode::Auto`], editing the original price or the discount
/// recomputes the selling price, and editing the selling price recomputes
/// the discount. Switching modes never recomputes anything by itself; the
/// next edit does.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceFields {
    /// Selling price.
    pub price: f64,
    /// Strike-through price.
    pub original_price: f64,
    /// Discount in percent of the original price.
    pub discount_percent: f64,
    /// Whether edits derive the dependent field.
    pub mode: PricingMode,
}

impl PriceFields {
    /// Form state seeded from an existing book.
    #[must_use]
    pub fn from_book(book: &Book) -> Self {
        Self {
            price: book.price,
            original_price: book.original_price,
            discount_percent: book.discount_percent.unwrap_or(0.0),
            mode: PricingMode::Auto,
        }
    }

    /// Records an edit to the original price.
    pub fn set_original_price(&mut self, value: f64) {
        match self.mode {
            PricingMode::Auto => {
                self.original_price = sanitize_money(value);
                self.price = price_from(self.original_price, self.discount_percent);
            }
            PricingMode::Manual => self.original_price = value,
        }
    }

    /// Records an edit to the discount percentage.
    pub fn set_discount_percent(&mut self, value: f64) {
        match self.mode {
            PricingMode::Auto => {
                self.discount_percent = sanitize_discount(value);
                self.price = price_from(self.original_price, self.discount_percent);
            }
            PricingMode::Manual => self.discount_percent = value,
        }
    }

    /// Records an edit to the selling price.
    pub fn set_price(&mut self, value: f64) {
        match self.mode {
            PricingMode::Auto => {
                self.price = sanitize_money(value);
                self.discount_percent = discount_from(self.price, self.original_price);
            }
            PricingMode::Manual => self.price = value,
        }
    }

    /// The book-field edits that persist this form.
    #[must_use]
    pub fn to_fields(&self) -> Vec<BookField> {
        let discount = if self.discount_percent > 0.0 {
            Some(self.discount_percent)
        } else {
            None
        };
        vec![
            BookField::Price(self.price),
            BookField::OriginalPrice(self.original_price),
            BookField::DiscountPercent(discount),
        ]
    }
}

impl Book {
    /// Amount the current discount saves on this book.
    #[must_use]
    pub fn savings(&self) -> f64 {
        round2((self.original_price - self.price).max(0.0))
    }

    /// Whether the book is currently on sale.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.original_price > self.price
    }
}
