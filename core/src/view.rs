//! Derived-state helpers for the presentation layer.
//!
//! Screens ask these functions what to render instead of re-deriving it from
//! raw snapshots, so every list in the app agrees on when to show the full
//! spinner, the footer spinner, the empty state, and when to prefetch.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{Book, BookId};
use crate::status::{ListSnapshot, ListStatus, OperationResponse};

/// How close to the end of the list a row may get before the next page is
/// requested.
const PREFETCH_MARGIN: usize = 3;

/// Whether to show a full-screen spinner: the first page is loading and there
/// is nothing to render yet.
#[must_use]
pub fn is_initial_load<T>(snapshot: &ListSnapshot<T>) -> bool {
    snapshot.status == ListStatus::Loading && snapshot.items.is_empty()
}

/// Whether to show the footer spinner under an already-rendered list.
#[must_use]
pub fn is_paginating<T>(snapshot: &ListSnapshot<T>) -> bool {
    snapshot.status == ListStatus::Fetching
}

/// Whether to show the empty state.
///
/// Only a settled, successful load with zero items qualifies; before the
/// first load and after a failure the screen shows other affordances.
#[must_use]
pub fn shows_empty_state<T>(snapshot: &ListSnapshot<T>) -> bool {
    snapshot.status == ListStatus::Idle
        && snapshot.items.is_empty()
        && matches!(snapshot.response, Some(OperationResponse::Success))
}

/// Localization key of the last failure, when the screen should show one.
#[must_use]
pub fn error_key<T>(snapshot: &ListSnapshot<T>) -> Option<&'static str> {
    match &snapshot.response {
        Some(OperationResponse::Failure(error)) => Some(error.localization_key()),
        _ => None,
    }
}

/// Whether rendering the row at `visible_index` should trigger the next page.
///
/// Fires when the row is within [`PREFETCH_MARGIN`] of the end, another page
/// exists, and no request is already in flight.
#[must_use]
pub fn should_request_next_page<T>(snapshot: &ListSnapshot<T>, visible_index: usize) -> bool {
    !snapshot.items.is_empty()
        && snapshot.has_more
        && snapshot.status == ListStatus::Idle
        && visible_index + PREFETCH_MARGIN >= snapshot.items.len()
}

/// A book row ready for rendering, with the viewer's flags attached.
#[derive(Debug, Clone, PartialEq)]
pub struct BookView {
    /// The catalog book.
    pub book: Book,
    /// Whether the viewer has favorited it.
    pub is_favorite: bool,
    /// Whether it is in the viewer's cart.
    pub in_cart: bool,
    /// How many copies the cart holds, zero when not in the cart.
    pub cart_quantity: u32,
}

/// Joins a page of books with the viewer's favorites and cart.
///
/// Both lookups are hash-based, so flagging a list costs one pass regardless
/// of how large the favorites set or the cart grows.
#[must_use]
pub fn attach_flags(
    books: Vec<Book>,
    favorites: &HashSet<BookId>,
    cart_quantities: &HashMap<BookId, u32>,
) -> Vec<BookView> {
    books
        .into_iter()
        .map(|book| {
            let is_favorite = favorites.contains(&book.id);
            let (in_cart, cart_quantity) = match cart_quantities.get(&book.id) {
                Some(&quantity) => (true, quantity),
                None => (false, 0),
            };
            BookView {
                book,
                is_favorite,
                in_cart,
                cart_quantity,
            }
        })
        .collect()
}

/// Items that share a calendar day, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBucket<T> {
    /// UTC calendar day shared by every item in the bucket.
    pub date: NaiveDate,
    /// Items of that day, in the order they arrived.
    pub items: Vec<T>,
}

/// A dated list partitioned into per-day buckets, newest day first.
///
/// Buckets stay sorted descending by date no matter what order items arrive
/// in, so an incremental page landing out of order slots into the right place
/// instead of appending a duplicate day at the bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBuckets<T> {
    buckets: Vec<DateBucket<T>>,
}

impl<T> DateBuckets<T> {
    /// An empty grouping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buckets: Vec::new(),
        }
    }

    /// The buckets, newest day first.
    #[must_use]
    pub fn buckets(&self) -> &[DateBucket<T>] {
        &self.buckets
    }

    /// Whether no items have been grouped yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of items across all buckets.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.items.len()).sum()
    }

    /// Merges more items into the grouping.
    ///
    /// Items landing on a known day append to that day's bucket; new days
    /// insert at their sorted position. Extending in two calls is equivalent
    /// to grouping the concatenation in one.
    pub fn extend<I, F>(&mut self, more: I, timestamp: F)
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> DateTime<Utc>,
    {
        for item in more {
            let date = timestamp(&item).date_naive();
            // Buckets are sorted descending, so compare reversed.
            match self
                .buckets
                .binary_search_by(|bucket| date.cmp(&bucket.date))
            {
                Ok(index) => self.buckets[index].items.push(item),
                Err(index) => self.buckets.insert(
                    index,
                    DateBucket {
                        date,
                        items: vec![item],
                    },
                ),
            }
        }
    }
}

impl<T> Default for DateBuckets<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Groups a dated list into per-day buckets, newest day first.
pub fn group_by_date<T, I, F>(items: I, timestamp: F) -> DateBuckets<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> DateTime<Utc>,
{
    let mut buckets = DateBuckets::new();
    buckets.extend(items, timestamp);
    buckets
}
