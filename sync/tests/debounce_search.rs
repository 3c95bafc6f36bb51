#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Debounced search: bursts coalesce, clears reset, stale results drop.

use std::time::Duration;

use bookstore_core::contract::Collection;
use bookstore_core::error::StoreError;
use bookstore_core::status::OperationResponse;
use bookstore_sync::search::SearchStore;
use bookstore_sync::SyncConfig;
use bookstore_testing::{fixtures, CatalogOp, InMemoryCatalog};
use tokio::time::sleep;

fn seeded() -> InMemoryCatalog {
    let catalog = InMemoryCatalog::new();
    catalog.insert(
        Collection::Books,
        "hobbit",
        &fixtures::book_with("hobbit", "The Hobbit", "J. R. R. Tolkien"),
    );
    catalog.insert(
        Collection::Books,
        "dune",
        &fixtures::book_with("dune", "Dune", "Frank Herbert"),
    );
    catalog
}

#[tokio::test(start_paused = true)]
async fn a_typing_burst_fetches_once_with_the_final_query() {
    let catalog = seeded();
    let search = SearchStore::new(catalog.clone(), SyncConfig::default());

    search.set_query("t").await;
    sleep(Duration::from_millis(100)).await;
    search.set_query("to").await;
    sleep(Duration::from_millis(100)).await;
    search.set_query("tolkien").await;

    // The query is visible immediately, but nothing has fetched yet.
    assert_eq!(search.query().await, "tolkien");
    assert_eq!(catalog.calls(CatalogOp::Query), 0);

    sleep(Duration::from_millis(500)).await;

    assert_eq!(catalog.calls(CatalogOp::Query), 1);
    let items = search.snapshot().await.items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id.as_str(), "hobbit");
}

#[tokio::test(start_paused = true)]
async fn clearing_the_query_resets_instead_of_searching() {
    let catalog = seeded();
    let search = SearchStore::new(catalog.clone(), SyncConfig::default());

    search.set_query("tolkien").await;
    sleep(Duration::from_millis(500)).await;
    assert_eq!(search.snapshot().await.items.len(), 1);

    search.set_query("  ").await;

    // Blanked immediately, and no further fetch ever fires.
    let snapshot = search.snapshot().await;
    assert!(snapshot.items.is_empty());
    assert_eq!(snapshot.response, None);
    sleep(Duration::from_millis(500)).await;
    assert_eq!(catalog.calls(CatalogOp::Query), 1);
}

#[tokio::test(start_paused = true)]
async fn results_landing_after_a_clear_are_discarded() {
    let catalog = seeded();
    catalog.set_latency(Some(Duration::from_millis(200)));
    let search = SearchStore::new(catalog.clone(), SyncConfig::default());

    // Debounce fires at 400ms, the fetch settles at 600ms.
    search.set_query("tolkien").await;
    sleep(Duration::from_millis(450)).await;
    search.set_query("").await;

    sleep(Duration::from_millis(400)).await;

    let snapshot = search.snapshot().await;
    assert!(snapshot.items.is_empty(), "stale results must not resurrect");
    assert_eq!(snapshot.response, None);
    assert_eq!(catalog.calls(CatalogOp::Query), 1);
}

#[tokio::test(start_paused = true)]
async fn a_failed_query_change_does_not_keep_the_old_results() {
    let catalog = InMemoryCatalog::new();
    fixtures::seed_books(&catalog, 5);
    let search = SearchStore::new(catalog.clone(), SyncConfig::default());

    search.set_query("Book 01").await;
    sleep(Duration::from_millis(500)).await;
    assert_eq!(search.snapshot().await.items.len(), 1);

    catalog.fail_next(CatalogOp::Query, StoreError::Network("offline".to_string()));
    search.set_query("Book 02").await;
    sleep(Duration::from_millis(500)).await;

    let snapshot = search.snapshot().await;
    assert!(
        snapshot.items.is_empty(),
        "the previous query's rows must not sit under the new query's error"
    );
    assert!(matches!(
        snapshot.response,
        Some(OperationResponse::Failure(StoreError::Network(_)))
    ));
}

#[tokio::test(start_paused = true)]
async fn results_paginate_like_any_other_list() {
    let catalog = InMemoryCatalog::new();
    fixtures::seed_books(&catalog, 15);
    let search = SearchStore::new(catalog.clone(), SyncConfig::default());

    // Every fixture title starts with "Book".
    search.set_query("book").await;
    sleep(Duration::from_millis(500)).await;

    let snapshot = search.snapshot().await;
    assert_eq!(snapshot.items.len(), 10);
    assert!(snapshot.has_more);

    search.load_more().await;
    assert_eq!(search.snapshot().await.items.len(), 15);
    assert!(!search.snapshot().await.has_more);
}

#[tokio::test(start_paused = true)]
async fn a_newer_burst_supersedes_the_scheduled_search() {
    let catalog = seeded();
    let search = SearchStore::new(catalog.clone(), SyncConfig::default());

    search.set_query("herbert").await;
    sleep(Duration::from_millis(390)).await;
    // Superseded 10ms before it would have fired.
    search.set_query("tolkien").await;
    sleep(Duration::from_millis(500)).await;

    assert_eq!(catalog.calls(CatalogOp::Query), 1);
    assert_eq!(search.snapshot().await.items[0].id.as_str(), "hobbit");
}
