#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Optimistic mutations: apply locally, reconcile with the backend, roll
//! back on failure.

use std::time::Duration;

use bookstore_core::contract::Collection;
use bookstore_core::error::StoreError;
use bookstore_core::model::{BookField, OrderStatus, ProfileField};
use bookstore_core::pricing::PriceFields;
use bookstore_core::status::OperationResponse;
use bookstore_sync::books::BookStore;
use bookstore_sync::favorites::FavoritesStore;
use bookstore_sync::history::ViewingHistoryStore;
use bookstore_sync::images::BookImagesStore;
use bookstore_sync::orders::{orders_store, OrderStore};
use bookstore_sync::profile::ProfileStore;
use bookstore_sync::{EntityOperation, SyncConfig};
use bookstore_testing::{fixtures, CatalogOp, InMemoryCatalog, InMemoryImageHost};
use tokio::time::sleep;

#[tokio::test]
async fn favorite_toggle_adds_then_removes() {
    let catalog = InMemoryCatalog::new();
    let favorites = FavoritesStore::new(catalog.clone(), SyncConfig::default());
    favorites.set_user(Some(fixtures::user())).await;
    favorites.load().await;

    let book = fixtures::book(1);
    favorites.toggle(&book).await;
    assert!(favorites.is_favorite(&book.id).await);
    assert_eq!(catalog.count(Collection::Favorites), 1);

    favorites.toggle(&book).await;
    assert!(!favorites.is_favorite(&book.id).await);
    assert_eq!(catalog.count(Collection::Favorites), 0);
}

#[tokio::test]
async fn failed_favorite_add_rolls_back() {
    let catalog = InMemoryCatalog::new();
    catalog.fail_next(CatalogOp::Create, StoreError::Network("offline".to_string()));
    let favorites = FavoritesStore::new(catalog.clone(), SyncConfig::default());
    favorites.set_user(Some(fixtures::user())).await;
    favorites.load().await;

    let book = fixtures::book(1);
    favorites.toggle(&book).await;

    assert!(!favorites.is_favorite(&book.id).await);
    assert_eq!(catalog.count(Collection::Favorites), 0);
}

#[tokio::test]
async fn failed_favorite_removal_reinstates_the_row() {
    let catalog = InMemoryCatalog::new();
    let user = fixtures::user();
    for n in 0..3 {
        let record = fixtures::favorite(n, &user, fixtures::book(n));
        catalog.insert(Collection::Favorites, record.id.as_str(), &record);
    }
    let favorites = FavoritesStore::new(catalog.clone(), SyncConfig::default());
    favorites.set_user(Some(user)).await;
    favorites.load().await;

    catalog.fail_next(CatalogOp::Delete, StoreError::Backend("boom".to_string()));
    let middle = fixtures::book(1);
    favorites.toggle(&middle).await;

    let items = favorites.snapshot().await.items;
    assert_eq!(items.len(), 3);
    assert_eq!(
        items[1].book.id, middle.id,
        "rolled back into its old position"
    );
}

#[tokio::test(start_paused = true)]
async fn a_double_tap_runs_one_toggle() {
    let catalog = InMemoryCatalog::new();
    catalog.set_latency(Some(Duration::from_millis(100)));
    let favorites = FavoritesStore::new(catalog.clone(), SyncConfig::default());
    favorites.set_user(Some(fixtures::user())).await;

    let book = fixtures::book(1);
    let first = {
        let favorites = favorites.clone();
        let book = book.clone();
        tokio::spawn(async move { favorites.toggle(&book).await })
    };
    sleep(Duration::from_millis(10)).await;
    // Without the guard this second tap would see the optimistic row and
    // issue a delete.
    favorites.toggle(&book).await;
    sleep(Duration::from_millis(200)).await;
    first.await.unwrap();

    assert_eq!(catalog.calls(CatalogOp::Create), 1);
    assert_eq!(catalog.calls(CatalogOp::Delete), 0);
    assert!(favorites.is_favorite(&book.id).await);
}

#[tokio::test]
async fn recording_a_view_moves_the_book_to_the_top() {
    let catalog = InMemoryCatalog::new();
    let history = ViewingHistoryStore::new(catalog.clone(), SyncConfig::default());
    history.set_user(Some(fixtures::user())).await;
    history.load().await;

    history.record_view(&fixtures::book(5)).await;
    history.record_view(&fixtures::book(3)).await;
    history.record_view(&fixtures::book(5)).await;

    let items = history.snapshot().await.items;
    assert_eq!(items.len(), 2, "the list shows each book once");
    assert_eq!(items[0].book.id.as_str(), "book-5");
    assert_eq!(items[1].book.id.as_str(), "book-3");
}

#[tokio::test]
async fn profile_update_merges_and_reconciles() {
    let catalog = InMemoryCatalog::new();
    let user = fixtures::user();
    catalog.insert(
        Collection::Profiles,
        user.as_str(),
        &fixtures::profile(&user),
    );
    let profile = ProfileStore::new(catalog.clone());
    profile.set_user(Some(user.clone())).await;
    profile.fetch().await;

    profile
        .update(vec![
            ProfileField::Name("Oksana Bondarenko".to_string()),
            ProfileField::City(Some("Lviv".to_string())),
        ])
        .await;

    let current = profile.profile().await.unwrap();
    assert_eq!(current.name, "Oksana Bondarenko");
    assert_eq!(current.city.as_deref(), Some("Lviv"));
    assert_eq!(current.email, "olena@example.com", "untouched fields stay");

    let document = catalog.document(Collection::Profiles, user.as_str()).unwrap();
    assert_eq!(document["name"], "Oksana Bondarenko");
    profile
        .state(|s| {
            assert_eq!(
                s.operations.update.response,
                Some(OperationResponse::Success)
            );
        })
        .await;
}

#[tokio::test]
async fn failed_profile_update_rolls_back_the_merge() {
    let catalog = InMemoryCatalog::new();
    let user = fixtures::user();
    catalog.insert(
        Collection::Profiles,
        user.as_str(),
        &fixtures::profile(&user),
    );
    let profile = ProfileStore::new(catalog.clone());
    profile.set_user(Some(user)).await;
    profile.fetch().await;

    catalog.fail_next(CatalogOp::Update, StoreError::Network("offline".to_string()));
    profile
        .update(vec![ProfileField::Name("Someone Else".to_string())])
        .await;

    let current = profile.profile().await.unwrap();
    assert_eq!(current.name, "Olena Bondarenko", "merge rolled back");
    profile
        .state(|s| {
            assert_eq!(
                s.operations.update.response,
                Some(OperationResponse::Failure(StoreError::Network(
                    "offline".to_string()
                )))
            );
        })
        .await;
}

#[tokio::test]
async fn failed_reconcile_refetch_keeps_the_merged_copy() {
    let catalog = InMemoryCatalog::new();
    let user = fixtures::user();
    catalog.insert(
        Collection::Profiles,
        user.as_str(),
        &fixtures::profile(&user),
    );
    let profile = ProfileStore::new(catalog.clone());
    profile.set_user(Some(user)).await;
    profile.fetch().await;

    // The write goes through; only the follow-up read breaks.
    catalog.fail_next(CatalogOp::Get, StoreError::Network("blip".to_string()));
    profile
        .update(vec![ProfileField::Phone(Some("+380671112233".to_string()))])
        .await;

    let current = profile.profile().await.unwrap();
    assert_eq!(current.phone.as_deref(), Some("+380671112233"));
    profile
        .state(|s| {
            assert_eq!(
                s.operations.update.response,
                Some(OperationResponse::Success),
                "the write itself succeeded"
            );
        })
        .await;
}

#[tokio::test]
async fn placing_an_order_points_the_store_at_it() {
    let catalog = InMemoryCatalog::new();
    let order_store = OrderStore::new(catalog.clone());

    let order = fixtures::order(1, None);
    order_store.place(order.clone()).await;

    assert_eq!(catalog.count(Collection::Orders), 1);
    let current = order_store.order().await.unwrap();
    assert_eq!(current.id, order.id);
    assert_eq!(current.status, OrderStatus::Pending);
}

#[tokio::test]
async fn status_updates_are_optimistic_with_rollback() {
    let catalog = InMemoryCatalog::new();
    let order = fixtures::order(1, None);
    catalog.insert(Collection::Orders, order.id.as_str(), &order);
    let order_store = OrderStore::new(catalog.clone());
    order_store.set_order(Some(order.id.clone())).await;
    order_store.fetch().await;

    order_store.update_status(OrderStatus::Shipped).await;
    assert_eq!(order_store.order().await.unwrap().status, OrderStatus::Shipped);
    let document = catalog.document(Collection::Orders, order.id.as_str()).unwrap();
    assert_eq!(document["status"], "shipped");

    catalog.fail_next(CatalogOp::Update, StoreError::Network("offline".to_string()));
    order_store.cancel().await;

    assert_eq!(
        order_store.order().await.unwrap().status,
        OrderStatus::Shipped,
        "failed transition rolled back"
    );
    order_store
        .state(|s| {
            assert!(matches!(
                s.operations.update_status.response,
                Some(OperationResponse::Failure(StoreError::Network(_)))
            ));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn staff_list_narrows_on_any_of_the_chosen_statuses() {
    let catalog = InMemoryCatalog::new();
    for n in 0..6 {
        let mut order = fixtures::order(n, None);
        order.status = match n % 3 {
            0 => OrderStatus::Pending,
            1 => OrderStatus::Shipped,
            _ => OrderStatus::Cancelled,
        };
        catalog.insert(Collection::Orders, order.id.as_str(), &order);
    }
    let orders = orders_store(catalog.clone(), SyncConfig::default());

    orders.load().await;
    assert_eq!(orders.items().await.len(), 6);

    orders
        .set_status_filter(vec![OrderStatus::Pending, OrderStatus::Shipped])
        .await;
    sleep(Duration::from_millis(500)).await;

    let items = orders.items().await;
    assert_eq!(items.len(), 4);
    assert!(items.iter().all(|order| matches!(
        order.status,
        OrderStatus::Pending | OrderStatus::Shipped
    )));
}

#[tokio::test]
async fn gallery_upload_writes_blob_then_document() {
    let catalog = InMemoryCatalog::new();
    let host = InMemoryImageHost::new();
    let gallery = BookImagesStore::new(catalog.clone(), host.clone(), SyncConfig::default());
    gallery.set_book(Some(fixtures::book(1).id)).await;
    gallery.load().await;

    gallery.add_image(fixtures::image_upload("cover.jpg")).await;

    assert_eq!(host.blob_count(), 1);
    assert_eq!(catalog.count(Collection::BookImages), 1);
    let items = gallery.snapshot().await.items;
    assert_eq!(items.len(), 1);
    assert_eq!(
        gallery.gallery().await.upload.response,
        Some(OperationResponse::Success)
    );
}

#[tokio::test]
async fn failed_document_write_cleans_up_the_blob() {
    let catalog = InMemoryCatalog::new();
    catalog.fail_next(CatalogOp::Create, StoreError::Backend("boom".to_string()));
    let host = InMemoryImageHost::new();
    let gallery = BookImagesStore::new(catalog.clone(), host.clone(), SyncConfig::default());
    gallery.set_book(Some(fixtures::book(1).id)).await;

    gallery.add_image(fixtures::image_upload("cover.jpg")).await;

    assert_eq!(host.blob_count(), 0, "orphaned blob was deleted again");
    assert_eq!(catalog.count(Collection::BookImages), 0);
    assert!(matches!(
        gallery.gallery().await.upload.response,
        Some(OperationResponse::Failure(StoreError::Backend(_)))
    ));
}

#[tokio::test]
async fn removing_an_image_drops_document_and_blob() {
    let catalog = InMemoryCatalog::new();
    let host = InMemoryImageHost::new();
    let gallery = BookImagesStore::new(catalog.clone(), host.clone(), SyncConfig::default());
    gallery.set_book(Some(fixtures::book(1).id)).await;
    gallery.add_image(fixtures::image_upload("cover.jpg")).await;
    let id = gallery.snapshot().await.items[0].id.clone();

    gallery.remove_image(&id).await;

    assert_eq!(catalog.count(Collection::BookImages), 0);
    assert_eq!(host.blob_count(), 0);
    assert!(gallery.snapshot().await.items.is_empty());
    assert_eq!(
        gallery.gallery().await.delete.response,
        Some(OperationResponse::Success)
    );
}

#[tokio::test(start_paused = true)]
async fn repointing_a_detail_store_discards_the_inflight_fetch() {
    let catalog = InMemoryCatalog::new();
    fixtures::seed_books(&catalog, 3);
    catalog.set_latency(Some(Duration::from_millis(100)));
    let store = BookStore::new(catalog.clone());

    store.set_book(Some(fixtures::book(1).id)).await;
    let background = {
        let store = store.clone();
        tokio::spawn(async move { store.fetch().await })
    };
    sleep(Duration::from_millis(10)).await;
    store.set_book(Some(fixtures::book(2).id)).await;

    sleep(Duration::from_millis(200)).await;
    background.await.unwrap();

    assert_eq!(store.book().await, None, "stale fetch settled into the void");
    store.fetch().await;
    assert_eq!(store.book().await.unwrap().id.as_str(), "book-2");
}

#[tokio::test]
async fn dismissing_a_banner_clears_one_slot_only() {
    let catalog = InMemoryCatalog::new();
    let store = BookStore::new(catalog.clone());
    store.set_book(Some(fixtures::book(9).id)).await;

    // No such document: the fetch settles into a failure banner.
    store.fetch().await;
    store
        .state(|s| assert!(s.operations.fetch.response.is_some()))
        .await;

    store.reset_operation(EntityOperation::Fetch).await;
    store
        .state(|s| {
            assert_eq!(s.operations.fetch.response, None);
            assert!(s.id.is_some(), "dismissal does not repoint the store");
        })
        .await;
}

#[tokio::test]
async fn creating_a_book_points_the_store_at_it() {
    let catalog = InMemoryCatalog::new();
    let store = BookStore::new(catalog.clone());

    let book = fixtures::book(1);
    store.create(book.clone()).await;

    assert_eq!(catalog.count(Collection::Books), 1);
    let current = store.book().await.unwrap();
    assert_eq!(current.id, book.id);
    store
        .state(|s| {
            assert_eq!(
                s.operations.create.response,
                Some(OperationResponse::Success)
            );
        })
        .await;
}

#[tokio::test]
async fn repricing_a_book_writes_the_derived_triple() {
    let catalog = InMemoryCatalog::new();
    let book = fixtures::book(1);
    catalog.insert(Collection::Books, book.id.as_str(), &book);
    let store = BookStore::new(catalog.clone());
    store.set_book(Some(book.id.clone())).await;
    store.fetch().await;

    // The admin form derives the selling price from the discount.
    let mut form = PriceFields::from_book(&book);
    form.set_discount_percent(50.0);
    store.update(form.to_fields()).await;

    let current = store.book().await.unwrap();
    assert!((current.price - 5.5).abs() < 1e-9);
    assert_eq!(current.discount_percent, Some(50.0));
    assert!(current.is_discounted());

    let document = catalog.document(Collection::Books, book.id.as_str()).unwrap();
    assert_eq!(document["price"], 5.5);
    assert_eq!(document["discountPercent"], 50.0);
    assert_eq!(document["originalPrice"], 11.0);
}

#[tokio::test]
async fn failed_book_edit_rolls_back_the_merge() {
    let catalog = InMemoryCatalog::new();
    let book = fixtures::book(1);
    catalog.insert(Collection::Books, book.id.as_str(), &book);
    let store = BookStore::new(catalog.clone());
    store.set_book(Some(book.id.clone())).await;
    store.fetch().await;

    catalog.fail_next(CatalogOp::Update, StoreError::Network("offline".to_string()));
    store
        .update(vec![BookField::Title("Unsaved Title".to_string())])
        .await;

    assert_eq!(store.book().await.unwrap().title, book.title);
    store
        .state(|s| {
            assert!(matches!(
                s.operations.update.response,
                Some(OperationResponse::Failure(StoreError::Network(_)))
            ));
        })
        .await;
}

#[tokio::test]
async fn availability_toggle_reaches_the_document() {
    let catalog = InMemoryCatalog::new();
    let book = fixtures::book(1);
    catalog.insert(Collection::Books, book.id.as_str(), &book);
    let store = BookStore::new(catalog.clone());
    store.set_book(Some(book.id.clone())).await;
    store.fetch().await;

    store.set_availability(false).await;

    assert!(!store.book().await.unwrap().available);
    let document = catalog.document(Collection::Books, book.id.as_str()).unwrap();
    assert_eq!(document["available"], false);
}

#[tokio::test]
async fn deleting_a_book_clears_the_entity_but_keeps_the_banner() {
    let catalog = InMemoryCatalog::new();
    let book = fixtures::book(1);
    catalog.insert(Collection::Books, book.id.as_str(), &book);
    let store = BookStore::new(catalog.clone());
    store.set_book(Some(book.id.clone())).await;
    store.fetch().await;

    store.delete().await;

    assert_eq!(catalog.count(Collection::Books), 0);
    assert_eq!(store.book().await, None);
    store
        .state(|s| {
            assert_eq!(
                s.operations.delete.response,
                Some(OperationResponse::Success)
            );
        })
        .await;
}
