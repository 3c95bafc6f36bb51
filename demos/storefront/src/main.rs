//! Storefront walkthrough binary
//!
//! Wires the full store set to the in-memory backends and plays through a
//! shopping session the way the screens drive it: mount loads, debounced
//! search, favorite toggles, the cart-to-order checkout, and session reset.

use std::time::Duration;

use bookstore_core::contract::Collection;
use bookstore_core::view::attach_flags;
use bookstore_sync::{Services, SyncConfig};
use bookstore_testing::{InMemoryCatalog, InMemoryDirectory, InMemoryImageHost, fixtures};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Debounce is shortened so the walkthrough doesn't sit on real timers.
const DEMO_DEBOUNCE: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=info,bookstore_sync=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Storefront Walkthrough: Bookstore Data Layer ===\n");

    // Seed the backends the way a staging environment would be.
    let catalog = InMemoryCatalog::new();
    fixtures::seed_books(&catalog, 25);
    fixtures::seed_categories(&catalog, 2);
    let user = fixtures::user();
    catalog.insert(
        Collection::Profiles,
        user.as_str(),
        &fixtures::profile(&user),
    );

    let directory = InMemoryDirectory::new();
    directory.add_city(
        fixtures::city("Kyiv"),
        vec![fixtures::warehouse(1), fixtures::warehouse(2)],
    );
    directory.add_city(fixtures::city("Lviv"), vec![fixtures::warehouse(3)]);

    let services = Services::new(
        catalog,
        InMemoryImageHost::new(),
        directory,
        SyncConfig::default().with_debounce(DEMO_DEBOUNCE),
    );

    // --- Catalog screen mounts ---
    println!(">>> Catalog screen mounts: load first page");
    services.books.load().await;
    let snapshot = services.books.snapshot().await;
    println!(
        "Catalog: {} books loaded, has_more = {}",
        snapshot.items.len(),
        snapshot.has_more
    );

    println!("\n>>> Scroll to the bottom: load next page");
    services.books.load_more().await;
    println!(
        "Catalog: {} books loaded, has_more = {}",
        services.books.items().await.len(),
        services.books.has_more().await
    );

    // --- Sign in ---
    println!("\n>>> Sign in as {}", user.as_str());
    services.set_user(Some(user.clone())).await;
    services.profile.fetch().await;
    if let Some(profile) = services.profile.profile().await {
        println!("Signed in: {} <{}>", profile.name, profile.email);
    }
    services.favorites.load().await;

    // --- Book detail ---
    let opened = fixtures::book(3);
    println!("\n>>> Open \"{}\": record view, toggle favorite", opened.title);
    services.book.set_book(Some(opened.id.clone())).await;
    services.book.fetch().await;
    services.viewing_history.record_view(&opened).await;
    services.favorites.toggle(&opened).await;
    println!(
        "Favorite now: {}",
        services.favorites.is_favorite(&opened.id).await
    );

    // --- Cart + flag join ---
    println!("\n>>> Add two books to the cart");
    services.cart.add(fixtures::book(1)).await;
    services.cart.add(fixtures::book(1)).await;
    services.cart.add(opened.clone()).await;
    println!(
        "Cart: {} lines, {} copies, total {:.2}",
        services.cart.items().await.len(),
        services.cart.count().await,
        services.cart.total().await
    );

    let views = attach_flags(
        services.books.items().await,
        &services.favorites.favorite_ids().await,
        &services.cart.quantities().await,
    );
    println!("Catalog rows with viewer flags:");
    for view in views.iter().take(5) {
        println!(
            "  {} | favorite: {} | in cart: {} (x{})",
            view.book.title, view.is_favorite, view.in_cart, view.cart_quantity
        );
    }

    // --- Debounced search ---
    println!("\n>>> Type into search: \"bo\", \"boo\", \"Book 04\" (one request fires)");
    services.search.set_query("bo").await;
    services.search.set_query("boo").await;
    services.search.set_query("Book 04").await;
    tokio::time::sleep(DEMO_DEBOUNCE * 4).await;
    let results = services.search.snapshot().await;
    println!("Search \"Book 04\": {} result(s)", results.items.len());
    for book in &results.items {
        println!("  {} by {}", book.title, book.author);
    }

    // --- Checkout: shipping picker ---
    println!("\n>>> Checkout: pick a shipping city and warehouse");
    services.shipping.set_city_query("Kyiv").await;
    tokio::time::sleep(DEMO_DEBOUNCE * 4).await;
    let cities = services.shipping.state(|s| s.cities.items.clone()).await;
    println!("City suggestions: {:?}", cities.iter().map(|c| &c.name).collect::<Vec<_>>());
    let Some(city) = cities.into_iter().next() else {
        println!("No city matched, aborting checkout");
        return;
    };
    services.shipping.select_city(city).await;
    services.shipping.search_warehouses().await;
    let warehouses = services.shipping.state(|s| s.warehouses.items.clone()).await;
    println!(
        "Warehouses in the city: {:?}",
        warehouses.iter().map(|w| &w.name).collect::<Vec<_>>()
    );
    if let Some(warehouse) = warehouses.into_iter().next() {
        services.shipping.select_warehouse(warehouse).await;
    }

    // --- Place the order ---
    println!("\n>>> Place the order");
    let selection = services.shipping.selection().await;
    if let Some(order) = services
        .cart
        .to_order(Some(&user), "Olena Bondarenko", "+380501234567", selection.as_ref())
        .await
    {
        let total = order.total;
        services.order.place(order).await;
        let placed = services
            .order
            .state(|s| s.operations.create.response.clone())
            .await;
        match placed {
            Some(response) if response.is_success() => {
                println!("Order placed, total {total:.2}");
                services.cart.clear().await;
            }
            other => println!("Order failed: {other:?}"),
        }
    }

    // --- Order history ---
    println!("\n>>> Order history screen mounts");
    services.order_history.load().await;
    let grouped = services.order_history.grouped().await;
    for bucket in grouped.buckets() {
        println!("  {}: {} order(s)", bucket.date, bucket.items.len());
    }

    // --- Sign out ---
    println!("\n>>> Sign out: clear the session");
    services.set_user(None).await;
    services.reset_session().await;
    println!(
        "Catalog after reset: {} books, cart: {} lines",
        services.books.items().await.len(),
        services.cart.items().await.len()
    );

    println!("\n=== Walkthrough Complete ===");
    println!("\nContract demonstrated:");
    println!("  • Screens call named store operations and read through selectors");
    println!("  • Mount triggers the initial load; unmount resets screen-scoped stores");
    println!("  • Rapid filter changes collapse into one debounced request");
    println!("  • Mutations are optimistic and roll back on backend failure");
    println!("  • Session reset fences out anything still in flight");
}
