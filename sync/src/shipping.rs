//! Checkout shipping picker: city lookup, then warehouse lookup.
//!
//! Two debounced sections share one store because the second depends on the
//! first: warehouses are searched within the selected city. Selecting a city
//! resets the warehouse side and fences out anything still in flight, the
//! same epoch discipline the list stores use.

use std::sync::Arc;

use bookstore_core::error::StoreError;
use bookstore_core::gateway::ShippingDirectory;
use bookstore_core::model::{City, ShippingSelection, Warehouse};
use bookstore_core::status::{ListStatus, OperationResponse};
use tokio::sync::RwLock;

use crate::config::SyncConfig;
use crate::debounce::Debouncer;

/// One side of the two-step lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSection<T> {
    /// Current suggestions.
    pub items: Vec<T>,
    /// Whether a search is in flight.
    pub status: ListStatus,
    /// Outcome of the last settled search.
    pub response: Option<OperationResponse>,
}

impl<T> Default for LookupSection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: ListStatus::Idle,
            response: None,
        }
    }
}

impl<T> LookupSection<T> {
    fn clear(&mut self) {
        self.items.clear();
        self.status = ListStatus::Idle;
        self.response = None;
    }
}

/// Everything the shipping picker renders.
#[derive(Debug, Clone)]
pub struct ShippingState {
    /// City search box contents.
    pub city_query: String,
    /// City suggestions.
    pub cities: LookupSection<City>,
    /// The chosen city, if any.
    pub selected_city: Option<City>,
    /// Warehouse search box contents.
    pub warehouse_query: String,
    /// Warehouse suggestions within the chosen city.
    pub warehouses: LookupSection<Warehouse>,
    /// The chosen warehouse, if any.
    pub selected_warehouse: Option<Warehouse>,
    epoch: u64,
}

impl Default for ShippingState {
    fn default() -> Self {
        Self {
            city_query: String::new(),
            cities: LookupSection::default(),
            selected_city: None,
            warehouse_query: String::new(),
            warehouses: LookupSection::default(),
            selected_warehouse: None,
            epoch: 0,
        }
    }
}

/// Store behind the checkout shipping picker.
///
/// Unlike the list stores, a failed search clears the section's suggestions:
/// a dropdown showing stale entries under an error banner invites picking a
/// city that no longer matches what was typed.
pub struct ShippingLookupStore<D: ShippingDirectory> {
    directory: D,
    config: SyncConfig,
    state: Arc<RwLock<ShippingState>>,
    city_debounce: Debouncer,
    warehouse_debounce: Debouncer,
}

impl<D: ShippingDirectory> ShippingLookupStore<D> {
    /// Creates an empty picker store.
    #[must_use]
    pub fn new(directory: D, config: SyncConfig) -> Self {
        Self {
            directory,
            config,
            state: Arc::new(RwLock::new(ShippingState::default())),
            city_debounce: Debouncer::default(),
            warehouse_debounce: Debouncer::default(),
        }
    }

    /// Read current state via a closure.
    pub async fn state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ShippingState) -> R,
    {
        let state = self.state.read().await;
        f(&*state)
    }

    /// Both halves of the selection, once both are made.
    pub async fn selection(&self) -> Option<ShippingSelection> {
        self.state(|s| {
            let city = s.selected_city.clone()?;
            let warehouse = s.selected_warehouse.clone()?;
            Some(ShippingSelection { city, warehouse })
        })
        .await
    }

    /// Replaces the city query; the search fires after the debounce window.
    ///
    /// An emptied query clears the suggestions instead of searching. An
    /// existing selection stays until a new city is selected.
    pub async fn set_city_query(&self, query: impl Into<String>) {
        let query = query.into();
        if query.trim().is_empty() {
            self.city_debounce.cancel();
            let mut state = self.state.write().await;
            state.city_query.clear();
            state.cities.clear();
            state.epoch += 1;
            tracing::debug!(store = "shipping-cities", "Query cleared");
            return;
        }
        {
            let mut state = self.state.write().await;
            state.city_query = query;
        }
        let store = self.clone();
        self.city_debounce
            .schedule(self.config.debounce, "shipping-cities", async move {
                store.search_cities().await;
            });
    }

    /// Runs the city search immediately, bypassing the debounce.
    pub async fn search_cities(&self) {
        let staged = {
            let mut state = self.state.write().await;
            let query = state.city_query.trim().to_string();
            if state.cities.status.is_busy() {
                tracing::debug!(store = "shipping-cities", "Search skipped, already loading");
                metrics::counter!(
                    "sync.load.skipped",
                    "store" => "shipping-cities",
                    "reason" => "busy"
                )
                .increment(1);
                None
            } else if query.is_empty() {
                None
            } else {
                state.cities.status = ListStatus::Loading;
                state.cities.response = None;
                Some((state.epoch, query))
            }
        };
        let Some((epoch, query)) = staged else {
            return;
        };
        let result = self
            .directory
            .search_cities(&query, self.config.lookup_limit)
            .await;
        self.settle_cities(epoch, result).await;
    }

    async fn settle_cities(&self, epoch: u64, result: Result<Vec<City>, StoreError>) {
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            tracing::warn!(
                store = "shipping-cities",
                "Discarding settlement from a superseded search"
            );
            metrics::counter!("sync.stale.dropped", "store" => "shipping-cities").increment(1);
            return;
        }
        state.cities.status = ListStatus::Idle;
        match result {
            Ok(cities) => {
                tracing::debug!(store = "shipping-cities", count = cities.len(), "Search completed");
                metrics::counter!("sync.load.completed", "store" => "shipping-cities").increment(1);
                state.cities.items = cities;
                state.cities.response = Some(OperationResponse::Success);
            }
            Err(error) => {
                tracing::warn!(store = "shipping-cities", error = %error, "Search failed");
                metrics::counter!("sync.load.failed", "store" => "shipping-cities").increment(1);
                state.cities.items.clear();
                state.cities.response = Some(OperationResponse::Failure(error));
            }
        }
    }

    /// Picks a city, resetting the warehouse side.
    pub async fn select_city(&self, city: City) {
        self.city_debounce.cancel();
        self.warehouse_debounce.cancel();
        let mut state = self.state.write().await;
        tracing::debug!(city = %city.reference, "City selected");
        state.selected_city = Some(city);
        state.cities.clear();
        state.warehouse_query.clear();
        state.warehouses.clear();
        state.selected_warehouse = None;
        state.epoch += 1;
    }

    /// Replaces the warehouse query; the search fires after the debounce
    /// window. An empty query is valid and lists the whole city.
    pub async fn set_warehouse_query(&self, query: impl Into<String>) {
        {
            let mut state = self.state.write().await;
            if state.selected_city.is_none() {
                tracing::warn!(
                    store = "shipping-warehouses",
                    "Warehouse query without a selected city"
                );
                return;
            }
            state.warehouse_query = query.into();
        }
        let store = self.clone();
        self.warehouse_debounce
            .schedule(self.config.debounce, "shipping-warehouses", async move {
                store.search_warehouses().await;
            });
    }

    /// Runs the warehouse search immediately, bypassing the debounce.
    pub async fn search_warehouses(&self) {
        let staged = {
            let mut state = self.state.write().await;
            let Some(city) = state.selected_city.clone() else {
                tracing::warn!(
                    store = "shipping-warehouses",
                    "Search skipped, no selected city"
                );
                return;
            };
            if state.warehouses.status.is_busy() {
                tracing::debug!(
                    store = "shipping-warehouses",
                    "Search skipped, already loading"
                );
                metrics::counter!(
                    "sync.load.skipped",
                    "store" => "shipping-warehouses",
                    "reason" => "busy"
                )
                .increment(1);
                None
            } else {
                state.warehouses.status = ListStatus::Loading;
                state.warehouses.response = None;
                Some((state.epoch, city, state.warehouse_query.clone()))
            }
        };
        let Some((epoch, city, query)) = staged else {
            return;
        };
        let result = self
            .directory
            .search_warehouses(&city.reference, &query, self.config.lookup_limit)
            .await;
        self.settle_warehouses(epoch, result).await;
    }

    async fn settle_warehouses(&self, epoch: u64, result: Result<Vec<Warehouse>, StoreError>) {
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            tracing::warn!(
                store = "shipping-warehouses",
                "Discarding settlement from a superseded search"
            );
            metrics::counter!("sync.stale.dropped", "store" => "shipping-warehouses").increment(1);
            return;
        }
        state.warehouses.status = ListStatus::Idle;
        match result {
            Ok(warehouses) => {
                tracing::debug!(
                    store = "shipping-warehouses",
                    count = warehouses.len(),
                    "Search completed"
                );
                metrics::counter!("sync.load.completed", "store" => "shipping-warehouses")
                    .increment(1);
                state.warehouses.items = warehouses;
                state.warehouses.response = Some(OperationResponse::Success);
            }
            Err(error) => {
                tracing::warn!(store = "shipping-warehouses", error = %error, "Search failed");
                metrics::counter!("sync.load.failed", "store" => "shipping-warehouses").increment(1);
                state.warehouses.items.clear();
                state.warehouses.response = Some(OperationResponse::Failure(error));
            }
        }
    }

    /// Picks a warehouse.
    pub async fn select_warehouse(&self, warehouse: Warehouse) {
        let mut state = self.state.write().await;
        tracing::debug!(warehouse = %warehouse.reference, "Warehouse selected");
        state.selected_warehouse = Some(warehouse);
    }

    /// Clears the whole picker, fencing out anything in flight.
    pub async fn reset(&self) {
        self.city_debounce.cancel();
        self.warehouse_debounce.cancel();
        let mut state = self.state.write().await;
        let epoch = state.epoch + 1;
        *state = ShippingState::default();
        state.epoch = epoch;
        tracing::debug!(store = "shipping", "Store reset");
        metrics::counter!("sync.store.reset", "store" => "shipping").increment(1);
    }
}

impl<D: ShippingDirectory> Clone for ShippingLookupStore<D> {
    fn clone(&self) -> Self {
        Self {
            directory: self.directory.clone(),
            config: self.config.clone(),
            state: Arc::clone(&self.state),
            city_debounce: self.city_debounce.clone(),
            warehouse_debounce: self.warehouse_debounce.clone(),
        }
    }
}
