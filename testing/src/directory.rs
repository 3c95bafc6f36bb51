//! In-memory shipping directory.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use bookstore_core::error::StoreError;
use bookstore_core::gateway::ShippingDirectory;
use bookstore_core::model::{City, Warehouse};

/// Directory operations that can be counted and scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupOp {
    /// City searches.
    Cities,
    /// Warehouse searches.
    Warehouses,
}

#[derive(Default)]
struct Script {
    failures: HashMap<LookupOp, VecDeque<StoreError>>,
    calls: HashMap<LookupOp, usize>,
    latency: Option<Duration>,
}

/// An in-memory [`ShippingDirectory`] for tests.
///
/// Seed it with [`add_city`](Self::add_city); searches match case-insensitive
/// substrings of the display name, and an empty result becomes the
/// directory's not-found error, exactly like the real carrier API.
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    cities: Arc<RwLock<Vec<City>>>,
    warehouses: Arc<RwLock<HashMap<String, Vec<Warehouse>>>>,
    script: Arc<Mutex<Script>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a city together with its warehouses.
    pub fn add_city(&self, city: City, warehouses: Vec<Warehouse>) {
        self.warehouses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(city.reference.clone(), warehouses);
        self.cities
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(city);
    }

    /// Queues an error for the next call of `op`.
    pub fn fail_next(&self, op: LookupOp, error: StoreError) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Sets the simulated directory latency for every subsequent call.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .latency = latency;
    }

    /// How many times `op` has been called, failures included.
    #[must_use]
    pub fn calls(&self, op: LookupOp) -> usize {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .calls
            .get(&op)
            .copied()
            .unwrap_or(0)
    }

    async fn admit(&self, op: LookupOp) -> Result<(), StoreError> {
        let latency = {
            let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
            *script.calls.entry(op).or_insert(0) += 1;
            script.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let failure = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .failures
            .get_mut(&op)
            .and_then(VecDeque::pop_front);
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl ShippingDirectory for InMemoryDirectory {
    async fn search_cities(&self, query: &str, limit: usize) -> Result<Vec<City>, StoreError> {
        self.admit(LookupOp::Cities).await?;

        let needle = query.trim().to_lowercase();
        let matched: Vec<City> = self
            .cities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|city| city.name.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect();
        if matched.is_empty() {
            return Err(StoreError::CitiesNotFound);
        }
        Ok(matched)
    }

    async fn search_warehouses(
        &self,
        city_ref: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Warehouse>, StoreError> {
        self.admit(LookupOp::Warehouses).await?;

        let needle = query.trim().to_lowercase();
        let matched: Vec<Warehouse> = self
            .warehouses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(city_ref)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter(|warehouse| needle.is_empty() || warehouse.name.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect();
        if matched.is_empty() {
            return Err(StoreError::WarehousesNotFound);
        }
        Ok(matched)
    }
}
