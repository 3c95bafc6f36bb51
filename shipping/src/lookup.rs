//! Lookup API request and response types

use serde::{Deserialize, Serialize};

/// Remote method for city search
pub const SEARCH_CITIES: &str = "searchCities";
/// Remote method for warehouse search
pub const SEARCH_WAREHOUSES: &str = "searchWarehouses";

/// Request to search the directory
///
/// Every lookup method takes the same envelope: the account key, the method
/// name, the typed filter text, and a result limit. Warehouse searches
/// additionally scope on the selected city's reference.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    /// Account key the directory authenticates on
    pub api_key: String,
    /// Remote method name ([`SEARCH_CITIES`] or [`SEARCH_WAREHOUSES`])
    pub method: String,
    /// Text typed into the picker
    pub filter_text: String,
    /// City scope for warehouse searches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_ref: Option<String>,
    /// Maximum number of matches to return
    pub limit: usize,
}

impl LookupRequest {
    /// Create a city search request
    #[must_use]
    pub fn cities(api_key: String, filter_text: impl Into<String>, limit: usize) -> Self {
        Self {
            api_key,
            method: SEARCH_CITIES.to_string(),
            filter_text: filter_text.into(),
            city_ref: None,
            limit,
        }
    }

    /// Create a warehouse search request scoped to one city
    #[must_use]
    pub fn warehouses(
        api_key: String,
        city_ref: impl Into<String>,
        filter_text: impl Into<String>,
        limit: usize,
    ) -> Self {
        Self {
            api_key,
            method: SEARCH_WAREHOUSES.to_string(),
            filter_text: filter_text.into(),
            city_ref: Some(city_ref.into()),
            limit,
        }
    }
}

/// Response envelope every lookup method returns
///
/// The directory never signals an empty result through HTTP status: a query
/// that matched nothing still returns 200 with `success: false`.
#[derive(Clone, Debug, Deserialize)]
pub struct LookupEnvelope<T> {
    /// Whether the lookup matched anything
    pub success: bool,
    /// Matches, in the directory's relevance order
    // An explicit default fn keeps the derive from requiring `T: Default`.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}
