//! Nova Post directory client implementation

use crate::{
    error::LookupError,
    lookup::{LookupEnvelope, LookupRequest},
};
use bookstore_core::error::StoreError;
use bookstore_core::gateway::ShippingDirectory;
use bookstore_core::model::{City, Warehouse};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

/// Nova Post directory client
///
/// Implements [`ShippingDirectory`], so the checkout shipping picker takes it
/// as its directory the same way tests take an in-memory fake.
#[derive(Clone)]
pub struct NovaPostClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl NovaPostClient {
    /// Create a new client with API key from environment
    ///
    /// # Errors
    ///
    /// Returns `LookupError::MissingApiKey` if `NOVA_POST_API_KEY` is not set
    pub fn from_env() -> Result<Self, LookupError> {
        let api_key =
            std::env::var("NOVA_POST_API_KEY").map_err(|_| LookupError::MissingApiKey)?;

        Ok(Self::new(api_key))
    }

    /// Create a new client with explicit API key
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_url: "https://api.novaposhta.ua/v2.0/json".to_string(),
        }
    }

    /// Builder: point the client at a different endpoint
    #[must_use]
    pub fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    /// Search cities matching `filter_text`
    ///
    /// # Errors
    ///
    /// Returns `LookupError::CitiesNotFound` when the directory reports no
    /// matches, and wraps transport, API, and parsing failures otherwise
    pub async fn cities(&self, filter_text: &str, limit: usize) -> Result<Vec<City>, LookupError> {
        let request = LookupRequest::cities(self.api_key.clone(), filter_text, limit);
        let envelope: LookupEnvelope<City> = self.lookup(&request).await?;
        if !envelope.success {
            return Err(LookupError::CitiesNotFound);
        }
        Ok(envelope.data)
    }

    /// Search warehouses within the city identified by `city_ref`
    ///
    /// An empty `filter_text` lists the city's warehouses up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::WarehousesNotFound` when the directory reports no
    /// matches, and wraps transport, API, and parsing failures otherwise
    pub async fn warehouses(
        &self,
        city_ref: &str,
        filter_text: &str,
        limit: usize,
    ) -> Result<Vec<Warehouse>, LookupError> {
        let request =
            LookupRequest::warehouses(self.api_key.clone(), city_ref, filter_text, limit);
        let envelope: LookupEnvelope<Warehouse> = self.lookup(&request).await?;
        if !envelope.success {
            return Err(LookupError::WarehousesNotFound);
        }
        Ok(envelope.data)
    }

    async fn lookup<T>(&self, request: &LookupRequest) -> Result<LookupEnvelope<T>, LookupError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(&self.api_url)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| LookupError::RequestFailed(e.to_string()))?;

        match response.status() {
            StatusCode::OK => response
                .json::<LookupEnvelope<T>>()
                .await
                .map_err(|e| LookupError::ResponseParseFailed(e.to_string())),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(LookupError::ApiError {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}

impl ShippingDirectory for NovaPostClient {
    async fn search_cities(&self, query: &str, limit: usize) -> Result<Vec<City>, StoreError> {
        self.cities(query, limit).await.map_err(StoreError::from)
    }

    async fn search_warehouses(
        &self,
        city_ref: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Warehouse>, StoreError> {
        self.warehouses(city_ref, query, limit)
            .await
            .map_err(StoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clients_point_at_the_production_directory_by_default() {
        let client = NovaPostClient::new("test-key".to_string());
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.api_url, "https://api.novaposhta.ua/v2.0/json");
    }

    #[test]
    fn with_api_url_redirects_the_client() {
        let client = NovaPostClient::new("test-key".to_string())
            .with_api_url("http://localhost:9090".to_string());
        assert_eq!(client.api_url, "http://localhost:9090");
    }
}
