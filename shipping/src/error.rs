//! Error types for the Nova Post directory client

use bookstore_core::error::StoreError;
use thiserror::Error;

/// Errors that can occur when querying the shipping directory
#[derive(Debug, Error)]
pub enum LookupError {
    /// Missing `NOVA_POST_API_KEY` environment variable
    #[error("Missing NOVA_POST_API_KEY environment variable")]
    MissingApiKey,

    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response parsing failed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// The directory matched no cities for the query
    #[error("No cities matched the query")]
    CitiesNotFound,

    /// The directory matched no warehouses for the query
    #[error("No warehouses matched the query")]
    WarehousesNotFound,

    /// API returned an error
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },
}

impl From<LookupError> for StoreError {
    fn from(error: LookupError) -> Self {
        match error {
            LookupError::MissingApiKey => {
                Self::Unavailable("shipping directory API key is not configured".to_string())
            }
            LookupError::RequestFailed(detail) => Self::Network(detail),
            LookupError::ResponseParseFailed(detail) => Self::Decode {
                collection: "shipping",
                detail,
            },
            LookupError::CitiesNotFound => Self::CitiesNotFound,
            LookupError::WarehousesNotFound => Self::WarehousesNotFound,
            LookupError::ApiError { status, message } => {
                Self::Backend(format!("shipping directory returned {status}: {message}"))
            }
        }
    }
}
