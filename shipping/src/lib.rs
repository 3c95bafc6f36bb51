//! # Nova Post Directory Client
//!
//! HTTP client for the Nova Post shipping directory, covering the two lookups
//! the checkout flow needs: city search, then warehouse search within the
//! chosen city.
//!
//! The client implements [`bookstore_core::gateway::ShippingDirectory`], so
//! the shipping picker store drives it exactly like the in-memory directory
//! used in tests.
//!
//! ## Example
//!
//! ```no_run
//! use bookstore_shipping::NovaPostClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create client from NOVA_POST_API_KEY environment variable
//!     let client = NovaPostClient::from_env()?;
//!
//!     // Search cities as the customer types
//!     let cities = client.cities("Kyi", 20).await?;
//!
//!     // List warehouses within the first match
//!     let warehouses = client.warehouses(&cities[0].reference, "", 20).await?;
//!
//!     println!("{} warehouses", warehouses.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod lookup;

// Re-export main types for convenience
pub use client::NovaPostClient;
pub use error::LookupError;
pub use lookup::{LookupEnvelope, LookupRequest};
