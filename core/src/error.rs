//! Error types for the bookstore data layer.
//!
//! Remote failures reach the stores in exactly one shape: [`StoreError`].
//! Gateway implementations call [`StoreError::classify`] on raw backend error
//! text at ingestion, so the rest of the system switches on structured kinds
//! rather than searching message substrings. The historical wire contract is
//! preserved at the edges: the known error-code fragments double as the
//! localization keys the presentation layer already has string tables for.

use thiserror::Error;

/// Errors surfaced by the data layer.
///
/// Every variant is cheap to clone because operation responses retain the
/// error until the next operation overwrites it, and any number of view
/// subscribers may read it through selectors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The remote call never completed (connectivity, timeout at the
    /// transport, DNS).
    #[error("network failure: {0}")]
    Network(String),

    /// The backend rejected the call with text that matched no known
    /// error-code fragment.
    #[error("backend error: {0}")]
    Backend(String),

    /// A document arrived but could not be decoded into the expected shape.
    #[error("failed to decode {collection} document: {detail}")]
    Decode {
        /// Wire name of the collection the document came from.
        collection: &'static str,
        /// Decoder message.
        detail: String,
    },

    /// The requested book does not exist.
    #[error("book not found")]
    BookNotFound,

    /// The requested order does not exist.
    #[error("order not found")]
    OrderNotFound,

    /// The requested profile does not exist.
    #[error("profile not found")]
    ProfileNotFound,

    /// The uploaded payload is not a usable image.
    #[error("invalid image object")]
    InvalidImage,

    /// The shipping directory matched no cities for the query.
    #[error("no cities matched the query")]
    CitiesNotFound,

    /// The shipping directory matched no warehouses for the query.
    #[error("no warehouses matched the query")]
    WarehousesNotFound,

    /// A collaborator is misconfigured or temporarily unusable.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Classifies raw backend error text into a structured kind.
    ///
    /// The backend signals domain failures as rejected calls whose message
    /// contains a fixed code fragment (for example
    /// `"image/invalid-image-object"`). Gateways call this once at ingestion;
    /// text that matches no known fragment becomes [`StoreError::Backend`]
    /// with the message carried verbatim.
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        if raw.contains("image/invalid-image-object") {
            return Self::InvalidImage;
        }
        if raw.contains("book-not-found") {
            return Self::BookNotFound;
        }
        if raw.contains("order-not-found") {
            return Self::OrderNotFound;
        }
        if raw.contains("profile-not-found") {
            return Self::ProfileNotFound;
        }
        if raw.contains("cities-not-found") {
            return Self::CitiesNotFound;
        }
        if raw.contains("warehouses-not-found") {
            return Self::WarehousesNotFound;
        }
        Self::Backend(raw.to_string())
    }

    /// Stable key the presentation layer localizes on.
    ///
    /// The kinds that originate from coded backend messages reuse their code
    /// fragment as the key, so existing string tables keep working.
    #[must_use]
    pub const fn localization_key(&self) -> &'static str {
        match self {
            Self::Network(_) => "errors.network",
            Self::Backend(_) => "errors.backend",
            Self::Decode { .. } => "errors.decode",
            Self::BookNotFound => "book-not-found",
            Self::OrderNotFound => "order-not-found",
            Self::ProfileNotFound => "profile-not-found",
            Self::InvalidImage => "image/invalid-image-object",
            Self::CitiesNotFound => "cities-not-found",
            Self::WarehousesNotFound => "warehouses-not-found",
            Self::Unavailable(_) => "errors.unavailable",
        }
    }

    /// Whether this error reports a missing entity or an empty lookup.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::BookNotFound
                | Self::OrderNotFound
                | Self::ProfileNotFound
                | Self::CitiesNotFound
                | Self::WarehousesNotFound
        )
    }

    /// Whether this error is a transport-level failure.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_maps_known_fragments() {
        assert_eq!(
            StoreError::classify("Error: book-not-found (id=42)"),
            StoreError::BookNotFound
        );
        assert_eq!(
            StoreError::classify("order-not-found"),
            StoreError::OrderNotFound
        );
        assert_eq!(
            StoreError::classify("rejected: profile-not-found"),
            StoreError::ProfileNotFound
        );
        assert_eq!(
            StoreError::classify("upload failed: image/invalid-image-object"),
            StoreError::InvalidImage
        );
        assert_eq!(
            StoreError::classify("cities-not-found"),
            StoreError::CitiesNotFound
        );
        assert_eq!(
            StoreError::classify("warehouses-not-found"),
            StoreError::WarehousesNotFound
        );
    }

    #[test]
    fn classify_passes_unknown_text_through() {
        let error = StoreError::classify("quota exceeded");
        assert_eq!(error, StoreError::Backend("quota exceeded".to_string()));
    }

    #[test]
    fn localization_keys_match_wire_fragments() {
        assert_eq!(StoreError::BookNotFound.localization_key(), "book-not-found");
        assert_eq!(
            StoreError::InvalidImage.localization_key(),
            "image/invalid-image-object"
        );
        assert_eq!(
            StoreError::CitiesNotFound.localization_key(),
            "cities-not-found"
        );
        assert_eq!(
            StoreError::Network("offline".to_string()).localization_key(),
            "errors.network"
        );
    }

    #[test]
    fn classify_then_key_round_trips_for_coded_fragments() {
        for fragment in [
            "book-not-found",
            "order-not-found",
            "profile-not-found",
            "image/invalid-image-object",
            "cities-not-found",
            "warehouses-not-found",
        ] {
            let error = StoreError::classify(fragment);
            assert_eq!(error.localization_key(), fragment);
        }
    }

    #[test]
    fn not_found_predicate() {
        assert!(StoreError::BookNotFound.is_not_found());
        assert!(StoreError::CitiesNotFound.is_not_found());
        assert!(!StoreError::Network("down".to_string()).is_not_found());
        assert!(StoreError::Network("down".to_string()).is_network());
    }
}
