//! Tunables shared by every store.

use std::time::Duration;

/// Configuration for the data-layer stores.
///
/// One instance is built at session start and cloned into every store, so a
/// screen that needs a different page size constructs its store with an
/// adjusted copy instead of mutating shared state.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Items requested per page.
    pub page_size: usize,
    /// Quiet window before a filter change triggers a reload.
    pub debounce: Duration,
    /// Maximum results per shipping-directory lookup.
    pub lookup_limit: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            debounce: Duration::from_millis(400),
            lookup_limit: 20,
        }
    }
}

impl SyncConfig {
    /// Builder: Set page size
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Builder: Set debounce window
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Builder: Set lookup limit
    #[must_use]
    pub const fn with_lookup_limit(mut self, lookup_limit: usize) -> Self {
        self.lookup_limit = lookup_limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_storefront() {
        let config = SyncConfig::default();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.debounce, Duration::from_millis(400));
        assert_eq!(config.lookup_limit, 20);
    }

    #[test]
    fn builders_override_single_fields() {
        let config = SyncConfig::default()
            .with_page_size(5)
            .with_debounce(Duration::from_millis(50));
        assert_eq!(config.page_size, 5);
        assert_eq!(config.debounce, Duration::from_millis(50));
        assert_eq!(config.lookup_limit, 20);
    }
}
