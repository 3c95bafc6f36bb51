//! Operation status vocabulary shared by every store.
//!
//! A store exposes exactly one in-flight indicator (its status enum) and one
//! record of the last settled operation (an optional [`OperationResponse`]).
//! Views render from those two fields alone, so the enums here are the whole
//! contract between the data layer and the presentation layer.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// What a paged list store is currently doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListStatus {
    /// No request in flight.
    #[default]
    Idle,
    /// First page (or a filter change) is being fetched.
    Loading,
    /// A subsequent page is being appended.
    Fetching,
    /// The list is being re-fetched from the top without clearing it first.
    Refreshing,
}

impl ListStatus {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Fetching => "fetching",
            Self::Refreshing => "refreshing",
        }
    }

    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl std::fmt::Display for ListStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a single-entity store is currently doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityStatus {
    /// No operation in flight.
    #[default]
    Idle,
    /// The entity is being fetched.
    Loading,
    /// A new entity is being created.
    Creating,
    /// An existing entity is being updated.
    Updating,
    /// The entity is being deleted.
    Deleting,
}

impl EntityStatus {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Creating => "creating",
            Self::Updating => "updating",
            Self::Deleting => "deleting",
        }
    }

    /// Whether an operation is in flight.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl std::fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the most recently settled operation.
///
/// Stores clear this when a new operation starts and write it exactly once
/// when that operation settles, so a view that observes `Some(...)` alongside
/// an idle status is looking at a completed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResponse {
    /// The operation completed.
    Success,
    /// The operation failed with the given error.
    Failure(StoreError),
}

impl OperationResponse {
    /// Whether the operation completed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Whether the operation failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// The failure, if there was one.
    #[must_use]
    pub const fn error(&self) -> Option<&StoreError> {
        match self {
            Self::Success => None,
            Self::Failure(error) => Some(error),
        }
    }
}

impl From<Result<(), StoreError>> for OperationResponse {
    fn from(result: Result<(), StoreError>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(error) => Self::Failure(error),
        }
    }
}

/// Value snapshot of a paged list, handed across the view boundary.
///
/// Views never hold the store's lock; they receive owned copies like this one
/// and re-read after awaiting any store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshot<T> {
    /// Accumulated items in backend order.
    pub items: Vec<T>,
    /// Current activity indicator.
    pub status: ListStatus,
    /// Outcome of the last settled load, if any.
    pub response: Option<OperationResponse>,
    /// Whether another page is worth requesting.
    pub has_more: bool,
}

impl<T> Default for ListSnapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: ListStatus::Idle,
            response: None,
            has_more: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_covers_every_non_idle_status() {
        assert!(!ListStatus::Idle.is_busy());
        assert!(ListStatus::Loading.is_busy());
        assert!(ListStatus::Fetching.is_busy());
        assert!(ListStatus::Refreshing.is_busy());

        assert!(!EntityStatus::Idle.is_busy());
        assert!(EntityStatus::Loading.is_busy());
        assert!(EntityStatus::Deleting.is_busy());
    }

    #[test]
    fn response_from_result() {
        let ok: OperationResponse = Ok(()).into();
        assert!(ok.is_success());
        assert_eq!(ok.error(), None);

        let failed: OperationResponse = Err(StoreError::BookNotFound).into();
        assert!(failed.is_failure());
        assert_eq!(failed.error(), Some(&StoreError::BookNotFound));
    }

    #[test]
    fn status_labels() {
        assert_eq!(ListStatus::Fetching.as_str(), "fetching");
        assert_eq!(EntityStatus::Updating.to_string(), "updating");
    }
}
