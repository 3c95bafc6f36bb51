//! Single-entity store engine.
//!
//! Detail screens work on one document at a time: fetch it, mutate it, watch
//! per-operation status. [`EntityCore`] owns that state machine; the concrete
//! stores ([`BookStore`](crate::books::BookStore),
//! [`OrderStore`](crate::orders::OrderStore),
//! [`ProfileStore`](crate::profile::ProfileStore)) compose it with a gateway
//! and expose typed operations.
//!
//! Each operation kind has its own status slot, so a screen can render a
//! delete spinner while a fetch error is still displayed. Settlement is
//! fenced the same way list loads are: [`EntityCore::set_id`] bumps an epoch,
//! and anything staged before the bump settles into the void.

use std::sync::Arc;

use tokio::sync::RwLock;

use bookstore_core::error::StoreError;
use bookstore_core::status::{EntityStatus, OperationResponse};

/// Operations an entity store can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityOperation {
    /// Fetch the entity by id.
    Fetch,
    /// Create a new entity.
    Create,
    /// Update fields of the entity.
    Update,
    /// Delete the entity.
    Delete,
    /// Update only the entity's lifecycle status.
    UpdateStatus,
}

impl EntityOperation {
    /// Label used in logs and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::UpdateStatus => "update-status",
        }
    }

    /// Status shown while this operation is in flight.
    #[must_use]
    pub const fn running_status(self) -> EntityStatus {
        match self {
            Self::Fetch => EntityStatus::Loading,
            Self::Create => EntityStatus::Creating,
            Self::Update | Self::UpdateStatus => EntityStatus::Updating,
            Self::Delete => EntityStatus::Deleting,
        }
    }

    const fn is_read(self) -> bool {
        matches!(self, Self::Fetch)
    }
}

/// Status and last outcome of one operation kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationSlot {
    /// Whether the operation is in flight.
    pub status: EntityStatus,
    /// Outcome of the last settled run.
    pub response: Option<OperationResponse>,
}

impl OperationSlot {
    /// Whether no run is in flight.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.status, EntityStatus::Idle)
    }

    fn begin(&mut self, op: EntityOperation) {
        self.status = op.running_status();
        self.response = None;
    }

    fn settle(&mut self, result: Result<(), StoreError>) {
        self.status = EntityStatus::Idle;
        self.response = Some(result.into());
    }

    fn clear(&mut self) {
        self.status = EntityStatus::Idle;
        self.response = None;
    }
}

/// One [`OperationSlot`] per operation kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationSlots {
    /// Fetch slot.
    pub fetch: OperationSlot,
    /// Create slot.
    pub create: OperationSlot,
    /// Update slot.
    pub update: OperationSlot,
    /// Delete slot.
    pub delete: OperationSlot,
    /// Status-update slot.
    pub update_status: OperationSlot,
}

impl OperationSlots {
    /// The slot for `op`.
    #[must_use]
    pub const fn slot(&self, op: EntityOperation) -> &OperationSlot {
        match op {
            EntityOperation::Fetch => &self.fetch,
            EntityOperation::Create => &self.create,
            EntityOperation::Update => &self.update,
            EntityOperation::Delete => &self.delete,
            EntityOperation::UpdateStatus => &self.update_status,
        }
    }

    fn slot_mut(&mut self, op: EntityOperation) -> &mut OperationSlot {
        match op {
            EntityOperation::Fetch => &mut self.fetch,
            EntityOperation::Create => &mut self.create,
            EntityOperation::Update => &mut self.update,
            EntityOperation::Delete => &mut self.delete,
            EntityOperation::UpdateStatus => &mut self.update_status,
        }
    }

    fn clear_all(&mut self) {
        self.fetch.clear();
        self.create.clear();
        self.update.clear();
        self.delete.clear();
        self.update_status.clear();
    }
}

/// State owned by an entity store.
#[derive(Debug, Clone)]
pub struct EntityState<I, T> {
    /// Id the store is pointed at.
    pub id: Option<I>,
    /// The entity, once fetched or created.
    pub entity: Option<T>,
    /// Per-operation status and outcomes.
    pub operations: OperationSlots,
    epoch: u64,
}

impl<I, T> Default for EntityState<I, T> {
    fn default() -> Self {
        Self {
            id: None,
            entity: None,
            operations: OperationSlots::default(),
            epoch: 0,
        }
    }
}

/// Shared engine behind the typed entity stores.
pub(crate) struct EntityCore<I, T> {
    name: &'static str,
    state: Arc<RwLock<EntityState<I, T>>>,
}

impl<I, T> EntityCore<I, T>
where
    I: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Arc::new(RwLock::new(EntityState::default())),
        }
    }

    pub(crate) async fn state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&EntityState<I, T>) -> R,
    {
        let state = self.state.read().await;
        f(&*state)
    }

    /// Points the store at a new id, clearing the entity and every slot and
    /// fencing out whatever was in flight for the previous id.
    pub(crate) async fn set_id(&self, id: Option<I>) {
        let mut state = self.state.write().await;
        state.id = id;
        state.entity = None;
        state.operations.clear_all();
        state.epoch += 1;
        tracing::debug!(store = self.name, "Entity store repointed");
        metrics::counter!("sync.store.reset", "store" => self.name).increment(1);
    }

    /// Clears one operation slot so its banner disappears.
    ///
    /// The clear is unconditional: if that operation is still in flight its
    /// eventual settlement will overwrite the cleared slot, which mirrors how
    /// the screens have always dismissed a stale banner.
    pub(crate) async fn reset_operation(&self, op: EntityOperation) {
        let mut state = self.state.write().await;
        state.operations.slot_mut(op).clear();
    }

    /// Stages `op`, returning the fencing epoch, or `None` when that
    /// operation is already in flight.
    pub(crate) async fn begin(&self, op: EntityOperation) -> Option<u64> {
        let mut state = self.state.write().await;
        if !state.operations.slot(op).is_idle() {
            tracing::debug!(
                store = self.name,
                operation = op.as_str(),
                "Operation skipped, already in flight"
            );
            metrics::counter!("sync.load.skipped", "store" => self.name, "reason" => "busy")
                .increment(1);
            return None;
        }
        state.operations.slot_mut(op).begin(op);
        Some(state.epoch)
    }

    /// Stages `op` against the current id.
    ///
    /// Returns `None` when the slot is busy or no id is set; the latter is a
    /// warned no-op rather than an error.
    pub(crate) async fn begin_for_id(&self, op: EntityOperation) -> Option<(u64, I)> {
        let mut state = self.state.write().await;
        let Some(id) = state.id.clone() else {
            tracing::warn!(
                store = self.name,
                operation = op.as_str(),
                "Operation skipped, no id set"
            );
            metrics::counter!("sync.load.skipped", "store" => self.name, "reason" => "no-id")
                .increment(1);
            return None;
        };
        if !state.operations.slot(op).is_idle() {
            tracing::debug!(
                store = self.name,
                operation = op.as_str(),
                "Operation skipped, already in flight"
            );
            metrics::counter!("sync.load.skipped", "store" => self.name, "reason" => "busy")
                .increment(1);
            return None;
        }
        state.operations.slot_mut(op).begin(op);
        Some((state.epoch, id))
    }

    /// Applies a mutation only if `epoch` is still current.
    pub(crate) async fn apply<F>(&self, epoch: u64, f: F) -> bool
    where
        F: FnOnce(&mut EntityState<I, T>),
    {
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            tracing::debug!(store = self.name, "Discarding fenced mutation");
            metrics::counter!("sync.stale.dropped", "store" => self.name).increment(1);
            return false;
        }
        f(&mut *state);
        true
    }

    /// Settles `op`, running `on_success` under the same lock when the
    /// operation succeeded. Fenced: a stale settlement is dropped whole.
    pub(crate) async fn settle<F>(
        &self,
        epoch: u64,
        op: EntityOperation,
        result: Result<(), StoreError>,
        on_success: F,
    ) -> bool
    where
        F: FnOnce(&mut EntityState<I, T>),
    {
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            tracing::warn!(
                store = self.name,
                operation = op.as_str(),
                "Discarding settlement from a superseded operation"
            );
            metrics::counter!("sync.stale.dropped", "store" => self.name).increment(1);
            return false;
        }
        let succeeded = result.is_ok();
        if let Err(error) = &result {
            tracing::warn!(
                store = self.name,
                operation = op.as_str(),
                error = %error,
                "Operation failed"
            );
        } else {
            tracing::debug!(
                store = self.name,
                operation = op.as_str(),
                "Operation completed"
            );
        }
        let metric = match (op.is_read(), succeeded) {
            (true, true) => "sync.load.completed",
            (true, false) => "sync.load.failed",
            (false, true) => "sync.mutation.completed",
            (false, false) => "sync.mutation.failed",
        };
        metrics::counter!(metric, "store" => self.name, "operation" => op.as_str()).increment(1);
        state.operations.slot_mut(op).settle(result);
        if succeeded {
            on_success(&mut *state);
        }
        true
    }
}

impl<I, T> Clone for EntityCore<I, T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            state: Arc::clone(&self.state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn begin_guards_per_slot() {
        let core: EntityCore<String, String> = EntityCore::new("test");
        let first = core.begin(EntityOperation::Create).await;
        assert!(first.is_some());

        // Same slot is busy, a different slot is free.
        assert!(core.begin(EntityOperation::Create).await.is_none());
        assert!(core.begin(EntityOperation::Delete).await.is_some());
    }

    #[tokio::test]
    async fn settle_writes_slot_and_applies_success_closure() {
        let core: EntityCore<String, String> = EntityCore::new("test");
        core.set_id(Some("id-1".to_string())).await;

        let (epoch, id) = core
            .begin_for_id(EntityOperation::Fetch)
            .await
            .unwrap_or_else(|| unreachable!("id was just set"));
        assert_eq!(id, "id-1");

        let applied = core
            .settle(epoch, EntityOperation::Fetch, Ok(()), |state| {
                state.entity = Some("loaded".to_string());
            })
            .await;
        assert!(applied);

        core.state(|s| {
            assert_eq!(s.entity.as_deref(), Some("loaded"));
            assert!(s.operations.fetch.is_idle());
            assert_eq!(s.operations.fetch.response, Some(OperationResponse::Success));
        })
        .await;
    }

    #[tokio::test]
    async fn set_id_fences_out_prior_operations() {
        let core: EntityCore<String, String> = EntityCore::new("test");
        core.set_id(Some("id-1".to_string())).await;
        let Some((epoch, _)) = core.begin_for_id(EntityOperation::Fetch).await else {
            unreachable!("id was just set");
        };

        core.set_id(Some("id-2".to_string())).await;

        let applied = core
            .settle(epoch, EntityOperation::Fetch, Ok(()), |state| {
                state.entity = Some("stale".to_string());
            })
            .await;
        assert!(!applied, "stale settlement must be dropped");
        core.state(|s| {
            assert!(s.entity.is_none());
            assert!(s.operations.fetch.is_idle(), "set_id cleared the staged slot");
        })
        .await;
    }

    #[tokio::test]
    async fn begin_without_id_is_a_no_op() {
        let core: EntityCore<String, String> = EntityCore::new("test");
        assert!(core.begin_for_id(EntityOperation::Fetch).await.is_none());
        core.state(|s| assert!(s.operations.fetch.is_idle())).await;
    }

    #[tokio::test]
    async fn failure_lands_in_the_slot_response() {
        let core: EntityCore<String, String> = EntityCore::new("test");
        let epoch = core
            .begin(EntityOperation::Update)
            .await
            .unwrap_or_else(|| unreachable!("slot was idle"));

        core.settle(
            epoch,
            EntityOperation::Update,
            Err(StoreError::Network("offline".to_string())),
            |_| {},
        )
        .await;

        core.state(|s| {
            assert_eq!(
                s.operations.update.response,
                Some(OperationResponse::Failure(StoreError::Network(
                    "offline".to_string()
                )))
            );
            assert!(s.operations.update.is_idle());
        })
        .await;
    }
}
