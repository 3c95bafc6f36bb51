//! The signed-in user's profile, with optimistic partial updates.

use bookstore_core::contract::Collection;
use bookstore_core::gateway::CatalogGateway;
use bookstore_core::model::{Profile, ProfileField, UserId};

use crate::entity::{EntityCore, EntityOperation, EntityState};

/// Profile store keyed by the session user.
///
/// [`update`](Self::update) merges the edits into the local copy first, then
/// writes the changed fields and refetches to pick up anything the backend
/// derived. A failed write rolls the merge back; a failed refetch keeps the
/// merged copy, which already reflects what was written.
pub struct ProfileStore<G: CatalogGateway> {
    gateway: G,
    core: EntityCore<UserId, Profile>,
}

impl<G: CatalogGateway> ProfileStore<G> {
    /// Creates an unscoped profile store.
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            core: EntityCore::new("profile"),
        }
    }

    /// Read current state via a closure.
    pub async fn state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&EntityState<UserId, Profile>) -> R,
    {
        self.core.state(f).await
    }

    /// The profile, once fetched.
    pub async fn profile(&self) -> Option<Profile> {
        self.core.state(|s| s.entity.clone()).await
    }

    /// Repoints the store at a user, clearing whatever it held before.
    pub async fn set_user(&self, user: Option<UserId>) {
        self.core.set_id(user).await;
    }

    /// Fetches the scoped user's profile.
    pub async fn fetch(&self) {
        let Some((epoch, id)) = self.core.begin_for_id(EntityOperation::Fetch).await else {
            return;
        };
        match self
            .gateway
            .get::<Profile>(Collection::Profiles, id.as_str())
            .await
        {
            Ok(profile) => {
                self.core
                    .settle(epoch, EntityOperation::Fetch, Ok(()), |state| {
                        state.entity = Some(profile);
                    })
                    .await;
            }
            Err(error) => {
                self.core
                    .settle(epoch, EntityOperation::Fetch, Err(error), |_| {})
                    .await;
            }
        }
    }

    /// Applies field edits optimistically and reconciles with the backend.
    pub async fn update(&self, fields: Vec<ProfileField>) {
        if fields.is_empty() {
            tracing::debug!(store = "profile", "Empty edit ignored");
            return;
        }
        let Some((epoch, id)) = self.core.begin_for_id(EntityOperation::Update).await else {
            return;
        };
        let mut previous = None;
        self.core
            .apply(epoch, |state| {
                if let Some(profile) = &mut state.entity {
                    previous = Some(profile.clone());
                    for field in &fields {
                        field.apply(profile);
                    }
                }
            })
            .await;
        match self
            .gateway
            .update_fields(Collection::Profiles, id.as_str(), ProfileField::patch(&fields))
            .await
        {
            Ok(()) => {
                // Reconcile with what the backend actually stored. If the
                // refetch fails the merged copy stays, it already matches the
                // fields that were written.
                match self
                    .gateway
                    .get::<Profile>(Collection::Profiles, id.as_str())
                    .await
                {
                    Ok(fresh) => {
                        self.core
                            .settle(epoch, EntityOperation::Update, Ok(()), |state| {
                                state.entity = Some(fresh);
                            })
                            .await;
                    }
                    Err(error) => {
                        tracing::warn!(
                            store = "profile",
                            error = %error,
                            "Reconciling refetch failed, keeping merged copy"
                        );
                        self.core
                            .settle(epoch, EntityOperation::Update, Ok(()), |_| {})
                            .await;
                    }
                }
            }
            Err(error) => {
                if let Some(profile) = previous {
                    self.core
                        .apply(epoch, |state| state.entity = Some(profile))
                        .await;
                }
                self.core
                    .settle(epoch, EntityOperation::Update, Err(error), |_| {})
                    .await;
            }
        }
    }

    /// Clears one settled operation banner.
    pub async fn reset_operation(&self, op: EntityOperation) {
        self.core.reset_operation(op).await;
    }

    /// Clears the store entirely.
    pub async fn reset(&self) {
        self.core.set_id(None).await;
    }
}

impl<G: CatalogGateway> Clone for ProfileStore<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            core: self.core.clone(),
        }
    }
}
