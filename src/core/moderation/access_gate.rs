// Authorization gate for moderator-only actions.

use super::moderation_store::{ModeratorStore, StoreError};
use std::sync::Arc;

/// Decides who may moderate.
///
/// The owner is checked by identity, never by store membership, so the owner
/// stays authorized even when seeding the owner row failed.
pub struct AccessGate<S: ModeratorStore> {
    store: Arc<S>,
    owner_id: u64,
}

impl<S: ModeratorStore> Clone for AccessGate<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            owner_id: self.owner_id,
        }
    }
}

impl<S: ModeratorStore> AccessGate<S> {
    pub fn new(store: Arc<S>, owner_id: u64) -> Self {
        Self { store, owner_id }
    }

    pub fn owner_id(&self) -> u64 {
        self.owner_id
    }

    pub fn is_owner(&self, user_id: u64) -> bool {
        user_id == self.owner_id
    }

    /// Owner, or a stored moderator, surfacing storage failures.
    pub async fn check_moderator(&self, user_id: u64) -> Result<bool, StoreError> {
        if self.is_owner(user_id) {
            return Ok(true);
        }
        self.store.is_moderator(user_id).await
    }

    /// Owner, or a stored moderator. A storage failure denies access.
    pub async fn is_moderator(&self, user_id: u64) -> bool {
        match self.check_moderator(user_id).await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Moderator lookup failed");
                false
            }
        }
    }
}
