// In-memory implementation of the moderation stores.
//
// Test backend for the services. Same contract as the SQLite store: keyed by
// transport message id, pending listed oldest first.

use crate::core::moderation::{
    Moderator, ModeratorStore, NewSubmission, StoreError, Submission, SubmissionStatus,
    SubmissionStore,
};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct InMemoryModerationStore {
    /// Maps transport message id -> submission
    submissions: DashMap<u64, Submission>,
    /// Maps user id -> moderator
    moderators: DashMap<u64, Moderator>,
    next_id: AtomicU64,
}

impl InMemoryModerationStore {
    pub fn new() -> Self {
        Self {
            submissions: DashMap::new(),
            moderators: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for InMemoryModerationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionStore for InMemoryModerationStore {
    async fn save(&self, submission: NewSubmission) -> Result<Submission, StoreError> {
        // entry() holds the shard lock, so a concurrent redelivery can't sneak in a second row
        let stored = match self.submissions.entry(submission.message_id) {
            Entry::Occupied(mut existing) => {
                let row = existing.get_mut();
                row.kind = submission.kind;
                row.content_handle = submission.content_handle;
                row.text = submission.text;
                row.created_at = submission.created_at;
                row.channel_id = submission.channel_id;
                row.status = SubmissionStatus::Pending;
                row.clone()
            }
            Entry::Vacant(slot) => {
                let row = Submission {
                    id: self.allocate_id(),
                    message_id: submission.message_id,
                    kind: submission.kind,
                    content_handle: submission.content_handle,
                    text: submission.text,
                    status: SubmissionStatus::Pending,
                    created_at: submission.created_at,
                    channel_id: submission.channel_id,
                };
                slot.insert(row.clone());
                row
            }
        };

        Ok(stored)
    }

    async fn list_pending(&self) -> Result<Vec<Submission>, StoreError> {
        let mut pending: Vec<Submission> = self
            .submissions
            .iter()
            .filter(|entry| entry.status == SubmissionStatus::Pending)
            .map(|entry| entry.value().clone())
            .collect();

        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(pending)
    }

    async fn update_status(
        &self,
        message_id: u64,
        status: SubmissionStatus,
    ) -> Result<(), StoreError> {
        match self.submissions.get_mut(&message_id) {
            Some(mut row) => {
                row.status = status;
                Ok(())
            }
            None => Err(StoreError::NotFound(message_id)),
        }
    }

    async fn delete(&self, message_id: u64) -> Result<(), StoreError> {
        self.submissions.remove(&message_id);
        Ok(())
    }

    async fn get_by_message_id(&self, message_id: u64) -> Result<Option<Submission>, StoreError> {
        Ok(self.submissions.get(&message_id).map(|row| row.clone()))
    }
}

#[async_trait]
impl ModeratorStore for InMemoryModerationStore {
    async fn add_moderator(&self, user_id: u64, display_name: &str) -> Result<(), StoreError> {
        match self.moderators.entry(user_id) {
            Entry::Occupied(_) => Err(StoreError::DuplicateModerator(user_id)),
            Entry::Vacant(slot) => {
                slot.insert(Moderator {
                    id: self.allocate_id(),
                    user_id,
                    display_name: display_name.to_string(),
                });
                Ok(())
            }
        }
    }

    async fn remove_moderator(&self, user_id: u64) -> Result<bool, StoreError> {
        Ok(self.moderators.remove(&user_id).is_some())
    }

    async fn is_moderator(&self, user_id: u64) -> Result<bool, StoreError> {
        Ok(self.moderators.contains_key(&user_id))
    }

    async fn list_moderators(&self) -> Result<Vec<Moderator>, StoreError> {
        let mut moderators: Vec<Moderator> =
            self.moderators.iter().map(|m| m.value().clone()).collect();
        moderators.sort_by_key(|m| m.id);
        Ok(moderators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::media::ContentKind;
    use crate::core::moderation::test_support::{at, new_submission};

    #[tokio::test]
    async fn test_save_is_idempotent_per_message() {
        let store = InMemoryModerationStore::new();

        let first = store
            .save(new_submission(42, ContentKind::Text, "", "first", at(0)))
            .await
            .unwrap();
        let second = store
            .save(new_submission(42, ContentKind::Photo, "h", "second", at(5)))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        let pending = store.list_pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].text, "second");
        assert_eq!(pending[0].kind, ContentKind::Photo);
        assert_eq!(pending[0].created_at, at(5));
    }

    #[tokio::test]
    async fn test_pending_only_and_ordered() {
        let store = InMemoryModerationStore::new();
        store
            .save(new_submission(3, ContentKind::Text, "", "c", at(3)))
            .await
            .unwrap();
        store
            .save(new_submission(1, ContentKind::Text, "", "a", at(1)))
            .await
            .unwrap();
        store
            .save(new_submission(2, ContentKind::Text, "", "b", at(2)))
            .await
            .unwrap();
        store
            .update_status(2, SubmissionStatus::Rejected)
            .await
            .unwrap();

        let ids: Vec<u64> = store
            .list_pending()
            .await
            .unwrap()
            .iter()
            .map(|s| s.message_id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_missing_rows_degrade_gracefully() {
        let store = InMemoryModerationStore::new();

        assert!(matches!(
            store.update_status(9, SubmissionStatus::Approved).await,
            Err(StoreError::NotFound(9))
        ));
        assert!(store.delete(9).await.is_ok());
        assert!(store.get_by_message_id(9).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_moderators_are_unique() {
        let store = InMemoryModerationStore::new();

        store.add_moderator(555, "alice").await.unwrap();
        assert!(matches!(
            store.add_moderator(555, "alice again").await,
            Err(StoreError::DuplicateModerator(555))
        ));
        assert!(store.is_moderator(555).await.unwrap());

        assert!(store.remove_moderator(555).await.unwrap());
        assert!(!store.remove_moderator(555).await.unwrap());
        assert!(store.list_moderators().await.unwrap().is_empty());
    }
}
