// Storage ports for submissions and moderators.
//
// Implementations live in infra/moderation. Each call is atomic on its own;
// nothing here spans more than one row or one call.

use super::moderation_models::{Moderator, NewSubmission, Submission, SubmissionStatus};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Submission {0} not found")]
    NotFound(u64),

    #[error("User {0} is already a moderator")]
    DuplicateModerator(u64),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Insert or overwrite the submission for its transport message id.
    /// A redelivered message never creates a second row.
    async fn save(&self, submission: NewSubmission) -> Result<Submission, StoreError>;

    /// Pending submissions, oldest first. The returned list is a snapshot.
    async fn list_pending(&self) -> Result<Vec<Submission>, StoreError>;

    /// Fails with `StoreError::NotFound` when no row matches.
    async fn update_status(
        &self,
        message_id: u64,
        status: SubmissionStatus,
    ) -> Result<(), StoreError>;

    /// Remove the row; absent rows are not an error.
    async fn delete(&self, message_id: u64) -> Result<(), StoreError>;

    async fn get_by_message_id(&self, message_id: u64) -> Result<Option<Submission>, StoreError>;
}

#[async_trait]
pub trait ModeratorStore: Send + Sync {
    /// Fails with `StoreError::DuplicateModerator` if the user is already stored.
    async fn add_moderator(&self, user_id: u64, display_name: &str) -> Result<(), StoreError>;

    /// Returns whether a row was removed.
    async fn remove_moderator(&self, user_id: u64) -> Result<bool, StoreError>;

    async fn is_moderator(&self, user_id: u64) -> Result<bool, StoreError>;

    async fn list_moderators(&self) -> Result<Vec<Moderator>, StoreError>;
}
