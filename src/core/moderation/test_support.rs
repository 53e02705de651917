// Test doubles shared by the core service tests.

use super::moderation_models::{Moderator, NewSubmission, Submission, SubmissionStatus};
use super::moderation_store::{ModeratorStore, StoreError, SubmissionStore};
use crate::core::media::ContentKind;
use crate::core::transport::{ActionControl, ActionHandle, ChatTransport, DeliveryError, Recipient};
use crate::infra::moderation::InMemoryModerationStore;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// One successful outbound call.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text {
        to: Recipient,
        text: String,
        control: Option<ActionControl>,
    },
    Media {
        to: Recipient,
        kind: ContentKind,
        handle: String,
        caption: Option<String>,
    },
    Answer {
        action_id: u64,
        text: String,
    },
    Delete {
        chat_id: u64,
        message_id: u64,
    },
}

/// Records every delivered call. Failed calls are not recorded.
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    failing: Mutex<HashSet<Recipient>>,
    media_fails: AtomicBool,
    names: Mutex<HashMap<u64, String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            media_fails: AtomicBool::new(false),
            names: Mutex::new(HashMap::new()),
        }
    }

    /// Every send to this recipient fails.
    pub fn fail_recipient(&self, to: Recipient) {
        self.failing.lock().unwrap().insert(to);
    }

    /// Every media send fails.
    pub fn fail_media(&self) {
        self.media_fails.store(true, Ordering::SeqCst);
    }

    pub fn set_name(&self, user_id: u64, name: &str) {
        self.names.lock().unwrap().insert(user_id, name.to_string());
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    pub fn texts(&self) -> Vec<(Recipient, String)> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { to, text, .. } => Some((to, text)),
                _ => None,
            })
            .collect()
    }

    pub fn texts_to(&self, to: Recipient) -> Vec<String> {
        self.texts()
            .into_iter()
            .filter(|(r, _)| *r == to)
            .map(|(_, t)| t)
            .collect()
    }

    pub fn answers(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Answer { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn controls(&self) -> Vec<ActionControl> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text {
                    control: Some(c), ..
                } => Some(c),
                _ => None,
            })
            .collect()
    }

    pub fn deliveries_to(&self, to: Recipient) -> usize {
        self.sent()
            .iter()
            .filter(|s| match s {
                Sent::Text { to: r, .. } | Sent::Media { to: r, .. } => *r == to,
                _ => false,
            })
            .count()
    }

    fn check(&self, to: Recipient) -> Result<(), DeliveryError> {
        if self.failing.lock().unwrap().contains(&to) {
            return Err(DeliveryError::Transport(format!("{:?} unreachable", to)));
        }
        Ok(())
    }

    fn record(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_text(
        &self,
        to: Recipient,
        text: &str,
        control: Option<&ActionControl>,
    ) -> Result<(), DeliveryError> {
        self.check(to)?;
        self.record(Sent::Text {
            to,
            text: text.to_string(),
            control: control.cloned(),
        });
        Ok(())
    }

    async fn send_media(
        &self,
        to: Recipient,
        kind: ContentKind,
        handle: &str,
        caption: Option<&str>,
    ) -> Result<(), DeliveryError> {
        self.check(to)?;
        if self.media_fails.load(Ordering::SeqCst) {
            return Err(DeliveryError::InvalidHandle {
                kind,
                handle: handle.to_string(),
            });
        }
        self.record(Sent::Media {
            to,
            kind,
            handle: handle.to_string(),
            caption: caption.map(str::to_string),
        });
        Ok(())
    }

    async fn answer_action(&self, action: &ActionHandle, text: &str) -> Result<(), DeliveryError> {
        self.record(Sent::Answer {
            action_id: action.id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete_message(&self, chat_id: u64, message_id: u64) -> Result<(), DeliveryError> {
        self.record(Sent::Delete {
            chat_id,
            message_id,
        });
        Ok(())
    }

    async fn display_name(&self, user_id: u64) -> Result<String, DeliveryError> {
        self.names
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or_else(|| DeliveryError::Transport(format!("unknown user {}", user_id)))
    }
}

/// In-memory store that can be told to fail reads or writes, fail deletes
/// alone, or yield after each lookup so concurrent handlers interleave.
pub struct FlakyStore {
    inner: InMemoryModerationStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
    yield_on_lookup: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryModerationStore::new(),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            yield_on_lookup: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &InMemoryModerationStore {
        &self.inner
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn yield_on_lookup(&self) {
        self.yield_on_lookup.store(true, Ordering::SeqCst);
    }

    /// Clear every failure switch.
    pub fn heal(&self) {
        self.fail_reads.store(false, Ordering::SeqCst);
        self.fail_writes.store(false, Ordering::SeqCst);
        self.fail_deletes.store(false, Ordering::SeqCst);
    }

    fn read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Storage("disk I/O error".into()));
        }
        Ok(())
    }

    fn write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Storage("database is locked".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for FlakyStore {
    async fn save(&self, submission: NewSubmission) -> Result<Submission, StoreError> {
        self.write()?;
        self.inner.save(submission).await
    }

    async fn list_pending(&self) -> Result<Vec<Submission>, StoreError> {
        self.read()?;
        self.inner.list_pending().await
    }

    async fn update_status(
        &self,
        message_id: u64,
        status: SubmissionStatus,
    ) -> Result<(), StoreError> {
        self.write()?;
        self.inner.update_status(message_id, status).await
    }

    async fn delete(&self, message_id: u64) -> Result<(), StoreError> {
        self.write()?;
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Storage("database is locked".into()));
        }
        self.inner.delete(message_id).await
    }

    async fn get_by_message_id(&self, message_id: u64) -> Result<Option<Submission>, StoreError> {
        self.read()?;
        let found = self.inner.get_by_message_id(message_id).await;
        if self.yield_on_lookup.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        found
    }
}

#[async_trait]
impl ModeratorStore for FlakyStore {
    async fn add_moderator(&self, user_id: u64, display_name: &str) -> Result<(), StoreError> {
        self.write()?;
        self.inner.add_moderator(user_id, display_name).await
    }

    async fn remove_moderator(&self, user_id: u64) -> Result<bool, StoreError> {
        self.write()?;
        self.inner.remove_moderator(user_id).await
    }

    async fn is_moderator(&self, user_id: u64) -> Result<bool, StoreError> {
        self.read()?;
        self.inner.is_moderator(user_id).await
    }

    async fn list_moderators(&self) -> Result<Vec<Moderator>, StoreError> {
        self.read()?;
        self.inner.list_moderators().await
    }
}

/// Fixed reference time so orderings are deterministic.
pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub fn new_submission(
    message_id: u64,
    kind: ContentKind,
    handle: &str,
    text: &str,
    created_at: DateTime<Utc>,
) -> NewSubmission {
    NewSubmission {
        message_id,
        kind,
        content_handle: handle.to_string(),
        text: text.to_string(),
        created_at,
        channel_id: CHANNEL_ID,
    }
}

pub fn sample_submission(message_id: u64, kind: ContentKind, handle: &str, text: &str) -> Submission {
    Submission {
        id: 1,
        message_id,
        kind,
        content_handle: handle.to_string(),
        text: text.to_string(),
        status: SubmissionStatus::Pending,
        created_at: at(0),
        channel_id: CHANNEL_ID,
    }
}

pub const OWNER_ID: u64 = 1;
pub const CHANNEL_ID: u64 = 9000;
