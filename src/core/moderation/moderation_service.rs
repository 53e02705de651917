// Moderation service - presents the oldest pending submission and applies
// approve/reject decisions.
//
// Flow of a decision:
//   pending --approve--> approved (published, then row deleted)
//   pending --reject---> rejected (row deleted)
//
// NO Discord dependencies here - outbound traffic goes through ChatTransport.

use super::access_gate::AccessGate;
use super::moderation_models::{Submission, SubmissionStatus, SuggestionConfig, Verdict};
use super::moderation_store::{ModeratorStore, StoreError, SubmissionStore};
use crate::core::media::{deliver_for_review, publish};
use crate::core::transport::{
    answer, notify, ActionControl, ButtonTone, ChatTransport, InboundAction, Recipient,
};
use std::sync::Arc;

const NO_ACCESS: &str = "❌ You don't have access to this feature.";
const ACTION_NO_ACCESS: &str = "❌ You don't have access.";
const QUEUE_LOAD_FAILED: &str = "❌ Failed to load suggestions. Please try again later.";
const QUEUE_EMPTY: &str = "✅ No new suggestions to moderate.";
const NOT_FOUND: &str = "❌ Suggestion not found. It may already have been handled.";
const PUBLISH_FAILED: &str = "❌ Failed to publish the suggestion.";
const STORAGE_FAILED: &str = "❌ Storage error. Please try again later.";

// ============================================================================
// OUTCOMES
// ============================================================================

/// What `show_next` ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueOutcome {
    AccessDenied,
    StorageFailed,
    Empty,
    /// The oldest item was rendered; `pending` counts the whole queue
    Presented { message_id: u64, pending: usize },
    /// The oldest item could not be rendered with its action control
    DeliveryFailed { message_id: u64 },
}

/// What `handle_action` ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// Payload was not an approve/reject payload
    Ignored,
    AccessDenied,
    /// Item already resolved or never existed
    NotFound { message_id: u64 },
    StorageFailed { message_id: u64 },
    /// Publishing failed; the item stays pending
    PublishFailed { message_id: u64 },
    Resolved { verdict: Verdict, message_id: u64 },
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct ModerationService<S: SubmissionStore + ModeratorStore> {
    store: Arc<S>,
    gate: AccessGate<S>,
    config: SuggestionConfig,
}

impl<S: SubmissionStore + ModeratorStore> ModerationService<S> {
    pub fn new(store: Arc<S>, config: SuggestionConfig) -> Self {
        let gate = AccessGate::new(Arc::clone(&store), config.owner_id);
        Self {
            store,
            gate,
            config,
        }
    }

    pub fn config(&self) -> &SuggestionConfig {
        &self.config
    }

    /// Render the oldest pending submission to a moderator.
    ///
    /// Only one item is shown at a time so the next decision always targets
    /// the current head of the queue.
    pub async fn show_next<T: ChatTransport + ?Sized>(
        &self,
        transport: &T,
        chat_id: u64,
        requester_id: u64,
    ) -> QueueOutcome {
        let chat = Recipient::Channel(chat_id);

        if !self.gate.is_moderator(requester_id).await {
            notify(transport, chat, NO_ACCESS).await;
            return QueueOutcome::AccessDenied;
        }

        let pending = match self.store.list_pending().await {
            Ok(pending) => pending,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list pending suggestions");
                notify(transport, chat, QUEUE_LOAD_FAILED).await;
                return QueueOutcome::StorageFailed;
            }
        };

        let Some(oldest) = pending.first() else {
            notify(transport, chat, QUEUE_EMPTY).await;
            return QueueOutcome::Empty;
        };

        notify(
            transport,
            chat,
            &format!("📨 {} suggestion(s) awaiting moderation:", pending.len()),
        )
        .await;

        if self.render(transport, chat, oldest).await {
            QueueOutcome::Presented {
                message_id: oldest.message_id,
                pending: pending.len(),
            }
        } else {
            QueueOutcome::DeliveryFailed {
                message_id: oldest.message_id,
            }
        }
    }

    /// Content first, then the caption block carrying the action control.
    async fn render<T: ChatTransport + ?Sized>(
        &self,
        transport: &T,
        chat: Recipient,
        submission: &Submission,
    ) -> bool {
        if let Err(e) = deliver_for_review(transport, chat, submission).await {
            tracing::warn!(
                message_id = submission.message_id,
                error = %e,
                "Failed to deliver suggestion content for review"
            );
        }

        let text = format!(
            "📨 Anonymous suggestion #{}\n\n⏰ Submitted: {}\n\nChoose an action:",
            submission.message_id,
            submission.created_at.format("%d.%m.%Y %H:%M UTC"),
        );

        let control = ActionControl::default()
            .button(
                "✅ Approve",
                Verdict::Approve.payload(submission.message_id),
                ButtonTone::Positive,
            )
            .button(
                "❌ Reject",
                Verdict::Reject.payload(submission.message_id),
                ButtonTone::Negative,
            );

        match transport.send_text(chat, &text, Some(&control)).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    message_id = submission.message_id,
                    error = %e,
                    "Failed to send moderation control"
                );
                false
            }
        }
    }

    /// Apply an approve/reject action.
    ///
    /// The item is re-fetched right before acting, so of two moderators racing
    /// on the same rendered item the second gets a not-found notice.
    pub async fn handle_action<T: ChatTransport + ?Sized>(
        &self,
        transport: &T,
        action: &InboundAction,
    ) -> DecisionOutcome {
        let Some((verdict, message_id)) = Verdict::parse_payload(&action.payload) else {
            tracing::debug!(payload = %action.payload, "Ignoring unknown action payload");
            return DecisionOutcome::Ignored;
        };

        if !self.gate.is_moderator(action.actor_id).await {
            answer(transport, &action.handle, ACTION_NO_ACCESS).await;
            return DecisionOutcome::AccessDenied;
        }

        let submission = match self.store.get_by_message_id(message_id).await {
            Ok(Some(submission)) if submission.status == SubmissionStatus::Pending => submission,
            Ok(Some(stale)) => {
                // Status was written but the row survived its delete; finish the cleanup.
                tracing::debug!(
                    message_id,
                    status = stale.status.as_str(),
                    "Decision on a suggestion that is already resolved"
                );
                if let Err(e) = self.store.delete(message_id).await {
                    tracing::warn!(message_id, error = %e, "Failed to remove resolved suggestion");
                }
                answer(transport, &action.handle, NOT_FOUND).await;
                return DecisionOutcome::NotFound { message_id };
            }
            Ok(None) => {
                tracing::debug!(message_id, "Decision on a suggestion that is already gone");
                answer(transport, &action.handle, NOT_FOUND).await;
                return DecisionOutcome::NotFound { message_id };
            }
            Err(e) => {
                tracing::error!(message_id, error = %e, "Failed to load suggestion");
                answer(transport, &action.handle, STORAGE_FAILED).await;
                return DecisionOutcome::StorageFailed { message_id };
            }
        };

        if verdict == Verdict::Approve {
            let destination = Recipient::Channel(submission.channel_id);
            if let Err(e) = publish(transport, destination, &submission).await {
                // Left pending on purpose so the approval can be retried.
                tracing::warn!(message_id, error = %e, "Failed to publish suggestion");
                answer(transport, &action.handle, PUBLISH_FAILED).await;
                return DecisionOutcome::PublishFailed { message_id };
            }
        }

        if let Err(e) = self.resolve(message_id, verdict).await {
            tracing::error!(message_id, error = %e, "Failed to resolve suggestion");
            answer(transport, &action.handle, STORAGE_FAILED).await;
            return DecisionOutcome::StorageFailed { message_id };
        }

        tracing::info!(
            message_id,
            moderator_id = action.actor_id,
            verdict = verdict.as_str(),
            "Suggestion resolved"
        );

        let notice = match verdict {
            Verdict::Approve => "✅ Suggestion published!",
            Verdict::Reject => "✅ Suggestion rejected!",
        };
        answer(transport, &action.handle, notice).await;

        if let Err(e) = transport
            .delete_message(action.chat_id, action.control_message_id)
            .await
        {
            tracing::warn!(
                chat_id = action.chat_id,
                control_message_id = action.control_message_id,
                error = %e,
                "Failed to remove moderation control"
            );
        }

        self.show_next(transport, action.chat_id, action.actor_id)
            .await;

        DecisionOutcome::Resolved {
            verdict,
            message_id,
        }
    }

    /// Status update, then removal. Two single-row calls, not one transaction;
    /// an observer between them sees the resolved status.
    async fn resolve(&self, message_id: u64, verdict: Verdict) -> Result<(), StoreError> {
        match self.store.update_status(message_id, verdict.status()).await {
            Ok(()) => {}
            Err(StoreError::NotFound(_)) => {
                tracing::debug!(message_id, "Suggestion resolved concurrently");
            }
            Err(e) => return Err(e),
        }

        self.store.delete(message_id).await
    }
}

// ============================================================================
// TESTS
// ============================================================================
