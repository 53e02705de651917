// Proposal intake - turns a private user message into a pending submission
// and lets every moderator know about it.
//
// NO Discord dependencies here - the discord layer builds the InboundMessage.

use crate::core::media::{classify, derive_text, ContentKind, InboundMessage, ChatKind};
use crate::core::moderation::{
    AccessGate, ModeratorStore, NewSubmission, Submission, SubmissionStore, SuggestionConfig,
};
use crate::core::transport::{notify, ChatTransport, DeliveryError, Recipient};
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;

/// Marks a message as a bot command rather than a suggestion.
pub const COMMAND_PREFIX: char = '/';

const ACCEPTED: &str = "✅ Your suggestion has been received! Moderators will review it anonymously.";
const SAVE_FAILED: &str = "❌ Something went wrong while sending your suggestion. Please try again later.";

const WELCOME: &str = "🤖 Welcome to the anonymous suggestion box!

Just send your suggestion, idea or message here and the moderators will review it anonymously.

Your identity stays hidden - moderators only see the content of your message.

❓ What you can send:
• Text suggestions
• Photos
• Documents
• Videos
• Video notes
• Audio and voice messages
• Stickers
• Ideas and wishes

Your suggestion will be reviewed soon!";

const OWNER_PANEL: &str = "👑 Owner panel

This is an anonymous suggestion bot. Users send suggestions in direct messages and you moderate them.

Available commands:
/addadmin <ID> - add a moderator
/removeadmin <ID> - remove a moderator
/admins - list moderators
/proposals - review suggestions";

const MODERATOR_PANEL: &str = "🛠️ Moderator panel

This is an anonymous suggestion bot. Users send suggestions in direct messages and you moderate them.

Available commands:
/proposals - review suggestions";

/// Why an inbound message was not captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotPrivate,
    Command,
    /// Moderators' own chat traffic is never a submission
    FromModerator,
    NoContent,
}

#[derive(Debug)]
pub enum IntakeOutcome {
    Ignored(IgnoreReason),
    SaveFailed,
    Accepted {
        submission: Submission,
        /// Moderators that received the notification
        notified: usize,
        /// Per-recipient notification failures, kept for observability only
        failures: Vec<(u64, DeliveryError)>,
    },
}

/// Which `/start` text a user got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPanel {
    Owner,
    Moderator,
    Visitor,
}

pub struct ProposalService<S: SubmissionStore + ModeratorStore> {
    store: Arc<S>,
    gate: AccessGate<S>,
    config: SuggestionConfig,
}

impl<S: SubmissionStore + ModeratorStore> ProposalService<S> {
    pub fn new(store: Arc<S>, config: SuggestionConfig) -> Self {
        let gate = AccessGate::new(Arc::clone(&store), config.owner_id);
        Self {
            store,
            gate,
            config,
        }
    }

    /// Capture a private message as a pending submission.
    pub async fn handle_inbound<T: ChatTransport + ?Sized>(
        &self,
        transport: &T,
        message: &InboundMessage,
    ) -> IntakeOutcome {
        if message.chat_kind != ChatKind::Private {
            return IntakeOutcome::Ignored(IgnoreReason::NotPrivate);
        }

        if message
            .body()
            .is_some_and(|text| text.starts_with(COMMAND_PREFIX))
        {
            return IntakeOutcome::Ignored(IgnoreReason::Command);
        }

        let sender_chat = Recipient::Channel(message.chat_id);

        match self.gate.check_moderator(message.sender_id).await {
            Ok(true) => {
                tracing::debug!(user_id = message.sender_id, "Ignoring moderator message");
                return IntakeOutcome::Ignored(IgnoreReason::FromModerator);
            }
            Ok(false) => {}
            Err(e) => {
                // Unknown sender role; capturing could store a moderator's own message
                tracing::error!(message_id = message.message_id, error = %e, "Moderator lookup failed");
                notify(transport, sender_chat, SAVE_FAILED).await;
                return IntakeOutcome::SaveFailed;
            }
        }

        if message.body().is_none() && !message.has_media() {
            return IntakeOutcome::Ignored(IgnoreReason::NoContent);
        }

        let (kind, content_handle) = classify(message);
        let submission = NewSubmission {
            message_id: message.message_id,
            kind,
            content_handle,
            text: derive_text(message),
            created_at: Utc::now(),
            channel_id: self.config.channel_id,
        };

        let saved = match self.store.save(submission).await {
            Ok(saved) => saved,
            Err(e) => {
                tracing::error!(message_id = message.message_id, error = %e, "Failed to save suggestion");
                notify(transport, sender_chat, SAVE_FAILED).await;
                return IntakeOutcome::SaveFailed;
            }
        };

        tracing::info!(
            message_id = saved.message_id,
            kind = %saved.kind,
            "Suggestion received"
        );
        notify(transport, sender_chat, ACCEPTED).await;

        let (notified, failures) = self.notify_moderators(transport, &saved).await;

        IntakeOutcome::Accepted {
            submission: saved,
            notified,
            failures,
        }
    }

    /// Tell every moderator about a new submission. Each delivery is independent;
    /// failures are collected, never propagated.
    async fn notify_moderators<T: ChatTransport + ?Sized>(
        &self,
        transport: &T,
        submission: &Submission,
    ) -> (usize, Vec<(u64, DeliveryError)>) {
        let mut recipients = vec![self.config.owner_id];
        match self.store.list_moderators().await {
            Ok(moderators) => recipients.extend(moderators.into_iter().map(|m| m.user_id)),
            Err(e) => tracing::error!(error = %e, "Failed to list moderators for notification"),
        }
        recipients.sort_unstable();
        recipients.dedup();

        let text = notification_text(submission.kind, &submission.text);
        let deliveries = recipients.iter().map(|&user_id| {
            let text = text.as_str();
            async move {
                let result = transport
                    .send_text(Recipient::User(user_id), text, None)
                    .await;
                (user_id, result)
            }
        });

        let mut notified = 0;
        let mut failures = Vec::new();
        for (user_id, result) in join_all(deliveries).await {
            match result {
                Ok(()) => notified += 1,
                Err(e) => {
                    tracing::warn!(user_id, error = %e, "Failed to notify moderator");
                    failures.push((user_id, e));
                }
            }
        }

        (notified, failures)
    }

    /// `/start` - panel for the owner and moderators, welcome text for everyone else.
    pub async fn start<T: ChatTransport + ?Sized>(
        &self,
        transport: &T,
        chat_id: u64,
        user_id: u64,
    ) -> StartPanel {
        let panel = if self.gate.is_owner(user_id) {
            StartPanel::Owner
        } else if self.gate.is_moderator(user_id).await {
            StartPanel::Moderator
        } else {
            StartPanel::Visitor
        };

        let text = match panel {
            StartPanel::Owner => OWNER_PANEL,
            StartPanel::Moderator => MODERATOR_PANEL,
            StartPanel::Visitor => WELCOME,
        };
        notify(transport, Recipient::Channel(chat_id), text).await;

        panel
    }
}

fn notification_text(kind: ContentKind, text: &str) -> String {
    format!(
        "📨 A new anonymous suggestion has arrived!\n\n💬 Text: {}\n📁 Kind: {}\n\nUse /proposals to review suggestions.",
        text, kind
    )
}
