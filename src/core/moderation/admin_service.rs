// Moderator administration - owner-only management of delegated reviewers.

use super::access_gate::AccessGate;
use super::moderation_store::{ModeratorStore, StoreError};
use crate::core::transport::{notify, ChatTransport, Recipient};
use std::sync::Arc;

const STORAGE_FAILED: &str = "❌ Storage error. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminOutcome {
    AccessDenied,
    /// No argument given; usage was shown
    Usage,
    InvalidId,
    TargetIsOwner,
    AlreadyModerator { user_id: u64 },
    NotAModerator { user_id: u64 },
    StorageFailed,
    Added {
        user_id: u64,
        display_name: String,
        /// Whether the new moderator was told about it
        notified: bool,
    },
    Removed { user_id: u64 },
    Listed { moderators: usize },
}

pub struct AdminService<S: ModeratorStore> {
    store: Arc<S>,
    gate: AccessGate<S>,
}

impl<S: ModeratorStore> AdminService<S> {
    pub fn new(store: Arc<S>, owner_id: u64) -> Self {
        let gate = AccessGate::new(Arc::clone(&store), owner_id);
        Self { store, gate }
    }

    /// Store the owner as a moderator row if it is missing. Returns whether a row was added.
    pub async fn seed_owner<T: ChatTransport + ?Sized>(
        &self,
        transport: &T,
    ) -> Result<bool, StoreError> {
        let owner_id = self.gate.owner_id();
        if self.store.is_moderator(owner_id).await? {
            return Ok(false);
        }

        let name = transport
            .display_name(owner_id)
            .await
            .unwrap_or_else(|_| "owner".to_string());

        match self.store.add_moderator(owner_id, &name).await {
            Ok(()) => {
                tracing::info!(owner_id, "Owner seeded as moderator");
                Ok(true)
            }
            Err(StoreError::DuplicateModerator(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// `/addadmin <id>`
    pub async fn add_moderator<T: ChatTransport + ?Sized>(
        &self,
        transport: &T,
        chat_id: u64,
        actor_id: u64,
        raw_target: Option<&str>,
    ) -> AdminOutcome {
        let chat = Recipient::Channel(chat_id);

        if !self.gate.is_owner(actor_id) {
            notify(transport, chat, "❌ Only the bot owner can add moderators.").await;
            return AdminOutcome::AccessDenied;
        }

        let target = match parse_target(raw_target) {
            Ok(target) => target,
            Err(outcome) => {
                notify(transport, chat, &argument_help("addadmin", &outcome)).await;
                return outcome;
            }
        };

        if self.gate.is_owner(target) {
            notify(transport, chat, "❌ You are already the owner of this bot.").await;
            return AdminOutcome::TargetIsOwner;
        }

        match self.store.is_moderator(target).await {
            Ok(false) => {}
            Ok(true) => return self.already_moderator(transport, chat, target).await,
            Err(e) => {
                tracing::error!(user_id = target, error = %e, "Moderator lookup failed");
                notify(transport, chat, STORAGE_FAILED).await;
                return AdminOutcome::StorageFailed;
            }
        }

        let display_name = match transport.display_name(target).await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(user_id = target, error = %e, "Could not resolve moderator name");
                format!("user_{}", target)
            }
        };

        match self.store.add_moderator(target, &display_name).await {
            Ok(()) => {}
            Err(StoreError::DuplicateModerator(_)) => {
                return self.already_moderator(transport, chat, target).await
            }
            Err(e) => {
                tracing::error!(user_id = target, error = %e, "Failed to add moderator");
                notify(transport, chat, STORAGE_FAILED).await;
                return AdminOutcome::StorageFailed;
            }
        }

        tracing::info!(user_id = target, name = %display_name, "Moderator added");
        notify(
            transport,
            chat,
            &format!(
                "✅ User {} (ID: {}) was added as a moderator!",
                display_name, target
            ),
        )
        .await;

        // The add stands even if the new moderator cannot be reached.
        let welcome = "🎉 You have been added as a moderator of the suggestion box!\n\n\
                       Use /start to open the moderation panel.";
        let notified = match transport
            .send_text(Recipient::User(target), welcome, None)
            .await
        {
            Ok(()) => {
                notify(transport, chat, "✅ The new moderator has been notified.").await;
                true
            }
            Err(e) => {
                tracing::warn!(user_id = target, error = %e, "Failed to notify new moderator");
                notify(
                    transport,
                    chat,
                    "⚠️ Moderator added, but they could not be notified.",
                )
                .await;
                false
            }
        };

        AdminOutcome::Added {
            user_id: target,
            display_name,
            notified,
        }
    }

    async fn already_moderator<T: ChatTransport + ?Sized>(
        &self,
        transport: &T,
        chat: Recipient,
        user_id: u64,
    ) -> AdminOutcome {
        notify(
            transport,
            chat,
            &format!("❌ User with ID {} is already a moderator.", user_id),
        )
        .await;
        AdminOutcome::AlreadyModerator { user_id }
    }

    /// `/removeadmin <id>`
    pub async fn remove_moderator<T: ChatTransport + ?Sized>(
        &self,
        transport: &T,
        chat_id: u64,
        actor_id: u64,
        raw_target: Option<&str>,
    ) -> AdminOutcome {
        let chat = Recipient::Channel(chat_id);

        if !self.gate.is_owner(actor_id) {
            notify(transport, chat, "❌ Only the bot owner can remove moderators.").await;
            return AdminOutcome::AccessDenied;
        }

        let target = match parse_target(raw_target) {
            Ok(target) => target,
            Err(outcome) => {
                notify(transport, chat, &argument_help("removeadmin", &outcome)).await;
                return outcome;
            }
        };

        if self.gate.is_owner(target) {
            notify(transport, chat, "❌ The owner cannot be removed.").await;
            return AdminOutcome::TargetIsOwner;
        }

        match self.store.remove_moderator(target).await {
            Ok(true) => {
                tracing::info!(user_id = target, "Moderator removed");
                notify(
                    transport,
                    chat,
                    &format!("✅ Moderator with ID {} was removed.", target),
                )
                .await;
                AdminOutcome::Removed { user_id: target }
            }
            Ok(false) => {
                notify(
                    transport,
                    chat,
                    &format!("❌ User with ID {} is not a moderator.", target),
                )
                .await;
                AdminOutcome::NotAModerator { user_id: target }
            }
            Err(e) => {
                tracing::error!(user_id = target, error = %e, "Failed to remove moderator");
                notify(transport, chat, STORAGE_FAILED).await;
                AdminOutcome::StorageFailed
            }
        }
    }

    /// `/admins`
    pub async fn list_moderators<T: ChatTransport + ?Sized>(
        &self,
        transport: &T,
        chat_id: u64,
        actor_id: u64,
    ) -> AdminOutcome {
        let chat = Recipient::Channel(chat_id);

        if !self.gate.is_owner(actor_id) {
            notify(
                transport,
                chat,
                "❌ Only the bot owner can view the moderator list.",
            )
            .await;
            return AdminOutcome::AccessDenied;
        }

        let moderators = match self.store.list_moderators().await {
            Ok(moderators) => moderators,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list moderators");
                notify(transport, chat, STORAGE_FAILED).await;
                return AdminOutcome::StorageFailed;
            }
        };

        let owner_id = self.gate.owner_id();
        let delegated: Vec<_> = moderators
            .iter()
            .filter(|m| m.user_id != owner_id)
            .collect();

        let mut text = format!("📋 Moderators:\n\n👑 Owner: ID {}\n", owner_id);
        if delegated.is_empty() {
            text.push_str("\nNo delegated moderators yet.");
        }
        for (i, moderator) in delegated.iter().enumerate() {
            text.push_str(&format!(
                "{}. {} (ID: {})\n",
                i + 1,
                moderator.display_name,
                moderator.user_id
            ));
        }

        notify(transport, chat, &text).await;
        AdminOutcome::Listed {
            moderators: delegated.len(),
        }
    }
}

/// Parse a user id argument. Zero is never a valid id.
fn parse_target(raw: Option<&str>) -> Result<u64, AdminOutcome> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty());
    let Some(raw) = raw else {
        return Err(AdminOutcome::Usage);
    };

    match raw.parse::<u64>() {
        Ok(0) | Err(_) => Err(AdminOutcome::InvalidId),
        Ok(id) => Ok(id),
    }
}

fn argument_help(command: &str, outcome: &AdminOutcome) -> String {
    let example = format!("Example: /{} 123456789", command);
    match outcome {
        AdminOutcome::Usage => format!("📝 Usage: /{} <user_id>\n\n{}", command, example),
        _ => format!(
            "❌ Invalid ID format. Use: /{} <user_id>\n\n{}",
            command, example
        ),
    }
}
