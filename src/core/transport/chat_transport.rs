// Chat transport port - the outbound primitives the core needs from whatever
// chat platform delivers its messages.
//
// The Discord layer implements this with serenity. Tests use a recording fake.

use crate::core::media::ContentKind;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid {kind} handle: {handle}")]
    InvalidHandle { kind: ContentKind, handle: String },

    #[error("Cannot deliver {0} as media")]
    Unsupported(ContentKind),
}

/// Where an outbound message goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// Direct conversation with a user, opened by the transport if needed
    User(u64),
    /// An existing chat or channel
    Channel(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonTone {
    Positive,
    Negative,
}

/// One labeled choice bound to an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub label: String,
    pub payload: String,
    pub tone: ButtonTone,
}

/// Set of buttons attached to a text message. Selecting one raises an action
/// event carrying its payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionControl {
    pub buttons: Vec<ActionButton>,
}

impl ActionControl {
    pub fn button(mut self, label: impl Into<String>, payload: impl Into<String>, tone: ButtonTone) -> Self {
        self.buttons.push(ActionButton {
            label: label.into(),
            payload: payload.into(),
            tone,
        });
        self
    }
}

/// Reference needed to answer an action with a transient notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionHandle {
    pub id: u64,
    pub token: String,
}

/// An action event raised by a button press.
#[derive(Debug, Clone)]
pub struct InboundAction {
    pub actor_id: u64,
    /// Chat holding the message the control was attached to
    pub chat_id: u64,
    /// The message carrying the control
    pub control_message_id: u64,
    pub payload: String,
    pub handle: ActionHandle,
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Deliver plain text, optionally with an action control attached.
    async fn send_text(
        &self,
        to: Recipient,
        text: &str,
        control: Option<&ActionControl>,
    ) -> Result<(), DeliveryError>;

    /// Re-deliver media by handle.
    async fn send_media(
        &self,
        to: Recipient,
        kind: ContentKind,
        handle: &str,
        caption: Option<&str>,
    ) -> Result<(), DeliveryError>;

    /// Answer an action with a notice only the actor sees.
    async fn answer_action(&self, action: &ActionHandle, text: &str) -> Result<(), DeliveryError>;

    async fn delete_message(&self, chat_id: u64, message_id: u64) -> Result<(), DeliveryError>;

    /// Best-effort display name for a user.
    async fn display_name(&self, user_id: u64) -> Result<String, DeliveryError>;
}

/// Send a notice, logging instead of failing. Notices never abort an operation.
pub async fn notify<T: ChatTransport + ?Sized>(transport: &T, to: Recipient, text: &str) {
    if let Err(e) = transport.send_text(to, text, None).await {
        tracing::warn!(recipient = ?to, error = %e, "Failed to send notice");
    }
}

/// Answer an action, logging instead of failing.
pub async fn answer<T: ChatTransport + ?Sized>(transport: &T, action: &ActionHandle, text: &str) {
    if let Err(e) = transport.answer_action(action, text).await {
        tracing::warn!(action_id = action.id, error = %e, "Failed to answer action");
    }
}
