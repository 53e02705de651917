// Serenity implementation of the core chat transport.
//
// Media is re-delivered by reference: attachments by CDN URL, stickers by id.

use crate::core::media::ContentKind;
use crate::core::transport::{
    ActionControl, ActionHandle, ButtonTone, ChatTransport, DeliveryError, Recipient,
};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Discord's per-message content limit, in characters.
const MESSAGE_LIMIT: usize = 2000;

#[derive(Clone)]
pub struct SerenityTransport {
    http: Arc<serenity::Http>,
}

impl SerenityTransport {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }

    /// Resolve a recipient to a channel, opening a DM for users.
    async fn channel_for(&self, to: Recipient) -> Result<serenity::ChannelId, DeliveryError> {
        match to {
            Recipient::Channel(id) => Ok(serenity::ChannelId::new(non_zero(id)?)),
            Recipient::User(id) => {
                let dm = serenity::UserId::new(non_zero(id)?)
                    .create_dm_channel(&self.http)
                    .await
                    .map_err(transport_error)?;
                Ok(dm.id)
            }
        }
    }

    async fn send(
        &self,
        to: Recipient,
        message: serenity::CreateMessage,
    ) -> Result<(), DeliveryError> {
        let channel = self.channel_for(to).await?;
        channel
            .send_message(&self.http, message)
            .await
            .map_err(transport_error)?;
        Ok(())
    }
}

// serenity ids panic on zero
fn non_zero(id: u64) -> Result<u64, DeliveryError> {
    if id == 0 {
        return Err(DeliveryError::Transport("Id must be non-zero".to_string()));
    }
    Ok(id)
}

fn transport_error(e: serenity::Error) -> DeliveryError {
    DeliveryError::Transport(e.to_string())
}

fn clamp(text: &str) -> String {
    text.chars().take(MESSAGE_LIMIT).collect()
}

fn build_buttons(control: &ActionControl) -> serenity::CreateActionRow {
    let buttons = control
        .buttons
        .iter()
        .map(|button| {
            let style = match button.tone {
                ButtonTone::Positive => serenity::ButtonStyle::Success,
                ButtonTone::Negative => serenity::ButtonStyle::Danger,
            };
            serenity::CreateButton::new(button.payload.clone())
                .label(button.label.clone())
                .style(style)
        })
        .collect();

    serenity::CreateActionRow::Buttons(buttons)
}

/// Build the outbound message for one piece of media.
fn media_message(
    kind: ContentKind,
    handle: &str,
    caption: Option<&str>,
) -> Result<serenity::CreateMessage, DeliveryError> {
    let invalid = || DeliveryError::InvalidHandle {
        kind,
        handle: handle.to_string(),
    };

    match kind {
        ContentKind::Text => Err(DeliveryError::Unsupported(kind)),
        ContentKind::Sticker => {
            let id = handle
                .parse::<u64>()
                .ok()
                .filter(|id| *id != 0)
                .ok_or_else(invalid)?;
            Ok(serenity::CreateMessage::new().add_sticker_id(serenity::StickerId::new(id)))
        }
        ContentKind::Photo => {
            if !handle.starts_with("http") {
                return Err(invalid());
            }
            let mut message = serenity::CreateMessage::new()
                .embed(serenity::CreateEmbed::new().image(handle));
            if let Some(caption) = caption {
                message = message.content(clamp(caption));
            }
            Ok(message)
        }
        _ => {
            if !handle.starts_with("http") {
                return Err(invalid());
            }
            // Discord unfurls the CDN link into a player/preview
            let content = match caption {
                Some(caption) => format!("{}\n{}", caption, handle),
                None => handle.to_string(),
            };
            // Keep the link intact when the caption is long
            let content = if content.chars().count() > MESSAGE_LIMIT {
                let room = MESSAGE_LIMIT.saturating_sub(handle.chars().count() + 1);
                let caption: String = caption.unwrap_or_default().chars().take(room).collect();
                format!("{}\n{}", caption, handle)
            } else {
                content
            };
            Ok(serenity::CreateMessage::new().content(content))
        }
    }
}

#[async_trait]
impl ChatTransport for SerenityTransport {
    async fn send_text(
        &self,
        to: Recipient,
        text: &str,
        control: Option<&ActionControl>,
    ) -> Result<(), DeliveryError> {
        let mut message = serenity::CreateMessage::new().content(clamp(text));
        if let Some(control) = control {
            message = message.components(vec![build_buttons(control)]);
        }
        self.send(to, message).await
    }

    async fn send_media(
        &self,
        to: Recipient,
        kind: ContentKind,
        handle: &str,
        caption: Option<&str>,
    ) -> Result<(), DeliveryError> {
        let message = media_message(kind, handle, caption)?;
        self.send(to, message).await
    }

    async fn answer_action(&self, action: &ActionHandle, text: &str) -> Result<(), DeliveryError> {
        let response = serenity::CreateInteractionResponse::Message(
            serenity::CreateInteractionResponseMessage::new()
                .content(clamp(text))
                .ephemeral(true),
        );

        self.http
            .create_interaction_response(
                serenity::InteractionId::new(non_zero(action.id)?),
                &action.token,
                &response,
                vec![],
            )
            .await
            .map_err(transport_error)
    }

    async fn delete_message(&self, chat_id: u64, message_id: u64) -> Result<(), DeliveryError> {
        serenity::ChannelId::new(non_zero(chat_id)?)
            .delete_message(&self.http, serenity::MessageId::new(non_zero(message_id)?))
            .await
            .map_err(transport_error)
    }

    async fn display_name(&self, user_id: u64) -> Result<String, DeliveryError> {
        let user = serenity::UserId::new(non_zero(user_id)?)
            .to_user(&self.http)
            .await
            .map_err(transport_error)?;

        Ok(user.global_name.clone().unwrap_or(user.name))
    }
}
