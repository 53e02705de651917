// Translate serenity events into core inbound models and hand them to the services.

use crate::core::media::{ChatKind, InboundMessage, MediaRef, PhotoVariant};
use crate::core::proposals::IntakeOutcome;
use crate::core::transport::{ActionHandle, InboundAction};
use crate::discord::Data;
use poise::serenity_prelude as serenity;

/// The attachment fields the intake cares about.
struct AttachmentMeta<'a> {
    url: &'a str,
    filename: &'a str,
    content_type: Option<&'a str>,
    width: Option<u32>,
    height: Option<u32>,
}

impl<'a> From<&'a serenity::Attachment> for AttachmentMeta<'a> {
    fn from(attachment: &'a serenity::Attachment) -> Self {
        Self {
            url: &attachment.url,
            filename: &attachment.filename,
            content_type: attachment.content_type.as_deref(),
            width: attachment.width,
            height: attachment.height,
        }
    }
}

/// Sort one attachment into the slot matching its MIME type.
fn attach(inbound: &mut InboundMessage, meta: AttachmentMeta<'_>, is_voice_message: bool) {
    let mime = meta.content_type.unwrap_or_default();

    if mime.starts_with("image/") {
        inbound.photo.push(PhotoVariant {
            handle: meta.url.to_string(),
            width: meta.width.unwrap_or_default(),
            height: meta.height.unwrap_or_default(),
        });
    } else if mime.starts_with("video/") {
        inbound.video.get_or_insert_with(|| MediaRef::new(meta.url));
    } else if mime.starts_with("audio/") && is_voice_message {
        inbound.voice.get_or_insert_with(|| MediaRef::new(meta.url));
    } else if mime.starts_with("audio/") {
        inbound.audio.get_or_insert_with(|| MediaRef {
            handle: meta.url.to_string(),
            file_name: None,
            title: Some(meta.filename.to_string()),
        });
    } else {
        inbound.document.get_or_insert_with(|| MediaRef {
            handle: meta.url.to_string(),
            file_name: Some(meta.filename.to_string()),
            title: None,
        });
    }
}

/// Build the platform-neutral view of a serenity message.
pub fn to_inbound_message(message: &serenity::Message) -> InboundMessage {
    let chat_kind = if message.guild_id.is_some() {
        ChatKind::Group
    } else {
        ChatKind::Private
    };

    let mut inbound = InboundMessage::new(
        message.id.get(),
        message.author.id.get(),
        message.channel_id.get(),
        chat_kind,
    );

    let is_voice_message = message
        .flags
        .is_some_and(|flags| flags.contains(serenity::MessageFlags::IS_VOICE_MESSAGE));

    for attachment in &message.attachments {
        attach(&mut inbound, AttachmentMeta::from(attachment), is_voice_message);
    }

    if let Some(sticker) = message.sticker_items.first() {
        inbound.sticker = Some(MediaRef::new(sticker.id.get().to_string()));
    }

    // With media attached, the message content is its caption
    if inbound.has_media() {
        inbound.caption = Some(message.content.clone());
        inbound
    } else {
        inbound.with_text(message.content.as_str())
    }
}

pub fn to_inbound_action(interaction: &serenity::ComponentInteraction) -> InboundAction {
    InboundAction {
        actor_id: interaction.user.id.get(),
        chat_id: interaction.channel_id.get(),
        control_message_id: interaction.message.id.get(),
        payload: interaction.data.custom_id.clone(),
        handle: ActionHandle {
            id: interaction.id.get(),
            token: interaction.token.clone(),
        },
    }
}

/// Feed a non-bot message to the intake.
pub async fn handle_message(data: &Data, message: &serenity::Message) {
    let inbound = to_inbound_message(message);

    match data.proposals.handle_inbound(&data.transport, &inbound).await {
        IntakeOutcome::Ignored(reason) => {
            tracing::debug!(message_id = inbound.message_id, ?reason, "Message not captured");
        }
        IntakeOutcome::SaveFailed => {
            tracing::warn!(message_id = inbound.message_id, "Suggestion could not be saved");
        }
        IntakeOutcome::Accepted {
            submission,
            notified,
            failures,
        } => {
            tracing::debug!(
                message_id = submission.message_id,
                notified,
                failed = failures.len(),
                "Suggestion intake finished"
            );
        }
    }
}

/// Feed a button press to the decision processor.
pub async fn handle_component(data: &Data, interaction: &serenity::ComponentInteraction) {
    let action = to_inbound_action(interaction);
    let outcome = data.moderation.handle_action(&data.transport, &action).await;
    tracing::debug!(actor_id = action.actor_id, ?outcome, "Action handled");
}
