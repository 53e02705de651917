// Delivery of a submission's content to a chat.
//
// Review (moderator sees the item) and publish (approved item goes to the
// destination channel) share one routine; they differ only in the text
// framing and in whether a failed media send falls back to a text notice.

use crate::core::moderation::Submission;
use crate::core::transport::{ChatTransport, DeliveryError, Recipient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Shown to a moderator; media failures degrade to a description
    Review,
    /// Posted to the destination channel; failures propagate
    Publish,
}

pub async fn deliver_for_review<T: ChatTransport + ?Sized>(
    transport: &T,
    to: Recipient,
    submission: &Submission,
) -> Result<(), DeliveryError> {
    deliver(transport, to, submission, DeliveryMode::Review).await
}

pub async fn publish<T: ChatTransport + ?Sized>(
    transport: &T,
    to: Recipient,
    submission: &Submission,
) -> Result<(), DeliveryError> {
    deliver(transport, to, submission, DeliveryMode::Publish).await
}

pub async fn deliver<T: ChatTransport + ?Sized>(
    transport: &T,
    to: Recipient,
    submission: &Submission,
    mode: DeliveryMode,
) -> Result<(), DeliveryError> {
    if !submission.has_media() {
        let text = match mode {
            DeliveryMode::Review => format!("💬 Suggestion text:\n{}", submission.text),
            DeliveryMode::Publish => format!("💡 New suggestion:\n\n{}", submission.text),
        };
        return transport.send_text(to, &text, None).await;
    }

    let caption = submission
        .kind
        .accepts_caption()
        .then_some(submission.text.as_str());

    let sent = transport
        .send_media(to, submission.kind, &submission.content_handle, caption)
        .await;

    match (sent, mode) {
        (Ok(()), _) => Ok(()),
        (Err(e), DeliveryMode::Publish) => Err(e),
        (Err(e), DeliveryMode::Review) => {
            tracing::warn!(
                message_id = submission.message_id,
                kind = %submission.kind,
                error = %e,
                "Media could not be shown for review, sending description instead"
            );
            let fallback = format!(
                "⚠️ Could not display media (kind: {})\n💬 Description: {}",
                submission.kind, submission.text
            );
            transport.send_text(to, &fallback, None).await
        }
    }
}
