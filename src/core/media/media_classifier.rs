// Media classifier - derives the content kind, handle and display text of an
// inbound message. Pure functions, no I/O.

use super::media_models::{ContentKind, InboundMessage};

/// Fallback summary when nothing more specific is known.
pub const GENERIC_SUMMARY: &str = "📦 Media content";

/// Pick the content kind and the handle used to re-deliver it.
///
/// Precedence: photo > document > video > audio > voice > sticker > video note > text.
/// For photos the largest variant wins. Text has an empty handle.
pub fn classify(message: &InboundMessage) -> (ContentKind, String) {
    if let Some(best) = message.photo.iter().max_by_key(|variant| variant.area()) {
        return (ContentKind::Photo, best.handle.clone());
    }

    let ranked = [
        (ContentKind::Document, &message.document),
        (ContentKind::Video, &message.video),
        (ContentKind::Audio, &message.audio),
        (ContentKind::Voice, &message.voice),
        (ContentKind::Sticker, &message.sticker),
        (ContentKind::VideoNote, &message.video_note),
    ];

    ranked
        .into_iter()
        .find_map(|(kind, media)| media.as_ref().map(|m| (kind, m.handle.clone())))
        .unwrap_or((ContentKind::Text, String::new()))
}

/// Text stored with a submission: body, else caption, else a summary of the media.
/// Never empty for a non-text kind.
pub fn derive_text(message: &InboundMessage) -> String {
    if let Some(body) = message.body() {
        return body.to_string();
    }
    if let Some(caption) = message.caption() {
        return caption.to_string();
    }

    let (kind, _) = classify(message);
    summarize(message, kind)
}

fn summarize(message: &InboundMessage, kind: ContentKind) -> String {
    match kind {
        ContentKind::Photo => "🖼️ Photo".to_string(),
        ContentKind::Document => {
            let name = message
                .document
                .as_ref()
                .and_then(|d| d.file_name.as_deref())
                .filter(|n| !n.is_empty())
                .unwrap_or("unnamed");
            format!("📄 Document: {}", name)
        }
        ContentKind::Video => "🎥 Video".to_string(),
        ContentKind::VideoNote => "📹 Video note".to_string(),
        ContentKind::Audio => {
            let title = message
                .audio
                .as_ref()
                .and_then(|a| a.title.as_deref())
                .filter(|t| !t.is_empty())
                .unwrap_or("Audio");
            format!("🎵 {}", title)
        }
        ContentKind::Voice => "🎤 Voice message".to_string(),
        ContentKind::Sticker => "😊 Sticker".to_string(),
        ContentKind::Text => GENERIC_SUMMARY.to_string(),
    }
}
