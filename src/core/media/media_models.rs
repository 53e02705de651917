// Media domain models - what an inbound message carries.
//
// These are pure domain types with no Discord dependencies.
// The Discord layer fills them in from serenity messages.

use serde::{Deserialize, Serialize};

/// Category of a submission's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Photo,
    Document,
    Video,
    VideoNote,
    Audio,
    Voice,
    Sticker,
}

impl ContentKind {
    /// Stable name used for storage and notifications.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Photo => "photo",
            ContentKind::Document => "document",
            ContentKind::Video => "video",
            ContentKind::VideoNote => "video_note",
            ContentKind::Audio => "audio",
            ContentKind::Voice => "voice",
            ContentKind::Sticker => "sticker",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(ContentKind::Text),
            "photo" => Some(ContentKind::Photo),
            "document" => Some(ContentKind::Document),
            "video" => Some(ContentKind::Video),
            "video_note" => Some(ContentKind::VideoNote),
            "audio" => Some(ContentKind::Audio),
            "voice" => Some(ContentKind::Voice),
            "sticker" => Some(ContentKind::Sticker),
            _ => None,
        }
    }

    /// Whether the platform accepts a caption alongside this kind.
    pub fn accepts_caption(&self) -> bool {
        !matches!(self, ContentKind::VideoNote | ContentKind::Sticker)
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of conversation a message arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    /// One-to-one conversation with the bot
    Private,
    /// Any shared space (server channel, thread, group)
    Group,
}

/// One resolution of an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoVariant {
    pub handle: String,
    pub width: u32,
    pub height: u32,
}

impl PhotoVariant {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Handle plus the bits of metadata the summaries need.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaRef {
    pub handle: String,
    pub file_name: Option<String>,
    pub title: Option<String>,
}

impl MediaRef {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            ..Default::default()
        }
    }
}

/// A user message as seen by the intake, independent of the chat platform.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Transport-assigned message identifier
    pub message_id: u64,
    pub sender_id: u64,
    pub chat_id: u64,
    pub chat_kind: ChatKind,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub photo: Vec<PhotoVariant>,
    pub document: Option<MediaRef>,
    pub video: Option<MediaRef>,
    pub audio: Option<MediaRef>,
    pub voice: Option<MediaRef>,
    pub sticker: Option<MediaRef>,
    pub video_note: Option<MediaRef>,
}

impl InboundMessage {
    /// A bare message with no text and no media.
    pub fn new(message_id: u64, sender_id: u64, chat_id: u64, chat_kind: ChatKind) -> Self {
        Self {
            message_id,
            sender_id,
            chat_id,
            chat_kind,
            text: None,
            caption: None,
            photo: Vec::new(),
            document: None,
            video: None,
            audio: None,
            voice: None,
            sticker: None,
            video_note: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Literal text body, if non-empty.
    pub fn body(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref().filter(|c| !c.is_empty())
    }

    pub fn has_media(&self) -> bool {
        !self.photo.is_empty()
            || self.document.is_some()
            || self.video.is_some()
            || self.audio.is_some()
            || self.voice.is_some()
            || self.sticker.is_some()
            || self.video_note.is_some()
    }
}
