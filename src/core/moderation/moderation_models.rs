// Moderation domain models - submissions, moderators and decisions.
//
// These are pure domain types with no Discord dependencies.

use crate::core::media::ContentKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner and destination channel, injected into every service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionConfig {
    /// The single identity allowed to manage moderators
    pub owner_id: u64,
    /// Where approved submissions are published
    pub channel_id: u64,
}

/// Lifecycle of a submission. Only pending items are shown to moderators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(SubmissionStatus::Pending),
            "approved" => Some(SubmissionStatus::Approved),
            "rejected" => Some(SubmissionStatus::Rejected),
            _ => None,
        }
    }
}

/// A submission about to be saved. Keyed by the transport message id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub message_id: u64,
    pub kind: ContentKind,
    /// Empty for text
    pub content_handle: String,
    /// Literal text, caption or derived summary; never empty
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub channel_id: u64,
}

/// A stored submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Durable key assigned by storage
    pub id: u64,
    /// Transport message id, unique while the item is unresolved
    pub message_id: u64,
    pub kind: ContentKind,
    pub content_handle: String,
    pub text: String,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub channel_id: u64,
}

impl Submission {
    /// True when there is a media handle worth re-delivering.
    pub fn has_media(&self) -> bool {
        self.kind != ContentKind::Text && !self.content_handle.is_empty()
    }
}

/// A delegated reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moderator {
    pub id: u64,
    pub user_id: u64,
    pub display_name: String,
}

/// The two choices offered on a presented submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approve,
    Reject,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Approve => "approve",
            Verdict::Reject => "reject",
        }
    }

    /// Terminal status the verdict moves a submission to.
    pub fn status(&self) -> SubmissionStatus {
        match self {
            Verdict::Approve => SubmissionStatus::Approved,
            Verdict::Reject => SubmissionStatus::Rejected,
        }
    }

    /// Payload carried by the action button, `"<verb>:<message_id>"`.
    pub fn payload(&self, message_id: u64) -> String {
        format!("{}:{}", self.as_str(), message_id)
    }

    /// Parse a button payload back into a verdict and target message id.
    pub fn parse_payload(payload: &str) -> Option<(Verdict, u64)> {
        let (verb, id) = payload.split_once(':')?;
        let verdict = match verb {
            "approve" => Verdict::Approve,
            "reject" => Verdict::Reject,
            _ => return None,
        };
        let message_id = id.trim().parse::<u64>().ok()?;
        Some((verdict, message_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_parsing() {
        assert_eq!(
            Verdict::parse_payload("approve:42"),
            Some((Verdict::Approve, 42))
        );
        assert_eq!(
            Verdict::parse_payload(&Verdict::Reject.payload(7)),
            Some((Verdict::Reject, 7))
        );
        assert_eq!(Verdict::parse_payload("approve_42"), None);
        assert_eq!(Verdict::parse_payload("delete:42"), None);
        assert_eq!(Verdict::parse_payload("approve:abc"), None);
        assert_eq!(Verdict::parse_payload(""), None);
    }
}
