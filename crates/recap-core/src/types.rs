// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat snapshot types and the content segment union.
//!
//! The snapshot types mirror what the channel transport exposes for a single
//! message. They are read-only: the core never mutates or persists them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier of a user on the channel transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Unique identifier of a message within a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

/// Unique identifier of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

/// Message author as seen at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    pub display_name: String,
}

/// A file attached to a message. The bytes live behind `url` and are fetched
/// on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    /// MIME type as declared by the transport, if any.
    pub content_type: Option<String>,
    /// Declared byte size, checked against caps before download.
    pub size: u64,
    pub url: String,
}

/// A named field inside an embed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}

/// Rich embed content attached to a message. Embeds are flattened to text
/// during assembly; they never become media segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub fields: Vec<EmbedField>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// A reaction emoji with its total count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// Unicode emoji, or `:name:` for custom emoji.
    pub emoji: String,
    pub count: u64,
}

/// A user who reacted to a message, resolved via reaction enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactingUser {
    pub id: UserId,
    pub display_name: String,
}

/// Immutable snapshot of one chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub author: Author,
    pub created_at: DateTime<Utc>,
    /// Text body; may be empty when the message is attachments-only.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    /// Identity of the message this one replies to, if any.
    #[serde(default)]
    pub reply_to: Option<MessageId>,
}

/// Downloaded attachment bytes with their resolved MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPayload {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// One unit of the assembled content list submitted to the provider.
///
/// A `Media` segment is always immediately preceded by a `Text` segment
/// carrying its attribution (message number, author, filename), so the
/// provider can attribute media by positional proximity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSegment {
    Text(String),
    Media { data: Vec<u8>, mime_type: String },
}

impl ContentSegment {
    pub fn is_media(&self) -> bool {
        matches!(self, ContentSegment::Media { .. })
    }

    /// Returns the text of a `Text` segment, or `None` for media.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentSegment::Text(t) => Some(t),
            ContentSegment::Media { .. } => None,
        }
    }

    /// Local token heuristic: ~4 characters per token for text, fixed
    /// per-category constants for media. Used when the provider's token
    /// counting call is unavailable.
    pub fn estimated_tokens(&self) -> u64 {
        match self {
            ContentSegment::Text(t) => (t.chars().count() / 4) as u64,
            ContentSegment::Media { mime_type, .. } => {
                if mime_type.starts_with("video") {
                    2000
                } else if mime_type.starts_with("audio") {
                    1000
                } else {
                    500
                }
            }
        }
    }
}

/// Sums the local token heuristic over a segment list.
pub fn estimate_segment_tokens(segments: &[ContentSegment]) -> u64 {
    segments.iter().map(ContentSegment::estimated_tokens).sum()
}

/// Successful provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResponse {
    pub text: String,
    /// Tokens generated by the model, as reported by the provider's usage
    /// metadata. Zero when the provider omits it.
    pub candidate_tokens: u64,
}
