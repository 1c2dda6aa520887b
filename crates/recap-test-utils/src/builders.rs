// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fluent builder for message snapshots used across the test suite.

use chrono::{DateTime, TimeZone, Utc};
use recap_core::types::{
    Attachment, Author, ChatMessage, Embed, MessageId, Reaction, UserId,
};

/// Deterministic base timestamp for built messages.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).single().unwrap()
}

/// Builder for [`ChatMessage`] snapshots.
///
/// Unless overridden with [`MessageBuilder::at`], the timestamp is
/// `base_time() + id` seconds, so ascending ids produce a chronologically
/// ordered, gap-free conversation.
pub struct MessageBuilder {
    msg: ChatMessage,
}

impl MessageBuilder {
    pub fn new(id: u64, author_id: u64, display_name: &str) -> Self {
        Self {
            msg: ChatMessage {
                id: MessageId(id),
                author: Author {
                    id: UserId(author_id),
                    display_name: display_name.to_string(),
                },
                created_at: base_time() + chrono::Duration::seconds(id as i64),
                content: String::new(),
                attachments: Vec::new(),
                embeds: Vec::new(),
                reactions: Vec::new(),
                reply_to: None,
            },
        }
    }

    pub fn content(mut self, text: &str) -> Self {
        self.msg.content = text.to_string();
        self
    }

    pub fn at(mut self, when: DateTime<Utc>) -> Self {
        self.msg.created_at = when;
        self
    }

    pub fn reply_to(mut self, id: u64) -> Self {
        self.msg.reply_to = Some(MessageId(id));
        self
    }

    pub fn attachment(mut self, filename: &str, content_type: Option<&str>, size: u64, url: &str) -> Self {
        self.msg.attachments.push(Attachment {
            filename: filename.to_string(),
            content_type: content_type.map(str::to_string),
            size,
            url: url.to_string(),
        });
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.msg.embeds.push(embed);
        self
    }

    pub fn reaction(mut self, emoji: &str, count: u64) -> Self {
        self.msg.reactions.push(Reaction {
            emoji: emoji.to_string(),
            count,
        });
        self
    }

    pub fn build(self) -> ChatMessage {
        self.msg
    }
}
