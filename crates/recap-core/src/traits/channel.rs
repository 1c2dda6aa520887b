// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use crate::error::RecapError;
use crate::types::{ChannelId, ChatMessage, MessageId, ReactingUser};

/// Read-only view of a channel's message history.
///
/// Implementations wrap the channel transport's paginated history API.
/// The core treats it as opaque: it only needs bounded newest-first reads
/// and per-emoji reaction enumeration.
#[async_trait]
pub trait ChannelHistory: Send + Sync {
    /// Fetches up to `limit` of the most recent messages, newest first.
    ///
    /// Fewer than `limit` messages is not an error; the channel may simply
    /// be shorter than the request.
    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RecapError>;

    /// Enumerates the users who reacted to `message` with `emoji`.
    ///
    /// May fail independently of history fetching; callers degrade to the
    /// count carried on the message snapshot.
    async fn reaction_users(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<Vec<ReactingUser>, RecapError>;
}
