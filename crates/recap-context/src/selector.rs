// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation window selection.
//!
//! Two modes: a fixed count of the most recent messages, or everything since
//! the anchor user's last non-command message. Both return oldest-first
//! windows with the triggering command message handled per mode; see
//! [`WindowSelector::select`].

use std::sync::Arc;

use recap_core::types::{ChannelId, ChatMessage, UserId};
use recap_core::{ChannelHistory, RecapError};
use tracing::info;

/// Prefix that marks a message as a command invocation.
pub const COMMAND_PREFIX: char = '!';

/// How to bound the conversation window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowMode {
    /// The `count` most recent messages, excluding the triggering command.
    Recent { count: usize },
    /// Everything since `anchor` last posted a non-command message, walking
    /// back at most `fetch_limit` messages.
    SinceLastActive { anchor: UserId, fetch_limit: usize },
}

/// Retrieves bounded, chronologically ordered message windows.
pub struct WindowSelector {
    history: Arc<dyn ChannelHistory>,
}

impl WindowSelector {
    pub fn new(history: Arc<dyn ChannelHistory>) -> Self {
        Self { history }
    }

    /// Selects the window for `mode`.
    ///
    /// An empty result is a valid outcome, not an error; only a failed
    /// history fetch propagates.
    pub async fn select(
        &self,
        channel: ChannelId,
        mode: &WindowMode,
    ) -> Result<Vec<ChatMessage>, RecapError> {
        match mode {
            WindowMode::Recent { count } => self.select_recent(channel, *count).await,
            WindowMode::SinceLastActive {
                anchor,
                fetch_limit,
            } => {
                self.select_since_last_active(channel, *anchor, *fetch_limit)
                    .await
            }
        }
    }

    /// Fetches `count + 1` messages newest-first, drops the newest (the
    /// command message that triggered the invocation), and reverses the
    /// remainder to chronological order.
    async fn select_recent(
        &self,
        channel: ChannelId,
        count: usize,
    ) -> Result<Vec<ChatMessage>, RecapError> {
        let mut messages = self.history.recent_messages(channel, count + 1).await?;
        if !messages.is_empty() {
            messages.remove(0);
        }
        messages.reverse();
        info!(count = messages.len(), "selected recent message window");
        Ok(messages)
    }

    /// Walks the history newest-first, collecting messages until the first
    /// one authored by `anchor` whose text is not a command invocation.
    ///
    /// When the anchor message is found it is excluded from the window (the
    /// anchor's own trailing message is not part of what happened since).
    /// When it is not found within `fetch_limit`, every collected message is
    /// returned unchanged; a user with no prior activity in range gets
    /// everything available rather than a failure. Note the trailing drop
    /// happens only on the found path.
    async fn select_since_last_active(
        &self,
        channel: ChannelId,
        anchor: UserId,
        fetch_limit: usize,
    ) -> Result<Vec<ChatMessage>, RecapError> {
        info!(fetch_limit, "selecting window since anchor was last active");

        let fetched = self.history.recent_messages(channel, fetch_limit).await?;

        let mut collected = Vec::new();
        let mut found_anchor = false;
        for message in fetched {
            let is_anchor = message.author.id == anchor
                && !message.content.starts_with(COMMAND_PREFIX);
            collected.push(message);
            if is_anchor {
                found_anchor = true;
                break;
            }
        }

        if found_anchor {
            collected.pop();
        } else {
            info!(
                collected = collected.len(),
                "anchor activity not found within fetch limit, using all collected messages"
            );
        }

        collected.reverse();
        info!(count = collected.len(), "selected since-last-active window");
        Ok(collected)
    }
}
