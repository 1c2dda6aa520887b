// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel history for deterministic testing.
//!
//! `MockHistory` implements `ChannelHistory` over an in-memory message list
//! with injectable reaction rosters and switchable failure modes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use recap_core::types::{ChannelId, ChatMessage, MessageId, ReactingUser};
use recap_core::{ChannelHistory, RecapError};

/// A mock history source backed by an in-memory, oldest-first message list.
///
/// `recent_messages` serves the newest `limit` messages newest-first, the
/// same shape a paginated transport history read produces.
pub struct MockHistory {
    messages: Arc<Mutex<Vec<ChatMessage>>>,
    reaction_rosters: Arc<Mutex<HashMap<(MessageId, String), Vec<ReactingUser>>>>,
    fail_history: Arc<Mutex<bool>>,
    fail_reactions: Arc<Mutex<bool>>,
}

impl MockHistory {
    /// Create an empty mock history.
    pub fn new() -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
            reaction_rosters: Arc::new(Mutex::new(HashMap::new())),
            fail_history: Arc::new(Mutex::new(false)),
            fail_reactions: Arc::new(Mutex::new(false)),
        }
    }

    /// Create a mock history pre-loaded with `messages` (oldest first).
    pub fn with_messages(messages: Vec<ChatMessage>) -> Self {
        let history = Self::new();
        {
            let mut guard = history.messages.try_lock().expect("fresh mock");
            *guard = messages;
        }
        history
    }

    /// Append a message at the newest end.
    pub async fn push(&self, message: ChatMessage) {
        self.messages.lock().await.push(message);
    }

    /// Set the roster returned by `reaction_users` for one message/emoji.
    pub async fn set_reaction_roster(
        &self,
        message: MessageId,
        emoji: &str,
        users: Vec<ReactingUser>,
    ) {
        self.reaction_rosters
            .lock()
            .await
            .insert((message, emoji.to_string()), users);
    }

    /// Make subsequent `recent_messages` calls fail.
    pub async fn fail_history(&self) {
        *self.fail_history.lock().await = true;
    }

    /// Make subsequent `reaction_users` calls fail.
    pub async fn fail_reactions(&self) {
        *self.fail_reactions.lock().await = true;
    }
}

impl Default for MockHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChannelHistory for MockHistory {
    async fn recent_messages(
        &self,
        _channel: ChannelId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RecapError> {
        if *self.fail_history.lock().await {
            return Err(RecapError::Channel {
                message: "mock history failure".to_string(),
                source: None,
            });
        }
        let messages = self.messages.lock().await;
        Ok(messages.iter().rev().take(limit).cloned().collect())
    }

    async fn reaction_users(
        &self,
        _channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<Vec<ReactingUser>, RecapError> {
        if *self.fail_reactions.lock().await {
            return Err(RecapError::Channel {
                message: "mock reaction enumeration failure".to_string(),
                source: None,
            });
        }
        let rosters = self.reaction_rosters.lock().await;
        Ok(rosters
            .get(&(message, emoji.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
