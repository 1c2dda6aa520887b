// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-backed channel history.
//!
//! Reads a JSON transcript (an oldest-first array of message snapshots)
//! and serves it through the `ChannelHistory` seam, so the pipeline runs
//! unchanged against recorded conversations.

use std::path::Path;

use async_trait::async_trait;
use recap_core::types::{ChannelId, ChatMessage, MessageId, ReactingUser};
use recap_core::{ChannelHistory, RecapError};
use tracing::info;

/// A channel history loaded from a transcript file.
#[derive(Debug)]
pub struct FileTranscript {
    messages: Vec<ChatMessage>,
}

impl FileTranscript {
    /// Loads `path` as an oldest-first JSON array of messages.
    pub fn load(path: &Path) -> Result<Self, RecapError> {
        let raw = std::fs::read_to_string(path).map_err(|e| RecapError::Channel {
            message: format!("failed to read transcript {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;
        let messages: Vec<ChatMessage> =
            serde_json::from_str(&raw).map_err(|e| RecapError::Channel {
                message: format!("failed to parse transcript {}: {e}", path.display()),
                source: Some(Box::new(e)),
            })?;
        info!(
            path = %path.display(),
            count = messages.len(),
            "loaded transcript"
        );
        Ok(Self { messages })
    }

    /// Author of the newest message, used as the default caller identity.
    pub fn newest_author(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

#[async_trait]
impl ChannelHistory for FileTranscript {
    async fn recent_messages(
        &self,
        _channel: ChannelId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RecapError> {
        Ok(self.messages.iter().rev().take(limit).cloned().collect())
    }

    async fn reaction_users(
        &self,
        _channel: ChannelId,
        _message: MessageId,
        _emoji: &str,
    ) -> Result<Vec<ReactingUser>, RecapError> {
        // Transcripts carry reaction counts but no per-user rosters.
        Ok(Vec::new())
    }
}
