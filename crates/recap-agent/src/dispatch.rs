// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The command surface and reply rendering.
//!
//! Thin glue over [`SummarizerService`]: parses command invocations,
//! validates caller-supplied counts, applies the admin gate, and renders
//! outcomes as transport-ready reply strings, chunking long summaries.

use std::sync::Arc;

use recap_config::{SettingsStore, KEY_MAX_MESSAGES_DEFAULT, KEY_MAX_MESSAGES_LIMIT, KEY_OPTED_OUT_USERS};
use recap_context::{split_message, WindowMode};
use recap_core::types::{ChannelId, UserId};
use recap_core::RecapError;
use recap_privacy::PrivacyRegistry;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::service::{SummarizerService, SummaryOutcome};

/// Hard per-message size limit of the channel transport.
pub const TRANSPORT_MESSAGE_LIMIT: usize = 2000;
/// Chunk size for long summaries, leaving headroom for the header line.
pub const CHUNK_LENGTH: usize = 1900;
/// Smallest count a caller may request explicitly.
const MIN_MESSAGE_COUNT: i64 = 5;

/// A parsed command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Summarize { count: Option<i64> },
    OptOut,
    OptIn,
    Config { key: Option<String>, value: Option<String> },
    Help,
}

/// Parses a message body into a command, or `None` if it is not one.
///
/// `!config` takes the first token as the key and the untokenized rest of
/// the line as the value, so string values may contain spaces.
pub fn parse_command(text: &str) -> Option<Command> {
    let mut tokens = text.split_whitespace();
    let head = tokens.next()?;

    match head {
        "!summarize" | "!summarise" | "!Summarize" | "!Summarise" => match tokens.next() {
            None => Some(Command::Summarize { count: None }),
            Some(raw) => raw.parse::<i64>().ok().map(|count| Command::Summarize {
                count: Some(count),
            }),
        },
        "!optout" => Some(Command::OptOut),
        "!optin" => Some(Command::OptIn),
        "!help" => Some(Command::Help),
        "!config" => {
            let key = tokens.next().map(str::to_string);
            let rest: Vec<&str> = tokens.collect();
            let value = if rest.is_empty() {
                None
            } else {
                Some(rest.join(" "))
            };
            Some(Command::Config { key, value })
        }
        _ => None,
    }
}

/// Executes parsed commands and renders user-facing replies.
pub struct Dispatcher {
    service: Arc<SummarizerService>,
    privacy: Arc<PrivacyRegistry>,
    store: Arc<Mutex<SettingsStore>>,
}

impl Dispatcher {
    pub fn new(
        service: Arc<SummarizerService>,
        privacy: Arc<PrivacyRegistry>,
        store: Arc<Mutex<SettingsStore>>,
    ) -> Self {
        Self {
            service,
            privacy,
            store,
        }
    }

    /// Handles one inbound message. Returns `None` when the message is not
    /// a command; otherwise the ordered replies to send.
    pub async fn handle(
        &self,
        channel: ChannelId,
        author: UserId,
        is_admin: bool,
        text: &str,
    ) -> Option<Vec<String>> {
        let command = parse_command(text)?;
        let replies = match command {
            Command::Summarize { count } => self.summarize(channel, author, count).await,
            Command::OptOut => self.opt_out(author).await,
            Command::OptIn => self.opt_in(author).await,
            Command::Config { key, value } => self.config(is_admin, key, value).await,
            Command::Help => vec![help_text()],
        };
        Some(replies)
    }

    async fn summarize(
        &self,
        channel: ChannelId,
        author: UserId,
        count: Option<i64>,
    ) -> Vec<String> {
        let mode = match count {
            Some(count) => {
                if count < MIN_MESSAGE_COUNT {
                    return vec!["Message count must be at least 5.".to_string()];
                }
                let limit = {
                    let store = self.store.lock().await;
                    store.get_u64(KEY_MAX_MESSAGES_LIMIT).unwrap_or(200)
                };
                if count as u64 > limit {
                    return vec![format!("Maximum message count is {limit}.")];
                }
                WindowMode::Recent {
                    count: count as usize,
                }
            }
            None => {
                let fetch_limit = {
                    let store = self.store.lock().await;
                    store.get_u64(KEY_MAX_MESSAGES_DEFAULT).unwrap_or(50) as usize
                };
                WindowMode::SinceLastActive {
                    anchor: author,
                    fetch_limit,
                }
            }
        };

        match self.service.summarize(channel, &mode).await {
            Ok(SummaryOutcome::Summary {
                text,
                message_count,
                media_count,
            }) => render_summary_replies(&text, message_count, media_count),
            Ok(SummaryOutcome::NoMessages) => {
                vec!["No messages found to summarize.".to_string()]
            }
            Ok(SummaryOutcome::NothingAfterPrivacyFilter) => {
                vec!["No messages available to summarize after privacy filtering.".to_string()]
            }
            Err(RecapError::RateLimited { message }) => vec![message],
            Err(RecapError::ContentTooLarge { .. }) => vec![
                "Error: Message history too long to summarize. Try with fewer messages."
                    .to_string(),
            ],
            Err(e) => {
                error!(error = %e, "summarize command failed");
                vec!["An error occurred while generating the summary.".to_string()]
            }
        }
    }

    async fn opt_out(&self, author: UserId) -> Vec<String> {
        match self.privacy.opt_out(author).await {
            Ok(true) => vec![concat!(
                "**Opted Out Successfully**\n",
                "Your messages and media will no longer be included in summaries.\n",
                "• Your messages won't be sent to the AI provider for processing\n",
                "• Your media attachments won't be analyzed\n",
                "• Your messages won't appear in any generated summaries\n",
                "• You can opt back in anytime using `!optin`"
            )
            .to_string()],
            Ok(false) => {
                vec!["You are already opted out of message summarization.".to_string()]
            }
            Err(e) => {
                error!(error = %e, "opt-out command failed");
                vec!["An error occurred while processing your opt-out request.".to_string()]
            }
        }
    }

    async fn opt_in(&self, author: UserId) -> Vec<String> {
        match self.privacy.opt_in(author).await {
            Ok(true) => vec![concat!(
                "**Opted In Successfully**\n",
                "Your messages and media will now be included in summaries again.\n",
                "• Your messages may be sent to the AI provider for processing\n",
                "• Your media attachments may be analyzed\n",
                "• Your messages may appear in generated summaries\n",
                "• You can opt out anytime using `!optout`"
            )
            .to_string()],
            Ok(false) => {
                vec!["You are not currently opted out of message summarization.".to_string()]
            }
            Err(e) => {
                error!(error = %e, "opt-in command failed");
                vec!["An error occurred while processing your opt-in request.".to_string()]
            }
        }
    }

    async fn config(
        &self,
        is_admin: bool,
        key: Option<String>,
        value: Option<String>,
    ) -> Vec<String> {
        if !is_admin {
            return vec!["You need administrator permissions to use this command.".to_string()];
        }

        // The opt-out key is off limits for reads and writes alike.
        if key.as_deref() == Some(KEY_OPTED_OUT_USERS) {
            return vec![
                "User opt-out data cannot be modified through the config command for privacy reasons."
                    .to_string(),
            ];
        }

        let Some(key) = key else {
            let snapshot = {
                let store = self.store.lock().await;
                store.redacted_snapshot()
            };
            let rendered = serde_json::to_string_pretty(&serde_json::Value::Object(snapshot))
                .unwrap_or_else(|_| "{}".to_string());
            return vec![format!("**Current Configuration:**\n```json\n{rendered}\n```")];
        };

        let Some(value) = value else {
            let store = self.store.lock().await;
            return match store.get(&key) {
                Some(current) => vec![format!("**{key}:** {}", render_value(current))],
                None => vec![format!("Configuration key '{key}' not found.")],
            };
        };

        // Values parse as JSON where possible, so integers and lists keep
        // their types; anything else is stored as a plain string.
        let parsed = serde_json::from_str::<serde_json::Value>(&value)
            .unwrap_or(serde_json::Value::String(value));

        let mut store = self.store.lock().await;
        if !store.contains_key(&key) {
            return vec![format!("There is no setting {key}")];
        }
        match store.set(&key, parsed.clone()) {
            Ok(()) => {
                info!(key = %key, "configuration updated");
                vec![format!(
                    "Configuration updated: **{key}** = {}",
                    render_value(&parsed)
                )]
            }
            Err(e) => vec![format!("Error updating configuration: {e}")],
        }
    }
}

/// Renders the summary with its header, chunked to the transport limit.
///
/// Summaries under the limit go out as one message. Longer ones are split
/// at [`CHUNK_LENGTH`]; the header rides with the first chunk unless the
/// combination would itself exceed the limit, in which case the header is
/// sent alone first.
fn render_summary_replies(text: &str, message_count: usize, media_count: usize) -> Vec<String> {
    let media_note = if media_count > 0 {
        format!(" (including {media_count} media files)")
    } else {
        String::new()
    };
    let header = format!("**Summary of {message_count} messages{media_note}:**\n");

    if text.chars().count() < TRANSPORT_MESSAGE_LIMIT {
        return vec![format!("{header}{text}")];
    }

    let mut replies = Vec::new();
    for (i, chunk) in split_message(text, CHUNK_LENGTH).into_iter().enumerate() {
        if i == 0 {
            if header.chars().count() + chunk.chars().count() > TRANSPORT_MESSAGE_LIMIT {
                replies.push(header.trim_end().to_string());
                replies.push(chunk);
            } else {
                replies.push(format!("{header}{chunk}"));
            }
        } else {
            replies.push(chunk);
        }
    }
    replies
}

fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn help_text() -> String {
    concat!(
        "**Recap - AI Multimodal Summarizer**\n",
        "Summarize group conversations including text, images, videos, and audio.\n",
        "\n",
        "**Summarization Commands**\n",
        "`!summarize` - Summarize messages since you were last active\n",
        "`!summarize <count>` - Summarize the last <count> messages\n",
        "\n",
        "**Supported Media Types**\n",
        "Images: JPG, PNG, GIF, WebP\n",
        "Videos: MP4, MOV, WebM, MPEG\n",
        "Audio: MP3, WAV, OGG\n",
        "\n",
        "**Privacy Commands**\n",
        "`!optout` - Exclude your messages and media from all summaries\n",
        "`!optin` - Re-include your messages and media in summaries\n",
        "\n",
        "**Admin Commands**\n",
        "`!config` - View current configuration\n",
        "`!config <key>` - View specific config value\n",
        "`!config <key> <value>` - Set config value\n",
        "\n",
        "**File Limits**\n",
        "Images, Audio: 20MB max. Videos: 100MB max.\n",
        "Rate limiting applies to prevent API overuse."
    )
    .to_string()
}
