// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multimodal content assembly.
//!
//! Turns a chronological message window into the ordered segment list
//! submitted to the provider. Ordering is load-bearing: the model attributes
//! media by positional proximity to the attribution text immediately before
//! it, not by any explicit linkage field.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use recap_core::types::{ChannelId, ChatMessage, ContentSegment, MessageId};
use recap_core::ChannelHistory;
use recap_media::{media_category, FetchOutcome, MediaFetcher};
use recap_privacy::PrivacyRegistry;
use tracing::{debug, info, warn};

/// Placeholder body for messages with no text.
const EMPTY_CONTENT_PLACEHOLDER: &str = "[No text content]";
/// Standalone marker inserted between included messages separated by more
/// than the configured gap threshold.
const TIME_GAP_MARKER: &str = "\n--- TIME GAP ---\n";
/// Reaction users listed by name before collapsing to "and K others".
const REACTION_USER_SAMPLE: usize = 5;

/// Maps message identities to dense 1-based sequence numbers assigned in
/// chronological order over the current window.
///
/// Built per invocation over the messages that survive privacy filtering,
/// so an excluded message is invisible to reply back-references: a reply
/// pointing at it renders as outside the conversation. Never persisted.
pub struct MessageIndex {
    sequence: HashMap<MessageId, usize>,
}

impl MessageIndex {
    pub fn build<'a>(messages: impl IntoIterator<Item = &'a ChatMessage>) -> Self {
        let sequence = messages
            .into_iter()
            .enumerate()
            .map(|(i, m)| (m.id, i + 1))
            .collect();
        Self { sequence }
    }

    /// Sequence number for `id`, or `None` if the message is not in the
    /// window (or was excluded from it).
    pub fn sequence(&self, id: MessageId) -> Option<usize> {
        self.sequence.get(&id).copied()
    }
}

/// Renders message windows into interleaved text and media segments.
pub struct Assembler {
    privacy: Arc<PrivacyRegistry>,
    history: Arc<dyn ChannelHistory>,
    fetcher: MediaFetcher,
    time_gap_threshold_minutes: i64,
}

impl Assembler {
    pub fn new(
        privacy: Arc<PrivacyRegistry>,
        history: Arc<dyn ChannelHistory>,
        fetcher: MediaFetcher,
        time_gap_threshold_minutes: i64,
    ) -> Self {
        Self {
            privacy,
            history,
            fetcher,
            time_gap_threshold_minutes,
        }
    }

    /// Assembles `messages` (oldest first) into the segment list.
    ///
    /// Per-message faults (a failed download, a failed reaction enumeration)
    /// degrade to inline notes or count-only summaries; nothing here aborts
    /// assembly of the remaining messages.
    pub async fn assemble(
        &self,
        channel: ChannelId,
        messages: &[ChatMessage],
    ) -> Vec<ContentSegment> {
        if messages.is_empty() {
            return Vec::new();
        }

        let mut included: Vec<&ChatMessage> = Vec::with_capacity(messages.len());
        let mut excluded_count = 0usize;
        for message in messages {
            if self.privacy.is_opted_out(message.author.id).await {
                excluded_count += 1;
            } else {
                included.push(message);
            }
        }

        let index = MessageIndex::build(included.iter().copied());
        let gap_threshold_secs = self.time_gap_threshold_minutes * 60;

        let mut segments = Vec::new();
        let mut media_count = 0usize;
        let mut prev_time: Option<DateTime<Utc>> = None;

        for (position, message) in included.iter().enumerate() {
            let sequence = position + 1;

            if let Some(prev) = prev_time {
                if (message.created_at - prev).num_seconds() > gap_threshold_secs {
                    segments.push(ContentSegment::Text(TIME_GAP_MARKER.to_string()));
                }
            }

            segments.push(ContentSegment::Text(
                self.render_attribution(channel, message, sequence, &index)
                    .await,
            ));

            media_count += self
                .append_attachments(&mut segments, message, sequence)
                .await;

            prev_time = Some(message.created_at);
        }

        if excluded_count > 0 {
            info!(excluded_count, "excluded messages from opted-out users");
        }
        if media_count > 0 {
            info!(media_count, "processed attributed media attachments");
        }

        segments
    }

    /// Renders the single attribution line for one message:
    /// sequence number, display name, content, reply back-reference,
    /// reaction summary, timestamp.
    async fn render_attribution(
        &self,
        channel: ChannelId,
        message: &ChatMessage,
        sequence: usize,
        index: &MessageIndex,
    ) -> String {
        let display_name = &message.author.display_name;
        let timestamp = message.created_at.format("%Y-%m-%d %H:%M:%S UTC");

        let mut content = if message.content.is_empty() {
            EMPTY_CONTENT_PLACEHOLDER.to_string()
        } else {
            message.content.clone()
        };
        if let Some(embeds) = flatten_embeds(message) {
            content.push_str(&embeds);
        }

        let reply_info = match message.reply_to {
            Some(target) => match index.sequence(target) {
                Some(n) => format!(" [Replying to Message #{n}]"),
                None => " [Replying to message outside conversation]".to_string(),
            },
            None => String::new(),
        };

        let reaction_info = self.reaction_summary(channel, message).await;

        format!(
            "Message #{sequence} | {display_name} | {content}{reply_info}{reaction_info} | {timestamp}"
        )
    }

    /// Builds the reaction summary for one message, listing up to
    /// [`REACTION_USER_SAMPLE`] visible reacting users per emoji.
    ///
    /// Each listed user is individually checked against the privacy
    /// registry. If enumeration fails for any emoji, the whole message
    /// degrades to the count-only form carried on the snapshot.
    async fn reaction_summary(&self, channel: ChannelId, message: &ChatMessage) -> String {
        if message.reactions.is_empty() {
            return String::new();
        }

        let mut details = Vec::with_capacity(message.reactions.len());
        for reaction in &message.reactions {
            let users = match self
                .history
                .reaction_users(channel, message.id, &reaction.emoji)
                .await
            {
                Ok(users) => users,
                Err(e) => {
                    warn!(error = %e, "reaction enumeration failed, falling back to counts");
                    return count_only_reactions(message);
                }
            };

            let mut visible = Vec::new();
            for user in users {
                if visible.len() >= REACTION_USER_SAMPLE {
                    break;
                }
                if !self.privacy.is_opted_out(user.id).await {
                    visible.push(user.display_name);
                }
            }

            if visible.is_empty() {
                details.push(format!("{}: {} users", reaction.emoji, reaction.count));
            } else {
                let shown = visible.len() as u64;
                let list = if reaction.count > shown {
                    format!("{} and {} others", visible.join(", "), reaction.count - shown)
                } else {
                    visible.join(", ")
                };
                details.push(format!("{}: {list}", reaction.emoji));
            }
        }

        format!(" [Reactions: {}]", details.join(" | "))
    }

    /// Fetches each attachment and appends its segments: attribution text
    /// then media bytes on success, a single explanatory note otherwise.
    /// Returns the number of media segments appended.
    async fn append_attachments(
        &self,
        segments: &mut Vec<ContentSegment>,
        message: &ChatMessage,
        sequence: usize,
    ) -> usize {
        let display_name = &message.author.display_name;
        let mut appended = 0usize;

        for attachment in &message.attachments {
            match self.fetcher.fetch(attachment).await {
                FetchOutcome::Fetched(payload) => {
                    let category = media_category(&payload.mime_type);
                    debug!(
                        filename = %attachment.filename,
                        mime = %payload.mime_type,
                        sequence,
                        "attached media segment"
                    );
                    segments.push(ContentSegment::Text(format!(
                        "[{category} from Message #{sequence} by {display_name}: {}]",
                        attachment.filename
                    )));
                    segments.push(ContentSegment::Media {
                        data: payload.data,
                        mime_type: payload.mime_type,
                    });
                    appended += 1;
                }
                FetchOutcome::Rejected(reason) => {
                    debug!(filename = %attachment.filename, ?reason, "attachment rejected");
                    segments.push(ContentSegment::Text(format!(
                        "[Unsupported attachment in Message #{sequence} by {display_name}: {}]",
                        attachment.filename
                    )));
                }
                FetchOutcome::Failed(error) => {
                    warn!(filename = %attachment.filename, %error, "attachment fetch failed");
                    segments.push(ContentSegment::Text(format!(
                        "[Media processing failed for Message #{sequence} by {display_name}: {}]",
                        attachment.filename
                    )));
                }
            }
        }

        appended
    }
}

/// Flattens embed content into descriptive text appended to the message
/// body. Embeds never become media segments.
fn flatten_embeds(message: &ChatMessage) -> Option<String> {
    let mut infos = Vec::new();
    for embed in &message.embeds {
        let mut lines = Vec::new();
        if let Some(title) = &embed.title {
            lines.push(format!("**Embed Title:** {title}"));
        }
        if let Some(description) = &embed.description {
            lines.push(format!("**Embed Description:** {description}"));
        }
        if let Some(url) = &embed.url {
            lines.push(format!("**Embed URL:** {url}"));
        }
        for field in &embed.fields {
            lines.push(format!("**{}:** {}", field.name, field.value));
        }
        if let Some(url) = &embed.image_url {
            lines.push(format!("**Embed Image:** {url}"));
        }
        if let Some(url) = &embed.video_url {
            lines.push(format!("**Embed Video:** {url}"));
        }
        if let Some(url) = &embed.thumbnail_url {
            lines.push(format!("**Embed Thumbnail:** {url}"));
        }
        if !lines.is_empty() {
            infos.push(lines.join("\n"));
        }
    }
    if infos.is_empty() {
        None
    } else {
        Some(format!(" [Embeds: {}]", infos.join(" | ")))
    }
}

/// Count-only reaction summary from the snapshot, used when enumeration
/// against the transport fails.
fn count_only_reactions(message: &ChatMessage) -> String {
    if message.reactions.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = message
        .reactions
        .iter()
        .map(|r| format!("{}({})", r.emoji, r.count))
        .collect();
    format!(" [Reactions: {}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use recap_config::SettingsStore;
    use recap_core::types::{Embed, ReactingUser, UserId};
    use recap_privacy::{PrivacyRegistry, Salt};
    use recap_test_utils::{builders::base_time, MessageBuilder, MockHistory};
    use tempfile::TempDir;
    use tokio::sync::Mutex;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CHANNEL: ChannelId = ChannelId(1);

    async fn registry(dir: &TempDir) -> Arc<PrivacyRegistry> {
        let store = Arc::new(Mutex::new(
            SettingsStore::load(dir.path().join("settings.json")).unwrap(),
        ));
        Arc::new(PrivacyRegistry::open(Salt::from_raw("test-salt"), store).await)
    }

    fn assembler(
        privacy: Arc<PrivacyRegistry>,
        history: Arc<MockHistory>,
        gap_minutes: i64,
    ) -> Assembler {
        Assembler::new(privacy, history, MediaFetcher::new(), gap_minutes)
    }

    fn texts(segments: &[ContentSegment]) -> Vec<&str> {
        segments.iter().filter_map(ContentSegment::as_text).collect()
    }

    #[tokio::test]
    async fn five_plain_messages_yield_five_numbered_segments() {
        let dir = TempDir::new().unwrap();
        let history = Arc::new(MockHistory::new());
        let assembler = assembler(registry(&dir).await, history, 30);

        let messages: Vec<_> = (1..=5)
            .map(|i| {
                MessageBuilder::new(i, 10 + i, &format!("user{i}"))
                    .content(&format!("hello {i}"))
                    .build()
            })
            .collect();

        let segments = assembler.assemble(CHANNEL, &messages).await;
        assert_eq!(segments.len(), 5);
        for (i, segment) in segments.iter().enumerate() {
            let text = segment.as_text().unwrap();
            assert!(
                text.starts_with(&format!("Message #{} | user{}", i + 1, i + 1)),
                "segment {i}: {text}"
            );
        }
    }

    #[tokio::test]
    async fn attribution_line_has_fixed_shape() {
        let dir = TempDir::new().unwrap();
        let history = Arc::new(MockHistory::new());
        let assembler = assembler(registry(&dir).await, history, 30);

        let when = base_time();
        let messages = vec![MessageBuilder::new(1, 10, "alice")
            .content("hello world")
            .at(when)
            .build()];

        let segments = assembler.assemble(CHANNEL, &messages).await;
        assert_eq!(
            segments[0].as_text().unwrap(),
            "Message #1 | alice | hello world | 2026-01-15 12:00:00 UTC"
        );
    }

    #[tokio::test]
    async fn empty_content_gets_placeholder() {
        let dir = TempDir::new().unwrap();
        let history = Arc::new(MockHistory::new());
        let assembler = assembler(registry(&dir).await, history, 30);

        let messages = vec![MessageBuilder::new(1, 10, "alice").build()];
        let segments = assembler.assemble(CHANNEL, &messages).await;
        assert!(segments[0]
            .as_text()
            .unwrap()
            .contains("| [No text content] |"));
    }

    #[tokio::test]
    async fn opted_out_author_is_invisible_to_replies() {
        let dir = TempDir::new().unwrap();
        let privacy = registry(&dir).await;
        privacy.opt_out(UserId(30)).await.unwrap();
        let history = Arc::new(MockHistory::new());
        let assembler = assembler(privacy, history, 30);

        let messages = vec![
            MessageBuilder::new(1, 10, "alice").content("one").build(),
            MessageBuilder::new(2, 11, "bob").content("two").build(),
            MessageBuilder::new(3, 30, "carol").content("secret").build(),
            MessageBuilder::new(4, 12, "dave").content("four").build(),
            MessageBuilder::new(5, 13, "erin").content("five").reply_to(3).build(),
        ];

        let segments = assembler.assemble(CHANNEL, &messages).await;
        assert_eq!(segments.len(), 4);

        let all = texts(&segments).join("\n");
        assert!(!all.contains("secret"));
        assert!(!all.contains("carol"));

        // The reply to the excluded message must not resolve to a number.
        let last = segments[3].as_text().unwrap();
        assert!(last.starts_with("Message #4 | erin"));
        assert!(last.contains("[Replying to message outside conversation]"));
    }

    #[tokio::test]
    async fn reply_inside_window_resolves_to_sequence_number() {
        let dir = TempDir::new().unwrap();
        let history = Arc::new(MockHistory::new());
        let assembler = assembler(registry(&dir).await, history, 30);

        let messages = vec![
            MessageBuilder::new(10, 1, "alice").content("question").build(),
            MessageBuilder::new(20, 2, "bob").content("answer").reply_to(10).build(),
        ];

        let segments = assembler.assemble(CHANNEL, &messages).await;
        assert!(segments[1]
            .as_text()
            .unwrap()
            .contains("[Replying to Message #1]"));
    }

    #[tokio::test]
    async fn time_gap_marker_between_distant_messages() {
        let dir = TempDir::new().unwrap();
        let history = Arc::new(MockHistory::new());
        let assembler = assembler(registry(&dir).await, history, 30);

        let messages = vec![
            MessageBuilder::new(1, 10, "alice").content("before").at(base_time()).build(),
            MessageBuilder::new(2, 11, "bob")
                .content("after")
                .at(base_time() + Duration::minutes(31))
                .build(),
        ];

        let segments = assembler.assemble(CHANNEL, &messages).await;
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].as_text().unwrap(), "\n--- TIME GAP ---\n");
    }

    #[tokio::test]
    async fn no_gap_marker_at_exactly_the_threshold() {
        let dir = TempDir::new().unwrap();
        let history = Arc::new(MockHistory::new());
        let assembler = assembler(registry(&dir).await, history, 30);

        let messages = vec![
            MessageBuilder::new(1, 10, "alice").content("before").at(base_time()).build(),
            MessageBuilder::new(2, 11, "bob")
                .content("after")
                .at(base_time() + Duration::minutes(30))
                .build(),
        ];

        let segments = assembler.assemble(CHANNEL, &messages).await;
        assert_eq!(segments.len(), 2);
    }

    #[tokio::test]
    async fn gap_is_measured_between_included_messages() {
        // The excluded message in the middle must not reset the gap clock.
        let dir = TempDir::new().unwrap();
        let privacy = registry(&dir).await;
        privacy.opt_out(UserId(30)).await.unwrap();
        let history = Arc::new(MockHistory::new());
        let assembler = assembler(privacy, history, 30);

        let messages = vec![
            MessageBuilder::new(1, 10, "alice").content("start").at(base_time()).build(),
            MessageBuilder::new(2, 30, "carol")
                .content("hidden")
                .at(base_time() + Duration::minutes(20))
                .build(),
            MessageBuilder::new(3, 11, "bob")
                .content("end")
                .at(base_time() + Duration::minutes(40))
                .build(),
        ];

        let segments = assembler.assemble(CHANNEL, &messages).await;
        let all = texts(&segments);
        assert_eq!(all.len(), 3);
        assert_eq!(all[1], "\n--- TIME GAP ---\n");
    }

    #[tokio::test]
    async fn embeds_are_flattened_into_the_message_line() {
        let dir = TempDir::new().unwrap();
        let history = Arc::new(MockHistory::new());
        let assembler = assembler(registry(&dir).await, history, 30);

        let embed = Embed {
            title: Some("Release notes".to_string()),
            description: Some("What changed".to_string()),
            url: Some("https://example.com/notes".to_string()),
            ..Default::default()
        };
        let messages = vec![MessageBuilder::new(1, 10, "alice")
            .content("look at this")
            .embed(embed)
            .build()];

        let segments = assembler.assemble(CHANNEL, &messages).await;
        assert_eq!(segments.len(), 1);
        let text = segments[0].as_text().unwrap();
        assert!(text.contains(
            " [Embeds: **Embed Title:** Release notes\n**Embed Description:** What changed\n**Embed URL:** https://example.com/notes]"
        ));
    }

    #[tokio::test]
    async fn reaction_summary_lists_visible_users() {
        let dir = TempDir::new().unwrap();
        let privacy = registry(&dir).await;
        privacy.opt_out(UserId(51)).await.unwrap();
        let history = Arc::new(MockHistory::new());
        history
            .set_reaction_roster(
                recap_core::types::MessageId(1),
                "👍",
                vec![
                    ReactingUser { id: UserId(50), display_name: "alice".to_string() },
                    ReactingUser { id: UserId(51), display_name: "hidden".to_string() },
                    ReactingUser { id: UserId(52), display_name: "bob".to_string() },
                ],
            )
            .await;
        let assembler = assembler(privacy, history, 30);

        let messages = vec![MessageBuilder::new(1, 10, "carol")
            .content("funny")
            .reaction("👍", 3)
            .build()];

        let segments = assembler.assemble(CHANNEL, &messages).await;
        let text = segments[0].as_text().unwrap();
        // The opted-out reactor is omitted; the residual count is appended.
        assert!(text.contains(" [Reactions: 👍: alice, bob and 1 others]"), "{text}");
    }

    #[tokio::test]
    async fn reaction_summary_without_visible_users_shows_count() {
        let dir = TempDir::new().unwrap();
        let history = Arc::new(MockHistory::new());
        let assembler = assembler(registry(&dir).await, history, 30);

        // No roster configured: enumeration returns nobody.
        let messages = vec![MessageBuilder::new(1, 10, "carol")
            .content("funny")
            .reaction("🎉", 4)
            .build()];

        let segments = assembler.assemble(CHANNEL, &messages).await;
        assert!(segments[0]
            .as_text()
            .unwrap()
            .contains(" [Reactions: 🎉: 4 users]"));
    }

    #[tokio::test]
    async fn reaction_enumeration_failure_degrades_to_counts() {
        let dir = TempDir::new().unwrap();
        let history = Arc::new(MockHistory::new());
        history.fail_reactions().await;
        let assembler = assembler(registry(&dir).await, history, 30);

        let messages = vec![MessageBuilder::new(1, 10, "carol")
            .content("funny")
            .reaction("👍", 2)
            .reaction("🎉", 1)
            .build()];

        let segments = assembler.assemble(CHANNEL, &messages).await;
        assert!(segments[0]
            .as_text()
            .unwrap()
            .contains(" [Reactions: 👍(2), 🎉(1)]"));
    }

    #[tokio::test]
    async fn fetched_media_follows_its_attribution_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![9u8, 9, 9]))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let history = Arc::new(MockHistory::new());
        let assembler = assembler(registry(&dir).await, history, 30);

        let messages = vec![MessageBuilder::new(1, 10, "alice")
            .content("look")
            .attachment("cat.png", Some("image/png"), 3, &server.uri())
            .build()];

        let segments = assembler.assemble(CHANNEL, &messages).await;
        assert_eq!(segments.len(), 3);
        assert_eq!(
            segments[1].as_text().unwrap(),
            "[Image from Message #1 by alice: cat.png]"
        );
        match &segments[2] {
            ContentSegment::Media { data, mime_type } => {
                assert_eq!(data, &vec![9, 9, 9]);
                assert_eq!(mime_type, "image/png");
            }
            other => panic!("expected media segment, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejected_and_failed_attachments_get_distinct_notes() {
        let dir = TempDir::new().unwrap();
        let history = Arc::new(MockHistory::new());
        let assembler = assembler(registry(&dir).await, history, 30);

        let messages = vec![MessageBuilder::new(1, 10, "alice")
            .content("files")
            .attachment("doc.pdf", Some("application/pdf"), 10, "http://unused")
            .attachment("cat.png", Some("image/png"), 10, "http://127.0.0.1:9/nope")
            .build()];

        let segments = assembler.assemble(CHANNEL, &messages).await;
        let all = texts(&segments);
        assert_eq!(all.len(), 3);
        assert_eq!(all[1], "[Unsupported attachment in Message #1 by alice: doc.pdf]");
        assert_eq!(all[2], "[Media processing failed for Message #1 by alice: cat.png]");
    }

    #[tokio::test]
    async fn empty_window_assembles_to_nothing() {
        let dir = TempDir::new().unwrap();
        let history = Arc::new(MockHistory::new());
        let assembler = assembler(registry(&dir).await, history, 30);
        assert!(assembler.assemble(CHANNEL, &[]).await.is_empty());
    }

    #[test]
    fn message_index_is_dense_and_one_based() {
        let messages: Vec<_> = [5u64, 9, 42]
            .iter()
            .map(|&id| MessageBuilder::new(id, 1, "a").build())
            .collect();
        let index = MessageIndex::build(&messages);
        assert_eq!(index.sequence(recap_core::types::MessageId(5)), Some(1));
        assert_eq!(index.sequence(recap_core::types::MessageId(9)), Some(2));
        assert_eq!(index.sequence(recap_core::types::MessageId(42)), Some(3));
        assert_eq!(index.sequence(recap_core::types::MessageId(7)), None);
    }
}
