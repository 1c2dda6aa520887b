// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end pipeline tests over mock history and provider.

use std::sync::Arc;

use recap_agent::{Dispatcher, SummarizerService};
use recap_config::SettingsStore;
use recap_core::types::{ChannelId, UserId};
use recap_limiter::RateGovernor;
use recap_privacy::{PrivacyRegistry, Salt};
use recap_test_utils::{MessageBuilder, MockHistory, MockProvider};
use tempfile::TempDir;
use tokio::sync::Mutex;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHANNEL: ChannelId = ChannelId(42);
const CALLER: UserId = UserId(999);

struct Stack {
    dispatcher: Dispatcher,
    provider: Arc<MockProvider>,
    privacy: Arc<PrivacyRegistry>,
    _dir: TempDir,
}

async fn stack(history: MockHistory) -> Stack {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(Mutex::new(
        SettingsStore::load(dir.path().join("settings.json")).unwrap(),
    ));
    let privacy = Arc::new(
        PrivacyRegistry::open(
            Salt::load_or_create(&dir.path().join("salt")).unwrap(),
            store.clone(),
        )
        .await,
    );
    let provider = Arc::new(MockProvider::new());
    let service = Arc::new(SummarizerService::new(
        Arc::new(history),
        provider.clone(),
        privacy.clone(),
        Arc::new(Mutex::new(RateGovernor::new())),
        store.clone(),
    ));
    Stack {
        dispatcher: Dispatcher::new(service, privacy.clone(), store),
        provider,
        privacy,
        _dir: dir,
    }
}

#[tokio::test]
async fn count_mode_over_six_messages_summarizes_the_oldest_five() {
    // Channel holds exactly 6 messages; the newest is the command itself.
    // A count of 5 must select the oldest 5 in chronological order.
    let mut msgs: Vec<_> = (1..=5)
        .map(|i| {
            MessageBuilder::new(i, 100 + i, &format!("user{i}"))
                .content(&format!("topic {i}"))
                .build()
        })
        .collect();
    msgs.push(
        MessageBuilder::new(6, CALLER.0, "caller")
            .content("!summarize 5")
            .build(),
    );

    let stack = stack(MockHistory::with_messages(msgs)).await;
    stack.provider.add_response("five topics".to_string()).await;

    let replies = stack
        .dispatcher
        .handle(CHANNEL, CALLER, false, "!summarize 5")
        .await
        .unwrap();
    assert_eq!(replies, vec!["**Summary of 5 messages:**\nfive topics"]);

    let calls = stack.provider.captured_calls().await;
    assert_eq!(calls.len(), 1);
    let texts: Vec<&str> = calls[0]
        .segments
        .iter()
        .filter_map(|s| s.as_text())
        .collect();
    assert_eq!(texts.len(), 5);
    for (i, text) in texts.iter().enumerate() {
        assert!(
            text.starts_with(&format!("Message #{} | user{} | topic {}", i + 1, i + 1, i + 1)),
            "segment {i}: {text}"
        );
    }
    // The command message never reaches the provider.
    assert!(!texts.iter().any(|t| t.contains("!summarize")));
}

#[tokio::test]
async fn since_last_active_covers_messages_after_the_callers_last_post() {
    let msgs = vec![
        MessageBuilder::new(1, CALLER.0, "caller").content("my last post").build(),
        MessageBuilder::new(2, 101, "alice").content("while you were away").build(),
        MessageBuilder::new(3, 102, "bob").content("more happened").build(),
        MessageBuilder::new(4, CALLER.0, "caller").content("!summarize").build(),
    ];

    let stack = stack(MockHistory::with_messages(msgs)).await;
    stack.provider.add_response("you missed things".to_string()).await;

    let replies = stack
        .dispatcher
        .handle(CHANNEL, CALLER, false, "!summarize")
        .await
        .unwrap();
    // Window: messages 2, 3, and the command message (3 in total).
    assert_eq!(replies, vec!["**Summary of 3 messages:**\nyou missed things"]);

    let calls = stack.provider.captured_calls().await;
    let texts: Vec<&str> = calls[0]
        .segments
        .iter()
        .filter_map(|s| s.as_text())
        .collect();
    assert!(texts[0].contains("while you were away"));
    assert!(texts[1].contains("more happened"));
}

#[tokio::test]
async fn opted_out_author_never_reaches_the_provider() {
    let mut msgs: Vec<_> = vec![
        MessageBuilder::new(1, 101, "alice").content("public remark").build(),
        MessageBuilder::new(2, 555, "private-person").content("private remark").build(),
        MessageBuilder::new(3, 102, "bob").content("another remark").build(),
    ];
    msgs.push(
        MessageBuilder::new(4, CALLER.0, "caller")
            .content("!summarize 5")
            .build(),
    );

    let stack = stack(MockHistory::with_messages(msgs)).await;
    stack.privacy.opt_out(UserId(555)).await.unwrap();

    stack
        .dispatcher
        .handle(CHANNEL, CALLER, false, "!summarize 5")
        .await
        .unwrap();

    let calls = stack.provider.captured_calls().await;
    let all: String = calls[0]
        .segments
        .iter()
        .filter_map(|s| s.as_text())
        .collect::<Vec<_>>()
        .join("\n");
    assert!(all.contains("public remark"));
    assert!(all.contains("another remark"));
    assert!(!all.contains("private remark"));
    assert!(!all.contains("private-person"));
}

#[tokio::test]
async fn media_attachments_flow_through_to_the_summary_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 16]))
        .mount(&server)
        .await;

    let msgs = vec![
        MessageBuilder::new(1, 101, "alice").content("look at this").build(),
        MessageBuilder::new(2, 102, "bob")
            .content("nice photo")
            .attachment("sunset.png", Some("image/png"), 16, &server.uri())
            .build(),
        MessageBuilder::new(3, CALLER.0, "caller").content("!summarize 5").build(),
    ];

    let stack = stack(MockHistory::with_messages(msgs)).await;
    stack.provider.add_response("a sunset was shared".to_string()).await;

    let replies = stack
        .dispatcher
        .handle(CHANNEL, CALLER, false, "!summarize 5")
        .await
        .unwrap();
    assert_eq!(
        replies,
        vec!["**Summary of 2 messages (including 1 media files):**\na sunset was shared"]
    );

    let calls = stack.provider.captured_calls().await;
    let segments = &calls[0].segments;
    // Attribution text immediately precedes the media bytes.
    let media_pos = segments.iter().position(|s| s.is_media()).unwrap();
    assert_eq!(
        segments[media_pos - 1].as_text().unwrap(),
        "[Image from Message #2 by bob: sunset.png]"
    );
}
