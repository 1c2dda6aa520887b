// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock summarization provider for deterministic testing.
//!
//! `MockProvider` implements `SummaryProvider` with pre-configured responses,
//! switchable failure modes, and capture of every submitted call.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use recap_core::types::{ContentSegment, SummaryResponse};
use recap_core::{RecapError, SummaryProvider};

/// One captured `summarize` call, for assertion in tests.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub system_prompt: String,
    pub segments: Vec<ContentSegment>,
}

/// A mock provider that returns pre-configured summaries.
///
/// Responses are popped from a FIFO queue. When the queue is empty, a
/// default "mock summary" text is returned. `count_tokens` returns a fixed
/// value, or fails when configured to, which exercises the caller's local
/// estimation fallback.
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<String>>>,
    calls: Arc<Mutex<Vec<CapturedCall>>>,
    candidate_tokens: Arc<Mutex<u64>>,
    counted_tokens: Arc<Mutex<Option<u64>>>,
    fail_summarize: Arc<Mutex<Option<RecapError>>>,
}

impl MockProvider {
    /// Create a new mock provider with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            candidate_tokens: Arc::new(Mutex::new(20)),
            counted_tokens: Arc::new(Mutex::new(Some(100))),
            fail_summarize: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a mock provider pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        let provider = Self::new();
        {
            let mut guard = provider.responses.try_lock().expect("fresh mock");
            *guard = VecDeque::from(responses);
        }
        provider
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, text: String) {
        self.responses.lock().await.push_back(text);
    }

    /// Set the candidate-token count reported with every summary.
    pub async fn set_candidate_tokens(&self, tokens: u64) {
        *self.candidate_tokens.lock().await = tokens;
    }

    /// Set the value `count_tokens` returns.
    pub async fn set_counted_tokens(&self, tokens: u64) {
        *self.counted_tokens.lock().await = Some(tokens);
    }

    /// Make `count_tokens` fail, forcing callers onto their local estimate.
    pub async fn fail_token_counting(&self) {
        *self.counted_tokens.lock().await = None;
    }

    /// Make the next `summarize` calls fail with `error`.
    pub async fn fail_summarize_with(&self, error: RecapError) {
        *self.fail_summarize.lock().await = Some(error);
    }

    /// All calls captured so far, oldest first.
    pub async fn captured_calls(&self) -> Vec<CapturedCall> {
        self.calls.lock().await.clone()
    }

    async fn next_response(&self) -> String {
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock summary".to_string())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SummaryProvider for MockProvider {
    async fn summarize(
        &self,
        system_prompt: &str,
        segments: &[ContentSegment],
    ) -> Result<SummaryResponse, RecapError> {
        self.calls.lock().await.push(CapturedCall {
            system_prompt: system_prompt.to_string(),
            segments: segments.to_vec(),
        });

        if let Some(error) = self.fail_summarize.lock().await.take() {
            return Err(error);
        }

        Ok(SummaryResponse {
            text: self.next_response().await,
            candidate_tokens: *self.candidate_tokens.lock().await,
        })
    }

    async fn count_tokens(&self, _segments: &[ContentSegment]) -> Result<u64, RecapError> {
        match *self.counted_tokens.lock().await {
            Some(tokens) => Ok(tokens),
            None => Err(RecapError::Provider {
                message: "mock token counting failure".to_string(),
                source: None,
            }),
        }
    }
}
