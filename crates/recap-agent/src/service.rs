// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One summarization invocation, end to end.

use std::sync::Arc;

use recap_config::{SettingsStore, KEY_SYSTEM_PROMPT, KEY_TIME_GAP_THRESHOLD_MINUTES};
use recap_context::{Assembler, WindowMode, WindowSelector};
use recap_core::types::{estimate_segment_tokens, ChannelId};
use recap_core::{ChannelHistory, RecapError, SummaryProvider};
use recap_limiter::RateGovernor;
use recap_media::MediaFetcher;
use recap_privacy::PrivacyRegistry;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Hard ceiling on estimated input tokens for one summarization call.
pub const TOKEN_CEILING: u64 = 1_000_000;

/// What a summarization invocation produced.
///
/// All three variants are successful completions; errors are reserved for
/// the failures in the `RecapError` taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Summary {
        text: String,
        /// Size of the selected window, before privacy filtering.
        message_count: usize,
        /// Media segments submitted with the request.
        media_count: usize,
    },
    /// The selected window was empty.
    NoMessages,
    /// Privacy filtering left nothing worth summarizing.
    NothingAfterPrivacyFilter,
}

/// Orchestrates selection, assembly, rate governance, and the provider call.
pub struct SummarizerService {
    history: Arc<dyn ChannelHistory>,
    provider: Arc<dyn SummaryProvider>,
    privacy: Arc<PrivacyRegistry>,
    governor: Arc<Mutex<RateGovernor>>,
    store: Arc<Mutex<SettingsStore>>,
    fetcher: MediaFetcher,
}

impl SummarizerService {
    pub fn new(
        history: Arc<dyn ChannelHistory>,
        provider: Arc<dyn SummaryProvider>,
        privacy: Arc<PrivacyRegistry>,
        governor: Arc<Mutex<RateGovernor>>,
        store: Arc<Mutex<SettingsStore>>,
    ) -> Self {
        Self {
            history,
            provider,
            privacy,
            governor,
            store,
            fetcher: MediaFetcher::new(),
        }
    }

    /// Runs one summarization invocation for `mode` over `channel`.
    ///
    /// The governor lock is taken separately for the admission check and the
    /// usage record; it is never held across the provider call. A failed
    /// provider call records nothing.
    pub async fn summarize(
        &self,
        channel: ChannelId,
        mode: &WindowMode,
    ) -> Result<SummaryOutcome, RecapError> {
        let selector = WindowSelector::new(self.history.clone());
        let messages = selector.select(channel, mode).await?;
        if messages.is_empty() {
            return Ok(SummaryOutcome::NoMessages);
        }

        let (system_prompt, gap_minutes) = {
            let store = self.store.lock().await;
            (
                store.get_str(KEY_SYSTEM_PROMPT).unwrap_or_default().to_string(),
                store.get_u64(KEY_TIME_GAP_THRESHOLD_MINUTES).unwrap_or(30) as i64,
            )
        };

        let assembler = Assembler::new(
            self.privacy.clone(),
            self.history.clone(),
            self.fetcher.clone(),
            gap_minutes,
        );
        let segments = assembler.assemble(channel, &messages).await;

        // A lone segment carries no conversation to summarize.
        if segments.len() <= 1 {
            return Ok(SummaryOutcome::NothingAfterPrivacyFilter);
        }

        let estimated_tokens = match self.provider.count_tokens(&segments).await {
            Ok(tokens) => tokens,
            Err(e) => {
                let estimate = estimate_segment_tokens(&segments);
                warn!(error = %e, estimate, "provider token counting failed, using local estimate");
                estimate
            }
        };

        if estimated_tokens > TOKEN_CEILING {
            return Err(RecapError::ContentTooLarge {
                estimated_tokens,
                limit: TOKEN_CEILING,
            });
        }

        {
            // The lock drops before the provider call, so another invocation
            // can be admitted in the gap; the governor's soft caps sit one
            // request (and 10k tokens) under the provider's hard caps, which
            // absorbs that race.
            let mut governor = self.governor.lock().await;
            if !governor.can_admit(estimated_tokens) {
                return Err(RecapError::RateLimited {
                    message: "Rate limit reached. Please wait before making another request."
                        .to_string(),
                });
            }
        }

        let response = self.provider.summarize(&system_prompt, &segments).await?;

        self.governor
            .lock()
            .await
            .record(estimated_tokens + response.candidate_tokens);

        let media_count = segments.iter().filter(|s| s.is_media()).count();
        info!(
            estimated_tokens,
            media_count,
            message_count = messages.len(),
            "generated summary"
        );

        Ok(SummaryOutcome::Summary {
            text: response.text,
            message_count: messages.len(),
            media_count,
        })
    }
}
