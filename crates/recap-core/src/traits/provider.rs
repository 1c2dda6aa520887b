// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use crate::error::RecapError;
use crate::types::{ContentSegment, SummaryResponse};

/// The summarization service boundary.
///
/// Accepts an ordered content-segment list plus a system instruction and
/// returns either a text result with usage metadata or a typed failure.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Submits the segments for summarization.
    async fn summarize(
        &self,
        system_prompt: &str,
        segments: &[ContentSegment],
    ) -> Result<SummaryResponse, RecapError>;

    /// Counts tokens for the segment list using the provider's own
    /// tokenizer. Callers fall back to
    /// [`estimate_segment_tokens`](crate::types::estimate_segment_tokens)
    /// when this fails.
    async fn count_tokens(&self, segments: &[ContentSegment]) -> Result<u64, RecapError>;
}
