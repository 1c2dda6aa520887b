// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `SummaryProvider` implementation over the Gemini client.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use recap_core::types::{ContentSegment, SummaryResponse};
use recap_core::{RecapError, SummaryProvider};
use tracing::info;

use crate::client::GeminiClient;
use crate::types::{
    Content, CountTokensRequest, GenerateContentRequest, GenerationConfig, Part, ThinkingConfig,
};

/// Model used for summary generation.
pub const DEFAULT_GENERATE_MODEL: &str = "gemini-2.5-flash-lite";
/// Model used for token counting.
pub const DEFAULT_COUNT_MODEL: &str = "gemini-2.5-flash";

/// Summarization service backed by Gemini.
#[derive(Debug, Clone)]
pub struct GeminiService {
    client: GeminiClient,
    generate_model: String,
    count_model: String,
}

impl GeminiService {
    pub fn new(api_key: &str) -> Result<Self, RecapError> {
        Ok(Self {
            client: GeminiClient::new(api_key)?,
            generate_model: DEFAULT_GENERATE_MODEL.to_string(),
            count_model: DEFAULT_COUNT_MODEL.to_string(),
        })
    }

    /// Overrides both model identifiers.
    pub fn with_models(mut self, generate_model: &str, count_model: &str) -> Self {
        self.generate_model = generate_model.to_string();
        self.count_model = count_model.to_string();
        self
    }

    /// Overrides the API base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }
}

/// Maps the segment list onto request parts, position for position.
fn segments_to_parts(segments: &[ContentSegment]) -> Vec<Part> {
    segments
        .iter()
        .map(|segment| match segment {
            ContentSegment::Text(text) => Part::text(text),
            ContentSegment::Media { data, mime_type } => {
                Part::inline_data(mime_type, BASE64.encode(data))
            }
        })
        .collect()
}

#[async_trait]
impl SummaryProvider for GeminiService {
    async fn summarize(
        &self,
        system_prompt: &str,
        segments: &[ContentSegment],
    ) -> Result<SummaryResponse, RecapError> {
        let request = GenerateContentRequest {
            system_instruction: Some(Content::system(system_prompt)),
            contents: vec![Content::user(segments_to_parts(segments))],
            generation_config: Some(GenerationConfig {
                temperature: 1.0,
                thinking_config: Some(ThinkingConfig { thinking_budget: 0 }),
            }),
        };

        let response = self
            .client
            .generate_content(&self.generate_model, &request)
            .await?;

        let text = response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.iter().find_map(|p| p.text.clone()))
            .ok_or_else(|| RecapError::Provider {
                message: "response contained no candidate text".to_string(),
                source: None,
            })?;

        let candidate_tokens = response
            .usage_metadata
            .and_then(|u| u.candidates_token_count)
            .unwrap_or(0);

        let media_parts = segments.iter().filter(|s| s.is_media()).count();
        info!(candidate_tokens, media_parts, "generated summary");

        Ok(SummaryResponse {
            text,
            candidate_tokens,
        })
    }

    async fn count_tokens(&self, segments: &[ContentSegment]) -> Result<u64, RecapError> {
        let request = CountTokensRequest {
            contents: vec![Content::user(segments_to_parts(segments))],
        };
        self.client.count_tokens(&self.count_model, &request).await
    }
}
