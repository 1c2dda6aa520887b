// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini REST API.
//!
//! Handles request construction, authentication, and error mapping. Quota
//! exhaustion (HTTP 429) maps to `RecapError::RateLimited`; the caller
//! surfaces it without retrying, since outbound pacing is the rate
//! governor's job.

use std::time::Duration;

use recap_core::RecapError;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use tracing::debug;

use crate::types::{
    ApiErrorResponse, CountTokensRequest, CountTokensResponse, GenerateContentRequest,
    GenerateContentResponse,
};

/// Production endpoint for the Gemini REST API.
pub const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// HTTP client for Gemini API communication.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// Creates a new Gemini API client authenticating with `api_key`.
    pub fn new(api_key: &str) -> Result<Self, RecapError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|e| RecapError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| RecapError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Calls `models/{model}:generateContent`.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, RecapError> {
        let url = format!("{}/models/{model}:generateContent", self.base_url);
        let response = self.post(&url, request).await?;
        response.json().await.map_err(|e| RecapError::Provider {
            message: format!("failed to parse generateContent response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Calls `models/{model}:countTokens`.
    pub async fn count_tokens(
        &self,
        model: &str,
        request: &CountTokensRequest,
    ) -> Result<u64, RecapError> {
        let url = format!("{}/models/{model}:countTokens", self.base_url);
        let response = self.post(&url, request).await?;
        let counted: CountTokensResponse =
            response.json().await.map_err(|e| RecapError::Provider {
                message: format!("failed to parse countTokens response: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(counted.total_tokens)
    }

    async fn post<T: serde::Serialize>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<reqwest::Response, RecapError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| RecapError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, url, "Gemini response received");

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RecapError::RateLimited {
                message: "provider quota exhausted (HTTP 429)".to_string(),
            });
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_err) => format!(
                "Gemini API error ({}): {}",
                api_err.error.status.as_deref().unwrap_or("UNKNOWN"),
                api_err.error.message
            ),
            Err(_) => format!("API returned {status}: {body}"),
        };
        Err(RecapError::Provider {
            message,
            source: None,
        })
    }
}
