// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Recap summarizer.

use thiserror::Error;

/// The primary error type used across all Recap components.
#[derive(Debug, Error)]
pub enum RecapError {
    /// Configuration errors (unreadable settings file, missing credentials,
    /// salt store failures). Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// A rate quota would be exceeded. This is a capacity shed, not a fault:
    /// the caller surfaces it to the user and must not retry automatically.
    #[error("rate limited: {message}")]
    RateLimited { message: String },

    /// The assembled content's estimated token volume exceeds the provider's
    /// hard ceiling. The caller should request a smaller window.
    #[error("content too large: ~{estimated_tokens} tokens (limit {limit})")]
    ContentTooLarge { estimated_tokens: u64, limit: u64 },

    /// Channel transport errors (history fetch, attachment download,
    /// reaction enumeration).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Summarization provider errors (API failure, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
