// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemini provider adapter.
//!
//! Implements the summarization service boundary against the Gemini
//! `generateContent` and `countTokens` REST endpoints. Content segments map
//! onto request parts: text segments become text parts, media segments
//! become base64 inline-data parts at the same position.

pub mod client;
pub mod service;
pub mod types;

pub use client::GeminiClient;
pub use service::{GeminiService, DEFAULT_COUNT_MODEL, DEFAULT_GENERATE_MODEL};
