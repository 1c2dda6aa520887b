// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Recap chat summarizer.
//!
//! This crate provides the error taxonomy, the immutable chat snapshot
//! types read from the channel transport, the `ContentSegment` union handed
//! to the summarization provider, and the trait seams behind which the
//! transport and the provider live.

pub mod error;
pub mod traits;
pub mod types;

pub use error::RecapError;
pub use types::{
    Attachment, Author, ChannelId, ChatMessage, ContentSegment, MediaPayload, MessageId,
    ReactingUser, Reaction, SummaryResponse, UserId,
};

pub use traits::{ChannelHistory, SummaryProvider};
