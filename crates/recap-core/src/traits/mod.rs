// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the core pipeline and its external collaborators.
//!
//! The channel transport and the summarization provider are the two
//! long-latency boundaries of the system. Both are modeled as async traits
//! so the pipeline can be exercised against mocks.

pub mod channel;
pub mod provider;

pub use channel::ChannelHistory;
pub use provider::SummaryProvider;
