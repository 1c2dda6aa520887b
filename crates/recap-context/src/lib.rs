// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation windowing and content assembly.
//!
//! This crate turns a channel's raw history into the ordered content-segment
//! list handed to the summarization provider, and splits oversized summaries
//! back into transport-sized chunks:
//!
//! - [`WindowSelector`] picks a bounded, chronologically ordered message
//!   window (N most recent, or everything since a user was last active).
//! - [`Assembler`] renders the window into interleaved text and media
//!   segments, applying privacy exclusions, time-gap markers, reply
//!   back-references, and reaction attribution.
//! - [`split_message`] chunks long output at linguistically sensible
//!   boundaries.

pub mod assemble;
pub mod selector;
pub mod split;

pub use assemble::{Assembler, MessageIndex};
pub use selector::{WindowMode, WindowSelector, COMMAND_PREFIX};
pub use split::split_message;
