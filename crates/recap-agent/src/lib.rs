// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Summarization pipeline orchestration.
//!
//! [`SummarizerService`] runs one invocation end to end: select the window,
//! assemble segments, gate on token volume and the rate governor, call the
//! provider, and record usage. [`Dispatcher`] sits above it, parsing the
//! command surface and rendering user-facing replies, including chunking
//! long summaries to the transport size limit.

pub mod dispatch;
pub mod service;

pub use dispatch::{parse_command, Command, Dispatcher};
pub use service::{SummarizerService, SummaryOutcome, TOKEN_CEILING};
