// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Recap integration tests.
//!
//! Provides mock adapters and message builders for fast, deterministic,
//! CI-runnable tests without a live channel transport or provider API.
//!
//! # Components
//!
//! - [`MockHistory`] - Mock channel history with injectable messages and
//!   reaction rosters
//! - [`MockProvider`] - Mock summarization provider with pre-configured
//!   responses and call capture
//! - [`MessageBuilder`] - Fluent builder for message snapshots

pub mod builders;
pub mod mock_history;
pub mod mock_provider;

pub use builders::MessageBuilder;
pub use mock_history::MockHistory;
pub use mock_provider::MockProvider;
