// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound rate governance for provider calls.
//!
//! Tracks three overlapping quota windows with a safety margin below the
//! provider's hard limits and admits or denies calls before they are made.
//! Denial is a boolean "not now", never an error, and callers must not
//! retry automatically.

pub mod governor;

pub use governor::RateGovernor;
