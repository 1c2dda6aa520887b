// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Privacy registry for the Recap summarizer.
//!
//! Users opt out of summarization by identity, but raw identities are never
//! stored: the durable representation is a set of one-way tokens derived
//! from a persistent secret salt. Losing the salt silently opts everyone
//! back in, so salt-store failures are fatal at startup rather than
//! recoverable.

pub mod registry;
pub mod salt;

pub use registry::PrivacyRegistry;
pub use salt::Salt;
