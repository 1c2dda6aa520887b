// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings store for the Recap summarizer.
//!
//! A flat key→value JSON document merged against compiled defaults on load
//! (missing keys filled in, unknown keys preserved) and persisted in full on
//! every mutation. The `opted_out_users` key is write-protected: only the
//! privacy registry's dedicated operation may change it.

pub mod store;

pub use store::{SettingsStore, KEY_MAX_MESSAGES_DEFAULT, KEY_MAX_MESSAGES_LIMIT,
    KEY_OPTED_OUT_USERS, KEY_SYSTEM_PROMPT, KEY_TIME_GAP_THRESHOLD_MINUTES};
