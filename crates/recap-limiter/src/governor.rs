// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The sliding-window rate governor.
//!
//! Three exact sliding windows over event timestamps: per-minute request
//! count, per-minute token volume, and per-day request count. Entries are
//! pruned lazily on every admission check, so the windows slide with the
//! events themselves rather than resetting on fixed boundaries.
//!
//! `can_admit` and `record` are deliberately separate calls: a caller
//! checks, makes the provider call, and records only on success. A failed
//! call therefore costs nothing against the quota.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

/// Admitted requests per minute, one below the provider's hard cap of 15.
const MINUTE_REQUEST_LIMIT: usize = 14;
/// Admitted token volume per minute, under the hard cap of 250,000.
const MINUTE_TOKEN_LIMIT: u64 = 240_000;
/// Admitted requests per day, under the hard cap of 1,000.
const DAY_REQUEST_LIMIT: usize = 950;

const MINUTE_SECS: i64 = 60;
const DAY_SECS: i64 = 86_400;

/// Sliding-window governor shared across all concurrent invocations.
///
/// Callers wrap it in a `tokio::sync::Mutex`; each `can_admit` and each
/// `record` must be atomic, but the lock is not held across the provider
/// call itself.
#[derive(Debug, Default)]
pub struct RateGovernor {
    minute_requests: VecDeque<DateTime<Utc>>,
    minute_tokens: VecDeque<(DateTime<Utc>, u64)>,
    day_requests: VecDeque<DateTime<Utc>>,
}

impl RateGovernor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a request estimated at `estimated_tokens` can be admitted
    /// without pushing any window over its limit.
    pub fn can_admit(&mut self, estimated_tokens: u64) -> bool {
        self.can_admit_at(Utc::now(), estimated_tokens)
    }

    /// Records a completed request. Call only after the provider call
    /// actually succeeded.
    pub fn record(&mut self, tokens_used: u64) {
        self.record_at(Utc::now(), tokens_used);
    }

    fn can_admit_at(&mut self, now: DateTime<Utc>, estimated_tokens: u64) -> bool {
        self.prune(now);

        let in_window_tokens: u64 = self.minute_tokens.iter().map(|(_, t)| t).sum();

        if self.minute_requests.len() >= MINUTE_REQUEST_LIMIT {
            warn!(
                in_window = self.minute_requests.len(),
                limit = MINUTE_REQUEST_LIMIT,
                "denying request: per-minute request window full"
            );
            return false;
        }
        if in_window_tokens + estimated_tokens > MINUTE_TOKEN_LIMIT {
            warn!(
                in_window_tokens,
                estimated_tokens,
                limit = MINUTE_TOKEN_LIMIT,
                "denying request: per-minute token window full"
            );
            return false;
        }
        if self.day_requests.len() >= DAY_REQUEST_LIMIT {
            warn!(
                in_window = self.day_requests.len(),
                limit = DAY_REQUEST_LIMIT,
                "denying request: per-day request window full"
            );
            return false;
        }

        true
    }

    fn record_at(&mut self, now: DateTime<Utc>, tokens_used: u64) {
        self.minute_requests.push_back(now);
        self.minute_tokens.push_back((now, tokens_used));
        self.day_requests.push_back(now);
        debug!(tokens_used, "recorded completed provider request");
    }

    /// Drops entries that have slid out of their windows. The queues are
    /// time-ordered, so pruning stops at the first in-window entry.
    fn prune(&mut self, now: DateTime<Utc>) {
        let minute_ago = now - Duration::seconds(MINUTE_SECS);
        let day_ago = now - Duration::seconds(DAY_SECS);

        while self
            .minute_requests
            .front()
            .is_some_and(|t| *t < minute_ago)
        {
            self.minute_requests.pop_front();
        }
        while self
            .minute_tokens
            .front()
            .is_some_and(|(t, _)| *t < minute_ago)
        {
            self.minute_tokens.pop_front();
        }
        while self.day_requests.front().is_some_and(|t| *t < day_ago) {
            self.day_requests.pop_front();
        }
    }

    #[cfg(test)]
    fn window_sizes(&self) -> (usize, usize, usize) {
        (
            self.minute_requests.len(),
            self.minute_tokens.len(),
            self.day_requests.len(),
        )
    }
}
