// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The opt-out registry.
//!
//! Maps user identities to irreversible pseudonymous tokens and tracks the
//! opted-out set. Check-then-mutate sequences are serialized under one lock,
//! and every mutation persists through the settings store before returning.

use std::collections::HashSet;
use std::sync::Arc;

use recap_config::SettingsStore;
use recap_core::types::UserId;
use recap_core::RecapError;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::info;

use crate::salt::Salt;

/// Opt-out registry shared across all concurrent invocations.
pub struct PrivacyRegistry {
    salt: Salt,
    store: Arc<Mutex<SettingsStore>>,
    tokens: Mutex<HashSet<String>>,
}

impl PrivacyRegistry {
    /// Opens the registry, hydrating the token set from the settings store.
    pub async fn open(salt: Salt, store: Arc<Mutex<SettingsStore>>) -> Self {
        let tokens: HashSet<String> = {
            let guard = store.lock().await;
            guard.opted_out_tokens().into_iter().collect()
        };
        if !tokens.is_empty() {
            info!(count = tokens.len(), "loaded opted-out users");
        }
        Self {
            salt,
            store,
            tokens: Mutex::new(tokens),
        }
    }

    /// Derives the privacy token for a user: hex(SHA-256(user_id || salt)).
    ///
    /// Deterministic for a fixed salt, computationally infeasible to
    /// reverse, and never logged alongside the identity it was derived from.
    fn derive_token(&self, user: UserId) -> String {
        let mut hasher = Sha256::new();
        hasher.update(user.0.to_string().as_bytes());
        hasher.update(self.salt.as_str().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Whether `user` has opted out of summarization.
    pub async fn is_opted_out(&self, user: UserId) -> bool {
        let token = self.derive_token(user);
        self.tokens.lock().await.contains(&token)
    }

    /// Opts `user` out. Returns `true` if newly added, `false` if already
    /// opted out. The mutation is persisted before returning.
    pub async fn opt_out(&self, user: UserId) -> Result<bool, RecapError> {
        let token = self.derive_token(user);
        let mut tokens = self.tokens.lock().await;
        if tokens.contains(&token) {
            return Ok(false);
        }
        tokens.insert(token);
        self.persist(&tokens).await?;
        info!("user opted out of summarization");
        Ok(true)
    }

    /// Opts `user` back in. Returns `true` if newly removed, `false` if the
    /// user was not opted out.
    pub async fn opt_in(&self, user: UserId) -> Result<bool, RecapError> {
        let token = self.derive_token(user);
        let mut tokens = self.tokens.lock().await;
        if !tokens.remove(&token) {
            return Ok(false);
        }
        self.persist(&tokens).await?;
        info!("user opted back into summarization");
        Ok(true)
    }

    /// Number of currently opted-out users.
    pub async fn opted_out_count(&self) -> usize {
        self.tokens.lock().await.len()
    }

    async fn persist(&self, tokens: &HashSet<String>) -> Result<(), RecapError> {
        // Sorted for stable files across runs.
        let mut list: Vec<String> = tokens.iter().cloned().collect();
        list.sort();
        let mut store = self.store.lock().await;
        store.set_opted_out_tokens(&list)
    }
}
