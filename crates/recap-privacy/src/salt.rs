// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The process-wide secret salt.
//!
//! Generated once from the system CSPRNG, persisted as a hex string, and
//! loaded verbatim on every subsequent start. The salt must never be logged
//! or exposed; `Debug` is redacted.

use std::fmt;
use std::path::Path;

use recap_core::RecapError;
use ring::rand::{SecureRandom, SystemRandom};
use tracing::info;

/// 256-bit secret salt for privacy token derivation.
#[derive(Clone)]
pub struct Salt(String);

impl Salt {
    /// Loads the salt from `path`, generating and persisting a fresh one if
    /// the file does not exist.
    ///
    /// Any I/O failure is a fatal configuration error: regenerating a salt
    /// that merely failed to load would irreversibly invalidate every
    /// stored opt-out token.
    pub fn load_or_create(path: &Path) -> Result<Self, RecapError> {
        if path.exists() {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| RecapError::Config(format!("failed to read salt file: {e}")))?;
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(RecapError::Config("salt file is empty".into()));
            }
            return Ok(Self(trimmed.to_string()));
        }

        let rng = SystemRandom::new();
        let mut bytes = [0u8; 32];
        rng.fill(&mut bytes)
            .map_err(|_| RecapError::Config("failed to generate random salt".into()))?;
        let encoded = hex::encode(bytes);

        std::fs::write(path, &encoded)
            .map_err(|e| RecapError::Config(format!("failed to write salt file: {e}")))?;
        info!(path = %path.display(), "created new salt for privacy token derivation");
        Ok(Self(encoded))
    }

    /// Builds a salt from raw material. Test-only; production salts always
    /// come from [`load_or_create`](Self::load_or_create).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Salt(<redacted>)")
    }
}
