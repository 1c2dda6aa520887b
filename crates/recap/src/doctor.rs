// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `recap doctor` command implementation.
//!
//! Runs diagnostic checks against the local data directory and the
//! provider endpoint to identify configuration and connectivity problems
//! before a summarization run.

use std::path::Path;
use std::time::{Duration, Instant};

use recap_config::SettingsStore;
use recap_gemini::client::API_BASE_URL;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed successfully.
    Pass,
    /// Check passed with a warning.
    Warn,
    /// Check failed.
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check.
    pub name: String,
    /// Check status.
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    /// Duration the check took.
    pub duration: Duration,
}

/// Run the `recap doctor` command.
///
/// Returns the number of failed checks so the caller can set the exit code.
pub async fn run_doctor(data_dir: &Path) -> usize {
    let mut results = Vec::new();

    results.push(check_settings(data_dir).await);
    results.push(check_salt(data_dir).await);
    results.push(check_credentials().await);
    results.push(check_provider_connectivity().await);

    println!();
    println!("  recap doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;

    for result in &results {
        let duration_ms = result.duration.as_millis();
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => {
                warn_count += 1;
                "[WARN]"
            }
            CheckStatus::Fail => {
                fail_count += 1;
                "[FAIL]"
            }
        };
        println!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        );
    }

    println!();

    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }

    println!();

    fail_count
}

/// Check the settings store loads without errors.
async fn check_settings(data_dir: &Path) -> CheckResult {
    let start = Instant::now();
    let path = data_dir.join("settings.json");

    if !path.exists() {
        return CheckResult {
            name: "Settings".to_string(),
            status: CheckStatus::Warn,
            message: format!(
                "not found: {} (will be created on first run)",
                path.display()
            ),
            duration: start.elapsed(),
        };
    }

    match SettingsStore::load(path) {
        Ok(_) => CheckResult {
            name: "Settings".to_string(),
            status: CheckStatus::Pass,
            message: "valid".to_string(),
            duration: start.elapsed(),
        },
        Err(e) => CheckResult {
            name: "Settings".to_string(),
            status: CheckStatus::Fail,
            message: format!("load failed: {e}"),
            duration: start.elapsed(),
        },
    }
}

/// Check the privacy salt file exists and is readable.
///
/// Only presence and readability are reported; the salt itself never
/// appears in any output.
async fn check_salt(data_dir: &Path) -> CheckResult {
    let start = Instant::now();
    let path = data_dir.join("salt");

    if !path.exists() {
        return CheckResult {
            name: "Privacy salt".to_string(),
            status: CheckStatus::Warn,
            message: "not found (will be generated on first run)".to_string(),
            duration: start.elapsed(),
        };
    }

    match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > 0 => CheckResult {
            name: "Privacy salt".to_string(),
            status: CheckStatus::Pass,
            message: "present".to_string(),
            duration: start.elapsed(),
        },
        Ok(_) => CheckResult {
            name: "Privacy salt".to_string(),
            status: CheckStatus::Fail,
            message: "file is empty".to_string(),
            duration: start.elapsed(),
        },
        Err(e) => CheckResult {
            name: "Privacy salt".to_string(),
            status: CheckStatus::Fail,
            message: format!("cannot read: {e}"),
            duration: start.elapsed(),
        },
    }
}

/// Check provider credentials are configured.
async fn check_credentials() -> CheckResult {
    let start = Instant::now();

    match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => CheckResult {
            name: "Credentials".to_string(),
            status: CheckStatus::Pass,
            message: "GEMINI_API_KEY set".to_string(),
            duration: start.elapsed(),
        },
        _ => CheckResult {
            name: "Credentials".to_string(),
            status: CheckStatus::Fail,
            message: "GEMINI_API_KEY not set".to_string(),
            duration: start.elapsed(),
        },
    }
}

/// Check provider API connectivity via HEAD request.
async fn check_provider_connectivity() -> CheckResult {
    let start = Instant::now();

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            return CheckResult {
                name: "Provider API".to_string(),
                status: CheckStatus::Fail,
                message: format!("HTTP client error: {e}"),
                duration: start.elapsed(),
            };
        }
    };

    match client.head(API_BASE_URL).send().await {
        Ok(_resp) => CheckResult {
            name: "Provider API".to_string(),
            status: CheckStatus::Pass,
            message: "reachable".to_string(),
            duration: start.elapsed(),
        },
        Err(e) => {
            let msg = if e.is_timeout() {
                "timeout (5s)".to_string()
            } else if e.is_connect() {
                "connection refused".to_string()
            } else {
                format!("error: {e}")
            };
            CheckResult {
                name: "Provider API".to_string(),
                status: CheckStatus::Fail,
                message: msg,
                duration: start.elapsed(),
            }
        }
    }
}
