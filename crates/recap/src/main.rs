// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recap - an AI group-chat summarizer.
//!
//! This is the binary entry point. It wires the privacy registry, rate
//! governor, settings store, and Gemini provider around the summarization
//! pipeline and drives it from chat commands over a transcript file.

mod doctor;
mod transcript;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use recap_agent::{Dispatcher, SummarizerService};
use recap_config::SettingsStore;
use recap_core::types::{ChannelId, UserId};
use recap_gemini::GeminiService;
use recap_limiter::RateGovernor;
use recap_privacy::{PrivacyRegistry, Salt};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::transcript::FileTranscript;

/// Recap - an AI group-chat summarizer.
#[derive(Parser, Debug)]
#[command(name = "recap", version, about, long_about = None)]
struct Cli {
    /// Directory holding the settings store and privacy salt.
    #[arg(long, default_value = "recap-data")]
    data_dir: PathBuf,

    /// Log level for the recap crates (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run diagnostic checks against the environment.
    Doctor,
    /// Run a chat command against a recorded transcript.
    Run {
        /// Path to a JSON transcript (oldest-first array of messages).
        #[arg(long)]
        transcript: PathBuf,

        /// The command text, e.g. "!summarize 20".
        #[arg(long)]
        command: String,

        /// Numeric id of the invoking user. Defaults to the author of the
        /// newest transcript message.
        #[arg(long)]
        caller: Option<u64>,

        /// Treat the caller as an administrator.
        #[arg(long)]
        admin: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("recap={},warn", cli.log_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();

    match cli.command {
        Commands::Doctor => {
            let failures = doctor::run_doctor(&cli.data_dir).await;
            if failures > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Commands::Run {
            transcript,
            command,
            caller,
            admin,
        } => run_command(&cli.data_dir, &transcript, &command, caller, admin).await,
    }
}

async fn run_command(
    data_dir: &std::path::Path,
    transcript_path: &std::path::Path,
    command: &str,
    caller: Option<u64>,
    admin: bool,
) -> ExitCode {
    if let Err(e) = std::fs::create_dir_all(data_dir) {
        eprintln!("recap: cannot create data directory {}: {e}", data_dir.display());
        return ExitCode::FAILURE;
    }

    let store = match SettingsStore::load(data_dir.join("settings.json")) {
        Ok(store) => Arc::new(Mutex::new(store)),
        Err(e) => {
            eprintln!("recap: settings store unavailable: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Refusing to start without a salt is deliberate: raw user ids must
    // never be persisted in its place.
    let salt = match Salt::load_or_create(&data_dir.join("salt")) {
        Ok(salt) => salt,
        Err(e) => {
            eprintln!("recap: privacy salt unavailable: {e}");
            return ExitCode::FAILURE;
        }
    };

    let api_key = match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            eprintln!("recap: GEMINI_API_KEY is not set");
            return ExitCode::FAILURE;
        }
    };

    let provider = match GeminiService::new(&api_key) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            eprintln!("recap: provider setup failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let history = match FileTranscript::load(transcript_path) {
        Ok(transcript) => transcript,
        Err(e) => {
            eprintln!("recap: {e}");
            return ExitCode::FAILURE;
        }
    };

    let caller = match caller.or_else(|| history.newest_author().map(|m| m.author.id.0)) {
        Some(id) => UserId(id),
        None => {
            eprintln!("recap: transcript is empty and no --caller was given");
            return ExitCode::FAILURE;
        }
    };

    let privacy = Arc::new(PrivacyRegistry::open(salt, store.clone()).await);
    let service = Arc::new(SummarizerService::new(
        Arc::new(history),
        provider,
        privacy.clone(),
        Arc::new(Mutex::new(RateGovernor::new())),
        store.clone(),
    ));
    let dispatcher = Dispatcher::new(service, privacy, store);

    match dispatcher.handle(ChannelId(0), caller, admin, command).await {
        Some(replies) => {
            for reply in replies {
                println!("{reply}");
            }
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("recap: not a recognized command: {command}");
            ExitCode::FAILURE
        }
    }
}
