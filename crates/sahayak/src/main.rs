// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sahayak - offline-first sync core for the coaching chat client.
//!
//! This binary is a thin operational shell around the library crates:
//! inspect the local store, or run a one-shot outbox drain against the
//! configured backend.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sahayak_api::HttpApiClient;
use sahayak_auth::SessionGate;
use sahayak_core::{Connectivity, SahayakError};
use sahayak_storage::LocalStore;
use sahayak_sync::{SyncEngine, SyncSettings};

/// Sahayak - offline-first sync core for the coaching chat client.
#[derive(Parser, Debug)]
#[command(name = "sahayak", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show session and queue state from the local store.
    Status,
    /// Replay queued sends against the configured backend once.
    Drain,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match sahayak_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            sahayak_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.client.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Some(Commands::Status) => status(&config).await,
        Some(Commands::Drain) => drain(&config).await,
        None => {
            println!("sahayak: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("sahayak: {e}");
        std::process::exit(1);
    }
}

async fn status(config: &sahayak_config::SahayakConfig) -> Result<(), SahayakError> {
    let store = LocalStore::open(&config.storage.database_path).await?;

    match store.session().await? {
        Some(session) => println!(
            "session: authenticated (teacher {})",
            session.teacher_id.as_deref().unwrap_or("unknown")
        ),
        None => println!("session: none"),
    }
    println!("messages: {}", store.message_count().await?);
    println!("queued actions: {}", store.pending_count().await?);

    store.close().await
}

async fn drain(config: &sahayak_config::SahayakConfig) -> Result<(), SahayakError> {
    let store = Arc::new(LocalStore::open(&config.storage.database_path).await?);
    let client = Arc::new(HttpApiClient::new(
        config.api.base_url.clone(),
        Duration::from_secs(config.api.timeout_secs),
    )?);

    // A one-shot CLI drain asserts reachability by trying; the engine
    // converts unreachability into retries.
    let connectivity = Connectivity::online();
    let gate = Arc::new(SessionGate::new(
        store.clone(),
        client.clone(),
        connectivity.clone(),
    ));
    let engine = SyncEngine::new(
        store.clone(),
        client,
        gate,
        connectivity,
        SyncSettings {
            retention_cap: config.sync.retention_cap,
            max_attempts: config.sync.max_attempts,
            default_language: Some(config.client.language.clone()),
        },
    );

    let report = engine.drain().await?;
    println!(
        "drained: {} processed, {} sent, {} retried, {} abandoned",
        report.processed, report.sent, report.retried, report.abandoned
    );
    if report.halted_on_auth {
        println!("halted: session rejected, log in again");
    }

    store.close().await
}
