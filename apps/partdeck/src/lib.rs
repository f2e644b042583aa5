//! # PartDeck Library
//!
//! Core library for the `partdeck` binary: configures logging, opens the
//! store, builds the state objects and runs one command.
//!
//! ## Module Organization
//! ```text
//! partdeck/
//! ├── lib.rs          ◄─── You are here (logging & run)
//! ├── cli.rs          ◄─── clap definitions
//! ├── app.rs          ◄─── Store + state objects, command dispatch
//! ├── config.rs       ◄─── catalog.toml and PARTDECK_* overrides
//! ├── state/
//! │   ├── catalog.rs  ◄─── ViewController behind a mutex, load tickets
//! │   ├── cart.rs     ◄─── Cart, persistence, totals channel
//! │   ├── media.rs    ◄─── Image discovery, gallery tickets
//! │   └── access.rs   ◄─── Verification gate
//! ├── commands/       ◄─── One function per operation, DTO results
//! ├── render.rs       ◄─── Text output
//! ├── shell.rs        ◄─── Interactive session
//! └── error.rs        ◄─── ApiError and exit codes
//! ```
//!
//! ## Output Streams
//! Command output goes to stdout (text or `--json`); logs and error
//! messages go to stderr so scripts can pipe results.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod shell;
pub mod state;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use app::{App, OutputFormat};
use cli::Cli;
use config::CatalogConfig;
use error::ApiError;

/// Parses the command line, runs the command and maps failures to exit codes.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  1. Initialize Logging ──► stderr, RUST_LOG or info,partdeck=debug      │
/// │  2. Load Configuration ──► --config / PARTDECK_CONFIG / platform dir    │
/// │  3. Open Store ──────────► SQLite (WAL), migrations                     │
/// │  4. Execute ─────────────► gate check, command, text or JSON            │
/// │  5. Close Store ─────────► pool drained before exit                     │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    match execute(cli, format).await {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(code = ?e.code, "{}", e.message);
            match format {
                OutputFormat::Json => match serde_json::to_string_pretty(&e) {
                    Ok(json) => eprintln!("{}", json),
                    Err(_) => eprintln!("error: {}", e.message),
                },
                OutputFormat::Text => eprintln!("error: {}", e.message),
            }
            ExitCode::from(e.code.exit_code())
        }
    }
}

async fn execute(cli: Cli, format: OutputFormat) -> Result<String, ApiError> {
    let config = CatalogConfig::load(cli.config.clone())?;
    let app = App::open(config, cli.config).await?;
    info!(command = ?cli.command, "Running");

    let result = app.execute(cli.command, format).await;
    app.close().await;
    result
}

/// Initializes the tracing subscriber.
///
/// Writes to stderr. Filter comes from `RUST_LOG`, defaulting to
/// `info,partdeck=debug,sqlx=warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,partdeck=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
