//! # PartDeck Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PartDeck CLI                                     │
//! │                                                                         │
//! │  main.rs ────► builds the tokio runtime, hands off to lib.rs           │
//! │                                                                         │
//! │  lib.rs ─────► logging, config, store, state objects, dispatch         │
//! │                                                                         │
//! │  commands/ ──► sheets, list, search, show, cart, export, login, ...    │
//! │                                                                         │
//! │  shell.rs ───► interactive browsing session                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // The actual setup is in lib.rs for testability
    partdeck::run().await
}
