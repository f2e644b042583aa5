//! # partdeck-store: Local Storage for PartDeck
//!
//! Durable client state: the cart ledger, the UI language and the
//! verification gate's counters and codes. Everything lives in one SQLite
//! key-value table.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PartDeck Data Flow                               │
//! │                                                                         │
//! │  partdeck cart add X1 2                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartState (in memory) ──► Cart::add (partdeck-core)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  partdeck-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ Kv, Cart,     │    │  (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │ Preferences,  │    │ 001_local_   │  │   │
//! │  │   │               │    │ Access        │    │ storage.sql  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  partdeck.db in the platform data directory                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use partdeck_store::{Database, StoreConfig};
//!
//! let db = Database::new(StoreConfig::new("partdeck.db")).await?;
//! let cart = db.cart().load().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Database, StoreConfig};

pub use repository::access::{AccessRepository, RemoteCode};
pub use repository::cart::CartRepository;
pub use repository::kv::KvRepository;
pub use repository::preferences::PreferencesRepository;
