//! # Repository Module
//!
//! Typed views over the local key-value store.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  db.cart()          db.preferences()        db.access()                 │
//! │  CartRepository     PreferencesRepository   AccessRepository            │
//! │  load / save        language                gate state, codes           │
//! │       │                   │                        │                    │
//! │       └───────────────────┼────────────────────────┘                    │
//! │                           ▼                                             │
//! │                     KvRepository  (db.kv())                             │
//! │                 get / set / delete / *_json                             │
//! │                           │                                             │
//! │                           ▼                                             │
//! │                  kv_store(key, value, updated_at)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod access;
pub mod cart;
pub mod kv;
pub mod preferences;
