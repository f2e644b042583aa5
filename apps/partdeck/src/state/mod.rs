//! # State Module
//!
//! Runtime state for one PartDeck process.
//!
//! ## Why Multiple State Types?
//! Each command takes only the state it touches. Listing a sheet never
//! waits on the cart lock, and exporting never holds the view lock.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │ CatalogState │  │  CartState   │  │  MediaState  │  │AccessState │  │
//! │  │              │  │              │  │              │  │            │  │
//! │  │ Mutex<View-  │  │ Arc<Mutex<   │  │ Arc<Image-   │  │ GatePolicy │  │
//! │  │  Controller> │  │   Cart>>     │  │  Discovery>  │  │ + store    │  │
//! │  │ LoadTracker  │  │ watch totals │  │ LoadTracker  │  │ + http     │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘  │
//! │                                                                         │
//! │  LOCK ORDER: view before cart. Never hold a lock across an .await.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod access;
pub(crate) mod cart;
pub(crate) mod catalog;
pub(crate) mod media;

pub use access::{AccessState, GateStatus};
pub use cart::{CartChange, CartState};
pub use catalog::{CatalogState, LoadOutcome};
pub use media::MediaState;
