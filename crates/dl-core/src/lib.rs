//! # dl-core — Campaign draw resolution engine
//!
//! Decides, for a single draw request against a named campaign, whether an
//! identity wins a prize and which one, under four interacting mechanisms:
//! weighted random selection, a one-shot cheat/override list, a
//! guaranteed-win pity ladder, and finite per-prize stock shared across
//! concurrent draws.
//!
//! ## Architecture
//!
//! ```text
//! DrawEngine
//!     │
//!     ├── VisitCounter (counted attempt index)
//!     ├── CheatOverride ─┐
//!     ├── CumulativeTable├── resolver chain, priority order
//!     ├── PityTracker  ──┘
//!     └── StockGate (atomic consumption, commit gate)
//!           │
//!           v
//!     DrawReceipt { index, Won | Lost }
//! ```
//!
//! All mutable campaign state lives behind the `dl-store` capability, so
//! any number of engine instances over one store act as concurrent service
//! instances of the same campaign.

pub mod campaign;
pub mod cheat;
pub mod draw;
pub mod error;
pub mod keys;
pub mod pity;
pub mod rate;
pub mod stock;
pub mod visit;

pub use campaign::*;
pub use cheat::*;
pub use draw::*;
pub use error::*;
pub use keys::*;
pub use pity::*;
pub use rate::*;
pub use stock::*;
pub use visit::*;
