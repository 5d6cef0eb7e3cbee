//! # dl-store — Keyed store capability for DrawLab
//!
//! Campaign state (draw counters, stock token pools, pity checkpoints, the
//! cheat ledger) is shared by independent service instances, so it never
//! lives in process memory. This crate defines the narrow [`Store`]
//! capability the draw engine talks to, and a reference in-process backend
//! for tests, simulation, and single-instance deployments.
//!
//! ## Architecture
//!
//! ```text
//! DrawEngine (dl-core)
//!     │
//!     v
//! Store (trait) ── atomic counters, token pools, hash records
//!     │
//!     ├── MemoryStore (this crate, mutex-backed)
//!     └── external backends (out of scope)
//! ```

pub mod error;
pub mod memory;
pub mod store;

pub use error::*;
pub use memory::*;
pub use store::*;
