//! # dl-sim — Batch draw simulator
//!
//! Runs large batches of draws against a campaign to validate its
//! configuration empirically: win distribution against configured weights,
//! stock exhaustion under concurrency, pity cadence.
//!
//! Draws fan out across worker threads; every worker drives its own
//! [`DrawEngine`](dl_core::DrawEngine) over the shared store, so a batch
//! doubles as a concurrency exercise of the real deployment shape
//! (independent service instances, shared campaign state).

pub mod batch;
pub mod stats;

pub use batch::*;
pub use stats::*;
