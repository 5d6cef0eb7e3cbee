//! Per-campaign draw counter

use std::sync::Arc;

use dl_store::Store;

use crate::error::DrawResult;
use crate::keys::KeySpace;

/// Monotonically increasing per-campaign draw count.
///
/// `increment` is a single atomic store operation, never read-then-write:
/// concurrent draws from independent service instances each receive a
/// distinct count.
#[derive(Clone)]
pub struct VisitCounter {
    store: Arc<dyn Store>,
    keys: KeySpace,
}

impl VisitCounter {
    pub fn new(store: Arc<dyn Store>, keys: KeySpace) -> Self {
        Self { store, keys }
    }

    /// Count one draw attempt and return the new count.
    ///
    /// Called at most once per draw, before resolver logic. Starts from 0
    /// for a fresh campaign.
    pub fn increment(&self, campaign: &str) -> DrawResult<u64> {
        let count = self.store.incr(&self.keys.visit(campaign))?;
        Ok(count.max(0) as u64)
    }

    /// Current count without counting an attempt. 0 when never incremented.
    pub fn current(&self, campaign: &str) -> DrawResult<u64> {
        let count = self.store.get(&self.keys.visit(campaign))?.unwrap_or(0);
        Ok(count.max(0) as u64)
    }

    pub(crate) fn reset(&self, campaign: &str) -> DrawResult<()> {
        self.store.set(&self.keys.visit(campaign), 0)?;
        Ok(())
    }
}
