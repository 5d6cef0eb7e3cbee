//! Finite per-prize stock

use std::sync::Arc;

use dl_store::Store;

use crate::campaign::PrizeId;
use crate::error::DrawResult;
use crate::keys::KeySpace;
use crate::visit::VisitCounter;

/// Result of one consumption attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockOutcome {
    /// One token removed; `remaining` is the pool size after removal.
    Consumed { remaining: u64 },
    /// Pool empty or never initialized.
    Depleted,
}

/// Finite per-prize inventory held as atomically-poppable tokens.
///
/// A pool initialized with N units yields at most N successful
/// consumptions, whatever the concurrent interleaving: `try_consume` is a
/// single atomic pop against the store. Prizes with no initialized pool
/// fail closed.
#[derive(Clone)]
pub struct StockGate {
    store: Arc<dyn Store>,
    keys: KeySpace,
}

impl StockGate {
    pub fn new(store: Arc<dyn Store>, keys: KeySpace) -> Self {
        Self { store, keys }
    }

    /// Create `quantity` tokens for one prize and restart the campaign.
    ///
    /// Stock reinitialization implies campaign restart: the visit counter
    /// resets to 0 and every pity checkpoint is cleared.
    pub fn initialize(&self, campaign: &str, prize: PrizeId, quantity: u64) -> DrawResult<()> {
        self.fill(campaign, prize, quantity)?;
        self.restart(campaign)
    }

    /// Batch form of [`initialize`](Self::initialize): fills every listed
    /// pool, then restarts the campaign once.
    pub fn initialize_all(&self, campaign: &str, stock: &[(PrizeId, u64)]) -> DrawResult<()> {
        for &(prize, quantity) in stock {
            self.fill(campaign, prize, quantity)?;
        }
        self.restart(campaign)
    }

    /// Atomically remove one token for `prize`.
    pub fn try_consume(&self, campaign: &str, prize: PrizeId) -> DrawResult<StockOutcome> {
        let key = self.keys.stock(campaign, prize);
        if self.store.pop(&key)? {
            let remaining = self.store.len(&key)?;
            Ok(StockOutcome::Consumed { remaining })
        } else {
            Ok(StockOutcome::Depleted)
        }
    }

    /// Current token count for `prize` (0 for unconfigured pools).
    pub fn remaining(&self, campaign: &str, prize: PrizeId) -> DrawResult<u64> {
        Ok(self.store.len(&self.keys.stock(campaign, prize))?)
    }

    fn fill(&self, campaign: &str, prize: PrizeId, quantity: u64) -> DrawResult<()> {
        let key = self.keys.stock(campaign, prize);
        for _ in 0..quantity {
            self.store.push(&key)?;
        }
        log::debug!("campaign '{campaign}': initialized {quantity} stock units for prize {prize}");
        Ok(())
    }

    fn restart(&self, campaign: &str) -> DrawResult<()> {
        VisitCounter::new(Arc::clone(&self.store), self.keys.clone()).reset(campaign)?;
        self.store.hash_delete(&self.keys.pity_map(), campaign)?;
        log::debug!("campaign '{campaign}': restarted (visit count and pity checkpoints cleared)");
        Ok(())
    }
}
