//! Draw orchestration
//!
//! One draw walks `Start → Counted → Resolved → StockChecked → Committed`:
//! count the attempt, gate on eligibility, run the resolver chain in
//! priority order, consume stock for the selected prize, and advance the
//! pity checkpoint only once the grant is confirmed.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use dl_store::Store;

use crate::campaign::{Campaign, PrizeId};
use crate::cheat::CheatOverride;
use crate::error::{ConfigError, DrawResult};
use crate::keys::KeySpace;
use crate::pity::PityTracker;
use crate::rate::{self, CumulativeTable};
use crate::stock::{StockGate, StockOutcome};
use crate::visit::VisitCounter;

/// Which resolver produced a win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinSource {
    /// Cheat map override.
    Override,
    /// Base rate table.
    Rate,
    /// Pity ladder, with the firing tier's index.
    Pity { tier: usize },
}

/// Why a draw granted nothing.
///
/// None of these are errors; a depleted prize is distinguishable here for
/// observability even though it surfaces to the player as a plain loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    /// The campaign's eligibility flag blocked all resolvers.
    Ineligible,
    /// No resolver produced a prize.
    NoMatch,
    /// A resolver selected this prize but its stock was exhausted. The
    /// draw is a silent loss; there is no reroll against other prizes.
    OutOfStock { prize: PrizeId },
}

/// Final outcome of one draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawOutcome {
    Won {
        prize: PrizeId,
        source: WinSource,
        /// Stock remaining for the prize after this grant.
        remaining: u64,
    },
    Lost { reason: LossReason },
}

impl DrawOutcome {
    pub fn is_win(&self) -> bool {
        matches!(self, Self::Won { .. })
    }

    pub fn prize(&self) -> Option<PrizeId> {
        match self {
            Self::Won { prize, .. } => Some(*prize),
            Self::Lost { .. } => None,
        }
    }
}

/// One draw's result: the counted attempt index (0 when counting is off)
/// and the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawReceipt {
    pub index: u64,
    pub outcome: DrawOutcome,
}

/// Resolver chain, in tie-break order. Earlier entries win.
const RESOLVER_CHAIN: [Resolver; 3] = [Resolver::Override, Resolver::Rate, Resolver::Pity];

#[derive(Debug, Clone, Copy)]
enum Resolver {
    Override,
    Rate,
    Pity,
}

/// Sequences one draw decision against a campaign.
///
/// The engine owns the validated campaign, the cumulative tables (built
/// once at construction), and the RNG. All mutable campaign state lives in
/// the shared store, so independent engines over the same store behave as
/// independent service instances of one campaign.
#[derive(Clone)]
pub struct DrawEngine {
    campaign: Campaign,
    rate_table: CumulativeTable,
    visits: VisitCounter,
    stock: StockGate,
    cheat: CheatOverride,
    pity: PityTracker,
    rng: StdRng,
}

impl DrawEngine {
    /// Create an engine in the default key namespace.
    pub fn new(campaign: Campaign, store: Arc<dyn Store>) -> Result<Self, ConfigError> {
        Self::with_keys(campaign, store, KeySpace::default())
    }

    /// Create an engine, validating the campaign up front.
    pub fn with_keys(
        campaign: Campaign,
        store: Arc<dyn Store>,
        keys: KeySpace,
    ) -> Result<Self, ConfigError> {
        campaign.validate()?;
        let rate_table = CumulativeTable::build(campaign.rate(), campaign.scale());
        let pity = PityTracker::new(
            Arc::clone(&store),
            keys.clone(),
            campaign.pity_tiers(),
            campaign.scale(),
        );
        Ok(Self {
            rate_table,
            visits: VisitCounter::new(Arc::clone(&store), keys.clone()),
            stock: StockGate::new(Arc::clone(&store), keys.clone()),
            cheat: CheatOverride::new(store, keys),
            pity,
            campaign,
            rng: StdRng::from_os_rng(),
        })
    }

    /// Seed the RNG for reproducible draws.
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    /// Stock operations for this campaign's namespace (initialization,
    /// remaining counts).
    pub fn stock(&self) -> &StockGate {
        &self.stock
    }

    pub fn visits(&self) -> &VisitCounter {
        &self.visits
    }

    /// Run one draw for `identity`.
    pub fn draw(&mut self, identity: &str) -> DrawResult<DrawReceipt> {
        let name = self.campaign.name().to_owned();

        // Counted. The attempt is consumed here and never rolled back,
        // whatever the outcome — including the ineligible gate below.
        let index = if self.campaign.counting() {
            self.visits.increment(&name)?
        } else {
            0
        };

        if !self.campaign.eligible() {
            log::debug!("campaign '{name}': draw {index} blocked by eligibility flag");
            return Ok(DrawReceipt {
                index,
                outcome: DrawOutcome::Lost {
                    reason: LossReason::Ineligible,
                },
            });
        }

        // Resolved.
        let Some((prize, source)) = self.resolve(&name, identity, index)? else {
            return Ok(DrawReceipt {
                index,
                outcome: DrawOutcome::Lost {
                    reason: LossReason::NoMatch,
                },
            });
        };
        log::debug!("campaign '{name}': draw {index} resolved prize {prize} via {source:?}");

        // StockChecked. A selected prize with no stock is a silent loss.
        let remaining = match self.stock.try_consume(&name, prize)? {
            StockOutcome::Depleted => {
                log::debug!("campaign '{name}': draw {index} lost prize {prize} to depleted stock");
                return Ok(DrawReceipt {
                    index,
                    outcome: DrawOutcome::Lost {
                        reason: LossReason::OutOfStock { prize },
                    },
                });
            }
            StockOutcome::Consumed { remaining } => remaining,
        };

        // Committed. The grant is confirmed; if the prize sits in a pity
        // tier, that tier's checkpoint advances to this draw.
        if self.campaign.pity_enabled() {
            if let Some(tier) = self.pity.tier_for_prize(prize) {
                self.pity.commit(&name, tier, index)?;
            }
        }

        Ok(DrawReceipt {
            index,
            outcome: DrawOutcome::Won {
                prize,
                source,
                remaining,
            },
        })
    }

    /// Boolean single-rate draw against the campaign's scale, using the
    /// campaign's base rate when none is given.
    pub fn single_rate(&mut self, percent: Option<f64>) -> bool {
        let percent = percent.unwrap_or(self.campaign.base_rate());
        rate::draw_single(percent, self.campaign.scale(), &mut self.rng)
    }

    /// Walk the resolver chain, short-circuiting on the first win.
    fn resolve(
        &mut self,
        name: &str,
        identity: &str,
        index: u64,
    ) -> DrawResult<Option<(PrizeId, WinSource)>> {
        for resolver in RESOLVER_CHAIN {
            let hit = match resolver {
                Resolver::Override => self
                    .cheat
                    .resolve(name, identity, self.campaign.cheat())?
                    .map(|prize| (prize, WinSource::Override)),
                Resolver::Rate => self
                    .rate_table
                    .draw(&mut self.rng)
                    .map(|prize| (prize, WinSource::Rate)),
                Resolver::Pity => {
                    if !self.campaign.pity_enabled() || self.pity.is_empty() {
                        None
                    } else {
                        let checkpoints = self.pity.checkpoints(name)?;
                        match self.pity.evaluate(&checkpoints, index) {
                            Some(tier) => self
                                .pity
                                .select_prize(tier, &mut self.rng)
                                .map(|prize| (prize, WinSource::Pity { tier })),
                            None => None,
                        }
                    }
                }
            };
            if hit.is_some() {
                return Ok(hit);
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dl_store::MemoryStore;

    use crate::campaign::{PityTier, PrizeWeights};

    fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    fn engine(campaign: Campaign, store: Arc<MemoryStore>) -> DrawEngine {
        let mut engine = DrawEngine::new(campaign, store).unwrap();
        engine.seed(99);
        engine
    }

    /// Rate table that always wins prize 1.
    fn always_win() -> PrizeWeights {
        PrizeWeights::certain(PrizeId(1))
    }

    /// Rate table that never wins.
    fn never_win() -> PrizeWeights {
        PrizeWeights::new().with(PrizeId(1), 0.0)
    }

    #[test]
    fn test_invalid_campaign_rejected_at_construction() {
        let campaign = Campaign::new("");
        assert!(DrawEngine::new(campaign, store()).is_err());
    }

    #[test]
    fn test_certain_rate_wins_with_stock() {
        let store = store();
        let mut engine = engine(Campaign::new("c").with_rate(always_win()), store);
        engine.stock().initialize("c", PrizeId(1), 2).unwrap();

        let receipt = engine.draw("player").unwrap();
        assert_eq!(receipt.index, 1);
        assert_eq!(
            receipt.outcome,
            DrawOutcome::Won {
                prize: PrizeId(1),
                source: WinSource::Rate,
                remaining: 1,
            }
        );
    }

    #[test]
    fn test_depleted_stock_is_silent_loss() {
        let store = store();
        let mut engine = engine(Campaign::new("c").with_rate(always_win()), store);
        engine.stock().initialize("c", PrizeId(1), 1).unwrap();

        assert!(engine.draw("a").unwrap().outcome.is_win());
        let receipt = engine.draw("b").unwrap();
        assert_eq!(
            receipt.outcome,
            DrawOutcome::Lost {
                reason: LossReason::OutOfStock { prize: PrizeId(1) },
            }
        );
        // The attempt was still counted.
        assert_eq!(receipt.index, 2);
    }

    #[test]
    fn test_ineligible_draw_still_counted() {
        let store = store();
        let mut engine = engine(
            Campaign::new("c").with_rate(always_win()).with_eligible(false),
            store,
        );
        engine.stock().initialize("c", PrizeId(1), 5).unwrap();

        for expected in 1..=3 {
            let receipt = engine.draw("player").unwrap();
            assert_eq!(receipt.index, expected);
            assert_eq!(
                receipt.outcome,
                DrawOutcome::Lost {
                    reason: LossReason::Ineligible,
                }
            );
        }
        assert_eq!(engine.visits().current("c").unwrap(), 3);
    }

    #[test]
    fn test_counting_disabled_reports_zero_index() {
        let store = store();
        let mut engine = engine(
            Campaign::new("c")
                .with_rate(never_win())
                .with_counting(false)
                .with_pity(false),
            store,
        );
        let receipt = engine.draw("player").unwrap();
        assert_eq!(receipt.index, 0);
        assert_eq!(engine.visits().current("c").unwrap(), 0);
    }

    #[test]
    fn test_override_beats_rate() {
        let store = store();
        let mut engine = engine(
            Campaign::new("c")
                .with_rate(always_win())
                .with_cheat("vip", PrizeId(9)),
            store,
        );
        engine
            .stock()
            .initialize_all("c", &[(PrizeId(1), 10), (PrizeId(9), 1)])
            .unwrap();

        let receipt = engine.draw("vip").unwrap();
        assert_eq!(
            receipt.outcome,
            DrawOutcome::Won {
                prize: PrizeId(9),
                source: WinSource::Override,
                remaining: 0,
            }
        );

        // The override is one-shot; the next draw falls through to rate.
        let receipt = engine.draw("vip").unwrap();
        assert_eq!(receipt.outcome.prize(), Some(PrizeId(1)));
    }

    #[test]
    fn test_override_slot_consumed_even_without_stock() {
        let store = store();
        let mut engine = engine(
            Campaign::new("c")
                .with_rate(never_win())
                .with_cheat("vip", PrizeId(9)),
            store,
        );
        // Prize 9 has no stock at all.
        let receipt = engine.draw("vip").unwrap();
        assert_eq!(
            receipt.outcome,
            DrawOutcome::Lost {
                reason: LossReason::OutOfStock { prize: PrizeId(9) },
            }
        );

        // The one-shot slot is gone: restocking does not revive the grant.
        engine.stock().initialize("c", PrizeId(9), 1).unwrap();
        let receipt = engine.draw("vip").unwrap();
        assert_eq!(
            receipt.outcome,
            DrawOutcome::Lost {
                reason: LossReason::NoMatch,
            }
        );
    }

    #[test]
    fn test_pity_fires_at_threshold() {
        let store = store();
        let mut engine = engine(
            Campaign::new("c")
                .with_rate(never_win())
                .with_pity_tier(PityTier::new(PrizeWeights::certain(PrizeId(5)), 3)),
            store,
        );
        engine.stock().initialize("c", PrizeId(5), 10).unwrap();

        for _ in 0..2 {
            let receipt = engine.draw("player").unwrap();
            assert_eq!(
                receipt.outcome,
                DrawOutcome::Lost {
                    reason: LossReason::NoMatch,
                }
            );
        }
        let receipt = engine.draw("player").unwrap();
        assert_eq!(receipt.index, 3);
        assert_eq!(
            receipt.outcome,
            DrawOutcome::Won {
                prize: PrizeId(5),
                source: WinSource::Pity { tier: 0 },
                remaining: 9,
            }
        );

        // Checkpoint advanced: the next two draws lose again.
        assert!(!engine.draw("player").unwrap().outcome.is_win());
        assert!(!engine.draw("player").unwrap().outcome.is_win());
        assert!(engine.draw("player").unwrap().outcome.is_win());
    }

    #[test]
    fn test_pity_checkpoint_survives_depleted_stock() {
        let store = store();
        let mut engine = engine(
            Campaign::new("c")
                .with_rate(never_win())
                .with_pity_tier(PityTier::new(PrizeWeights::certain(PrizeId(5)), 3)),
            store.clone(),
        );
        // No stock: the tier fires on every draw past the threshold and
        // keeps losing, without its checkpoint advancing.
        for index in 1..=2 {
            let receipt = engine.draw("p").unwrap();
            assert_eq!(receipt.index, index);
            assert_eq!(
                receipt.outcome,
                DrawOutcome::Lost {
                    reason: LossReason::NoMatch,
                }
            );
        }
        for index in 3..=6 {
            let receipt = engine.draw("p").unwrap();
            assert_eq!(receipt.index, index);
            assert_eq!(
                receipt.outcome,
                DrawOutcome::Lost {
                    reason: LossReason::OutOfStock { prize: PrizeId(5) },
                }
            );
        }

        // Stock arrives mid-campaign (no restart): the tier grants at once.
        // Refill the pool directly so visit count and checkpoints survive.
        let keys = KeySpace::default();
        engine_store_push(&keys, &store, "c", PrizeId(5), 1);
        let receipt = engine.draw("p").unwrap();
        assert!(receipt.outcome.is_win());
    }

    fn engine_store_push(
        keys: &KeySpace,
        store: &Arc<MemoryStore>,
        campaign: &str,
        prize: PrizeId,
        quantity: u64,
    ) {
        use dl_store::Store as _;
        for _ in 0..quantity {
            store.push(&keys.stock(campaign, prize)).unwrap();
        }
    }

    #[test]
    fn test_rate_win_advances_containing_pity_tier() {
        let store = store();
        let mut engine = engine(
            Campaign::new("c")
                .with_rate(always_win())
                .with_pity_tier(PityTier::new(
                    PrizeWeights::new().with(PrizeId(1), 100.0),
                    50,
                )),
            store.clone(),
        );
        engine.stock().initialize("c", PrizeId(1), 3).unwrap();

        engine.draw("p").unwrap();
        engine.draw("p").unwrap();

        // Prize 1 sits in tier 0, so each rate win moved the checkpoint.
        let keys = KeySpace::default();
        use dl_store::Store as _;
        assert_eq!(store.hash_get(&keys.pity_map(), "c").unwrap(), Some("[2]".into()));
    }

    #[test]
    fn test_single_rate_uses_base_rate_default() {
        let store = store();
        let mut engine = engine(
            Campaign::new("c").with_base_rate(100.0).with_rate(never_win()),
            store,
        );
        assert!(engine.single_rate(None));
        assert!(!engine.single_rate(Some(0.0)));
    }
}
