//! Guaranteed-win pity ladder

use std::sync::Arc;

use rand::Rng;

use dl_store::Store;

use crate::campaign::{PityTier, PrizeId};
use crate::error::{DrawError, DrawResult};
use crate::keys::KeySpace;
use crate::rate::CumulativeTable;

/// Ordered ladder of guaranteed-win tiers with per-tier checkpoints.
///
/// Each tier remembers the counted draw index at which it last fired
/// (its checkpoint, stored as a JSON array per campaign). A tier qualifies
/// once `visit_count - checkpoint >= threshold`; the first qualifying tier
/// in ladder order wins the draw's pity slot.
///
/// Checkpoints only advance through [`commit`](Self::commit), which the
/// orchestrator calls after the selected prize is confirmed granted. A
/// fired-but-unconfirmed tier (depleted stock, NoWin selection) keeps its
/// checkpoint and re-qualifies on every subsequent draw.
#[derive(Clone)]
pub struct PityTracker {
    store: Arc<dyn Store>,
    keys: KeySpace,
    tiers: Vec<PityTier>,
    tables: Vec<CumulativeTable>,
}

impl PityTracker {
    /// Build the tracker, precomputing one cumulative table per tier.
    pub fn new(store: Arc<dyn Store>, keys: KeySpace, tiers: &[PityTier], scale: u64) -> Self {
        let tables = tiers
            .iter()
            .map(|tier| CumulativeTable::build(&tier.prizes, scale))
            .collect();
        Self {
            store,
            keys,
            tiers: tiers.to_vec(),
            tables,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Per-tier checkpoints for a campaign, lazily initialized to zeros on
    /// first read. The zero record is written back so later readers see an
    /// explicit baseline.
    pub fn checkpoints(&self, campaign: &str) -> DrawResult<Vec<u64>> {
        let map = self.keys.pity_map();
        match self.store.hash_get(&map, campaign)? {
            Some(json) => {
                let mut checkpoints: Vec<u64> = decode_checkpoints(campaign, &json)?;
                // The tier list may have grown since the record was written.
                checkpoints.resize(self.tiers.len(), 0);
                Ok(checkpoints)
            }
            None => {
                let zeros = vec![0u64; self.tiers.len()];
                let json = encode_checkpoints(campaign, &zeros)?;
                self.store.hash_set(&map, campaign, &json)?;
                Ok(zeros)
            }
        }
    }

    /// First tier, in ladder order, whose threshold is met at
    /// `visit_count`. Lower-priority qualifying tiers are ignored this
    /// draw.
    pub fn evaluate(&self, checkpoints: &[u64], visit_count: u64) -> Option<usize> {
        self.tiers
            .iter()
            .zip(checkpoints)
            .position(|(tier, &checkpoint)| {
                visit_count.saturating_sub(checkpoint) >= tier.threshold
            })
    }

    /// Pick the prize for a fired tier.
    ///
    /// A single-entry table is granted directly, no randomness. Multiple
    /// entries are drawn by weight and may themselves come up empty when
    /// the weights don't cover the full scale.
    pub fn select_prize(&self, tier: usize, rng: &mut impl Rng) -> Option<PrizeId> {
        if let Some(prize) = self.tiers[tier].prizes.sole_prize() {
            return Some(prize);
        }
        self.tables[tier].draw(rng)
    }

    /// Record that `tier`'s prize was confirmed granted at `visit_count`.
    pub fn commit(&self, campaign: &str, tier: usize, visit_count: u64) -> DrawResult<()> {
        let mut checkpoints = self.checkpoints(campaign)?;
        checkpoints[tier] = visit_count;
        let json = encode_checkpoints(campaign, &checkpoints)?;
        self.store.hash_set(&self.keys.pity_map(), campaign, &json)?;
        log::debug!("campaign '{campaign}': pity tier {tier} checkpoint set to {visit_count}");
        Ok(())
    }

    /// First tier whose prize table contains `prize`, if any. Grants of
    /// such a prize advance that tier's checkpoint however the prize was
    /// won.
    pub fn tier_for_prize(&self, prize: PrizeId) -> Option<usize> {
        self.tiers.iter().position(|tier| tier.prizes.contains(prize))
    }
}

fn decode_checkpoints(campaign: &str, json: &str) -> DrawResult<Vec<u64>> {
    serde_json::from_str(json).map_err(|source| DrawError::Record {
        kind: "pity checkpoint",
        campaign: campaign.to_owned(),
        source,
    })
}

fn encode_checkpoints(campaign: &str, checkpoints: &[u64]) -> DrawResult<String> {
    serde_json::to_string(checkpoints).map_err(|source| DrawError::Record {
        kind: "pity checkpoint",
        campaign: campaign.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dl_store::MemoryStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::campaign::PrizeWeights;

    fn tracker(tiers: Vec<PityTier>) -> (PityTracker, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let tracker = PityTracker::new(store.clone(), KeySpace::default(), &tiers, 10_000);
        (tracker, store)
    }

    fn two_tier_ladder() -> Vec<PityTier> {
        vec![
            PityTier::new(
                PrizeWeights::new().with(PrizeId(1), 20.0).with(PrizeId(2), 80.0),
                400,
            ),
            PityTier::new(PrizeWeights::new().with(PrizeId(3), 100.0), 1200),
        ]
    }

    #[test]
    fn test_checkpoints_lazily_initialized() {
        let (tracker, store) = tracker(two_tier_ladder());
        assert_eq!(tracker.checkpoints("c").unwrap(), vec![0, 0]);
        // The zero record was persisted.
        assert_eq!(
            store.hash_get(&KeySpace::default().pity_map(), "c").unwrap(),
            Some("[0,0]".into())
        );
    }

    #[test]
    fn test_threshold_fires_exactly() {
        let (tracker, _) = tracker(two_tier_ladder());
        let checkpoints = tracker.checkpoints("c").unwrap();
        assert_eq!(tracker.evaluate(&checkpoints, 399), None);
        assert_eq!(tracker.evaluate(&checkpoints, 400), Some(0));
        assert_eq!(tracker.evaluate(&checkpoints, 401), Some(0));
    }

    #[test]
    fn test_first_qualifying_tier_wins() {
        let (tracker, _) = tracker(two_tier_ladder());
        // Both tiers qualify at 1200; the higher-priority tier is chosen.
        let checkpoints = vec![0, 0];
        assert_eq!(tracker.evaluate(&checkpoints, 1200), Some(0));
        // With tier 0 freshly committed, tier 1 gets its turn.
        let checkpoints = vec![1200, 0];
        assert_eq!(tracker.evaluate(&checkpoints, 1200), Some(1));
    }

    #[test]
    fn test_commit_resets_distance() {
        let (tracker, _) = tracker(two_tier_ladder());
        tracker.checkpoints("c").unwrap();
        tracker.commit("c", 0, 400).unwrap();

        let checkpoints = tracker.checkpoints("c").unwrap();
        assert_eq!(checkpoints, vec![400, 0]);
        assert_eq!(tracker.evaluate(&checkpoints, 799), None);
        assert_eq!(tracker.evaluate(&checkpoints, 800), Some(0));
    }

    #[test]
    fn test_uncommitted_tier_stays_eligible() {
        let (tracker, _) = tracker(two_tier_ladder());
        let checkpoints = tracker.checkpoints("c").unwrap();
        // No commit between evaluations: the tier keeps qualifying.
        assert_eq!(tracker.evaluate(&checkpoints, 400), Some(0));
        assert_eq!(tracker.evaluate(&checkpoints, 401), Some(0));
        assert_eq!(tracker.evaluate(&checkpoints, 500), Some(0));
    }

    #[test]
    fn test_select_prize_single_entry_is_direct() {
        let (tracker, _) = tracker(two_tier_ladder());
        let mut rng = StdRng::seed_from_u64(1);
        // Tier 1 has one entry; selection never consults the RNG result.
        for _ in 0..10 {
            assert_eq!(tracker.select_prize(1, &mut rng), Some(PrizeId(3)));
        }
    }

    #[test]
    fn test_select_prize_weighted_covers_table() {
        let (tracker, _) = tracker(two_tier_ladder());
        let mut rng = StdRng::seed_from_u64(2);
        // Tier 0 weights sum to 100%: selection always lands on a prize.
        for _ in 0..200 {
            let prize = tracker.select_prize(0, &mut rng).unwrap();
            assert!(prize == PrizeId(1) || prize == PrizeId(2));
        }
    }

    #[test]
    fn test_select_prize_may_miss_when_underweighted() {
        let tiers = vec![PityTier::new(
            PrizeWeights::new().with(PrizeId(1), 1.0).with(PrizeId(2), 1.0),
            10,
        )];
        let (tracker, _) = tracker(tiers);
        let mut rng = StdRng::seed_from_u64(3);
        let misses = (0..500).filter(|_| tracker.select_prize(0, &mut rng).is_none()).count();
        assert!(misses > 0);
    }

    #[test]
    fn test_tier_for_prize() {
        let (tracker, _) = tracker(two_tier_ladder());
        assert_eq!(tracker.tier_for_prize(PrizeId(1)), Some(0));
        assert_eq!(tracker.tier_for_prize(PrizeId(2)), Some(0));
        assert_eq!(tracker.tier_for_prize(PrizeId(3)), Some(1));
        assert_eq!(tracker.tier_for_prize(PrizeId(99)), None);
    }

    #[test]
    fn test_record_resizes_when_ladder_grows() {
        let (tracker, store) = tracker(two_tier_ladder());
        store
            .hash_set(&KeySpace::default().pity_map(), "c", "[250]")
            .unwrap();
        assert_eq!(tracker.checkpoints("c").unwrap(), vec![250, 0]);
    }

    #[test]
    fn test_corrupt_record_surfaces() {
        let (tracker, store) = tracker(two_tier_ladder());
        store
            .hash_set(&KeySpace::default().pity_map(), "c", "{oops")
            .unwrap();
        let err = tracker.checkpoints("c").unwrap_err();
        assert!(matches!(err, DrawError::Record { kind: "pity checkpoint", .. }));
    }
}
