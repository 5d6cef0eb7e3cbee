//! Campaign configuration

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default single-rate chance in percent, used when no rate is supplied to
/// the boolean draw form.
pub const DEFAULT_BASE_RATE: f64 = 0.99;

/// Identifier of a configured prize.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PrizeId(pub u32);

impl fmt::Display for PrizeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of a weight table.
///
/// `percent` is a win percentage with two-decimal precision (e.g. `0.85`
/// for 0.85%). `None` is only legal in a single-entry table and means the
/// prize is certain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub prize: PrizeId,
    pub percent: Option<f64>,
}

/// Ordered prize→percentage table.
///
/// Order is significant: cumulative boundaries accumulate in table order,
/// so ties and overlaps favor earlier entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrizeWeights {
    entries: Vec<WeightEntry>,
}

impl PrizeWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-entry table with no percentage — a certain win.
    pub fn certain(prize: PrizeId) -> Self {
        Self {
            entries: vec![WeightEntry {
                prize,
                percent: None,
            }],
        }
    }

    /// Append an entry, builder style.
    pub fn with(mut self, prize: PrizeId, percent: f64) -> Self {
        self.push(prize, percent);
        self
    }

    pub fn push(&mut self, prize: PrizeId, percent: f64) {
        self.entries.push(WeightEntry {
            prize,
            percent: Some(percent),
        });
    }

    pub fn entries(&self) -> &[WeightEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, prize: PrizeId) -> bool {
        self.entries.iter().any(|e| e.prize == prize)
    }

    /// The prize of a single-entry table, whatever its percentage.
    pub fn sole_prize(&self) -> Option<PrizeId> {
        match self.entries.as_slice() {
            [entry] => Some(entry.prize),
            _ => None,
        }
    }

    /// True for a single-entry table with no percentage specified.
    pub fn is_certain(&self) -> bool {
        matches!(self.entries.as_slice(), [WeightEntry { percent: None, .. }])
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for entry in &self.entries {
            match entry.percent {
                Some(p) if p < 0.0 => {
                    return Err(ConfigError::NegativeWeight {
                        prize: entry.prize,
                        percent: p,
                    });
                }
                None if self.entries.len() > 1 => {
                    return Err(ConfigError::UnspecifiedWeight { prize: entry.prize });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl FromIterator<(PrizeId, f64)> for PrizeWeights {
    fn from_iter<I: IntoIterator<Item = (PrizeId, f64)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(prize, percent)| WeightEntry {
                prize,
                percent: Some(percent),
            })
            .collect();
        Self { entries }
    }
}

/// One rung of the pity ladder.
///
/// Position in the campaign's tier list is the priority: lower index wins
/// when several tiers qualify on the same draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PityTier {
    /// Prize table consulted when the tier fires. A single entry is granted
    /// directly; multiple entries are drawn by weight.
    pub prizes: PrizeWeights,
    /// Counted draws since the tier's checkpoint before it fires.
    pub threshold: u64,
}

impl PityTier {
    pub fn new(prizes: PrizeWeights, threshold: u64) -> Self {
        Self { prizes, threshold }
    }
}

/// A named, independently configured draw context.
///
/// Immutable for a run: built once, validated by the engine, then only
/// read. Flags mirror the classic campaign switches — `eligible` gates all
/// resolvers, `counting` drives the visit counter, and `pity_enabled`
/// turns the ladder on (which forces counting, since thresholds are
/// measured in counted draws).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    name: String,
    base_rate: f64,
    rate: PrizeWeights,
    pity_tiers: Vec<PityTier>,
    cheat: HashMap<String, PrizeId>,
    eligible: bool,
    counting: bool,
    pity_enabled: bool,
    scale: u64,
}

impl Campaign {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_rate: DEFAULT_BASE_RATE,
            rate: PrizeWeights::new(),
            pity_tiers: Vec::new(),
            cheat: HashMap::new(),
            eligible: true,
            counting: true,
            pity_enabled: true,
            scale: crate::rate::MIN_SCALE,
        }
    }

    pub fn with_base_rate(mut self, percent: f64) -> Self {
        self.base_rate = percent;
        self
    }

    pub fn with_rate(mut self, rate: PrizeWeights) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_pity_tier(mut self, tier: PityTier) -> Self {
        self.pity_tiers.push(tier);
        self
    }

    pub fn with_pity_tiers(mut self, tiers: Vec<PityTier>) -> Self {
        self.pity_tiers = tiers;
        self
    }

    pub fn with_cheat(mut self, identity: impl Into<String>, prize: PrizeId) -> Self {
        self.cheat.insert(identity.into(), prize);
        self
    }

    pub fn with_eligible(mut self, eligible: bool) -> Self {
        self.eligible = eligible;
        self
    }

    pub fn with_counting(mut self, counting: bool) -> Self {
        self.counting = counting;
        self
    }

    pub fn with_pity(mut self, enabled: bool) -> Self {
        self.pity_enabled = enabled;
        self
    }

    /// Weight scale. Values below the minimum are clamped up at table
    /// build time.
    pub fn with_scale(mut self, scale: u64) -> Self {
        self.scale = scale;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_rate(&self) -> f64 {
        self.base_rate
    }

    pub fn rate(&self) -> &PrizeWeights {
        &self.rate
    }

    pub fn pity_tiers(&self) -> &[PityTier] {
        &self.pity_tiers
    }

    pub fn cheat(&self) -> &HashMap<String, PrizeId> {
        &self.cheat
    }

    pub fn eligible(&self) -> bool {
        self.eligible
    }

    pub fn pity_enabled(&self) -> bool {
        self.pity_enabled
    }

    pub fn scale(&self) -> u64 {
        self.scale
    }

    /// Whether the visit counter runs. Pity thresholds are measured in
    /// counted draws, so enabling the ladder forces counting on.
    pub fn counting(&self) -> bool {
        self.counting || self.pity_enabled
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.base_rate < 0.0 {
            return Err(ConfigError::NegativeBaseRate(self.base_rate));
        }
        self.rate.validate()?;
        for (index, tier) in self.pity_tiers.iter().enumerate() {
            if tier.prizes.is_empty() {
                return Err(ConfigError::EmptyPityTier(index));
            }
            if tier.threshold == 0 {
                return Err(ConfigError::ZeroPityThreshold(index));
            }
            tier.prizes.validate()?;
        }
        Ok(())
    }
}
