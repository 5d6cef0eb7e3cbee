//! Weighted random selection
//!
//! Percentages are scaled to an integer range and accumulated into a
//! cumulative boundary table, built once per rate-table version and reused
//! across draws. A draw rolls a uniform integer in `[1, scale]` and takes
//! the first prize whose boundary covers the roll.

use rand::Rng;

use crate::campaign::{PrizeId, PrizeWeights};

/// Smallest permitted weight scale; two-decimal percentages stay exact at
/// this resolution. Smaller configured scales are clamped up.
pub const MIN_SCALE: u64 = 10_000;

/// Immutable cumulative boundary table for one weight table.
#[derive(Debug, Clone)]
pub struct CumulativeTable {
    bounds: Vec<(PrizeId, f64)>,
    certain: Option<PrizeId>,
    scale: u64,
}

impl CumulativeTable {
    /// Build the table.
    ///
    /// Each percentage is scaled to `scale` and accumulated in table order,
    /// so ties and overlaps favor earlier entries. Weights summing above
    /// 100% are accumulated as-is: the excess consumes the NoWin space and
    /// pushes later boundaries past `scale`. A single-entry table with no
    /// percentage is a certain win.
    pub fn build(weights: &PrizeWeights, scale: u64) -> Self {
        let scale = scale.max(MIN_SCALE);

        if weights.is_certain() {
            return Self {
                bounds: Vec::new(),
                certain: weights.sole_prize(),
                scale,
            };
        }

        let mut cumulative = 0.0;
        let bounds = weights
            .entries()
            .iter()
            .map(|entry| {
                cumulative += scale as f64 * entry.percent.unwrap_or(0.0) / 100.0;
                (entry.prize, cumulative)
            })
            .collect();

        Self {
            bounds,
            certain: None,
            scale,
        }
    }

    pub fn scale(&self) -> u64 {
        self.scale
    }

    /// Resolve a roll in `[1, scale]` against the boundaries.
    ///
    /// Returns the first prize whose cumulative boundary is ≥ the roll, or
    /// `None` when the roll exceeds every boundary.
    pub fn sample(&self, roll: u64) -> Option<PrizeId> {
        if self.certain.is_some() {
            return self.certain;
        }
        self.bounds
            .iter()
            .find(|(_, bound)| roll as f64 <= *bound)
            .map(|(prize, _)| *prize)
    }

    /// Roll uniformly and resolve.
    pub fn draw(&self, rng: &mut impl Rng) -> Option<PrizeId> {
        let roll = rng.random_range(1..=self.scale);
        self.sample(roll)
    }
}

/// Boolean single-rate draw: one chance at `percent` against `scale`.
pub fn draw_single(percent: f64, scale: u64, rng: &mut impl Rng) -> bool {
    let scale = scale.max(MIN_SCALE);
    let roll = rng.random_range(1..=scale);
    roll as f64 <= scale as f64 * percent / 100.0
}
