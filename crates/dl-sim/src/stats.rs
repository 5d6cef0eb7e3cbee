//! Batch outcome statistics

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use dl_core::{DrawOutcome, DrawReceipt, LossReason, PrizeId, WinSource};

/// Aggregated outcomes of a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    pub draws: u64,
    pub wins: u64,
    pub losses: u64,
    pub wins_override: u64,
    pub wins_rate: u64,
    pub wins_pity: u64,
    pub losses_ineligible: u64,
    pub losses_no_match: u64,
    pub losses_out_of_stock: u64,
    /// Confirmed grants per prize.
    pub wins_by_prize: HashMap<PrizeId, u64>,
    /// Pity grants per tier index.
    pub pity_fires_by_tier: HashMap<usize, u64>,
}

impl BatchStats {
    pub fn record(&mut self, receipt: &DrawReceipt) {
        self.draws += 1;
        match receipt.outcome {
            DrawOutcome::Won { prize, source, .. } => {
                self.wins += 1;
                *self.wins_by_prize.entry(prize).or_insert(0) += 1;
                match source {
                    WinSource::Override => self.wins_override += 1,
                    WinSource::Rate => self.wins_rate += 1,
                    WinSource::Pity { tier } => {
                        self.wins_pity += 1;
                        *self.pity_fires_by_tier.entry(tier).or_insert(0) += 1;
                    }
                }
            }
            DrawOutcome::Lost { reason } => {
                self.losses += 1;
                match reason {
                    LossReason::Ineligible => self.losses_ineligible += 1,
                    LossReason::NoMatch => self.losses_no_match += 1,
                    LossReason::OutOfStock { .. } => self.losses_out_of_stock += 1,
                }
            }
        }
    }

    /// Fold another worker's stats into this one.
    pub fn merge(&mut self, other: &BatchStats) {
        self.draws += other.draws;
        self.wins += other.wins;
        self.losses += other.losses;
        self.wins_override += other.wins_override;
        self.wins_rate += other.wins_rate;
        self.wins_pity += other.wins_pity;
        self.losses_ineligible += other.losses_ineligible;
        self.losses_no_match += other.losses_no_match;
        self.losses_out_of_stock += other.losses_out_of_stock;
        for (&prize, &count) in &other.wins_by_prize {
            *self.wins_by_prize.entry(prize).or_insert(0) += count;
        }
        for (&tier, &count) in &other.pity_fires_by_tier {
            *self.pity_fires_by_tier.entry(tier).or_insert(0) += count;
        }
    }

    /// Percentage of draws that granted anything.
    pub fn hit_rate(&self) -> f64 {
        if self.draws > 0 {
            (self.wins as f64 / self.draws as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Empirical win percentage for one prize.
    pub fn empirical_rate(&self, prize: PrizeId) -> f64 {
        if self.draws > 0 {
            let wins = self.wins_by_prize.get(&prize).copied().unwrap_or(0);
            (wins as f64 / self.draws as f64) * 100.0
        } else {
            0.0
        }
    }
}
