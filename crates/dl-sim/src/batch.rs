//! Batch execution

use std::sync::Arc;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use dl_core::{Campaign, ConfigError, DrawEngine, DrawError};
use dl_store::Store;

use crate::stats::BatchStats;

/// Batch run parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Total draws across all workers.
    pub draws: u64,
    /// Worker thread count; 0 means one per CPU.
    pub workers: usize,
    /// Master seed. Per-worker engine seeds derive from it, so a batch is
    /// reproducible for a fixed config.
    pub seed: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            draws: 10_000,
            workers: 0,
            seed: 1,
        }
    }
}

/// Fans a batch of draws out over worker engines sharing one store.
pub struct BatchRunner {
    prototype: DrawEngine,
    config: BatchConfig,
}

impl BatchRunner {
    /// Validate the campaign and prepare the worker prototype engine.
    pub fn new(campaign: Campaign, store: Arc<dyn Store>) -> Result<Self, ConfigError> {
        Ok(Self {
            prototype: DrawEngine::new(campaign, store)?,
            config: BatchConfig::default(),
        })
    }

    pub fn with_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    /// The prototype engine, for stock initialization before a run.
    pub fn engine(&self) -> &DrawEngine {
        &self.prototype
    }

    /// Run the batch and aggregate outcome statistics.
    ///
    /// Each worker clones the prototype engine over the shared store and
    /// draws its share sequentially, so workers interleave exactly like
    /// independent service instances would.
    pub fn run(&self) -> Result<BatchStats, DrawError> {
        let workers = match self.config.workers {
            0 => num_cpus::get().max(1),
            n => n,
        };

        let mut seed_stream = ChaCha8Rng::seed_from_u64(self.config.seed);
        let seeds: Vec<u64> = (0..workers).map(|_| seed_stream.next_u64()).collect();

        let base = self.config.draws / workers as u64;
        let remainder = self.config.draws % workers as u64;

        let worker_stats = (0..workers)
            .into_par_iter()
            .map(|w| {
                let share = base + u64::from((w as u64) < remainder);
                let mut engine = self.prototype.clone();
                engine.seed(seeds[w]);

                let mut stats = BatchStats::default();
                for i in 0..share {
                    let receipt = engine.draw(&format!("sim:{w}:{i}"))?;
                    stats.record(&receipt);
                }
                Ok(stats)
            })
            .collect::<Result<Vec<_>, DrawError>>()?;

        let mut total = BatchStats::default();
        for stats in &worker_stats {
            total.merge(stats);
        }
        log::debug!(
            "batch complete: {} draws, {} wins ({:.2}% hit rate)",
            total.draws,
            total.wins,
            total.hit_rate()
        );
        Ok(total)
    }
}
