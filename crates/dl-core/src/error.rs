//! Error types for the draw engine

use thiserror::Error;

use dl_store::StoreError;

use crate::campaign::PrizeId;

/// Campaign configuration rejected at engine construction.
///
/// Configuration problems fail fast and never reach the draw path.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Campaign name must not be empty")]
    EmptyName,

    #[error("Negative weight {percent} for prize {prize}")]
    NegativeWeight { prize: PrizeId, percent: f64 },

    #[error("Prize {prize} has no weight in a multi-entry table")]
    UnspecifiedWeight { prize: PrizeId },

    #[error("Negative base rate {0}")]
    NegativeBaseRate(f64),

    #[error("Pity tier {0} has no prize entries")]
    EmptyPityTier(usize),

    #[error("Pity tier {0} has a zero draw threshold")]
    ZeroPityThreshold(usize),
}

/// Draw-time failure.
///
/// NoWin is never an error — it is a first-class [`DrawOutcome`]. Errors
/// here are infrastructure: the store could not complete an operation, or a
/// stored record is corrupt.
///
/// [`DrawOutcome`]: crate::draw::DrawOutcome
#[derive(Error, Debug)]
pub enum DrawError {
    #[error("Store operation failed")]
    Store(#[from] StoreError),

    #[error("Corrupt {kind} record for campaign '{campaign}'")]
    Record {
        kind: &'static str,
        campaign: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias
pub type DrawResult<T> = Result<T, DrawError>;
