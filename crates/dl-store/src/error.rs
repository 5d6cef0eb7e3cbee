//! Store error types

use thiserror::Error;

/// Store-level failure.
///
/// A failed store operation is an infrastructure error. Callers must never
/// fold it into a draw outcome.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias
pub type StoreResult<T> = Result<T, StoreError>;
