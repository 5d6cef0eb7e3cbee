//! The keyed store capability

use crate::error::StoreResult;

/// Abstract keyed store the draw engine runs against.
///
/// Three key families: integer counters, pools of consumable unit tokens,
/// and string-valued hash maps. Keys in different families never collide in
/// practice because the engine namespaces them (see `dl-core::keys`).
///
/// Atomicity contract: `incr`, `pop`, and `hash_compare_set` must each be a
/// single atomic operation against the backing store — no two concurrent
/// `pop` calls may both succeed when one token remains, and `incr` must
/// never be implemented as read-then-write. The remaining operations carry
/// no cross-call ordering guarantees.
pub trait Store: Send + Sync {
    /// Atomically increment a counter, creating it at 0 first if absent,
    /// and return the new value.
    fn incr(&self, key: &str) -> StoreResult<i64>;

    /// Read a counter. `None` if the key was never written.
    fn get(&self, key: &str) -> StoreResult<Option<i64>>;

    /// Overwrite a counter.
    fn set(&self, key: &str, value: i64) -> StoreResult<()>;

    /// Add one token to a pool, creating the pool if absent.
    fn push(&self, key: &str) -> StoreResult<()>;

    /// Atomically remove one token. Returns `false` when the pool is empty
    /// or was never initialized. Token order is not significant.
    fn pop(&self, key: &str) -> StoreResult<bool>;

    /// Number of tokens currently in a pool (0 for absent pools).
    fn len(&self, key: &str) -> StoreResult<u64>;

    /// Read one field of a hash map.
    fn hash_get(&self, map: &str, field: &str) -> StoreResult<Option<String>>;

    /// Write one field of a hash map, creating the map if absent.
    fn hash_set(&self, map: &str, field: &str, value: &str) -> StoreResult<()>;

    /// Remove one field of a hash map. Removing an absent field is a no-op.
    fn hash_delete(&self, map: &str, field: &str) -> StoreResult<()>;

    /// Atomically write `value` to a hash field only if its current value
    /// equals `expected` (`None` meaning the field is absent). Returns
    /// whether the write happened.
    fn hash_compare_set(
        &self,
        map: &str,
        field: &str,
        expected: Option<&str>,
        value: &str,
    ) -> StoreResult<bool>;
}
