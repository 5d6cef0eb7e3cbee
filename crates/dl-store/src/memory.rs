//! In-process reference store backend

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::StoreResult;
use crate::store::Store;

/// State behind the mutex, one map per key family.
#[derive(Debug, Default)]
struct Shelves {
    counters: HashMap<String, i64>,
    /// Token pools. Pop order is not significant, so a pool is just a count.
    pools: HashMap<String, u64>,
    hashes: HashMap<String, HashMap<String, String>>,
}

/// Mutex-backed [`Store`] for tests, simulation, and single-process use.
///
/// Every operation takes the one lock, so each primitive is trivially
/// linearizable — the atomicity the trait demands of `incr`, `pop`, and
/// `hash_compare_set` holds for free.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Shelves>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn incr(&self, key: &str) -> StoreResult<i64> {
        let mut shelves = self.inner.lock();
        let counter = shelves.counters.entry(key.to_owned()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    fn get(&self, key: &str) -> StoreResult<Option<i64>> {
        Ok(self.inner.lock().counters.get(key).copied())
    }

    fn set(&self, key: &str, value: i64) -> StoreResult<()> {
        self.inner.lock().counters.insert(key.to_owned(), value);
        Ok(())
    }

    fn push(&self, key: &str) -> StoreResult<()> {
        let mut shelves = self.inner.lock();
        *shelves.pools.entry(key.to_owned()).or_insert(0) += 1;
        Ok(())
    }

    fn pop(&self, key: &str) -> StoreResult<bool> {
        let mut shelves = self.inner.lock();
        match shelves.pools.get_mut(key) {
            Some(count) if *count > 0 => {
                *count -= 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn len(&self, key: &str) -> StoreResult<u64> {
        Ok(self.inner.lock().pools.get(key).copied().unwrap_or(0))
    }

    fn hash_get(&self, map: &str, field: &str) -> StoreResult<Option<String>> {
        Ok(self
            .inner
            .lock()
            .hashes
            .get(map)
            .and_then(|h| h.get(field))
            .cloned())
    }

    fn hash_set(&self, map: &str, field: &str, value: &str) -> StoreResult<()> {
        self.inner
            .lock()
            .hashes
            .entry(map.to_owned())
            .or_default()
            .insert(field.to_owned(), value.to_owned());
        Ok(())
    }

    fn hash_delete(&self, map: &str, field: &str) -> StoreResult<()> {
        if let Some(hash) = self.inner.lock().hashes.get_mut(map) {
            hash.remove(field);
        }
        Ok(())
    }

    fn hash_compare_set(
        &self,
        map: &str,
        field: &str,
        expected: Option<&str>,
        value: &str,
    ) -> StoreResult<bool> {
        let mut shelves = self.inner.lock();
        let hash = shelves.hashes.entry(map.to_owned()).or_default();
        let current = hash.get(field).map(String::as_str);
        if current == expected {
            hash.insert(field.to_owned(), value.to_owned());
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
