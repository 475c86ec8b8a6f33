// src/cache.rs
// Single-slot memoization per pipeline. Deliberately not a keyed cache: one
// (key, value) pair is retained, a different key evicts it, and nothing
// expires on its own — only the explicit invalidation signal clears it.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;

pub struct ResultCache<K, V> {
    slot: Mutex<Option<(K, Arc<V>)>>,
}

impl<K, V> ResultCache<K, V>
where
    K: PartialEq,
{
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the cached value when the key matches the retained slot;
    /// otherwise run `compute`, store its result under `key`, and return it.
    /// The slot lock is held across the compute, so a repeat caller arriving
    /// mid-build waits and then reads the freshly stored value.
    pub async fn get_or_compute<F, Fut>(&self, key: K, compute: F) -> Arc<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let mut slot = self.slot.lock().await;
        if let Some((stored, value)) = slot.as_ref() {
            if *stored == key {
                return Arc::clone(value);
            }
        }
        let value = Arc::new(compute().await);
        *slot = Some((key, Arc::clone(&value)));
        value
    }

    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}

impl<K: PartialEq, V> Default for ResultCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
