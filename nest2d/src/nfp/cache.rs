use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use ordered_float::OrderedFloat;

/// Identifies the nofit polygon of an orbiting item against a stationary one, both rotated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NfpKey {
    pub stationary_id: usize,
    pub stationary_rotation: OrderedFloat<f64>,
    pub orbiting_id: usize,
    pub orbiting_rotation: OrderedFloat<f64>,
}

/// Identifies the inner-fit region of an item (rotated) in a bin
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IfpKey {
    pub bin_id: usize,
    pub item_id: usize,
    pub rotation: OrderedFloat<f64>,
}

/// Thread-safe memo of translation-free geometric results, shared by all passes of a run.
#[derive(Debug)]
pub struct GeoCache<K, V> {
    map: RwLock<HashMap<K, Arc<V>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

pub type NfpCache<V> = GeoCache<NfpKey, V>;
pub type IfpCache<V> = GeoCache<IfpKey, V>;

impl<K: Eq + Hash + Copy, V> GeoCache<K, V> {
    pub fn new() -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let map = self.map.read().unwrap_or_else(|e| e.into_inner());
        map.get(key).cloned()
    }

    /// Returns the cached value or computes, stores and returns it.
    /// Concurrent misses on the same key may compute twice, the first stored value wins.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        if let Some(v) = self.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(v);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = Arc::new(compute()?);
        let mut map = self.map.write().unwrap_or_else(|e| e.into_inner());
        Ok(map.entry(key).or_insert(value).clone())
    }

    pub fn len(&self) -> usize {
        self.map.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (hits, misses)
    pub fn stats(&self) -> (usize, usize) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

impl<K: Eq + Hash + Copy, V> Default for GeoCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: usize, o: usize) -> NfpKey {
        NfpKey {
            stationary_id: s,
            stationary_rotation: OrderedFloat(0.0),
            orbiting_id: o,
            orbiting_rotation: OrderedFloat(0.0),
        }
    }

    #[test]
    fn second_lookup_is_a_hit() {
        let cache: NfpCache<u32> = GeoCache::new();
        let a = cache.get_or_try_insert_with(key(0, 1), || Ok::<_, ()>(7)).unwrap();
        let b = cache
            .get_or_try_insert_with(key(0, 1), || Ok::<_, ()>(8))
            .unwrap();
        assert_eq!((*a, *b), (7, 7));
        assert_eq!(cache.stats(), (1, 1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_computation_is_not_stored() {
        let cache: NfpCache<u32> = GeoCache::new();
        assert!(cache.get_or_try_insert_with(key(1, 1), || Err("boom")).is_err());
        assert!(cache.is_empty());
    }
}
