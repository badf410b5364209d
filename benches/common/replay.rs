//! Minimal replay container for driving the engine in benchmarks.

use std::collections::HashSet;

use evictkit::engine::EvictionEngine;
use evictkit::traits::CacheView;

pub struct ReplayCache {
    capacity: usize,
    resident: HashSet<u64>,
}

impl ReplayCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            resident: HashSet::with_capacity(capacity),
        }
    }

    pub fn access(&mut self, engine: &mut EvictionEngine<u64>, key: u64) -> bool {
        if self.resident.contains(&key) {
            engine.on_hit(&*self, &key);
            return true;
        }
        if self.resident.len() >= self.capacity {
            let victim = engine.select_victim(&*self, &key).expect("victim");
            self.resident.remove(&victim);
            self.resident.insert(key);
            engine.on_insert(&*self, &key);
            engine.on_evict_committed(&*self, &key, &victim);
        } else {
            self.resident.insert(key);
            engine.on_insert(&*self, &key);
        }
        false
    }
}

impl CacheView<u64> for ReplayCache {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn len(&self) -> usize {
        self.resident.len()
    }

    fn contains(&self, key: &u64) -> bool {
        self.resident.contains(key)
    }
}
