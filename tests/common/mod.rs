//! Shared replay harness for integration tests.
//!
//! A minimal stand-in for the external cache container: it owns the resident
//! set and the hit/miss counters, drives any [`ReplacementPolicy`] through
//! the four-hook protocol, and exposes itself to the policy as a
//! [`CacheView`] snapshot.

#![allow(dead_code)]

use std::collections::HashSet;
use std::hash::Hash;

use evictkit::traits::{CacheView, ReplacementPolicy};

pub struct ReplayCache<K> {
    capacity: usize,
    resident: HashSet<K>,
    hits: u64,
    misses: u64,
}

impl<K> ReplayCache<K>
where
    K: Clone + Eq + Hash,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            resident: HashSet::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Replays one access through the full hook protocol. Returns `true` on
    /// a hit.
    pub fn access<P: ReplacementPolicy<K>>(&mut self, policy: &mut P, key: K) -> bool {
        if self.resident.contains(&key) {
            self.hits += 1;
            policy.on_hit(&*self, &key);
            return true;
        }

        self.misses += 1;
        if self.resident.len() >= self.capacity {
            let victim = policy
                .select_victim(&*self, &key)
                .expect("select_victim on a populated cache");
            self.resident.remove(&victim);
            self.resident.insert(key.clone());
            policy.on_insert(&*self, &key);
            policy.on_evict_committed(&*self, &key, &victim);
        } else {
            self.resident.insert(key.clone());
            policy.on_insert(&*self, &key);
        }
        false
    }

    pub fn replay<P: ReplacementPolicy<K>>(&mut self, policy: &mut P, trace: &[K]) {
        for key in trace {
            self.access(policy, key.clone());
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn resident(&self) -> &HashSet<K> {
        &self.resident
    }
}

impl<K> CacheView<K> for ReplayCache<K>
where
    K: Clone + Eq + Hash,
{
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn len(&self) -> usize {
        self.resident.len()
    }

    fn contains(&self, key: &K) -> bool {
        self.resident.contains(key)
    }
}
