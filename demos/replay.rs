//! Drives an engine through the four-hook protocol with a toy container.
//!
//! Run with: `cargo run --example replay`

use std::collections::HashMap;

use evictkit::engine::EvictionEngine;
use evictkit::traits::CacheView;

/// A tiny object cache that delegates every eviction decision to the engine.
struct ObjectCache {
    capacity: usize,
    objects: HashMap<String, String>,
    hits: u64,
    misses: u64,
}

impl ObjectCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            objects: HashMap::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    fn access(&mut self, engine: &mut EvictionEngine<String>, key: &str) {
        let key = key.to_string();
        if self.objects.contains_key(&key) {
            self.hits += 1;
            engine.on_hit(&*self, &key);
            return;
        }

        self.misses += 1;
        if self.objects.len() >= self.capacity {
            let victim = engine
                .select_victim(&*self, &key)
                .expect("populated cache must yield a victim");
            self.objects.remove(&victim);
            self.objects.insert(key.clone(), format!("object:{key}"));
            engine.on_insert(&*self, &key);
            engine.on_evict_committed(&*self, &key, &victim);
        } else {
            self.objects.insert(key.clone(), format!("object:{key}"));
            engine.on_insert(&*self, &key);
        }
    }
}

impl CacheView<String> for ObjectCache {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn len(&self) -> usize {
        self.objects.len()
    }

    fn contains(&self, key: &String) -> bool {
        self.objects.contains_key(key)
    }
}

fn main() {
    let mut cache = ObjectCache::new(8);
    let mut engine: EvictionEngine<String> = EvictionEngine::new(8);

    // a small working set with real reuse
    for round in 0..20 {
        for hot in ["alpha", "beta", "gamma"] {
            cache.access(&mut engine, hot);
        }
        // plus a stream of one-off keys that should not displace it
        cache.access(&mut engine, &format!("scan_{round}"));
    }

    println!(
        "accesses: {}, hits: {}, misses: {}",
        cache.hits + cache.misses,
        cache.hits,
        cache.misses
    );
    println!(
        "small: {} / target {}, main: {}, ghosts: {}, ratio: {:.3}",
        engine.small_len(),
        engine.small_target(),
        engine.main_len(),
        engine.ghost_len(),
        engine.small_ratio()
    );

    for hot in ["alpha", "beta", "gamma"] {
        let segment = engine.segment_of(&hot.to_string());
        println!("{hot}: {segment:?}");
    }
}
