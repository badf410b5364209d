#![no_main]

use std::collections::HashSet;

use evictkit::engine::EvictionEngine;
use evictkit::traits::CacheView;
use libfuzzer_sys::fuzz_target;

struct Container {
    capacity: usize,
    resident: HashSet<u32>,
}

impl CacheView<u32> for Container {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn len(&self) -> usize {
        self.resident.len()
    }

    fn contains(&self, key: &u32) -> bool {
        self.resident.contains(key)
    }
}

// Fuzz access traces through the full hook protocol
//
// Replays byte-derived key sequences against an engine-driven container and
// checks that the engine's resident bookkeeping always mirrors the
// container's, that victims are always resident, and that the ghost bound
// and ratio band hold.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let capacity = (data[0] as usize) % 32 + 1;
    let ghost_bound = capacity * 2;
    let mut container = Container {
        capacity,
        resident: HashSet::new(),
    };
    let mut engine: EvictionEngine<u32> = EvictionEngine::new(capacity);

    for &byte in &data[1..] {
        let key = u32::from(byte % 64);

        if container.resident.contains(&key) {
            engine.on_hit(&container, &key);
        } else if container.resident.len() >= capacity {
            let victim = engine
                .select_victim(&container, &key)
                .expect("populated engine must produce a victim");
            assert!(container.resident.contains(&victim));
            container.resident.remove(&victim);
            container.resident.insert(key);
            engine.on_insert(&container, &key);
            engine.on_evict_committed(&container, &key, &victim);
        } else {
            container.resident.insert(key);
            engine.on_insert(&container, &key);
        }

        #[cfg(debug_assertions)]
        engine.check_invariants().unwrap();

        let tracked: HashSet<u32> = engine
            .small_keys()
            .chain(engine.main_keys())
            .copied()
            .collect();
        assert_eq!(tracked, container.resident);
        assert!(engine.ghost_len() <= ghost_bound);
        assert!(engine.small_ratio() >= 0.01 && engine.small_ratio() <= 0.9);
    }
});
