#![no_main]

use evictkit::ds::{GhostEntry, GhostOrigin, GhostRegistry};
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on GhostRegistry
//
// Tests random sequences of record, consume, contains, clear operations to
// find edge cases in the bounded history and its per-origin accounting.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // Use first byte to determine capacity (0-50)
    let capacity = (data[0] as usize) % 51;
    let mut ghost: GhostRegistry<u32> = GhostRegistry::new(capacity);

    let mut idx = 1;
    while idx + 1 < data.len() {
        let op = data[idx] % 5;
        let key = u32::from(data[idx + 1]);

        match op {
            0 => {
                let origin = if data[idx] & 0x10 == 0 {
                    GhostOrigin::Small
                } else {
                    GhostOrigin::Main
                };
                let level = data[idx] >> 5;
                ghost.record(key, GhostEntry { origin, level });
            }
            1 => {
                let entry = ghost.consume(&key);
                if entry.is_some() {
                    assert!(!ghost.contains(&key));
                }
            }
            2 => {
                let _ = ghost.contains(&key);
            }
            3 => {
                let _ = ghost.len();
            }
            4 => {
                ghost.clear();
                assert!(ghost.is_empty());
            }
            _ => unreachable!(),
        }

        // Validate invariants after each operation
        ghost.debug_validate_invariants();
        assert!(ghost.len() <= capacity);
        assert_eq!(
            ghost.small_origin_len() + ghost.main_origin_len(),
            ghost.len()
        );

        // Zero capacity should always be empty
        if capacity == 0 {
            assert!(ghost.is_empty());
        }

        idx += 2;
    }
});
