#![no_main]

use evictkit::ds::FifoSet;
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on FifoSet
//
// Tests random sequences of push_tail, pop_head, remove, contains, clear
// operations to find edge cases and invariant violations in the ordered set.
fuzz_target!(|data: &[u8]| {
    let mut set: FifoSet<u32> = FifoSet::new();
    let mut shadow_len: usize = 0;

    let mut idx = 0;
    while idx + 1 < data.len() {
        let op = data[idx] % 5;
        let key = u32::from(data[idx + 1]);

        match op {
            0 => {
                if set.push_tail(key) {
                    shadow_len += 1;
                }
            }
            1 => {
                if set.pop_head().is_some() {
                    shadow_len -= 1;
                }
            }
            2 => {
                if set.remove(&key) {
                    shadow_len -= 1;
                }
            }
            3 => {
                let _ = set.contains(&key);
            }
            4 => {
                set.clear();
                shadow_len = 0;
            }
            _ => unreachable!(),
        }

        // Validate invariants after each operation
        set.debug_validate_invariants();
        assert_eq!(set.len(), shadow_len);

        if let Some(head) = set.peek_head() {
            assert!(set.contains(head));
        } else {
            assert!(set.is_empty());
        }

        idx += 2;
    }

    // Drain order must visit every remaining key exactly once
    let mut drained = 0;
    while set.pop_head().is_some() {
        drained += 1;
    }
    assert_eq!(drained, shadow_len);
});
