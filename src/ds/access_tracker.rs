//! Per-key saturating access counters.
//!
//! The side channel next to the FIFO queues: a hit bumps a key's level here
//! instead of moving it, and the victim scan spends those levels one unit per
//! inspection. A nonzero level means "give this key another chance before
//! evicting it". The cap is configurable; cap 1 degenerates to the
//! accessed-bit variant.

use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Map from key to a saturating access level in `0..=max_level`.
///
/// Absent keys are at level 0; entries are dropped as soon as they decay
/// back to 0, so the map only holds keys with outstanding chances.
#[derive(Debug)]
pub struct AccessTracker<K> {
    levels: FxHashMap<K, u8>,
    max_level: u8,
}

impl<K> AccessTracker<K>
where
    K: Clone + Eq + Hash,
{
    /// Creates a tracker whose counters saturate at `max_level`.
    pub fn new(max_level: u8) -> Self {
        Self {
            levels: FxHashMap::default(),
            max_level,
        }
    }

    /// Returns the saturation cap.
    #[inline]
    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    /// Returns the number of keys holding a nonzero level.
    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Returns `true` if no key holds a nonzero level.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Bumps `key` by one, saturating at the cap.
    pub fn touch(&mut self, key: &K) {
        let max = self.max_level;
        self.levels
            .entry(key.clone())
            .and_modify(|level| {
                if *level < max {
                    *level += 1;
                }
            })
            .or_insert(1);
    }

    /// Returns the current level of `key` (0 if untracked).
    #[inline]
    pub fn level(&self, key: &K) -> u8 {
        self.levels.get(key).copied().unwrap_or(0)
    }

    /// Spends one unit of `key`'s level, dropping the entry at zero.
    pub fn decay(&mut self, key: &K) {
        if let Some(level) = self.levels.get_mut(key) {
            if *level <= 1 {
                self.levels.remove(key);
            } else {
                *level -= 1;
            }
        }
    }

    /// Resets `key` to level 0.
    #[inline]
    pub fn clear(&mut self, key: &K) {
        self.levels.remove(key);
    }

    /// Removes `key` and returns the level it held.
    #[inline]
    pub fn take(&mut self, key: &K) -> u8 {
        self.levels.remove(key).unwrap_or(0)
    }

    /// Sets `key` to `level` (clamped to the cap); level 0 untracks it.
    pub fn seed(&mut self, key: &K, level: u8) {
        let level = level.min(self.max_level);
        if level == 0 {
            self.levels.remove(key);
        } else {
            self.levels.insert(key.clone(), level);
        }
    }

    /// Returns every key to level 0.
    pub fn reset(&mut self) {
        self.levels.clear();
    }

    /// Iterates over keys holding a nonzero level.
    pub fn tracked_keys(&self) -> impl Iterator<Item = &K> {
        self.levels.keys()
    }
}
