//! Adaptive segmented-FIFO eviction engine.
//!
//! Decides which resident key an external cache container should evict, and
//! keeps the bookkeeping current after every hit, insertion, and committed
//! eviction. Admission is probationary: new keys queue up in a small FIFO
//! segment and earn their way into the protected main segment by being
//! re-referenced; a bounded ghost history of evicted keys feeds a controller
//! that retunes the probation size whenever an evicted key comes back.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │                      EvictionEngine<K> Layout                            │
//! │                                                                          │
//! │   SMALL (probation):  head ─► [e] ─► [f] ─► [g] ◄─ tail    FifoSet<K>    │
//! │   MAIN  (protected):  head ─► [a] ─► [b] ─► [c] ◄─ tail    FifoSet<K>    │
//! │   GHOST (history):    bounded FIFO of evicted keys + origin/level        │
//! │   TRACKER:            key ─► saturating access level (side channel)      │
//! │   CONTROLLER:         small_ratio ∈ [min, max], moved by ghost hits      │
//! │                                                                          │
//! │   Victim scan (select_victim):                                           │
//! │     while small.len > target or main is empty: inspect small's head      │
//! │       credit? ── promote to main tail, spend credit, keep scanning       │
//! │       cold?   ── that's the victim (finalized on commit)                 │
//! │     otherwise: inspect main's head                                       │
//! │       credit? ── recirculate (main tail) or demote (small tail)          │
//! │       cold?   ── that's the victim                                       │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Hook protocol
//!
//! The container calls [`on_hit`](EvictionEngine::on_hit) after every hit and
//! [`on_insert`](EvictionEngine::on_insert) after every admission. When a
//! slot must be freed it calls [`select_victim`](EvictionEngine::select_victim)
//! and, once the swap actually happened,
//! [`on_evict_committed`](EvictionEngine::on_evict_committed). The scan
//! reorders only the engine's own queues; the chosen victim stays queued
//! until the commit, so re-running the scan on an unchanged snapshot returns
//! the same key.
//!
//! ## Scan resistance
//!
//! Hits never move a key. A long pass over never-repeated keys drains
//! through the small queue and the ghost history without touching the
//! protected segment, while genuinely reused keys accumulate access credit
//! and survive the scan.
//!
//! ## Example
//!
//! ```
//! use std::collections::HashSet;
//!
//! use evictkit::engine::EvictionEngine;
//! use evictkit::traits::CacheView;
//!
//! struct View {
//!     capacity: usize,
//!     resident: HashSet<u64>,
//! }
//!
//! impl CacheView<u64> for View {
//!     fn capacity(&self) -> usize {
//!         self.capacity
//!     }
//!     fn len(&self) -> usize {
//!         self.resident.len()
//!     }
//!     fn contains(&self, key: &u64) -> bool {
//!         self.resident.contains(key)
//!     }
//! }
//!
//! let mut view = View { capacity: 2, resident: HashSet::new() };
//! let mut engine: EvictionEngine<u64> = EvictionEngine::new(2);
//!
//! view.resident.insert(1);
//! engine.on_insert(&view, &1);
//! view.resident.insert(2);
//! engine.on_insert(&view, &2);
//!
//! let victim = engine.select_victim(&view, &3).unwrap();
//! view.resident.remove(&victim);
//! view.resident.insert(3);
//! engine.on_insert(&view, &3);
//! engine.on_evict_committed(&view, &3, &victim);
//! ```

pub mod adaptive;
pub mod tiebreak;

use std::fmt::Debug;
use std::hash::Hash;

pub use adaptive::{AdaptationStep, AdaptiveController};
pub use tiebreak::Tiebreak;

use crate::builder::EngineBuilder;
use crate::ds::{AccessTracker, FifoSet, GhostEntry, GhostOrigin, GhostRegistry};
use crate::error::EngineError;
use crate::traits::{CacheView, ReplacementPolicy};

/// What happens to a main-queue head that still holds access credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainReinsert {
    /// Re-append at the main tail with one unit of credit spent. The default.
    SecondChance,
    /// Send it back to the small tail for one more probation pass.
    Demote,
}

/// Which evictions populate the ghost history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostScope {
    /// Only small-queue evictions leave ghosts.
    SmallOnly,
    /// Evictions from both queues leave ghosts, so the controller receives
    /// both adaptation signals. The default.
    Both,
}

/// Resident queue segment a key currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Probationary queue.
    Small,
    /// Protected queue.
    Main,
}

/// Decision counters for the engine.
#[cfg(feature = "metrics")]
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct EngineMetrics {
    /// Insertions that found their key in the ghost history (small origin).
    pub ghost_hits_small: u64,
    /// Insertions that found their key in the ghost history (main origin).
    pub ghost_hits_main: u64,
    /// Small-queue heads promoted into the main queue during scans.
    pub promotions: u64,
    /// Main-queue heads recirculated at the main tail.
    pub main_reinserts: u64,
    /// Main-queue heads demoted back to the small queue.
    pub demotions: u64,
    /// Committed evictions out of the small queue.
    pub small_evictions: u64,
    /// Committed evictions out of the main queue.
    pub main_evictions: u64,
    /// Events referencing keys the engine did not track (repaired locally).
    pub desync_repairs: u64,
}

#[cfg(feature = "metrics")]
impl std::fmt::Display for EngineMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EngineMetrics {{ ghost_hits_small: {}, ghost_hits_main: {}, promotions: {}, \
             main_reinserts: {}, demotions: {}, small_evictions: {}, main_evictions: {}, \
             desync_repairs: {} }}",
            self.ghost_hits_small,
            self.ghost_hits_main,
            self.promotions,
            self.main_reinserts,
            self.demotions,
            self.small_evictions,
            self.main_evictions,
            self.desync_repairs
        )
    }
}

/// Adaptive segmented-FIFO eviction engine; one instance per cache.
///
/// Owns all decision state exclusively: the two resident queue segments, the
/// ghost history, the access tracker, and the adaptive controller. Simulating
/// several caches means one engine value each — nothing here is shared.
///
/// Construct via [`EvictionEngine::new`] for defaults or
/// [`EvictionEngine::builder`] to tune ratios, ghost depth, access cap,
/// adaptation step, reinsert policy, ghost scope, and tiebreak strategy.
pub struct EvictionEngine<K> {
    small: FifoSet<K>,
    main: FifoSet<K>,
    ghost: GhostRegistry<K>,
    tracker: AccessTracker<K>,
    controller: AdaptiveController,
    tiebreak: Tiebreak,
    reinsert: MainReinsert,
    ghost_scope: GhostScope,
    capacity: usize,

    #[cfg(feature = "metrics")]
    metrics: EngineMetrics,
}

impl<K> EvictionEngine<K>
where
    K: Clone + Eq + Hash,
{
    /// Creates an engine with default tuning for a cache of `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        EngineBuilder::new(capacity).build()
    }

    /// Returns a builder for custom tuning.
    pub fn builder(capacity: usize) -> EngineBuilder {
        EngineBuilder::new(capacity)
    }

    pub(crate) fn from_parts(
        capacity: usize,
        ghost_capacity: usize,
        max_access_level: u8,
        controller: AdaptiveController,
        tiebreak: Tiebreak,
        reinsert: MainReinsert,
        ghost_scope: GhostScope,
    ) -> Self {
        Self {
            small: FifoSet::with_capacity(capacity),
            main: FifoSet::with_capacity(capacity),
            ghost: GhostRegistry::new(ghost_capacity),
            tracker: AccessTracker::new(max_access_level),
            controller,
            tiebreak,
            reinsert,
            ghost_scope,
            capacity,
            #[cfg(feature = "metrics")]
            metrics: EngineMetrics::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Returns the cache capacity the engine was built for.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of keys in the probationary queue.
    #[inline]
    pub fn small_len(&self) -> usize {
        self.small.len()
    }

    /// Returns the number of keys in the protected queue.
    #[inline]
    pub fn main_len(&self) -> usize {
        self.main.len()
    }

    /// Returns the number of ghost entries.
    #[inline]
    pub fn ghost_len(&self) -> usize {
        self.ghost.len()
    }

    /// Returns the number of keys the engine tracks as resident.
    #[inline]
    pub fn resident_len(&self) -> usize {
        self.small.len() + self.main.len()
    }

    /// Returns the current small-queue fraction.
    #[inline]
    pub fn small_ratio(&self) -> f64 {
        self.controller.ratio()
    }

    /// Returns the small-queue size the controller currently aims for.
    #[inline]
    pub fn small_target(&self) -> usize {
        self.controller.target(self.capacity)
    }

    /// Returns the segment `key` occupies, if the engine tracks it.
    pub fn segment_of(&self, key: &K) -> Option<Segment> {
        if self.small.contains(key) {
            Some(Segment::Small)
        } else if self.main.contains(key) {
            Some(Segment::Main)
        } else {
            None
        }
    }

    /// Iterates the probationary queue from oldest to newest.
    pub fn small_keys(&self) -> impl Iterator<Item = &K> {
        self.small.iter()
    }

    /// Iterates the protected queue from oldest to newest.
    pub fn main_keys(&self) -> impl Iterator<Item = &K> {
        self.main.iter()
    }

    /// Returns decision counters if the `metrics` feature is enabled.
    #[cfg(feature = "metrics")]
    #[inline]
    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Resets decision counters to zero.
    #[cfg(feature = "metrics")]
    #[inline]
    pub fn reset_metrics(&mut self) {
        self.metrics = EngineMetrics::default();
    }

    // -----------------------------------------------------------------------
    // Hooks
    // -----------------------------------------------------------------------

    /// Chooses the resident key to evict so `incoming` can be admitted.
    ///
    /// Walks queue heads under the current size target: heads holding access
    /// credit are promoted or recirculated (spending one unit of credit per
    /// inspection, which bounds the walk), and the first cold head is
    /// returned. The choice is not finalized here — the victim keeps its
    /// queue position until [`on_evict_committed`](Self::on_evict_committed).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyQueues`] when the engine tracks no
    /// resident keys; with a full container that is an upstream accounting
    /// bug the caller must surface, not mask.
    pub fn select_victim<S: CacheView<K>>(
        &mut self,
        snapshot: &S,
        _incoming: &K,
    ) -> Result<K, EngineError> {
        if self.small.is_empty() && self.main.is_empty() {
            return Err(EngineError::EmptyQueues {
                resident: snapshot.len(),
            });
        }

        let target = self.controller.target(snapshot.capacity());
        loop {
            let scan_small = self.small.len() > target || self.main.is_empty();
            let victim = if scan_small {
                self.scan_small_head()
            } else {
                self.scan_main_head()
            };
            if let Some(victim) = victim {
                return Ok(victim);
            }
        }
    }

    /// Records a cache hit on `key`: one unit of access credit, no movement.
    ///
    /// A hit on a key the engine does not track means the container and the
    /// engine disagree about residency; the engine repairs itself by
    /// re-tracking the key in the protected queue with neutral credit.
    pub fn on_hit<S: CacheView<K>>(&mut self, _snapshot: &S, key: &K) {
        if self.segment_of(key).is_none() {
            log::warn!("hit on a key the engine does not track; re-tracking in the main queue");
            self.tracker.clear(key);
            self.main.push_tail(key.clone());
            #[cfg(feature = "metrics")]
            {
                self.metrics.desync_repairs += 1;
            }
            return;
        }
        self.tracker.touch(key);
    }

    /// Records that the container admitted `key`.
    ///
    /// A key found in the ghost history returned soon after eviction: it is
    /// placed straight into the protected queue, its tracked level is
    /// re-seeded from the ghost payload, and the controller moves the
    /// probation target — up for small-origin ghosts, down for main-origin
    /// ones. Everything else starts cold at the small tail.
    pub fn on_insert<S: CacheView<K>>(&mut self, snapshot: &S, key: &K) {
        if self.segment_of(key).is_some() {
            log::warn!("insert announced for a key the engine already tracks; ignoring");
            #[cfg(feature = "metrics")]
            {
                self.metrics.desync_repairs += 1;
            }
            return;
        }

        let small_ghosts = self.ghost.small_origin_len();
        let main_ghosts = self.ghost.main_origin_len();
        match self.ghost.consume(key) {
            Some(entry) => {
                let capacity = snapshot.capacity();
                match entry.origin {
                    GhostOrigin::Small => {
                        self.controller
                            .on_small_ghost_hit(capacity, small_ghosts, main_ghosts);
                        #[cfg(feature = "metrics")]
                        {
                            self.metrics.ghost_hits_small += 1;
                        }
                    },
                    GhostOrigin::Main => {
                        self.controller
                            .on_main_ghost_hit(capacity, main_ghosts, small_ghosts);
                        #[cfg(feature = "metrics")]
                        {
                            self.metrics.ghost_hits_main += 1;
                        }
                    },
                }
                self.tracker.seed(key, entry.level);
                self.main.push_tail(key.clone());
            },
            None => {
                self.controller.on_plain_insert();
                self.tracker.clear(key);
                self.small.push_tail(key.clone());
            },
        }
    }

    /// Records that the container evicted `evicted` and stored `inserted`.
    ///
    /// Finalizes the decision `select_victim` deferred: the evicted key
    /// leaves its queue, its access state is dropped, and a ghost entry is
    /// recorded (main-queue evictions only under [`GhostScope::Both`]).
    pub fn on_evict_committed<S: CacheView<K>>(
        &mut self,
        _snapshot: &S,
        _inserted: &K,
        evicted: &K,
    ) {
        let level = self.tracker.take(evicted);
        if self.small.remove(evicted) {
            self.ghost.record(
                evicted.clone(),
                GhostEntry {
                    origin: GhostOrigin::Small,
                    level,
                },
            );
            #[cfg(feature = "metrics")]
            {
                self.metrics.small_evictions += 1;
            }
        } else if self.main.remove(evicted) {
            if self.ghost_scope == GhostScope::Both {
                self.ghost.record(
                    evicted.clone(),
                    GhostEntry {
                        origin: GhostOrigin::Main,
                        level,
                    },
                );
            }
            #[cfg(feature = "metrics")]
            {
                self.metrics.main_evictions += 1;
            }
        } else {
            log::warn!("eviction committed for a key the engine does not track");
            #[cfg(feature = "metrics")]
            {
                self.metrics.desync_repairs += 1;
            }
        }
    }

    /// Reinitializes all four structures and the controller, as if freshly
    /// built. Replaying a different trace through the same engine must go
    /// through here.
    pub fn reset(&mut self) {
        self.small.clear();
        self.main.clear();
        self.ghost.clear();
        self.tracker.reset();
        self.controller.reset();
        self.tiebreak.reset();
    }

    // -----------------------------------------------------------------------
    // Victim scan
    // -----------------------------------------------------------------------

    /// Inspects the small queue's head. Returns the victim if it is cold,
    /// `None` if it was promoted and the scan should continue.
    fn scan_small_head(&mut self) -> Option<K> {
        let level = self.tracker.level(self.small.peek_head()?);
        if self.tiebreak.grants_second_chance(level) {
            if let Some(key) = self.small.pop_head() {
                self.tracker.clear(&key);
                self.main.push_tail(key);
                #[cfg(feature = "metrics")]
                {
                    self.metrics.promotions += 1;
                }
            }
            return None;
        }
        self.small.peek_head().cloned()
    }

    /// Inspects the main queue's head. Returns the victim if it is cold,
    /// `None` if it was recirculated or demoted.
    fn scan_main_head(&mut self) -> Option<K> {
        let level = self.tracker.level(self.main.peek_head()?);
        if self.tiebreak.grants_second_chance(level) {
            if let Some(key) = self.main.pop_head() {
                self.tracker.decay(&key);
                match self.reinsert {
                    MainReinsert::SecondChance => {
                        self.main.push_tail(key);
                        #[cfg(feature = "metrics")]
                        {
                            self.metrics.main_reinserts += 1;
                        }
                    },
                    MainReinsert::Demote => {
                        self.small.push_tail(key);
                        #[cfg(feature = "metrics")]
                        {
                            self.metrics.demotions += 1;
                        }
                    },
                }
            }
            return None;
        }
        self.main.peek_head().cloned()
    }

    /// Validates internal invariants (debug-only).
    #[cfg(debug_assertions)]
    pub fn check_invariants(&self) -> Result<(), crate::error::InvariantError>
    where
        K: Debug,
    {
        use crate::error::InvariantError;

        self.small.debug_validate_invariants();
        self.main.debug_validate_invariants();
        self.ghost.debug_validate_invariants();

        for key in self.small.iter() {
            if self.main.contains(key) {
                return Err(InvariantError::new(format!(
                    "key {:?} present in both queues",
                    key
                )));
            }
        }

        for key in self.small.iter().chain(self.main.iter()) {
            if self.ghost.contains(key) {
                return Err(InvariantError::new(format!(
                    "resident key {:?} also has a ghost entry",
                    key
                )));
            }
        }

        for key in self.tracker.tracked_keys() {
            if !self.small.contains(key) && !self.main.contains(key) {
                return Err(InvariantError::new(format!(
                    "tracked level for non-resident key {:?}",
                    key
                )));
            }
        }

        if self.ghost.len() > self.ghost.capacity() {
            return Err(InvariantError::new(format!(
                "ghost registry holds {} entries over its bound {}",
                self.ghost.len(),
                self.ghost.capacity()
            )));
        }

        let ratio = self.controller.ratio();
        if ratio < self.controller.min_ratio() || ratio > self.controller.max_ratio() {
            return Err(InvariantError::new(format!(
                "small ratio {} escaped [{}, {}]",
                ratio,
                self.controller.min_ratio(),
                self.controller.max_ratio()
            )));
        }

        Ok(())
    }
}

impl<K> Debug for EvictionEngine<K>
where
    K: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvictionEngine")
            .field("capacity", &self.capacity)
            .field("small_len", &self.small.len())
            .field("main_len", &self.main.len())
            .field("ghost_len", &self.ghost.len())
            .field("small_ratio", &self.controller.ratio())
            .field("small_target", &self.small_target())
            .finish_non_exhaustive()
    }
}

impl<K> ReplacementPolicy<K> for EvictionEngine<K>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn select_victim<S: CacheView<K>>(
        &mut self,
        snapshot: &S,
        incoming: &K,
    ) -> Result<K, EngineError> {
        EvictionEngine::select_victim(self, snapshot, incoming)
    }

    #[inline]
    fn on_hit<S: CacheView<K>>(&mut self, snapshot: &S, key: &K) {
        EvictionEngine::on_hit(self, snapshot, key);
    }

    #[inline]
    fn on_insert<S: CacheView<K>>(&mut self, snapshot: &S, key: &K) {
        EvictionEngine::on_insert(self, snapshot, key);
    }

    #[inline]
    fn on_evict_committed<S: CacheView<K>>(&mut self, snapshot: &S, inserted: &K, evicted: &K) {
        EvictionEngine::on_evict_committed(self, snapshot, inserted, evicted);
    }

    fn reset(&mut self) {
        EvictionEngine::reset(self);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    /// Minimal stand-in for the external container.
    struct View {
        capacity: usize,
        resident: HashSet<u32>,
    }

    impl View {
        fn new(capacity: usize) -> Self {
            Self {
                capacity,
                resident: HashSet::new(),
            }
        }
    }

    impl CacheView<u32> for View {
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

    #[allow(unused_variables)]
    fn assert_invariants(engine: &EvictionEngine<u32>) {
        #[cfg(debug_assertions)]
        engine.check_invariants().unwrap();
    }

    /// Drives one access through the full hook protocol. Returns `true` on a
    /// hit.
    fn access(view: &mut View, engine: &mut EvictionEngine<u32>, key: u32) -> bool {
        if view.resident.contains(&key) {
            engine.on_hit(&*view, &key);
            return true;
        }
        if view.resident.len() >= view.capacity {
            let victim = engine.select_victim(&*view, &key).expect("victim");
            view.resident.remove(&victim);
            view.resident.insert(key);
            engine.on_insert(&*view, &key);
            engine.on_evict_committed(&*view, &key, &victim);
        } else {
            view.resident.insert(key);
            engine.on_insert(&*view, &key);
        }
        false
    }

    // ==============================================
    // Admission
    // ==============================================

    mod admission {
        use super::*;

        #[test]
        fn new_keys_enter_the_small_queue() {
            let mut view = View::new(10);
            let mut engine = EvictionEngine::new(10);

            access(&mut view, &mut engine, 1);
            access(&mut view, &mut engine, 2);

            assert_eq!(engine.small_len(), 2);
            assert_eq!(engine.main_len(), 0);
            assert_eq!(engine.segment_of(&1), Some(Segment::Small));
        }

        #[test]
        fn ghost_hit_enters_the_main_queue() {
            let mut view = View::new(2);
            let mut engine = EvictionEngine::new(2);

            // fill, evict 1, then bring 1 back
            access(&mut view, &mut engine, 1);
            access(&mut view, &mut engine, 2);
            access(&mut view, &mut engine, 3);
            assert!(!view.resident.contains(&1));

            access(&mut view, &mut engine, 1);
            assert_eq!(engine.segment_of(&1), Some(Segment::Main));
        }

        #[test]
        fn resident_set_matches_engine_queues() {
            let mut view = View::new(4);
            let mut engine = EvictionEngine::new(4);

            for key in [1, 2, 3, 4, 5, 6, 2, 7, 3] {
                access(&mut view, &mut engine, key);
                let tracked: HashSet<u32> = engine
                    .small_keys()
                    .chain(engine.main_keys())
                    .copied()
                    .collect();
                assert_eq!(tracked, view.resident);
                assert_invariants(&engine);
            }
        }
    }

    // ==============================================
    // Victim scan
    // ==============================================

    mod victim_scan {
        use super::*;

        #[test]
        fn cold_small_head_is_the_victim() {
            let mut view = View::new(2);
            let mut engine = EvictionEngine::new(2);

            access(&mut view, &mut engine, 1);
            access(&mut view, &mut engine, 2);

            let victim = engine.select_victim(&view, &3).unwrap();
            assert_eq!(victim, 1);
        }

        #[test]
        fn accessed_head_is_promoted_not_evicted() {
            let mut view = View::new(4);
            let mut engine = EvictionEngine::new(4);

            for key in [1, 2, 3, 4] {
                access(&mut view, &mut engine, key);
            }
            access(&mut view, &mut engine, 1); // hit: 1 earns credit

            let victim = engine.select_victim(&view, &5).unwrap();
            assert_eq!(victim, 2);
            assert_eq!(engine.segment_of(&1), Some(Segment::Main));
        }

        #[test]
        fn selection_is_idempotent_until_committed() {
            let mut view = View::new(3);
            let mut engine = EvictionEngine::new(3);

            access(&mut view, &mut engine, 1);
            access(&mut view, &mut engine, 2);
            access(&mut view, &mut engine, 3);
            access(&mut view, &mut engine, 1);

            let first = engine.select_victim(&view, &9).unwrap();
            let second = engine.select_victim(&view, &9).unwrap();
            let third = engine.select_victim(&view, &9).unwrap();
            assert_eq!(first, second);
            assert_eq!(second, third);
        }

        #[test]
        fn scan_terminates_with_all_credit_spent() {
            let mut view = View::new(4);
            let mut engine = EvictionEngine::new(4);

            for key in 1..=4 {
                access(&mut view, &mut engine, key);
            }
            // give everyone maximum credit
            for _ in 0..5 {
                for key in 1..=4 {
                    access(&mut view, &mut engine, key);
                }
            }

            let victim = engine.select_victim(&view, &9).unwrap();
            assert!(view.resident.contains(&victim));
        }

        #[test]
        fn main_head_recirculates_under_second_chance() {
            let mut view = View::new(4);
            let mut engine = EvictionEngine::new(4);

            for key in [1, 2, 3, 4] {
                access(&mut view, &mut engine, key);
            }
            access(&mut view, &mut engine, 1);
            access(&mut view, &mut engine, 2);
            // the next miss promotes 1 and 2 into main and evicts cold 3
            access(&mut view, &mut engine, 5);
            assert_eq!(engine.segment_of(&1), Some(Segment::Main));

            // heat 1 and the small residents, then force a scan into main:
            // 1 is recirculated at the main tail and cold 2 goes instead
            access(&mut view, &mut engine, 1);
            access(&mut view, &mut engine, 4);
            access(&mut view, &mut engine, 5);
            access(&mut view, &mut engine, 6);

            assert!(view.resident.contains(&1), "hot main key was evicted");
            assert_eq!(engine.segment_of(&1), Some(Segment::Main));
            assert_invariants(&engine);
        }

        #[test]
        fn demote_variant_sends_main_heads_back_to_small() {
            let mut view = View::new(2);
            let mut engine: EvictionEngine<u32> = EvictionEngine::<u32>::builder(2)
                .main_reinsert(MainReinsert::Demote)
                .build();

            access(&mut view, &mut engine, 1);
            access(&mut view, &mut engine, 2);
            access(&mut view, &mut engine, 3);
            access(&mut view, &mut engine, 1); // ghost recall: 1 now in main
            access(&mut view, &mut engine, 1); // credit

            // force a scan that reaches the main head
            access(&mut view, &mut engine, 4);
            access(&mut view, &mut engine, 5);

            // 1 survived by demotion or still holds main residency
            assert_invariants(&engine);
            let tracked: HashSet<u32> = engine
                .small_keys()
                .chain(engine.main_keys())
                .copied()
                .collect();
            assert_eq!(tracked, view.resident);
        }

        #[test]
        fn empty_engine_returns_empty_queues_error() {
            let view = View::new(2);
            let mut engine: EvictionEngine<u32> = EvictionEngine::new(2);

            let err = engine.select_victim(&view, &1).unwrap_err();
            assert_eq!(err, EngineError::EmptyQueues { resident: 0 });
        }
    }

    // ==============================================
    // Ghost feedback
    // ==============================================

    mod ghost_feedback {
        use super::*;

        #[test]
        fn small_origin_recall_raises_the_ratio() {
            let mut view = View::new(2);
            let mut engine = EvictionEngine::new(2);
            let initial = engine.small_ratio();

            access(&mut view, &mut engine, 1);
            access(&mut view, &mut engine, 2);
            access(&mut view, &mut engine, 3); // evicts 1 into the ghost
            access(&mut view, &mut engine, 1); // recall

            assert!(engine.small_ratio() > initial);
        }

        #[test]
        fn main_origin_recall_lowers_the_ratio() {
            let mut view = View::new(2);
            let mut engine: EvictionEngine<u32> = EvictionEngine::<u32>::builder(2)
                .small_ratio(0.5)
                .build();

            // put 1 into main, then force it out
            access(&mut view, &mut engine, 1);
            access(&mut view, &mut engine, 2);
            access(&mut view, &mut engine, 3);
            access(&mut view, &mut engine, 1); // 1 in main
            let before = engine.small_ratio();

            // churn until 1 is evicted out of main
            let mut next = 10;
            while view.resident.contains(&1) {
                access(&mut view, &mut engine, next);
                next += 1;
            }
            access(&mut view, &mut engine, 1); // main-origin recall

            assert!(engine.small_ratio() < before);
        }

        #[test]
        fn small_only_scope_leaves_no_main_ghosts() {
            let mut view = View::new(2);
            let mut engine: EvictionEngine<u32> = EvictionEngine::<u32>::builder(2)
                .ghost_scope(GhostScope::SmallOnly)
                .build();

            access(&mut view, &mut engine, 1);
            access(&mut view, &mut engine, 2);
            access(&mut view, &mut engine, 3);
            access(&mut view, &mut engine, 1); // 1 in main

            let mut next = 10;
            while view.resident.contains(&1) {
                access(&mut view, &mut engine, next);
                next += 1;
            }

            // 1 was evicted out of main: no ghost entry under SmallOnly
            let ratio_before = engine.small_ratio();
            access(&mut view, &mut engine, 1);
            assert_eq!(engine.segment_of(&1), Some(Segment::Small));
            assert!(engine.small_ratio() >= ratio_before);
        }

        #[test]
        fn ghost_bound_holds_under_churn() {
            let mut view = View::new(4);
            let mut engine = EvictionEngine::new(4);

            for key in 0..200 {
                access(&mut view, &mut engine, key);
                assert!(engine.ghost_len() <= engine.capacity() * 2);
            }
        }
    }

    // ==============================================
    // Desync repair
    // ==============================================

    mod desync_repair {
        use super::*;

        #[test]
        fn hit_on_untracked_key_retracks_in_main() {
            let mut view = View::new(4);
            let mut engine = EvictionEngine::new(4);

            view.resident.insert(42); // container state the engine never saw
            engine.on_hit(&view, &42);

            assert_eq!(engine.segment_of(&42), Some(Segment::Main));
            assert_invariants(&engine);
        }

        #[test]
        fn double_insert_announcement_is_ignored() {
            let mut view = View::new(4);
            let mut engine = EvictionEngine::new(4);

            access(&mut view, &mut engine, 1);
            engine.on_insert(&view, &1);

            assert_eq!(engine.resident_len(), 1);
            assert_eq!(engine.segment_of(&1), Some(Segment::Small));
        }

        #[test]
        fn commit_for_untracked_key_is_a_noop() {
            let mut view = View::new(4);
            let mut engine = EvictionEngine::new(4);

            access(&mut view, &mut engine, 1);
            engine.on_evict_committed(&view, &1, &99);

            assert_eq!(engine.resident_len(), 1);
            assert_invariants(&engine);
        }
    }

    // ==============================================
    // Reset
    // ==============================================

    mod reset_behavior {
        use super::*;

        #[test]
        fn reset_clears_all_state() {
            let mut view = View::new(2);
            let mut engine = EvictionEngine::new(2);

            access(&mut view, &mut engine, 1);
            access(&mut view, &mut engine, 2);
            access(&mut view, &mut engine, 3);
            access(&mut view, &mut engine, 1);
            assert!(engine.small_ratio() > 0.1);

            engine.reset();

            assert_eq!(engine.resident_len(), 0);
            assert_eq!(engine.ghost_len(), 0);
            assert_eq!(engine.small_ratio(), 0.1);
            assert_invariants(&engine);
        }

        #[test]
        fn replay_after_reset_matches_fresh_engine() {
            let trace: Vec<u32> = (0..40).collect();

            let mut reused_view = View::new(4);
            let mut reused = EvictionEngine::new(4);
            // dirty the engine first
            for key in [1, 2, 1, 3, 1, 4, 5, 1] {
                access(&mut reused_view, &mut reused, key);
            }
            reused.reset();
            let mut reused_view = View::new(4);

            let mut fresh_view = View::new(4);
            let mut fresh = EvictionEngine::new(4);

            let mut reused_hits = 0;
            let mut fresh_hits = 0;
            for &key in &trace {
                if access(&mut reused_view, &mut reused, key) {
                    reused_hits += 1;
                }
                if access(&mut fresh_view, &mut fresh, key) {
                    fresh_hits += 1;
                }
            }

            assert_eq!(reused_hits, fresh_hits);
            assert_eq!(reused.small_ratio(), fresh.small_ratio());
            assert_eq!(reused.small_len(), fresh.small_len());
            assert_eq!(reused.main_len(), fresh.main_len());
            assert_eq!(reused.ghost_len(), fresh.ghost_len());
        }
    }

    // ==============================================
    // Tiebreak strategies
    // ==============================================

    mod tiebreak_strategies {
        use super::*;

        #[test]
        fn probabilistic_engine_is_reproducible_under_a_seed() {
            let run = || {
                let mut view = View::new(8);
                let mut engine: EvictionEngine<u32> = EvictionEngine::<u32>::builder(8)
                    .tiebreak(Tiebreak::probabilistic(500, 42))
                    .build();
                let mut hits = 0;
                for i in 0..400u32 {
                    if access(&mut view, &mut engine, i % 24) {
                        hits += 1;
                    }
                }
                let mut resident: Vec<u32> = view.resident.iter().copied().collect();
                resident.sort_unstable();
                (hits, resident)
            };

            assert_eq!(run(), run());
        }

        #[test]
        fn zero_grant_probability_degenerates_to_plain_fifo_eviction() {
            let mut view = View::new(2);
            let mut engine: EvictionEngine<u32> = EvictionEngine::<u32>::builder(2)
                .tiebreak(Tiebreak::probabilistic(0, 1))
                .build();

            access(&mut view, &mut engine, 1);
            access(&mut view, &mut engine, 2);
            access(&mut view, &mut engine, 1); // credit that will be ignored

            let victim = engine.select_victim(&view, &3).unwrap();
            assert_eq!(victim, 1);
        }
    }

    // ==============================================
    // Metrics
    // ==============================================

    #[cfg(feature = "metrics")]
    mod metrics_counters {
        use super::*;

        #[test]
        fn counters_track_decisions() {
            let mut view = View::new(2);
            let mut engine = EvictionEngine::new(2);

            access(&mut view, &mut engine, 1);
            access(&mut view, &mut engine, 2);
            access(&mut view, &mut engine, 3); // small eviction
            access(&mut view, &mut engine, 1); // ghost hit (small origin)

            let metrics = engine.metrics();
            assert!(metrics.small_evictions >= 1);
            assert_eq!(metrics.ghost_hits_small, 1);
            assert_eq!(metrics.desync_repairs, 0);

            let summary = metrics.to_string();
            assert!(summary.contains("ghost_hits_small"));
        }

        #[test]
        fn reset_metrics_zeroes_counters() {
            let mut view = View::new(2);
            let mut engine = EvictionEngine::new(2);

            access(&mut view, &mut engine, 1);
            access(&mut view, &mut engine, 2);
            access(&mut view, &mut engine, 3);

            engine.reset_metrics();
            assert_eq!(engine.metrics().small_evictions, 0);
        }
    }
}
