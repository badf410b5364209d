//! # Policy Trait Hierarchy
//!
//! This module defines the seam between an eviction decision engine and the
//! external cache container that consumes it. The container owns the objects,
//! the capacity accounting, and the hit/miss bookkeeping; the engine owns
//! every byte of decision state. They meet in exactly two traits.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────┐          ┌─────────────────────────────────┐
//!   │   external container       │          │   ReplacementPolicy<K>          │
//!   │   (objects, capacity,      │─ hooks ─►│                                 │
//!   │    hit/miss counting)      │          │  select_victim(&snap, &k) → K   │
//!   │                            │◄─ view ──│  on_hit(&snap, &k)              │
//!   │   implements CacheView<K>  │          │  on_insert(&snap, &k)           │
//!   └────────────────────────────┘          │  on_evict_committed(&snap, ...) │
//!                                           │  reset()                        │
//!                                           └─────────────────────────────────┘
//! ```
//!
//! ## Contract
//!
//! The container drives the engine strictly sequentially, one access event at
//! a time, and passes a read-only [`CacheView`] snapshot into every hook:
//!
//! 1. On a hit, call [`on_hit`](ReplacementPolicy::on_hit): bookkeeping
//!    only, residency never changes.
//! 2. On a miss with free space, admit the object, then call
//!    [`on_insert`](ReplacementPolicy::on_insert).
//! 3. On a miss at capacity, call
//!    [`select_victim`](ReplacementPolicy::select_victim), evict the returned
//!    key, store the new object, call `on_insert`, and finish with
//!    [`on_evict_committed`](ReplacementPolicy::on_evict_committed).
//!
//! `select_victim` never removes the chosen key from the engine's own
//! bookkeeping — the container might still decide not to evict it.
//! Finalization (dequeue, ghost recording, access-state cleanup) happens in
//! `on_evict_committed`, which is why repeated `select_victim` calls against
//! an unchanged snapshot return the same key.
//!
//! Engines hold per-instance state only: simulating many caches concurrently
//! means one engine value per cache, never a shared one. Replaying a new
//! trace over an existing engine goes through
//! [`reset`](ReplacementPolicy::reset) — there is no restart detection
//! heuristic.

use crate::error::EngineError;

/// Read-only snapshot of the external cache container's state.
///
/// Handed to every [`ReplacementPolicy`] hook. Implementations are expected
/// to be cheap views over the container's live state, not copies.
pub trait CacheView<K> {
    /// Maximum number of resident objects the container will hold.
    fn capacity(&self) -> usize;

    /// Number of objects currently resident.
    fn len(&self) -> usize;

    /// Returns `true` if `key` is currently resident.
    fn contains(&self, key: &K) -> bool;

    /// Returns `true` if the container cannot admit another object without
    /// evicting one first.
    fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }
}

impl<K, T: CacheView<K> + ?Sized> CacheView<K> for &T {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn contains(&self, key: &K) -> bool {
        (**self).contains(key)
    }
}

/// An eviction decision engine driven by an external cache container.
///
/// All four hooks execute to completion before the next event is processed;
/// the engine is a deterministic state machine over the trace-replay order.
pub trait ReplacementPolicy<K> {
    /// Chooses the resident key to evict so `incoming` can be admitted.
    ///
    /// Pure decision with respect to the container: the engine may shuffle
    /// its own queues (lazy promotion, recirculation) but residency is
    /// untouched until the container commits the eviction.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyQueues`] if the engine tracks no resident
    /// keys while the snapshot claims the container is populated — a
    /// container-side accounting bug that must not be masked.
    fn select_victim<S: CacheView<K>>(
        &mut self,
        snapshot: &S,
        incoming: &K,
    ) -> Result<K, EngineError>;

    /// Records a cache hit on `key`. Must not change residency.
    fn on_hit<S: CacheView<K>>(&mut self, snapshot: &S, key: &K);

    /// Records that the container admitted `key` (post-capacity-check).
    fn on_insert<S: CacheView<K>>(&mut self, snapshot: &S, key: &K);

    /// Records that the container evicted `evicted` and stored `inserted`.
    ///
    /// Performs the cleanup that `select_victim` deferred: the evicted key
    /// leaves its queue, its access state is dropped, and a ghost entry is
    /// recorded.
    fn on_evict_committed<S: CacheView<K>>(&mut self, snapshot: &S, inserted: &K, evicted: &K);

    /// Reinitializes every structure and tunable to its construction-time
    /// value, as if the engine were freshly built.
    fn reset(&mut self);
}
