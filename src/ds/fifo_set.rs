//! Ordered set with strict FIFO discipline.
//!
//! The building block for both resident queue segments. Keys keep the
//! position they were given at insertion (or re-insertion) time; lookups and
//! membership tests never reorder anything. Scan resistance of the policy
//! rests on exactly this property: a hit updates a side-channel access
//! counter, not the queue position.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId>        arena-linked node chain
//!   ┌─────────┬─────────┐             head ─► [A] ◄──► [B] ◄──► [C] ◄── tail
//!   │  key A  │  id_0   │             oldest                     newest
//!   │  key B  │  id_1   │
//!   └─────────┴─────────┘
//! ```
//!
//! ## Operations
//! - `push_tail(k)`: append at the newest end
//! - `peek_head()` / `pop_head()`: inspect / remove the oldest key
//! - `remove(k)`: unlink from any position via the index
//!
//! All of the above are O(1) average.
//!
//! `debug_validate_invariants()` is available in debug/test builds.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
struct Node<K> {
    key: K,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Ordered set of keys with O(1) tail append, head removal, membership test,
/// and positional removal.
#[derive(Debug)]
pub struct FifoSet<K> {
    arena: SlotArena<Node<K>>,
    index: FxHashMap<K, SlotId>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<K> FifoSet<K>
where
    K: Clone + Eq + Hash,
{
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            arena: SlotArena::new(),
            index: FxHashMap::default(),
            head: None,
            tail: None,
        }
    }

    /// Creates an empty set with reserved node capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            head: None,
            tail: None,
        }
    }

    /// Returns the number of keys in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Returns `true` if `key` is present.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the oldest key without removing it.
    pub fn peek_head(&self) -> Option<&K> {
        self.head
            .and_then(|id| self.arena.get(id).map(|node| &node.key))
    }

    /// Appends `key` at the tail (newest position).
    ///
    /// Returns `false` without touching the order if the key is already
    /// present; a key occupies exactly one position.
    pub fn push_tail(&mut self, key: K) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }

        let id = self.arena.insert(Node {
            key: key.clone(),
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(tail) => {
                if let Some(node) = self.arena.get_mut(tail) {
                    node.next = Some(id);
                }
            },
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.index.insert(key, id);
        true
    }

    /// Removes and returns the oldest key.
    pub fn pop_head(&mut self) -> Option<K> {
        let id = self.head?;
        self.detach(id);
        let node = self.arena.remove(id)?;
        self.index.remove(&node.key);
        Some(node.key)
    }

    /// Removes `key` from whatever position it holds; returns `true` if it
    /// was present.
    pub fn remove(&mut self, key: &K) -> bool {
        let id = match self.index.remove(key) {
            Some(id) => id,
            None => return false,
        };
        self.detach(id);
        self.arena.remove(id);
        true
    }

    /// Drops every key.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }

    /// Iterates keys from oldest to newest.
    pub fn iter(&self) -> FifoSetIter<'_, K> {
        FifoSetIter {
            set: self,
            current: self.head,
        }
    }

    fn detach(&mut self, id: SlotId) {
        let (prev, next) = match self.arena.get(id) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.arena.get_mut(p) {
                    node.next = next;
                }
            },
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.arena.get_mut(n) {
                    node.prev = prev;
                }
            },
            None => self.tail = prev,
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.arena.len(), self.index.len());

        let mut count = 0;
        let mut prev: Option<SlotId> = None;
        let mut current = self.head;
        while let Some(id) = current {
            let node = self.arena.get(id).expect("chain references a dead slot");
            assert_eq!(node.prev, prev, "prev link inconsistent");
            assert_eq!(self.index.get(&node.key), Some(&id), "index out of sync");
            count += 1;
            prev = Some(id);
            current = node.next;
        }
        assert_eq!(count, self.arena.len(), "chain length != arena length");
        assert_eq!(self.tail, prev, "tail does not terminate the chain");
    }
}

impl<K> Default for FifoSet<K>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a [`FifoSet`]'s keys from oldest to newest.
#[derive(Debug)]
pub struct FifoSetIter<'a, K> {
    set: &'a FifoSet<K>,
    current: Option<SlotId>,
}

impl<'a, K> Iterator for FifoSetIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.set.arena.get(id)?;
        self.current = node.next;
        Some(&node.key)
    }
}

impl<K> std::iter::FusedIterator for FifoSetIter<'_, K> {}
