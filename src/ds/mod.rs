pub mod access_tracker;
pub mod fifo_set;
pub mod ghost_registry;
pub mod slot_arena;

pub use access_tracker::AccessTracker;
pub use fifo_set::{FifoSet, FifoSetIter};
pub use ghost_registry::{GhostEntry, GhostOrigin, GhostRegistry};
pub use slot_arena::{SlotArena, SlotId};
