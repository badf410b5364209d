pub use crate::builder::EngineBuilder;
pub use crate::ds::{
    AccessTracker, FifoSet, GhostEntry, GhostOrigin, GhostRegistry, SlotArena, SlotId,
};
#[cfg(feature = "metrics")]
pub use crate::engine::EngineMetrics;
pub use crate::engine::{
    AdaptationStep, AdaptiveController, EvictionEngine, GhostScope, MainReinsert, Segment,
    Tiebreak,
};
pub use crate::error::{ConfigError, EngineError, InvariantError};
pub use crate::traits::{CacheView, ReplacementPolicy};
