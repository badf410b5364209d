//! Builder for configuring eviction engines.
//!
//! Collects every tunable the engine exposes (queue sizing band, ghost
//! depth, access-level cap, adaptation step, reinsert policy, ghost scope,
//! tiebreak strategy), validates the whole configuration once, and produces
//! an [`EvictionEngine`]. Per-hook calls never re-validate.
//!
//! ## Example
//!
//! ```
//! use evictkit::builder::EngineBuilder;
//! use evictkit::engine::{EvictionEngine, GhostScope, MainReinsert};
//!
//! let engine: EvictionEngine<u64> = EngineBuilder::new(1000)
//!     .small_ratio(0.2)
//!     .ghost_ratio(4.0)
//!     .main_reinsert(MainReinsert::Demote)
//!     .ghost_scope(GhostScope::Both)
//!     .build();
//! assert_eq!(engine.capacity(), 1000);
//! ```

use std::hash::Hash;

use crate::engine::adaptive::{AdaptationStep, AdaptiveController};
use crate::engine::tiebreak::Tiebreak;
use crate::engine::{EvictionEngine, GhostScope, MainReinsert};
use crate::error::ConfigError;

/// Starting fraction of capacity the probationary queue aims for.
pub const DEFAULT_SMALL_RATIO: f64 = 0.1;

/// Lower clamp of the adaptive ratio band.
pub const DEFAULT_MIN_SMALL_RATIO: f64 = 0.01;

/// Upper clamp of the adaptive ratio band.
pub const DEFAULT_MAX_SMALL_RATIO: f64 = 0.9;

/// Ghost history depth as a multiple of cache capacity.
pub const DEFAULT_GHOST_RATIO: f64 = 2.0;

/// Saturation cap for per-key access levels.
pub const DEFAULT_MAX_ACCESS_LEVEL: u8 = 3;

/// Highest access-level cap the engine accepts.
const MAX_ACCESS_LEVEL_LIMIT: u8 = 7;

/// Builder for [`EvictionEngine`] instances.
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    capacity: usize,
    small_ratio: f64,
    min_small_ratio: f64,
    max_small_ratio: f64,
    ghost_ratio: f64,
    max_access_level: u8,
    step: AdaptationStep,
    idle_decay: Option<f64>,
    reinsert: MainReinsert,
    ghost_scope: GhostScope,
    tiebreak: Tiebreak,
}

impl EngineBuilder {
    /// Creates a builder for a cache of `capacity` slots with default tuning.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            small_ratio: DEFAULT_SMALL_RATIO,
            min_small_ratio: DEFAULT_MIN_SMALL_RATIO,
            max_small_ratio: DEFAULT_MAX_SMALL_RATIO,
            ghost_ratio: DEFAULT_GHOST_RATIO,
            max_access_level: DEFAULT_MAX_ACCESS_LEVEL,
            step: AdaptationStep::GhostProportional,
            idle_decay: None,
            reinsert: MainReinsert::SecondChance,
            ghost_scope: GhostScope::Both,
            tiebreak: Tiebreak::Deterministic,
        }
    }

    /// Sets the starting fraction of capacity for the probationary queue.
    pub fn small_ratio(mut self, ratio: f64) -> Self {
        self.small_ratio = ratio;
        self
    }

    /// Sets the lower clamp of the adaptive ratio band.
    pub fn min_small_ratio(mut self, ratio: f64) -> Self {
        self.min_small_ratio = ratio;
        self
    }

    /// Sets the upper clamp of the adaptive ratio band.
    pub fn max_small_ratio(mut self, ratio: f64) -> Self {
        self.max_small_ratio = ratio;
        self
    }

    /// Sets the ghost history depth as a multiple of cache capacity.
    pub fn ghost_ratio(mut self, ratio: f64) -> Self {
        self.ghost_ratio = ratio;
        self
    }

    /// Sets the saturation cap for access levels (1 = accessed-bit behavior).
    pub fn max_access_level(mut self, level: u8) -> Self {
        self.max_access_level = level;
        self
    }

    /// Sets the step policy applied on ghost hits.
    pub fn adaptation_step(mut self, step: AdaptationStep) -> Self {
        self.step = step;
        self
    }

    /// Drifts the ratio toward its lower clamp by `decay` on every plain
    /// insertion.
    pub fn idle_decay(mut self, decay: f64) -> Self {
        self.idle_decay = Some(decay);
        self
    }

    /// Sets what happens to main-queue heads that still hold credit.
    pub fn main_reinsert(mut self, reinsert: MainReinsert) -> Self {
        self.reinsert = reinsert;
        self
    }

    /// Sets which evictions populate the ghost history.
    pub fn ghost_scope(mut self, scope: GhostScope) -> Self {
        self.ghost_scope = scope;
        self
    }

    /// Sets the second-chance grant strategy.
    pub fn tiebreak(mut self, tiebreak: Tiebreak) -> Self {
        self.tiebreak = tiebreak;
        self
    }

    /// Builds the engine with the configured parameters.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. For a non-panicking
    /// alternative, use [`try_build`](Self::try_build).
    pub fn build<K>(self) -> EvictionEngine<K>
    where
        K: Clone + Eq + Hash,
    {
        match self.try_build() {
            Ok(engine) => engine,
            Err(e) => panic!("{}", e),
        }
    }

    /// Builds the engine, returning an error on invalid parameters instead
    /// of panicking.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the capacity is zero, the ratio band is
    /// out of order or escapes `(0, 1]`, the starting ratio lies outside the
    /// band, the ghost ratio is negative or non-finite, the access cap is
    /// outside `1..=7`, or a step/decay/probability parameter is out of
    /// range.
    pub fn try_build<K>(self) -> Result<EvictionEngine<K>, ConfigError>
    where
        K: Clone + Eq + Hash,
    {
        if self.capacity == 0 {
            return Err(ConfigError::new("engine capacity must be greater than zero"));
        }
        if !self.min_small_ratio.is_finite()
            || !self.max_small_ratio.is_finite()
            || self.min_small_ratio <= 0.0
            || self.max_small_ratio > 1.0
            || self.min_small_ratio > self.max_small_ratio
        {
            return Err(ConfigError::new(format!(
                "small-ratio band must satisfy 0 < min <= max <= 1, got [{}, {}]",
                self.min_small_ratio, self.max_small_ratio
            )));
        }
        if !self.small_ratio.is_finite()
            || self.small_ratio < self.min_small_ratio
            || self.small_ratio > self.max_small_ratio
        {
            return Err(ConfigError::new(format!(
                "small_ratio must lie within [{}, {}], got {}",
                self.min_small_ratio, self.max_small_ratio, self.small_ratio
            )));
        }
        if !self.ghost_ratio.is_finite() || self.ghost_ratio < 0.0 {
            return Err(ConfigError::new(format!(
                "ghost_ratio must be finite and non-negative, got {}",
                self.ghost_ratio
            )));
        }
        if self.max_access_level == 0 || self.max_access_level > MAX_ACCESS_LEVEL_LIMIT {
            return Err(ConfigError::new(format!(
                "max_access_level must be in 1..={}, got {}",
                MAX_ACCESS_LEVEL_LIMIT, self.max_access_level
            )));
        }
        if let AdaptationStep::Fixed(step) = self.step
            && (!step.is_finite() || step <= 0.0)
        {
            return Err(ConfigError::new(format!(
                "fixed adaptation step must be finite and positive, got {}",
                step
            )));
        }
        if let Some(decay) = self.idle_decay
            && (!decay.is_finite() || decay <= 0.0)
        {
            return Err(ConfigError::new(format!(
                "idle_decay must be finite and positive, got {}",
                decay
            )));
        }
        if let Tiebreak::Probabilistic { permille, .. } = &self.tiebreak
            && *permille > 1000
        {
            return Err(ConfigError::new(format!(
                "tiebreak probability must be at most 1000 permille, got {}",
                permille
            )));
        }

        let ghost_capacity = (self.capacity as f64 * self.ghost_ratio).round() as usize;
        let controller = AdaptiveController::new(
            self.small_ratio,
            self.min_small_ratio,
            self.max_small_ratio,
            self.step,
            self.idle_decay,
        );

        Ok(EvictionEngine::from_parts(
            self.capacity,
            ghost_capacity,
            self.max_access_level,
            controller,
            self.tiebreak,
            self.reinsert,
            self.ghost_scope,
        ))
    }
}
