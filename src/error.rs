//! Error types for the evictkit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when engine configuration parameters are
//!   invalid (e.g. zero capacity, out-of-order ratio bounds).
//! - [`EngineError`]: Returned by `select_victim` when the engine cannot make
//!   a decision: the structural failure modes a caller must not paper over.
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (debug-only `check_invariants` methods).
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::builder::EngineBuilder;
//! use evictkit::engine::EvictionEngine;
//! use evictkit::error::ConfigError;
//!
//! // Fallible constructor for user-configurable parameters
//! let engine: Result<EvictionEngine<String>, ConfigError> =
//!     EngineBuilder::new(100).small_ratio(0.2).try_build();
//! assert!(engine.is_ok());
//!
//! // Invalid ratio is caught without panicking
//! let bad = EngineBuilder::new(100).small_ratio(2.0).try_build::<String>();
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when engine configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`EngineBuilder::try_build`](crate::builder::EngineBuilder::try_build).
/// Validation happens once at construction time, never per hook call.
/// Carries a human-readable description of which parameter failed.
///
/// # Example
///
/// ```
/// use evictkit::builder::EngineBuilder;
///
/// let err = EngineBuilder::new(0).try_build::<u64>().unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// Error returned when the engine cannot produce an eviction decision.
///
/// Unlike recoverable per-key desyncs (which the engine repairs locally and
/// logs), these indicate a structural disagreement with the external cache
/// container and are surfaced so the caller can fail loudly instead of
/// masking the bug with an arbitrary victim.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    /// `select_victim` was invoked while both resident queues are empty, yet
    /// the container reports `resident` entries — a capacity-accounting bug
    /// upstream of the engine.
    EmptyQueues {
        /// Resident entry count the container's snapshot reported.
        resident: usize,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::EmptyQueues { resident } => write!(
                f,
                "both queues empty while the container reports {} resident entries",
                resident
            ),
        }
    }
}

impl std::error::Error for EngineError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal engine invariants are violated.
///
/// Produced by debug-only `check_invariants` methods (e.g.
/// [`EvictionEngine::check_invariants`](crate::engine::EvictionEngine::check_invariants)).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
