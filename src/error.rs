use std::io;
use thiserror::Error;

/// Errors raised while building or resizing a cache.
///
/// A missing key is never an error; lookups return `Option`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache capacity must be at least 1, got {capacity}")]
    InvalidCapacity { capacity: usize },
}

/// Errors from loading the harness configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("'{field}' must be between 0.0 and 1.0, got {value}")]
    InvalidRatio { field: &'static str, value: f64 },

    #[error("read_ratio + remove_ratio must not exceed 1.0, got {total}")]
    RatioOverflow { total: f64 },

    #[error("key_space must be at least 1")]
    EmptyKeySpace,

    #[error("at least one policy must be listed")]
    EmptyPolicies,
}

/// A broken structural invariant, reported by `LruCache::validate`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("index holds {index} keys but the order list holds {order} entries")]
    LengthMismatch { index: usize, order: usize },

    #[error("{len} entries exceed capacity {capacity}")]
    OverCapacity { len: usize, capacity: usize },

    #[error("slot {slot} is linked but vacant")]
    VacantSlotLinked { slot: usize },

    #[error("slot {slot} has a prev link that does not point at its predecessor")]
    BrokenBackLink { slot: usize },

    #[error("tail does not point at the last reachable entry")]
    TailMismatch,

    #[error("walk from head revisits slot {slot}")]
    Cycle { slot: usize },

    #[error("entry in slot {slot} is not reachable through the index")]
    Unindexed { slot: usize },
}
