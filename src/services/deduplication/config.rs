//! Deduplication configuration.
//!
//! This module defines the tunable bounds of the deduplication service: the
//! longest accepted string key, the capacity of the unsorted key cache and
//! the strategy used when a call does not name one.

use crate::models::Strategy;

/// Default maximum length of a string key, in UTF-16 code units.
pub const DEFAULT_MAX_KEY_LENGTH: usize = 64;

/// Default number of keys retained by the `Unsorted` strategy.
pub const DEFAULT_UNSORTED_CAPACITY: usize = 1000;

/// Configuration for the deduplication service.
///
/// # Environment Variables
///
/// | Variable | Type | Default | Description |
/// |----------|------|---------|-------------|
/// | `KEYCACHE_MAX_KEY_LENGTH` | usize | `64` | Longest accepted string key |
/// | `KEYCACHE_UNSORTED_CAPACITY` | usize | `1000` | Key cache size for `Unsorted` |
/// | `KEYCACHE_DEFAULT_STRATEGY` | strategy | `sorted_items` | Strategy when none is given |
///
/// # Example
///
/// ```rust
/// use keycache::{DedupeConfig, Strategy};
///
/// let config = DedupeConfig::default();
/// assert_eq!(config.max_key_length, 64);
/// assert_eq!(config.unsorted_capacity, 1000);
/// assert_eq!(config.default_strategy, Strategy::SortedItems);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupeConfig {
    /// Longest accepted string key, counted in UTF-16 code units.
    pub max_key_length: usize,

    /// Maximum number of keys the `Unsorted` strategy keeps.
    pub unsorted_capacity: usize,

    /// Strategy applied when the caller does not pick one.
    pub default_strategy: Strategy,
}

impl DedupeConfig {
    /// Applies environment overrides on top of this configuration.
    ///
    /// Unset or unparseable variables leave the current value in place. An
    /// unknown strategy name is ignored here; use
    /// [`KeycacheConfig`](crate::KeycacheConfig) for strict loading.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(length) = parse_usize_env("KEYCACHE_MAX_KEY_LENGTH") {
            self.max_key_length = length;
        }

        if let Some(capacity) = parse_usize_env("KEYCACHE_UNSORTED_CAPACITY") {
            self.unsorted_capacity = capacity;
        }

        if let Some(strategy) = std::env::var("KEYCACHE_DEFAULT_STRATEGY")
            .ok()
            .and_then(|v| Strategy::parse(&v))
        {
            self.default_strategy = strategy;
        }

        self
    }

    /// Returns the largest key cache a strategy may return.
    ///
    /// # Example
    ///
    /// ```rust
    /// use keycache::{DedupeConfig, Strategy};
    ///
    /// let config = DedupeConfig::default();
    /// assert_eq!(config.cache_bound(Strategy::SortedKeys), 1);
    /// assert_eq!(config.cache_bound(Strategy::Unsorted), 1000);
    /// ```
    #[must_use]
    pub const fn cache_bound(&self, strategy: Strategy) -> usize {
        match strategy {
            Strategy::SortedItems | Strategy::SortedKeys => 1,
            Strategy::Unsorted => self.unsorted_capacity,
        }
    }

    /// Builder method to set the maximum key length.
    #[must_use]
    pub const fn with_max_key_length(mut self, length: usize) -> Self {
        self.max_key_length = length;
        self
    }

    /// Builder method to set the unsorted cache capacity.
    #[must_use]
    pub const fn with_unsorted_capacity(mut self, capacity: usize) -> Self {
        self.unsorted_capacity = capacity;
        self
    }

    /// Builder method to set the default strategy.
    #[must_use]
    pub const fn with_default_strategy(mut self, strategy: Strategy) -> Self {
        self.default_strategy = strategy;
        self
    }
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            unsorted_capacity: DEFAULT_UNSORTED_CAPACITY,
            default_strategy: Strategy::SortedItems,
        }
    }
}

fn parse_usize_env(name: &str) -> Option<usize> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
