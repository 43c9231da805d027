//! Ordering strategies.

use crate::DedupeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The ordering assumption a caller makes about incoming batches.
///
/// A strategy is fixed for the lifetime of a key cache. Feeding a cache built
/// under one strategy into another is unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Batches arrive newest-first; the cache holds the newest key seen.
    #[default]
    #[serde(alias = "sorted-items", alias = "SortedItems")]
    SortedItems,
    /// Keys increase monotonically across batches; the cache holds the maximum.
    #[serde(alias = "sorted-keys", alias = "SortedKeys")]
    SortedKeys,
    /// No ordering guarantee; the cache holds a bounded set of recent keys.
    #[serde(alias = "Unsorted")]
    Unsorted,
}

impl Strategy {
    /// Returns all strategy variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::SortedItems, Self::SortedKeys, Self::Unsorted]
    }

    /// Returns the strategy as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SortedItems => "sorted_items",
            Self::SortedKeys => "sorted_keys",
            Self::Unsorted => "unsorted",
        }
    }

    /// Parses a strategy name.
    ///
    /// Accepts `snake_case`, `kebab-case` and `CamelCase` spellings in any
    /// letter case.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "sorteditems" => Some(Self::SortedItems),
            "sortedkeys" => Some(Self::SortedKeys),
            "unsorted" => Some(Self::Unsorted),
            _ => None,
        }
    }
}

impl FromStr for Strategy {
    type Err = DedupeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DedupeError::InvalidStrategy(s.to_string()))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
