//! Dedupe CLI command.
//!
//! Deduplicates a JSON batch against a key cache given on the command line
//! and reports the survivors together with the next cache. The command keeps
//! no state; the caller stores the returned cache wherever it likes.

use crate::models::{Batch, Key, Strategy};
use crate::services::deduplication::{DedupeOptions, Deduplicated, Deduplicator, Field};
use crate::{DedupeError, Result};
use serde_json::Value;

/// Default record field used as the key.
pub const DEFAULT_KEY_FIELD: &str = "id";

/// Dedupe command handler.
#[derive(Debug, Clone, Default)]
pub struct DedupeCommand {
    deduplicator: Deduplicator,
    strategy: Option<Strategy>,
    key_field: Option<String>,
}

impl DedupeCommand {
    /// Creates a new dedupe command.
    #[must_use]
    pub const fn new(deduplicator: Deduplicator) -> Self {
        Self {
            deduplicator,
            strategy: None,
            key_field: None,
        }
    }

    /// Sets the strategy; the configured default applies otherwise.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: Option<Strategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the key field name or JSON pointer.
    #[must_use]
    pub fn with_key_field(mut self, key_field: Option<String>) -> Self {
        self.key_field = key_field;
        self
    }

    /// Returns the deduplicator this command runs.
    pub(crate) const fn deduplicator(&self) -> &Deduplicator {
        &self.deduplicator
    }

    /// Builds the per-call options for this command.
    pub(crate) fn options(&self) -> DedupeOptions<Field> {
        let mut options = DedupeOptions::new().with_key_mapper(Field::new(
            self.key_field.as_deref().unwrap_or(DEFAULT_KEY_FIELD),
        ));
        options.strategy = self.strategy;
        options
    }

    /// Runs the command.
    ///
    /// `input` is a JSON array (a batch) or any other JSON value (a single
    /// record). `key_cache` is a JSON array of keys; `None` primes the cache.
    ///
    /// # Errors
    ///
    /// Returns [`DedupeError::OperationFailed`] for malformed JSON input and
    /// [`DedupeError::InvalidKey`] when a record has no valid key.
    pub fn run(&self, input: &str, key_cache: Option<&str>) -> Result<Deduplicated<Value>> {
        let batch = parse_batch(input)?;
        let mut options = self.options();
        options.key_cache = key_cache.map(parse_key_cache).transpose()?;

        self.deduplicator.dedupe(batch, options)
    }
}

/// Parses a JSON document into a batch.
pub(crate) fn parse_batch(input: &str) -> Result<Batch<Value>> {
    let value: Value = serde_json::from_str(input).map_err(|e| DedupeError::OperationFailed {
        operation: "parse_input".to_string(),
        cause: e.to_string(),
    })?;

    Ok(batch_from_value(value))
}

/// Splits a JSON value into a batch, treating arrays as sequences.
pub(crate) fn batch_from_value(value: Value) -> Batch<Value> {
    match value {
        Value::Array(records) => Batch::Many(records),
        record => Batch::One(record),
    }
}

/// Parses a JSON array of keys.
pub(crate) fn parse_key_cache(input: &str) -> Result<Vec<Key>> {
    serde_json::from_str(input).map_err(|e| DedupeError::OperationFailed {
        operation: "parse_key_cache".to_string(),
        cause: e.to_string(),
    })
}
