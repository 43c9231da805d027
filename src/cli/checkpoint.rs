//! Checkpoint CLI command.
//!
//! Works on an envelope document that carries both the batch and the
//! checkpoint:
//!
//! ```json
//! {"items": [{"id": "a"}, {"id": "b"}], "$checkpoint": ["b"], "source": "feed-1"}
//! ```
//!
//! The output is the same envelope with `items` replaced by the survivors
//! and `$checkpoint` replaced by the next cache. Other fields pass through.

use crate::models::Key;
use crate::services::deduplication::CheckpointHolder;
use crate::{DedupeError, Result};
use serde_json::{Map, Value};

use super::dedupe::{DedupeCommand, batch_from_value};

const ITEMS_FIELD: &str = "items";
const CHECKPOINT_FIELD: &str = "$checkpoint";

/// Checkpoint command handler.
#[derive(Debug, Clone, Default)]
pub struct CheckpointCommand {
    dedupe: DedupeCommand,
}

impl CheckpointCommand {
    /// Creates a checkpoint command from a configured dedupe command.
    #[must_use]
    pub const fn new(dedupe: DedupeCommand) -> Self {
        Self { dedupe }
    }

    /// Runs the command and returns the updated envelope.
    ///
    /// # Errors
    ///
    /// Returns [`DedupeError::OperationFailed`] if the input is not a JSON
    /// object with an `items` field, and [`DedupeError::InvalidKey`] when a
    /// record has no valid key.
    pub fn run(&self, input: &str) -> Result<Value> {
        let mut envelope: Map<String, Value> =
            serde_json::from_str(input).map_err(|e| DedupeError::OperationFailed {
                operation: "parse_envelope".to_string(),
                cause: e.to_string(),
            })?;

        let items = envelope
            .remove(ITEMS_FIELD)
            .ok_or_else(|| DedupeError::OperationFailed {
                operation: "parse_envelope".to_string(),
                cause: format!("missing '{ITEMS_FIELD}' field"),
            })?;

        let mut holder: CheckpointHolder = serde_json::from_value(Value::Object(envelope.clone()))
            .map_err(|e| DedupeError::OperationFailed {
                operation: "parse_envelope".to_string(),
                cause: e.to_string(),
            })?;

        let result = self.dedupe.deduplicator().dedupe_checkpointed(
            batch_from_value(items),
            self.dedupe.options(),
            &mut holder,
        )?;

        let items = serde_json::to_value(&result.items).map_err(|e| DedupeError::OperationFailed {
            operation: "encode_output".to_string(),
            cause: e.to_string(),
        })?;
        envelope.insert(ITEMS_FIELD.to_string(), items);
        envelope.insert(
            CHECKPOINT_FIELD.to_string(),
            Value::Array(result.key_cache.iter().map(Key::to_value).collect()),
        );

        Ok(Value::Object(envelope))
    }
}
