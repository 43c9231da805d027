//! CLI command implementations.
//!
//! The `keycache` binary is a stateless front end over the deduplication
//! service: it reads JSON, deduplicates it and writes JSON. Storing the
//! returned key cache between runs is up to the caller.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dedupe` | Deduplicate a batch against a key cache given as an argument |
//! | `checkpoint` | Deduplicate an envelope carrying its own `$checkpoint` |
//!
//! # Example Usage
//!
//! ```bash
//! # Prime, then filter
//! echo '[{"id":"a"},{"id":"b"}]' | keycache dedupe --strategy unsorted
//! echo '[{"id":"a"},{"id":"c"}]' | keycache dedupe --strategy unsorted --cache '["a","b"]'
//!
//! # Envelope form
//! echo '{"items":[{"id":3},{"id":2}],"$checkpoint":[2]}' | keycache checkpoint --strategy sorted-items
//! ```

mod checkpoint;
mod dedupe;

pub use checkpoint::CheckpointCommand;
pub use dedupe::{DEFAULT_KEY_FIELD, DedupeCommand};
