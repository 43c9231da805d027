//! Key-cache deduplication.
//!
//! Filters batches of records down to the ones not seen before, remembering
//! what was seen in a small key cache that the caller carries between calls.
//!
//! # Strategies
//!
//! | Strategy | Source ordering | Cache contents |
//! |----------|-----------------|----------------|
//! | `SortedItems` | Newest first | The newest key seen |
//! | `SortedKeys` | Keys increase across batches | The largest key seen |
//! | `Unsorted` | Any | Up to 1000 recently seen keys |
//!
//! # Call flow
//!
//! ```text
//! batch ──► extract keys ──► resolve cache ──► strategy filter ──► trim ──► survivors
//!              │                 │                                           + key cache
//!              ▼                 ├─ none:  prime, nothing is new
//!         InvalidKey             └─ empty: everything is new
//! ```
//!
//! # Example
//!
//! ```rust
//! use keycache::{Batch, CheckpointHolder, DedupeOptions, Strategy, dedupe_checkpointed};
//! use serde_json::json;
//!
//! let mut checkpoint = CheckpointHolder::empty();
//! let options = || DedupeOptions::new().with_strategy(Strategy::Unsorted);
//!
//! // The first call only primes the cache.
//! let first = vec![json!({"id": 1}), json!({"id": 2})];
//! let result = dedupe_checkpointed(Batch::Many(first), options(), &mut checkpoint)?;
//! assert!(result.items.is_empty());
//!
//! // Later calls return only unseen records.
//! let second = vec![json!({"id": 2}), json!({"id": 3})];
//! let result = dedupe_checkpointed(Batch::Many(second), options(), &mut checkpoint)?;
//! assert_eq!(result.items.into_vec(), vec![json!({"id": 3})]);
//! # Ok::<(), keycache::DedupeError>(())
//! ```

mod checkpoint;
mod config;
mod extract;
mod filters;
mod mapper;
mod service;

pub use checkpoint::{Checkpoint, CheckpointHolder};
pub use config::{DEFAULT_MAX_KEY_LENGTH, DEFAULT_UNSORTED_CAPACITY, DedupeConfig};
pub use mapper::{Field, IdField, KeyMapper};
pub use service::{DedupeOptions, Deduplicated, Deduplicator, dedupe, dedupe_checkpointed};
