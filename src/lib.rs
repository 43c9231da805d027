//! # Keycache
//!
//! Bounded key-cache deduplication for polled and paginated record streams.
//!
//! A poller that repeatedly fetches "the latest" records from a source sees
//! the same records again and again. Keycache filters each fetched batch down
//! to the records that are genuinely new, using a small cache of previously
//! seen keys that the caller carries from one call to the next.
//!
//! ## Features
//!
//! - Three ordering strategies: `SortedItems`, `SortedKeys` and `Unsorted`
//! - Bounded state: one watermark key for sorted sources, at most 1000 keys
//!   (configurable) for unsorted ones
//! - Caller-supplied key extraction, validated before any filtering decision
//! - Optional checkpoint holder that reads and writes the cache for you
//!
//! ## Example
//!
//! ```rust
//! use keycache::{Batch, DedupeOptions, Key, Strategy, dedupe};
//! use serde_json::json;
//!
//! let page = vec![json!({"id": "a"}), json!({"id": "b"}), json!({"id": "c"})];
//! let options = DedupeOptions::new()
//!     .with_strategy(Strategy::Unsorted)
//!     .with_key_cache(vec![Key::from("b")]);
//!
//! let result = dedupe(Batch::Many(page), options)?;
//! assert_eq!(result.items.len(), 2);
//! assert_eq!(result.key_cache, vec![Key::from("a"), Key::from("c"), Key::from("b")]);
//! # Ok::<(), keycache::DedupeError>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod cli;
pub mod config;
pub mod models;
pub mod observability;
pub mod services;

pub use config::KeycacheConfig;
pub use models::{Batch, Key, Strategy, Survivors};
pub use services::deduplication::{
    Checkpoint, CheckpointHolder, DedupeConfig, DedupeOptions, Deduplicated, Deduplicator, Field,
    IdField, KeyMapper, dedupe, dedupe_checkpointed,
};

/// Error type for keycache operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidStrategy` | An unknown strategy name is parsed (config, CLI, env) |
/// | `InvalidKey` | A derived key is not a bounded string or a finite number |
/// | `OperationFailed` | Config file I/O or parsing fails, CLI input is malformed |
#[derive(Debug, ThisError)]
pub enum DedupeError {
    /// An unrecognized strategy value was supplied.
    ///
    /// Raised before any record is looked at.
    #[error("invalid strategy: {0}")]
    InvalidStrategy(String),

    /// A derived key failed validation.
    ///
    /// The offending record and key are written to the diagnostic log only,
    /// so record contents never travel through the error channel.
    #[error("dedupe error, check logs")]
    InvalidKey,

    /// An ambient operation failed.
    ///
    /// Raised when:
    /// - A configuration file cannot be read or parsed
    /// - CLI input is not valid JSON
    /// - Logging has already been initialized
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for keycache operations.
pub type Result<T> = std::result::Result<T, DedupeError>;
