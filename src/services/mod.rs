//! Business logic services.
//!
//! Services orchestrate the model types into the operations the library and
//! the command-line front end expose.

pub mod deduplication;

pub use deduplication::{DedupeConfig, Deduplicator};
