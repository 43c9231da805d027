//! Data models for keycache.
//!
//! This module contains the value types shared by the deduplication service,
//! the configuration layer and the command-line front end.

mod batch;
mod key;
mod strategy;

pub use batch::{Batch, Survivors};
pub use key::Key;
pub use strategy::Strategy;
