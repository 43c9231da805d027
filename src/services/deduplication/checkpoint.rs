//! Checkpoint holders.
//!
//! A checkpoint is a caller-owned slot that remembers the key cache between
//! calls. The checkpointed entry point reads the slot before deduplicating
//! and writes the new cache back afterwards; that write is its only side
//! effect.

use crate::models::Key;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A caller-owned slot holding a key cache.
pub trait Checkpoint {
    /// Returns the stored key cache, or `None` if nothing valid is stored.
    fn key_cache(&self) -> Option<Vec<Key>>;

    /// Replaces the stored key cache.
    fn store_key_cache(&mut self, key_cache: Vec<Key>);
}

impl Checkpoint for Option<Vec<Key>> {
    fn key_cache(&self) -> Option<Vec<Key>> {
        self.clone()
    }

    fn store_key_cache(&mut self, key_cache: Vec<Key>) {
        *self = Some(key_cache);
    }
}

/// A serializable checkpoint with its cache under the `$checkpoint` field.
///
/// A `$checkpoint` value that is not an array of keys is read as "no valid
/// cache", so the next call primes the cache instead of failing.
///
/// # Example
///
/// ```rust
/// use keycache::{Checkpoint, CheckpointHolder, Key};
///
/// let holder: CheckpointHolder = serde_json::from_str(r#"{"$checkpoint": ["b"]}"#)?;
/// assert_eq!(holder.key_cache(), Some(vec![Key::from("b")]));
///
/// let broken: CheckpointHolder = serde_json::from_str(r#"{"$checkpoint": "b"}"#)?;
/// assert_eq!(broken.key_cache(), None);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointHolder {
    /// The stored key cache.
    #[serde(
        rename = "$checkpoint",
        default,
        deserialize_with = "lenient_key_cache",
        skip_serializing_if = "Option::is_none"
    )]
    pub checkpoint: Option<Vec<Key>>,
}

impl CheckpointHolder {
    /// Creates a holder with an initial key cache.
    #[must_use]
    pub const fn new(key_cache: Vec<Key>) -> Self {
        Self {
            checkpoint: Some(key_cache),
        }
    }

    /// Creates an empty holder; the first call through it primes the cache.
    #[must_use]
    pub const fn empty() -> Self {
        Self { checkpoint: None }
    }
}

impl Checkpoint for CheckpointHolder {
    fn key_cache(&self) -> Option<Vec<Key>> {
        self.checkpoint.clone()
    }

    fn store_key_cache(&mut self, key_cache: Vec<Key>) {
        self.checkpoint = Some(key_cache);
    }
}

fn lenient_key_cache<'de, D>(deserializer: D) -> Result<Option<Vec<Key>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}
