//! Key extraction and validation.
//!
//! Every record of a batch is mapped and validated before the deduplicator
//! makes any filtering decision, and so is every key of the prior cache.
//! One bad key fails the whole call.
//!
//! String length is measured in UTF-16 code units, the unit the key caches
//! persisted by other pollers use. A key outside the Basic Multilingual
//! Plane counts as two.

use crate::models::Key;
use crate::{DedupeError, Result};
use serde_json::Value;
use std::fmt;
use std::fmt::Debug;

use super::mapper::KeyMapper;

/// Why a raw key was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeyRejection {
    /// A string key longer than the configured maximum.
    TooLong {
        /// Length of the rejected key in UTF-16 code units.
        length: usize,
        /// Configured maximum.
        max: usize,
    },
    /// A JSON value that is neither a string nor a number.
    IllegalType(&'static str),
    /// A NaN or infinite number.
    NonFinite,
}

impl fmt::Display for KeyRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong { length, max } => {
                write!(f, "key too long ({length} units, max {max})")
            },
            Self::IllegalType(kind) => write!(f, "key was an illegal type ({kind})"),
            Self::NonFinite => write!(f, "key was not a finite number"),
        }
    }
}

/// Converts a raw mapped value into a key.
pub(crate) fn validate_key(raw: &Value, max_length: usize) -> std::result::Result<Key, KeyRejection> {
    let key = match raw {
        Value::String(s) => Key::Text(s.clone()),
        Value::Number(n) => Key::Number(n.as_f64().ok_or(KeyRejection::NonFinite)?),
        Value::Null => return Err(KeyRejection::IllegalType("null")),
        Value::Bool(_) => return Err(KeyRejection::IllegalType("bool")),
        Value::Array(_) => return Err(KeyRejection::IllegalType("array")),
        Value::Object(_) => return Err(KeyRejection::IllegalType("object")),
    };
    check_key(&key, max_length)?;
    Ok(key)
}

/// Checks the length and finiteness bounds of an already typed key.
pub(crate) fn check_key(key: &Key, max_length: usize) -> std::result::Result<(), KeyRejection> {
    match key {
        Key::Text(s) => {
            let length = s.encode_utf16().count();
            if length > max_length {
                return Err(KeyRejection::TooLong {
                    length,
                    max: max_length,
                });
            }
            Ok(())
        },
        Key::Number(n) if n.is_finite() => Ok(()),
        Key::Number(_) => Err(KeyRejection::NonFinite),
    }
}

/// Checks every key of a caller-supplied cache.
///
/// A cache holding an out-of-bounds key is refused as a whole, with the
/// same [`DedupeError::InvalidKey`] a bad record produces.
pub(crate) fn validate_key_cache(key_cache: &[Key], max_length: usize) -> Result<()> {
    key_cache.iter().enumerate().try_for_each(|(index, key)| {
        check_key(key, max_length).map_err(|rejection| {
            tracing::error!(
                index,
                key = ?key,
                reason = %rejection,
                "Invalid key in prior key cache"
            );
            metrics::counter!("keycache_invalid_keys_total").increment(1);
            DedupeError::InvalidKey
        })
    })
}

/// Maps every record to a validated key, in batch order.
///
/// On the first invalid key, logs the record and its raw key and returns
/// [`DedupeError::InvalidKey`]. The error itself carries no record data.
pub(crate) fn extract_keys<R, M>(records: &[R], mapper: &M, max_length: usize) -> Result<Vec<Key>>
where
    R: Debug,
    M: KeyMapper<R> + ?Sized,
{
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let raw = mapper.map_key(record);
            validate_key(&raw, max_length).map_err(|rejection| {
                tracing::error!(
                    index,
                    record = ?record,
                    key = %raw,
                    reason = %rejection,
                    "Invalid dedupe key"
                );
                metrics::counter!("keycache_invalid_keys_total").increment(1);
                DedupeError::InvalidKey
            })
        })
        .collect()
}
