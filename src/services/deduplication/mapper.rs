//! Key extraction from records.
//!
//! A key mapper turns a record into a raw JSON value. The raw value is
//! validated into a [`Key`](crate::Key) afterwards, so a mapper never has to
//! decide what a legal key is.
//!
//! [`IdField`] and [`Field`] work on any `Serialize` record by converting it
//! to a `serde_json::Value` first, which copies the whole record once per
//! key lookup. For large records or hot loops, a closure that reads the
//! field directly avoids that copy:
//!
//! ```rust
//! use keycache::{Batch, DedupeOptions, Key, dedupe};
//! use serde_json::{Value, json};
//!
//! let page = vec![json!({"id": "a", "body": "..."}), json!({"id": "b", "body": "..."})];
//! let options = DedupeOptions::new()
//!     .with_key_cache(vec![Key::from("b")])
//!     .with_key_mapper(|record: &Value| record["id"].clone());
//!
//! let result = dedupe(Batch::Many(page), options)?;
//! assert_eq!(result.items.len(), 1);
//! # Ok::<(), keycache::DedupeError>(())
//! ```

use serde::Serialize;
use serde_json::Value;

/// Maps a record to its raw deduplication key.
///
/// Implemented for [`IdField`], [`Field`] and any closure
/// `Fn(&R) -> serde_json::Value`.
///
/// # Example
///
/// ```rust
/// use keycache::KeyMapper;
/// use serde_json::json;
///
/// struct Event { seq: u64 }
///
/// let by_seq = |event: &Event| json!(event.seq);
/// assert_eq!(by_seq.map_key(&Event { seq: 7 }), json!(7));
/// ```
pub trait KeyMapper<R: ?Sized> {
    /// Returns the raw key of `record`.
    fn map_key(&self, record: &R) -> Value;
}

impl<R: ?Sized, F> KeyMapper<R> for F
where
    F: Fn(&R) -> Value,
{
    fn map_key(&self, record: &R) -> Value {
        self(record)
    }
}

/// The default mapper: reads the record's top-level `id` field.
///
/// The record is serialized with `serde_json` on every lookup; a record
/// without an `id` field maps to `null`, which fails key validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdField;

impl<R: Serialize + ?Sized> KeyMapper<R> for IdField {
    fn map_key(&self, record: &R) -> Value {
        lookup(record, "id")
    }
}

/// Reads a named field from the serialized record.
///
/// A name starting with `/` is a JSON pointer into nested objects.
///
/// # Example
///
/// ```rust
/// use keycache::{Field, KeyMapper};
/// use serde_json::json;
///
/// let record = json!({"id": "a", "meta": {"seq": 3}});
/// assert_eq!(Field::new("/meta/seq").map_key(&record), json!(3));
/// assert_eq!(Field::new("id").map_key(&record), json!("a"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field(String);

impl Field {
    /// Creates a mapper for the given field name or JSON pointer.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the field name or pointer.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl<R: Serialize + ?Sized> KeyMapper<R> for Field {
    fn map_key(&self, record: &R) -> Value {
        lookup(record, &self.0)
    }
}

fn lookup<R: Serialize + ?Sized>(record: &R, field: &str) -> Value {
    let Ok(value) = serde_json::to_value(record) else {
        return Value::Null;
    };
    let found = if field.starts_with('/') {
        value.pointer(field)
    } else {
        value.get(field)
    };
    found.cloned().unwrap_or(Value::Null)
}
