//! Deduplication keys.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Largest integral magnitude that serializes as a JSON integer (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A record identifier remembered in a key cache.
///
/// Keys are either short strings or numbers. Two keys of different kinds are
/// never equal and never ordered relative to each other: `partial_cmp`
/// returns `None`, so both `<` and `>` are false.
///
/// `From<f64>` does not check its input. The deduplicator refuses NaN and
/// infinite numbers, and overlong strings, in both extracted keys and the
/// prior key cache, so every key it compares or returns is in bounds.
///
/// # Example
///
/// ```rust
/// use keycache::Key;
///
/// assert!(Key::from("b") > Key::from("a"));
/// assert!(Key::from(10) > Key::from(9.5));
/// assert_ne!(Key::from("1"), Key::from(1));
/// assert_eq!(Key::from("b").partial_cmp(&Key::from(1)), None);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// A string identifier.
    Text(String),
    /// A numeric identifier.
    Number(f64),
}

impl Key {
    /// Returns the string if this is a text key.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    /// Returns the number if this is a numeric key.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Text(_) => None,
            Self::Number(n) => Some(*n),
        }
    }

    /// Converts the key back into a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(n) => integral(*n).map_or_else(
                || serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
                |i| Value::Number(i.into()),
            ),
        }
    }

    /// `-0.0` and `0.0` compare equal, so they must hash alike.
    fn normalized_bits(n: f64) -> u64 {
        if n == 0.0 { 0 } else { n.to_bits() }
    }
}

/// Returns the value as an `i64` when it is integral and exactly representable.
#[allow(clippy::cast_possible_truncation)]
fn integral(n: f64) -> Option<i64> {
    (n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER).then_some(n as i64)
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            #[allow(clippy::float_cmp)]
            (Self::Number(a), Self::Number(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Text(s) => {
                0u8.hash(state);
                s.hash(state);
            },
            Self::Number(n) => {
                1u8.hash(state);
                Self::normalized_bits(*n).hash(state);
            },
        }
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number(n) => match integral(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(n) => match integral(*n) {
                Some(i) => write!(f, "{i}"),
                None => write!(f, "{n}"),
            },
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Key {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Key {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Key {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_text_and_number_never_equal() {
        assert_ne!(Key::from("1"), Key::from(1));
        assert_ne!(Key::from(1), Key::from("1"));
    }

    #[test]
    fn test_mixed_kinds_are_unordered() {
        let text = Key::from("z");
        let number = Key::from(1);
        assert_eq!(text.partial_cmp(&number), None);
        assert!(!(text > number));
        assert!(!(text < number));
    }

    #[test]
    fn test_ordering_within_kind() {
        assert!(Key::from("b") > Key::from("a"));
        assert!(Key::from("aa") > Key::from("a"));
        assert!(Key::from(3) > Key::from(2));
        assert!(Key::from(-1.5) < Key::from(0));
    }

    #[test]
    fn test_negative_zero_hashes_like_zero() {
        let mut set = HashSet::new();
        set.insert(Key::from(0.0));
        assert!(set.contains(&Key::from(-0.0)));
    }

    #[test]
    fn test_serialize_integral_numbers_without_fraction() {
        let keys = vec![Key::from(3), Key::from(2.5), Key::from("x")];
        let json = serde_json::to_string(&keys).unwrap_or_default();
        assert_eq!(json, r#"[3,2.5,"x"]"#);
    }

    #[test]
    fn test_deserialize_mixed_cache() {
        let keys: Vec<Key> = serde_json::from_str(r#"["b", 2, 2.5]"#).unwrap_or_default();
        assert_eq!(keys, vec![Key::from("b"), Key::from(2), Key::from(2.5)]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Key::from("abc").to_string(), "abc");
        assert_eq!(Key::from(42).to_string(), "42");
        assert_eq!(Key::from(0.25).to_string(), "0.25");
    }

    #[test]
    fn test_to_value() {
        assert_eq!(Key::from("a").to_value(), serde_json::json!("a"));
        assert_eq!(Key::from(7).to_value(), serde_json::json!(7));
        assert_eq!(Key::from(1.5).to_value(), serde_json::json!(1.5));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Key::from("a").as_text(), Some("a"));
        assert_eq!(Key::from("a").as_number(), None);
        assert_eq!(Key::from(4).as_number(), Some(4.0));
        assert_eq!(Key::from(4).as_text(), None);
    }
}
