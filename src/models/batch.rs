//! Input batches and their deduplicated survivors.
//!
//! A caller may hand the deduplicator either a single record or a sequence
//! of records; the output keeps the same shape.

use serde::{Deserialize, Serialize};

/// Records submitted for one deduplication call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Batch<R> {
    /// An ordered sequence of records.
    Many(Vec<R>),
    /// A single, unwrapped record.
    One(R),
}

impl<R> Batch<R> {
    /// Returns the number of records in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Many(records) => records.len(),
            Self::One(_) => 1,
        }
    }

    /// Returns true if the batch holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Splits the batch into its records and a flag recording its shape.
    pub(crate) fn into_parts(self) -> (Vec<R>, bool) {
        match self {
            Self::Many(records) => (records, false),
            Self::One(record) => (vec![record], true),
        }
    }
}

impl<R> From<Vec<R>> for Batch<R> {
    fn from(records: Vec<R>) -> Self {
        Self::Many(records)
    }
}

/// Records that survived deduplication, in the shape of the input batch.
///
/// Serializes as an array for `Many`, and as the record itself or `null`
/// for `One`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Survivors<R> {
    /// Surviving records of a sequence batch, in input order.
    Many(Vec<R>),
    /// The single record, if it was new.
    One(Option<R>),
}

impl<R> Survivors<R> {
    /// Rebuilds the caller's shape from the kept records.
    pub(crate) fn from_parts(mut records: Vec<R>, single: bool) -> Self {
        if single {
            Self::One(records.pop())
        } else {
            Self::Many(records)
        }
    }

    /// Returns the number of surviving records.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Many(records) => records.len(),
            Self::One(record) => usize::from(record.is_some()),
        }
    }

    /// Returns true if nothing survived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattens the survivors into a vector, whatever the shape.
    #[must_use]
    pub fn into_vec(self) -> Vec<R> {
        match self {
            Self::Many(records) => records,
            Self::One(record) => record.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_shape() {
        let one = Batch::One("a");
        assert_eq!(one.len(), 1);
        assert!(!one.is_empty());
        assert_eq!(one.into_parts(), (vec!["a"], true));

        let many: Batch<&str> = vec!["a", "b"].into();
        assert_eq!(many.len(), 2);
        assert_eq!(many.into_parts(), (vec!["a", "b"], false));
        assert!(Batch::<&str>::Many(Vec::new()).is_empty());
    }

    #[test]
    fn test_survivors_restore_single_shape() {
        assert_eq!(Survivors::from_parts(vec!["a"], true), Survivors::One(Some("a")));
        assert_eq!(Survivors::<&str>::from_parts(Vec::new(), true), Survivors::One(None));
        assert_eq!(
            Survivors::from_parts(vec!["a", "b"], false),
            Survivors::Many(vec!["a", "b"])
        );
    }

    #[test]
    fn test_survivors_serialize_by_shape() {
        let none: Survivors<u8> = Survivors::One(None);
        assert_eq!(serde_json::to_string(&none).unwrap_or_default(), "null");
        let one = Survivors::One(Some(1u8));
        assert_eq!(serde_json::to_string(&one).unwrap_or_default(), "1");
        let many = Survivors::Many(vec![1u8, 2]);
        assert_eq!(serde_json::to_string(&many).unwrap_or_default(), "[1,2]");
    }

    #[test]
    fn test_batch_deserializes_array_as_many() {
        let batch: Option<Batch<serde_json::Value>> = serde_json::from_str(r#"[{"id":1}]"#).ok();
        assert!(matches!(batch, Some(Batch::Many(v)) if v.len() == 1));

        let batch: Option<Batch<serde_json::Value>> = serde_json::from_str(r#"{"id":1}"#).ok();
        assert!(matches!(batch, Some(Batch::One(_))));
    }

    #[test]
    fn test_survivors_accessors() {
        assert_eq!(Survivors::Many(vec![1, 2]).into_vec(), vec![1, 2]);
        assert_eq!(Survivors::One(Some(3)).into_vec(), vec![3]);
        assert_eq!(Survivors::<i32>::One(None).into_vec(), Vec::<i32>::new());
        assert_eq!(Survivors::One(Some(4)).len(), 1);
        assert!(Survivors::<i32>::Many(Vec::new()).is_empty());
    }
}
