//! Deduplication service.
//!
//! Runs one deduplication call:
//! 1. **Extract**: map and validate every key of the batch
//! 2. **Resolve**: handle the priming (no cache) and first-run (empty cache) cases
//! 3. **Filter**: apply the strategy's filter against the prior cache
//! 4. **Trim**: bound the next cache for the strategy
//! 5. **Restore**: return survivors in the caller's batch shape
//!
//! The call is a pure function of its inputs. The checkpointed variant
//! wraps it and writes the resulting cache into the caller's holder.

use crate::Result;
use crate::models::{Batch, Key, Strategy, Survivors};
use serde::Serialize;
use std::fmt::Debug;
use tracing::instrument;

use super::checkpoint::Checkpoint;
use super::config::DedupeConfig;
use super::extract::{extract_keys, validate_key_cache};
use super::filters::{self, Filtered};
use super::mapper::{IdField, KeyMapper};

/// Per-call options.
///
/// # Example
///
/// ```rust
/// use keycache::{DedupeOptions, Key, Strategy};
/// use serde_json::{Value, json};
///
/// let options = DedupeOptions::new()
///     .with_strategy(Strategy::SortedKeys)
///     .with_key_cache(vec![Key::from(2)])
///     .with_key_mapper(|record: &Value| record["sec"].clone());
/// assert_eq!(options.strategy, Some(Strategy::SortedKeys));
/// ```
#[derive(Debug, Clone)]
pub struct DedupeOptions<M = IdField> {
    /// Ordering strategy; the configured default when `None`.
    pub strategy: Option<Strategy>,

    /// Prior key cache. `None` primes the cache; for the checkpointed
    /// entry point, `None` means "read it from the checkpoint".
    pub key_cache: Option<Vec<Key>>,

    /// Key extractor.
    pub key_mapper: M,
}

impl DedupeOptions<IdField> {
    /// Creates options with the default strategy, no cache and the `id` mapper.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            strategy: None,
            key_cache: None,
            key_mapper: IdField,
        }
    }
}

impl Default for DedupeOptions<IdField> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> DedupeOptions<M> {
    /// Builder method to set the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Builder method to set the prior key cache.
    #[must_use]
    pub fn with_key_cache(mut self, key_cache: Vec<Key>) -> Self {
        self.key_cache = Some(key_cache);
        self
    }

    /// Builder method to replace the key mapper.
    #[must_use]
    pub fn with_key_mapper<N>(self, key_mapper: N) -> DedupeOptions<N> {
        DedupeOptions {
            strategy: self.strategy,
            key_cache: self.key_cache,
            key_mapper,
        }
    }
}

/// Outcome of a deduplication call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deduplicated<R> {
    /// Records that were not seen before, in the input's shape.
    pub items: Survivors<R>,

    /// Key cache to pass into the next call.
    pub key_cache: Vec<Key>,
}

/// Filters batches of records against a bounded cache of seen keys.
///
/// The deduplicator holds configuration only; all state travels through
/// the key cache the caller passes in and gets back. It is safe to share
/// across threads as long as each logical cache has a single writer.
///
/// # Example
///
/// ```rust
/// use keycache::{Batch, DedupeConfig, DedupeOptions, Deduplicator, Key};
/// use serde_json::json;
///
/// let dedup = Deduplicator::new(DedupeConfig::default());
/// let page = vec![json!({"id": "a"}), json!({"id": "b"}), json!({"id": "c"})];
///
/// let result = dedup.dedupe(
///     Batch::Many(page),
///     DedupeOptions::new().with_key_cache(vec![Key::from("b")]),
/// )?;
/// assert_eq!(result.items.into_vec(), vec![json!({"id": "a"})]);
/// assert_eq!(result.key_cache, vec![Key::from("a")]);
/// # Ok::<(), keycache::DedupeError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deduplicator {
    config: DedupeConfig,
}

impl Deduplicator {
    /// Creates a deduplicator with the given configuration.
    #[must_use]
    pub const fn new(config: DedupeConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &DedupeConfig {
        &self.config
    }

    /// Deduplicates a batch against the options' key cache.
    ///
    /// # Errors
    ///
    /// Returns [`DedupeError::InvalidKey`](crate::DedupeError::InvalidKey)
    /// if any record maps to a key, or the prior cache holds a key, that is
    /// not a bounded string or a finite number. Nothing is filtered in that
    /// case.
    #[instrument(
        skip_all,
        fields(
            operation = "dedupe",
            strategy = tracing::field::Empty,
            batch_len = items.len()
        )
    )]
    pub fn dedupe<R, M>(&self, items: Batch<R>, options: DedupeOptions<M>) -> Result<Deduplicated<R>>
    where
        R: Debug,
        M: KeyMapper<R>,
    {
        let strategy = options.strategy.unwrap_or(self.config.default_strategy);
        tracing::Span::current().record("strategy", strategy.as_str());

        let (records, single) = items.into_parts();
        let current = extract_keys(&records, &options.key_mapper, self.config.max_key_length)?;
        if let Some(prior) = options.key_cache.as_deref() {
            validate_key_cache(prior, self.config.max_key_length)?;
        }
        let batch_len = records.len();

        let Filtered { records, key_cache } = match options.key_cache.as_deref() {
            None => {
                tracing::debug!(keys = current.len(), "No key cache, priming");
                Filtered {
                    records: Vec::new(),
                    key_cache: current,
                }
            },
            Some([]) => {
                tracing::debug!(keys = current.len(), "Empty key cache, accepting batch");
                Filtered {
                    records,
                    key_cache: current,
                }
            },
            Some(prior @ [watermark, ..]) => match strategy {
                Strategy::SortedKeys => filters::sorted_keys(records, current, watermark, prior),
                Strategy::SortedItems => filters::sorted_items(records, current, watermark),
                Strategy::Unsorted => filters::unsorted(records, &current, prior),
            },
        };

        let key_cache = filters::trim(strategy, key_cache, &self.config);
        record_metrics(strategy, batch_len, records.len(), key_cache.len());

        tracing::debug!(
            kept = records.len(),
            dropped = batch_len - records.len(),
            cache_len = key_cache.len(),
            "Deduplicated batch"
        );

        Ok(Deduplicated {
            items: Survivors::from_parts(records, single),
            key_cache,
        })
    }

    /// Deduplicates a batch using, and then updating, a checkpoint.
    ///
    /// The prior cache comes from `checkpoint` unless the options carry an
    /// explicit one, which takes precedence. On success the new cache is
    /// stored into `checkpoint`; on error the checkpoint is left untouched.
    ///
    /// # Errors
    ///
    /// Same as [`Deduplicator::dedupe`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use keycache::{Batch, CheckpointHolder, DedupeOptions, Deduplicator, Key};
    /// use serde_json::json;
    ///
    /// let mut holder = CheckpointHolder::new(vec![Key::from("b")]);
    /// let page = vec![json!({"id": "a"}), json!({"id": "b"}), json!({"id": "c"})];
    ///
    /// let result = Deduplicator::default()
    ///     .dedupe_checkpointed(Batch::Many(page), DedupeOptions::new(), &mut holder)?;
    /// assert_eq!(result.items.len(), 1);
    /// assert_eq!(holder.checkpoint, Some(vec![Key::from("a")]));
    /// # Ok::<(), keycache::DedupeError>(())
    /// ```
    pub fn dedupe_checkpointed<R, M, C>(
        &self,
        items: Batch<R>,
        mut options: DedupeOptions<M>,
        checkpoint: &mut C,
    ) -> Result<Deduplicated<R>>
    where
        R: Debug,
        M: KeyMapper<R>,
        C: Checkpoint + ?Sized,
    {
        if options.key_cache.is_none() {
            options.key_cache = checkpoint.key_cache();
        }

        let result = self.dedupe(items, options)?;
        checkpoint.store_key_cache(result.key_cache.clone());
        Ok(result)
    }
}

/// Deduplicates a batch with the default configuration.
///
/// # Errors
///
/// Same as [`Deduplicator::dedupe`].
pub fn dedupe<R, M>(items: Batch<R>, options: DedupeOptions<M>) -> Result<Deduplicated<R>>
where
    R: Debug,
    M: KeyMapper<R>,
{
    Deduplicator::default().dedupe(items, options)
}

/// Deduplicates a batch through a checkpoint with the default configuration.
///
/// # Errors
///
/// Same as [`Deduplicator::dedupe`].
pub fn dedupe_checkpointed<R, M, C>(
    items: Batch<R>,
    options: DedupeOptions<M>,
    checkpoint: &mut C,
) -> Result<Deduplicated<R>>
where
    R: Debug,
    M: KeyMapper<R>,
    C: Checkpoint + ?Sized,
{
    Deduplicator::default().dedupe_checkpointed(items, options, checkpoint)
}

#[allow(clippy::cast_precision_loss)]
fn record_metrics(strategy: Strategy, batch_len: usize, kept: usize, cache_len: usize) {
    let strategy = strategy.as_str();
    metrics::counter!(
        "keycache_records_total",
        "strategy" => strategy,
        "outcome" => "kept"
    )
    .increment(kept as u64);
    metrics::counter!(
        "keycache_records_total",
        "strategy" => strategy,
        "outcome" => "dropped"
    )
    .increment((batch_len - kept) as u64);
    metrics::histogram!("keycache_cache_size", "strategy" => strategy).record(cache_len as f64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DedupeError;
    use crate::services::deduplication::CheckpointHolder;
    use serde_json::{Value, json};

    fn page() -> Vec<Value> {
        vec![json!({"id": "a"}), json!({"id": "b"}), json!({"id": "c"})]
    }

    fn keys(ids: &[&str]) -> Vec<Key> {
        ids.iter().map(|id| Key::from(*id)).collect()
    }

    fn run(strategy: Strategy, cache: Option<&[&str]>) -> Deduplicated<Value> {
        let mut options = DedupeOptions::new().with_strategy(strategy);
        options.key_cache = cache.map(keys);
        dedupe(Batch::Many(page()), options).unwrap_or_else(|_| Deduplicated {
            items: Survivors::Many(Vec::new()),
            key_cache: keys(&["<error>"]),
        })
    }

    #[test]
    fn test_priming_returns_nothing() {
        let result = run(Strategy::Unsorted, None);
        assert!(result.items.is_empty());
        assert_eq!(result.key_cache, keys(&["a", "b", "c"]));

        let result = run(Strategy::SortedItems, None);
        assert!(result.items.is_empty());
        assert_eq!(result.key_cache, keys(&["a"]));

        let result = run(Strategy::SortedKeys, None);
        assert!(result.items.is_empty());
        assert_eq!(result.key_cache, keys(&["c"]));
    }

    #[test]
    fn test_empty_cache_accepts_everything() {
        let result = run(Strategy::Unsorted, Some(&[]));
        assert_eq!(result.items, Survivors::Many(page()));
        assert_eq!(result.key_cache, keys(&["a", "b", "c"]));
    }

    #[test]
    fn test_sorted_keys() {
        let result = run(Strategy::SortedKeys, Some(&["b"]));
        assert_eq!(result.items.into_vec(), vec![json!({"id": "c"})]);
        assert_eq!(result.key_cache, keys(&["c"]));
    }

    #[test]
    fn test_sorted_items() {
        let result = run(Strategy::SortedItems, Some(&["b"]));
        assert_eq!(result.items.into_vec(), vec![json!({"id": "a"})]);
        assert_eq!(result.key_cache, keys(&["a"]));
    }

    #[test]
    fn test_unsorted() {
        let result = run(Strategy::Unsorted, Some(&["a"]));
        assert_eq!(
            result.items.into_vec(),
            vec![json!({"id": "b"}), json!({"id": "c"})]
        );
        assert_eq!(result.key_cache, keys(&["c", "b", "a"]));
    }

    #[test]
    fn test_default_strategy_from_config() {
        let dedup =
            Deduplicator::new(DedupeConfig::default().with_default_strategy(Strategy::Unsorted));
        let result = dedup
            .dedupe(
                Batch::Many(page()),
                DedupeOptions::new().with_key_cache(keys(&["b"])),
            )
            .map(|r| r.key_cache)
            .unwrap_or_default();
        assert_eq!(result, keys(&["a", "c", "b"]));
    }

    #[test]
    fn test_single_record_shape() {
        let result = dedupe(
            Batch::One(json!({"id": "z"})),
            DedupeOptions::new().with_key_cache(keys(&["y"])),
        );
        assert!(matches!(
            result,
            Ok(Deduplicated { items: Survivors::One(Some(_)), .. })
        ));

        let result = dedupe(
            Batch::One(json!({"id": "y"})),
            DedupeOptions::new().with_key_cache(keys(&["y"])),
        );
        assert!(matches!(
            result,
            Ok(Deduplicated { items: Survivors::One(None), .. })
        ));
    }

    #[test]
    fn test_invalid_key_fails_atomically() {
        let mut holder = CheckpointHolder::new(keys(&["b"]));
        let batch = vec![json!({"id": "a"}), json!({"id": "x".repeat(65)})];
        let result = Deduplicator::default().dedupe_checkpointed(
            Batch::Many(batch),
            DedupeOptions::new(),
            &mut holder,
        );
        assert!(matches!(result, Err(DedupeError::InvalidKey)));
        assert_eq!(holder.checkpoint, Some(keys(&["b"])));
    }

    #[test]
    fn test_configured_key_length() {
        let dedup = Deduplicator::new(DedupeConfig::default().with_max_key_length(3));
        let ok = dedup.dedupe(Batch::One(json!({"id": "abc"})), DedupeOptions::new());
        assert!(ok.is_ok());
        let err = dedup.dedupe(Batch::One(json!({"id": "abcd"})), DedupeOptions::new());
        assert!(matches!(err, Err(DedupeError::InvalidKey)));
    }

    #[test]
    fn test_checkpoint_override_wins() {
        let mut holder = CheckpointHolder::new(keys(&["c"]));
        let result = dedupe_checkpointed(
            Batch::Many(page()),
            DedupeOptions::new().with_key_cache(keys(&["b"])),
            &mut holder,
        );
        assert_eq!(result.map(|r| r.items.len()).unwrap_or_default(), 1);
        assert_eq!(holder.checkpoint, Some(keys(&["a"])));
    }
}
