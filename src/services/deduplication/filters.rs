//! Per-strategy filtering and key cache trimming.
//!
//! Each filter receives the batch records, their parallel keys and the
//! prior cache or its first key, and returns the kept records together with the
//! untrimmed next cache. Trimming is a separate step so that the
//! degenerate cases (no cache, empty cache) are bounded the same way.

use crate::models::{Key, Strategy};
use std::collections::HashSet;

use super::config::DedupeConfig;

/// Records kept by a filter and the next key cache before trimming.
pub(crate) struct Filtered<R> {
    pub records: Vec<R>,
    pub key_cache: Vec<Key>,
}

/// Keeps records whose key is strictly above the previous watermark.
///
/// The next cache is the prior cache followed by the current keys.
pub(crate) fn sorted_keys<R>(
    records: Vec<R>,
    current: Vec<Key>,
    watermark: &Key,
    prior: &[Key],
) -> Filtered<R> {
    let records = records
        .into_iter()
        .zip(&current)
        .filter(|(_, key)| *key > watermark)
        .map(|(record, _)| record)
        .collect();

    let mut key_cache = prior.to_vec();
    key_cache.extend(current);

    Filtered { records, key_cache }
}

/// Keeps the records that precede the previous watermark in the batch.
///
/// Without a match the whole batch is new. The next cache is the current
/// keys, newest first.
pub(crate) fn sorted_items<R>(mut records: Vec<R>, current: Vec<Key>, watermark: &Key) -> Filtered<R> {
    if let Some(pivot) = current.iter().position(|key| key == watermark) {
        records.truncate(pivot);
    }

    Filtered {
        records,
        key_cache: current,
    }
}

/// Keeps records whose key is absent from the prior cache.
///
/// Newly seen keys are prepended to the cache. When the first record of the
/// batch was already known, the source is assumed to list oldest first and
/// the new keys are reversed so the most recent ones sit at the front.
pub(crate) fn unsorted<R>(records: Vec<R>, current: &[Key], prior: &[Key]) -> Filtered<R> {
    let seen: HashSet<&Key> = prior.iter().collect();

    let (kept, mut undropped) = records.into_iter().zip(current).fold(
        (Vec::new(), Vec::new()),
        |(mut kept, mut undropped), (record, key)| {
            if !seen.contains(key) {
                kept.push(record);
                undropped.push(key.clone());
            }
            (kept, undropped)
        },
    );

    if undropped
        .first()
        .is_some_and(|first| current.first() != Some(first))
    {
        undropped.reverse();
    }

    undropped.extend_from_slice(prior);

    Filtered {
        records: kept,
        key_cache: undropped,
    }
}

/// Bounds a key cache according to the strategy.
///
/// `SortedKeys` first reduces the cache to its maximum key. Every strategy
/// then keeps at most [`DedupeConfig::cache_bound`] leading keys.
pub(crate) fn trim(strategy: Strategy, key_cache: Vec<Key>, config: &DedupeConfig) -> Vec<Key> {
    let mut key_cache: Vec<Key> = match strategy {
        Strategy::SortedKeys => key_cache
            .into_iter()
            .reduce(|max, key| if key > max { key } else { max })
            .into_iter()
            .collect(),
        Strategy::SortedItems | Strategy::Unsorted => key_cache,
    };
    key_cache.truncate(config.cache_bound(strategy));
    key_cache
}
