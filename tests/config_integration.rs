//! Integration tests for configuration loading.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use keycache::config::KeycacheConfig;
use keycache::{Batch, DedupeError, DedupeOptions, Deduplicator, Key, Strategy};
use serde_json::json;
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file.flush().expect("flush config");
    file
}

#[test]
fn test_config_file_drives_deduplicator() {
    let file = write_config(
        r#"
        [dedupe]
        unsorted_capacity = 2
        default_strategy = "unsorted"
        "#,
    );

    let config = KeycacheConfig::load_from_file(file.path()).expect("valid config");
    let deduplicator = Deduplicator::new(config.dedupe);

    let batch = vec![json!({"id": "x"}), json!({"id": "y"}), json!({"id": "z"})];
    let result = deduplicator
        .dedupe(
            Batch::Many(batch),
            DedupeOptions::new().with_key_cache(vec![Key::from("old")]),
        )
        .expect("valid keys");

    assert_eq!(result.items.len(), 3);
    assert_eq!(result.key_cache, vec![Key::from("x"), Key::from("y")]);
}

#[test]
fn test_config_file_key_length() {
    let file = write_config("[dedupe]\nmax_key_length = 4\n");
    let config = KeycacheConfig::load_from_file(file.path()).expect("valid config");
    let deduplicator = Deduplicator::new(config.dedupe);

    let ok = deduplicator.dedupe(Batch::One(json!({"id": "abcd"})), DedupeOptions::new());
    assert!(ok.is_ok());

    let err = deduplicator.dedupe(Batch::One(json!({"id": "abcde"})), DedupeOptions::new());
    assert!(matches!(err, Err(DedupeError::InvalidKey)));
}

#[test]
fn test_logging_section() {
    let file = write_config(
        r#"
        [logging]
        format = "json"
        file = "/tmp/keycache-test.log"
        "#,
    );
    let config = KeycacheConfig::load_from_file(file.path()).expect("valid config");

    assert_eq!(config.dedupe.default_strategy, Strategy::SortedItems);
    assert_eq!(config.logging.format.as_deref(), Some("json"));
    assert_eq!(
        config.logging.file.as_deref(),
        Some(std::path::Path::new("/tmp/keycache-test.log"))
    );
}

#[test]
fn test_invalid_strategy_in_file() {
    let file = write_config("[dedupe]\ndefault_strategy = \"latest\"\n");
    let result = KeycacheConfig::load_from_file(file.path());
    assert!(matches!(result, Err(DedupeError::InvalidStrategy(ref s)) if s == "latest"));
}

#[test]
fn test_explicit_missing_path_is_an_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let result = KeycacheConfig::load(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(DedupeError::OperationFailed { .. })));
}
