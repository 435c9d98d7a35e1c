//! Tests for MetadataStore
//!
//! These tests verify:
//! - Set/get with NotFound for unknown keys
//! - Last-write-wins and persistence across reopen
//! - The log only grows (no compaction path)
//! - Keys are encoded with the same codec as the value log

use std::path::PathBuf;
use std::sync::Arc;

use logcache::codec::{JsonCodec, StringCodec};
use logcache::log::RecordReader;
use logcache::{CacheError, MetadataCache, MetadataStore};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ItemMeta {
    etag: String,
    fetched_at: u64,
}

fn meta(etag: &str, fetched_at: u64) -> ItemMeta {
    ItemMeta {
        etag: etag.to_string(),
        fetched_at,
    }
}

fn setup_temp_metadata() -> (TempDir, PathBuf, MetadataStore<String, ItemMeta>) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("metadata.log");
    let store = MetadataStore::open_json(&path).unwrap();
    (temp_dir, path, store)
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_set_get_metadata() {
    let (_temp, _path, store) = setup_temp_metadata();
    let key = "drive/root".to_string();

    store.set_metadata(&key, &meta("\"abc\"", 1)).unwrap();

    assert_eq!(store.get_metadata(&key).unwrap(), meta("\"abc\"", 1));
}

#[test]
fn test_get_unknown_metadata_is_not_found() {
    let (_temp, _path, store) = setup_temp_metadata();

    let err = store.get_metadata(&"nothing".to_string()).unwrap_err();

    assert!(matches!(err, CacheError::NotFound));
}

#[test]
fn test_metadata_last_write_wins() {
    let (_temp, _path, store) = setup_temp_metadata();
    let key = "file/42".to_string();

    store.set_metadata(&key, &meta("v1", 1)).unwrap();
    store.set_metadata(&key, &meta("v2", 2)).unwrap();

    assert_eq!(store.get_metadata(&key).unwrap(), meta("v2", 2));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_metadata_survives_reopen() {
    let (_temp, path, store) = setup_temp_metadata();

    store.set_metadata(&"a".to_string(), &meta("ea", 10)).unwrap();
    store.set_metadata(&"b".to_string(), &meta("eb", 20)).unwrap();
    store.set_metadata(&"a".to_string(), &meta("ea2", 30)).unwrap();
    drop(store);

    let reopened: MetadataStore<String, ItemMeta> = MetadataStore::open_json(&path).unwrap();

    assert_eq!(reopened.get_metadata(&"a".to_string()).unwrap(), meta("ea2", 30));
    assert_eq!(reopened.get_metadata(&"b".to_string()).unwrap(), meta("eb", 20));
}

#[test]
fn test_metadata_log_only_grows() {
    let (_temp, _path, store) = setup_temp_metadata();
    let key = "profile".to_string();
    let mut last_size = 0;

    for i in 0..5 {
        store.set_metadata(&key, &meta("same", i)).unwrap();
        let stats = store.stats().unwrap();
        assert!(stats.file_bytes > last_size);
        last_size = stats.file_bytes;
    }

    let stats = store.stats().unwrap();
    assert_eq!(stats.total_records, 5);
    assert_eq!(stats.live_records, 1);
}

#[test]
fn test_metadata_clear() {
    let (_temp, path, store) = setup_temp_metadata();

    store.set_metadata(&"a".to_string(), &meta("e", 1)).unwrap();
    store.clear().unwrap();

    assert!(!path.exists());
    assert!(store.is_empty());
    assert!(store
        .get_metadata(&"a".to_string())
        .unwrap_err()
        .is_not_found());

    store.set_metadata(&"a".to_string(), &meta("f", 2)).unwrap();
    assert_eq!(store.get_metadata(&"a".to_string()).unwrap(), meta("f", 2));
}

// =============================================================================
// Codec Tests
// =============================================================================

#[test]
fn test_metadata_keys_use_supplied_key_codec() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("metadata.log");
    let store: MetadataStore<String, ItemMeta> = MetadataStore::open(
        &path,
        Arc::new(StringCodec),
        Arc::new(JsonCodec::<ItemMeta>::new()),
    )
    .unwrap();

    store.set_metadata(&"alice".to_string(), &meta("e", 1)).unwrap();

    let (_, record) = RecordReader::open(&path).unwrap().next().unwrap().unwrap();
    assert_eq!(record.key, b"alice");
    assert_eq!(store.path(), path.as_path());
}

#[test]
fn test_metadata_through_trait_object() {
    let (_temp, _path, store) = setup_temp_metadata();
    let cache: &dyn MetadataCache<String, ItemMeta> = &store;

    cache.set_metadata(&"k".to_string(), &meta("t", 7)).unwrap();

    assert_eq!(cache.get_metadata(&"k".to_string()).unwrap(), meta("t", 7));
}
