//! Typed log store
//!
//! [`LogStore`] puts key and value codecs in front of a [`LogFile`], turning
//! the raw append-only log into a cache of `K → V`.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{Codec, JsonCodec};
use crate::config::SyncStrategy;
use crate::entry::Entry;
use crate::error::Result;

use super::compaction::CompactionReport;
use super::file::{LogFile, LogStats};

/// Persistent `K → V` cache backed by one append-only log
///
/// Every `set` appends a record; the record it supersedes stays in the file
/// as dead weight until a `remove` (or an explicit [`compact`](Self::compact))
/// rewrites the log. `remove` is O(live entries) and belongs off hot paths.
pub struct LogStore<K, V> {
    log: LogFile,
    key_codec: Arc<dyn Codec<K>>,
    value_codec: Arc<dyn Codec<V>>,
}

impl<K, V> LogStore<K, V> {
    /// Open or create the store at `path`, appending without fsync
    pub fn open(
        path: impl AsRef<Path>,
        key_codec: Arc<dyn Codec<K>>,
        value_codec: Arc<dyn Codec<V>>,
    ) -> Result<Self> {
        Self::open_with(path, SyncStrategy::Never, key_codec, value_codec)
    }

    /// Open or create the store at `path` with an explicit sync strategy
    pub fn open_with(
        path: impl AsRef<Path>,
        sync_strategy: SyncStrategy,
        key_codec: Arc<dyn Codec<K>>,
        value_codec: Arc<dyn Codec<V>>,
    ) -> Result<Self> {
        let log = LogFile::open(path.as_ref(), sync_strategy)?;
        Ok(Self {
            log,
            key_codec,
            value_codec,
        })
    }

    /// Entry for `key` holding the default value; touches neither the file
    /// nor the index
    pub fn new_entry(&self, key: K) -> Entry<K, V>
    where
        V: Default,
    {
        Entry::empty(key)
    }

    /// Look up the latest value for `key`
    ///
    /// Fails with [`CacheError::NotFound`](crate::CacheError::NotFound)
    /// when the key has no live record.
    pub fn get_entry(&self, key: K) -> Result<Entry<K, V>> {
        let value = self.get(&key)?;
        Ok(Entry::new(key, value))
    }

    /// Look up the latest value for `key` without building an entry
    pub fn get(&self, key: &K) -> Result<V> {
        let key_bytes = self.key_codec.serialize(key)?;
        let bytes = self.log.read(&key_bytes)?;
        self.value_codec.deserialize(&bytes)
    }

    /// Append the entry's value as the latest record for its key
    pub fn set_entry(&self, entry: &Entry<K, V>) -> Result<()> {
        self.set(entry.key(), entry.value())
    }

    pub fn set(&self, key: &K, value: &V) -> Result<()> {
        let key_bytes = self.key_codec.serialize(key)?;
        let value_bytes = self.value_codec.serialize(value)?;
        self.log.append(&key_bytes, &value_bytes)
    }

    /// Forget `key` and compact the log
    ///
    /// While rewriting, a surviving key whose value can no longer be read
    /// or decoded is dropped rather than failing the removal. Removing an
    /// absent key succeeds without touching the file.
    pub fn remove(&self, key: &K) -> Result<()> {
        let key_bytes = self.key_codec.serialize(key)?;
        self.log.remove(&key_bytes, &|bytes: &[u8]| self.validate(bytes))?;
        Ok(())
    }

    /// Rewrite the log keeping one record per live key
    pub fn compact(&self) -> Result<CompactionReport> {
        self.log.compact(&|bytes: &[u8]| self.validate(bytes))
    }

    fn validate(&self, bytes: &[u8]) -> Result<()> {
        self.value_codec.deserialize(bytes).map(drop)
    }

    /// Delete the backing file and every key. Irreversible.
    pub fn clear(&self) -> Result<()> {
        self.log.clear()
    }

    pub fn contains_key(&self, key: &K) -> Result<bool> {
        let key_bytes = self.key_codec.serialize(key)?;
        Ok(self.log.contains(&key_bytes))
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live keys, decoded, in log order
    pub fn keys(&self) -> Result<Vec<K>> {
        self.log
            .keys()
            .iter()
            .map(|bytes| self.key_codec.deserialize(bytes))
            .collect()
    }

    pub fn stats(&self) -> Result<LogStats> {
        self.log.stats()
    }

    pub fn path(&self) -> &Path {
        self.log.path()
    }
}

impl<K, V> LogStore<K, V>
where
    K: Serialize + DeserializeOwned + 'static,
    V: Serialize + DeserializeOwned + 'static,
{
    /// Open a store that keeps both keys and values as JSON
    pub fn open_json(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(
            path,
            Arc::new(JsonCodec::<K>::new()),
            Arc::new(JsonCodec::<V>::new()),
        )
    }
}
