//! Cache Module
//!
//! The contract callers program against, and the store that implements it
//! on top of a value log plus a metadata log.
//!
//! ## Responsibilities
//! - Define the narrow cache surface (`Cache`, `MetadataCache`)
//! - Open both logs of one data directory with a shared key codec
//! - Keep value operations and metadata operations independent

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::codec::{Codec, JsonCodec};
use crate::config::Config;
use crate::entry::Entry;
use crate::error::{CacheError, Result};
use crate::log::LogStore;
use crate::metadata::MetadataStore;

/// Typed cache of `K → V`
pub trait Cache<K, V>: Send + Sync {
    /// Entry holding `key` and the default value, not yet stored
    fn new_entry(&self, key: K) -> Entry<K, V>
    where
        V: Default,
    {
        Entry::empty(key)
    }

    /// Latest entry for `key`; `NotFound` when there is none
    fn get_entry(&self, key: K) -> Result<Entry<K, V>>;

    fn set_entry(&self, entry: &Entry<K, V>) -> Result<()>;

    fn remove(&self, key: &K) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Auxiliary metadata attached to cache keys
pub trait MetadataCache<K, M>: Send + Sync {
    fn get_metadata(&self, key: &K) -> Result<M>;

    fn set_metadata(&self, key: &K, metadata: &M) -> Result<()>;
}

impl<K, V> Cache<K, V> for LogStore<K, V> {
    fn get_entry(&self, key: K) -> Result<Entry<K, V>> {
        LogStore::get_entry(self, key)
    }

    fn set_entry(&self, entry: &Entry<K, V>) -> Result<()> {
        LogStore::set_entry(self, entry)
    }

    fn remove(&self, key: &K) -> Result<()> {
        LogStore::remove(self, key)
    }

    fn clear(&self) -> Result<()> {
        LogStore::clear(self)
    }
}

impl<K, M> MetadataCache<K, M> for MetadataStore<K, M> {
    fn get_metadata(&self, key: &K) -> Result<M> {
        MetadataStore::get_metadata(self, key)
    }

    fn set_metadata(&self, key: &K, metadata: &M) -> Result<()> {
        MetadataStore::set_metadata(self, key, metadata)
    }
}

/// Value log and metadata log of one data directory
///
/// ```text
/// {data_dir}/
///   ├── cache.log       values,   compacted on remove
///   └── metadata.log    metadata, append-only
/// ```
///
/// Safe to share between threads of one process. Two processes opening the
/// same directory are not coordinated and will corrupt each other's view.
pub struct EntryCache<K, V, M> {
    config: Config,
    values: LogStore<K, V>,
    metadata: MetadataStore<K, M>,
}

impl<K, V, M> EntryCache<K, V, M> {
    /// Open or create both logs under `config.data_dir`
    pub fn open(
        config: Config,
        key_codec: Arc<dyn Codec<K>>,
        value_codec: Arc<dyn Codec<V>>,
        metadata_codec: Arc<dyn Codec<M>>,
    ) -> Result<Self> {
        if config.values_path() == config.metadata_path() {
            return Err(CacheError::Config(format!(
                "values and metadata share one log file: {}",
                config.values_path().display()
            )));
        }
        fs::create_dir_all(&config.data_dir)?;

        let values = LogStore::open_with(
            config.values_path(),
            config.sync_strategy,
            Arc::clone(&key_codec),
            value_codec,
        )?;
        let metadata = MetadataStore::open_with(
            config.metadata_path(),
            config.sync_strategy,
            key_codec,
            metadata_codec,
        )?;

        debug!(
            data_dir = %config.data_dir.display(),
            values = values.len(),
            metadata = metadata.len(),
            "opened entry cache"
        );

        Ok(Self {
            config,
            values,
            metadata,
        })
    }

    pub fn new_entry(&self, key: K) -> Entry<K, V>
    where
        V: Default,
    {
        self.values.new_entry(key)
    }

    pub fn get_entry(&self, key: K) -> Result<Entry<K, V>> {
        self.values.get_entry(key)
    }

    pub fn set_entry(&self, entry: &Entry<K, V>) -> Result<()> {
        self.values.set_entry(entry)
    }

    /// Remove the value for `key` and compact the value log
    ///
    /// Metadata for the key is kept; the metadata log has no removal path.
    pub fn remove(&self, key: &K) -> Result<()> {
        self.values.remove(key)
    }

    /// Delete both logs
    pub fn clear(&self) -> Result<()> {
        self.values.clear()?;
        self.metadata.clear()
    }

    pub fn get_metadata(&self, key: &K) -> Result<M> {
        self.metadata.get_metadata(key)
    }

    pub fn set_metadata(&self, key: &K, metadata: &M) -> Result<()> {
        self.metadata.set_metadata(key, metadata)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn values(&self) -> &LogStore<K, V> {
        &self.values
    }

    pub fn metadata(&self) -> &MetadataStore<K, M> {
        &self.metadata
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }
}

impl<K, V, M> EntryCache<K, V, M>
where
    K: Serialize + DeserializeOwned + 'static,
    V: Serialize + DeserializeOwned + 'static,
    M: Serialize + DeserializeOwned + 'static,
{
    /// Open a cache that stores keys, values and metadata as JSON
    pub fn open_json(config: Config) -> Result<Self> {
        Self::open(
            config,
            Arc::new(JsonCodec::<K>::new()),
            Arc::new(JsonCodec::<V>::new()),
            Arc::new(JsonCodec::<M>::new()),
        )
    }
}

impl<K, V, M> Cache<K, V> for EntryCache<K, V, M> {
    fn get_entry(&self, key: K) -> Result<Entry<K, V>> {
        EntryCache::get_entry(self, key)
    }

    fn set_entry(&self, entry: &Entry<K, V>) -> Result<()> {
        EntryCache::set_entry(self, entry)
    }

    fn remove(&self, key: &K) -> Result<()> {
        EntryCache::remove(self, key)
    }

    fn clear(&self) -> Result<()> {
        EntryCache::clear(self)
    }
}

impl<K, V, M> MetadataCache<K, M> for EntryCache<K, V, M> {
    fn get_metadata(&self, key: &K) -> Result<M> {
        EntryCache::get_metadata(self, key)
    }

    fn set_metadata(&self, key: &K, metadata: &M) -> Result<()> {
        EntryCache::set_metadata(self, key, metadata)
    }
}
