//! Metadata Module
//!
//! Auxiliary per-key data (an ETag, a fetch time, ...) kept apart from the
//! cached value so it can change without re-encoding the value.
//!
//! The metadata log uses the same record format and append discipline as
//! the value log but its own file and its own index. Nothing ties the two
//! together: a key can have metadata without a value and vice versa.
//!
//! There is no removal and no compaction here. The file only grows, which
//! is acceptable for data that changes rarely; `clear` is the only way to
//! reclaim space.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{Codec, JsonCodec};
use crate::config::SyncStrategy;
use crate::error::Result;
use crate::log::{LogFile, LogStats};

/// Append-only `K → M` metadata log
pub struct MetadataStore<K, M> {
    log: LogFile,
    key_codec: Arc<dyn Codec<K>>,
    metadata_codec: Arc<dyn Codec<M>>,
}

impl<K, M> MetadataStore<K, M> {
    /// Open or create the metadata log at `path`
    pub fn open(
        path: impl AsRef<Path>,
        key_codec: Arc<dyn Codec<K>>,
        metadata_codec: Arc<dyn Codec<M>>,
    ) -> Result<Self> {
        Self::open_with(path, SyncStrategy::Never, key_codec, metadata_codec)
    }

    pub fn open_with(
        path: impl AsRef<Path>,
        sync_strategy: SyncStrategy,
        key_codec: Arc<dyn Codec<K>>,
        metadata_codec: Arc<dyn Codec<M>>,
    ) -> Result<Self> {
        let log = LogFile::open(path.as_ref(), sync_strategy)?;
        Ok(Self {
            log,
            key_codec,
            metadata_codec,
        })
    }

    /// Latest metadata recorded for `key`, or `NotFound`
    pub fn get_metadata(&self, key: &K) -> Result<M> {
        let key_bytes = self.key_codec.serialize(key)?;
        let bytes = self.log.read(&key_bytes)?;
        self.metadata_codec.deserialize(&bytes)
    }

    /// Append `metadata` as the latest record for `key`
    pub fn set_metadata(&self, key: &K, metadata: &M) -> Result<()> {
        let key_bytes = self.key_codec.serialize(key)?;
        let bytes = self.metadata_codec.serialize(metadata)?;
        self.log.append(&key_bytes, &bytes)
    }

    /// Delete the metadata file and every key
    pub fn clear(&self) -> Result<()> {
        self.log.clear()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> Result<LogStats> {
        self.log.stats()
    }

    pub fn path(&self) -> &Path {
        self.log.path()
    }
}

impl<K, M> MetadataStore<K, M>
where
    K: Serialize + DeserializeOwned + 'static,
    M: Serialize + DeserializeOwned + 'static,
{
    /// Open a metadata log that keeps keys and metadata as JSON
    pub fn open_json(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(
            path,
            Arc::new(JsonCodec::<K>::new()),
            Arc::new(JsonCodec::<M>::new()),
        )
    }
}
