//! Configuration for logcache
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Configuration for an [`EntryCache`](crate::cache::EntryCache)
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the cache files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── cache.log        (value log)
    ///     └── metadata.log     (metadata log)
    pub data_dir: PathBuf,

    /// File name of the value log inside `data_dir`
    pub values_file: String,

    /// File name of the metadata log inside `data_dir`
    pub metadata_file: String,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Whether appends are followed by an fsync
    pub sync_strategy: SyncStrategy,
}

/// Sync strategy for appends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Leave appends in the OS page cache. A crash may lose the last
    /// write or leave a truncated tail that fails the next open.
    #[default]
    Never,

    /// fsync after every append (safest, slowest)
    EveryWrite,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./logcache_data"),
            values_file: "cache.log".to_string(),
            metadata_file: "metadata.log".to_string(),
            sync_strategy: SyncStrategy::Never,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Full path of the value log
    pub fn values_path(&self) -> PathBuf {
        self.data_dir.join(&self.values_file)
    }

    /// Full path of the metadata log
    pub fn metadata_path(&self) -> PathBuf {
        self.data_dir.join(&self.metadata_file)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the value log file name
    pub fn values_file(mut self, name: impl Into<String>) -> Self {
        self.config.values_file = name.into();
        self
    }

    /// Set the metadata log file name
    pub fn metadata_file(mut self, name: impl Into<String>) -> Self {
        self.config.metadata_file = name.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
