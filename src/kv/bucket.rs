//! Bucketed byte store backed by redb.
//!
//! One database file holds any number of named buckets (redb tables). Every
//! [`BucketStore`] handed out by a [`BucketDb`] shares the same database
//! handle, so logical caches such as "profile", "drive", "file" and "auth"
//! live side by side in a single file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use redb::{Database, TableDefinition};
use tracing::debug;

use super::KeyValueStore;
use crate::error::{CacheError, Result};

/// Handle on one bucket database file
///
/// Owned by whoever composes the application and passed to the caches that
/// need it; there is no process-wide registry of open databases.
#[derive(Clone)]
pub struct BucketDb {
    db: Arc<Database>,
    path: PathBuf,
}

impl BucketDb {
    /// Open (or create) the database file at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;
        debug!(path = %path.display(), "opened bucket database");

        Ok(Self {
            db: Arc::new(db),
            path: path.to_path_buf(),
        })
    }

    /// Store for the bucket `name`, creating the bucket if needed
    pub fn bucket(&self, name: &str) -> Result<BucketStore> {
        let store = BucketStore {
            db: Arc::clone(&self.db),
            name: name.to_string(),
        };

        // Create the table eagerly so later read txns don't fail
        let write_txn = self.db.begin_write()?;
        {
            let _t = write_txn.open_table(store.definition())?;
        }
        write_txn.commit()?;

        Ok(store)
    }

    /// Drop the bucket `name` and everything in it
    ///
    /// Returns whether the bucket existed. Existing [`BucketStore`] handles
    /// for it fail on their next read until the bucket is created again.
    pub fn delete_bucket(&self, name: &str) -> Result<bool> {
        let definition: TableDefinition<&[u8], &[u8]> = TableDefinition::new(name);
        let write_txn = self.db.begin_write()?;
        let existed = write_txn.delete_table(definition)?;
        write_txn.commit()?;
        Ok(existed)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One named bucket of a [`BucketDb`]
///
/// Each `set` and `delete` is its own committed write transaction.
#[derive(Clone)]
pub struct BucketStore {
    db: Arc<Database>,
    name: String,
}

impl BucketStore {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn definition(&self) -> TableDefinition<'_, &'static [u8], &'static [u8]> {
        TableDefinition::new(&self.name)
    }
}

impl KeyValueStore for BucketStore {
    fn get(&self, key: &[u8]) -> Result<Bytes> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(self.definition())?;
        let value = table.get(key)?;
        match value {
            Some(guard) => Ok(Bytes::copy_from_slice(guard.value())),
            None => Err(CacheError::NotFound),
        }
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(self.definition())?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(self.definition())?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
