//! In-memory byte store.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::Mutex;

use super::KeyValueStore;
use crate::error::{CacheError, Result};

/// `HashMap` behind a mutex; contents are lost when the store is dropped
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<Vec<u8>, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Bytes> {
        self.data
            .lock()
            .get(key)
            .cloned()
            .ok_or(CacheError::NotFound)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.data
            .lock()
            .insert(key.to_vec(), Bytes::copy_from_slice(value));
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.data.lock().remove(key);
        Ok(())
    }
}
