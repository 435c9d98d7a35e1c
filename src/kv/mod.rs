//! Key-Value Store Module
//!
//! Byte-oriented storage behind the same cache semantics as the typed logs.
//!
//! ## Responsibilities
//! - A minimal `get`/`set`/`delete` contract over raw bytes
//! - Interchangeable backends: an in-memory map, or named buckets inside
//!   one embedded database file
//! - A wrapper that takes encode/decode closures per call, so one backend
//!   can hold values of many shapes without generic parameters on the store

mod bucket;
mod composable;
mod memory;

use std::sync::Arc;

use bytes::Bytes;

use crate::error::Result;

pub use bucket::{BucketDb, BucketStore};
pub use composable::ComposableCache;
pub use memory::MemoryStore;

/// Raw byte store
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, or [`CacheError::NotFound`](crate::CacheError::NotFound)
    fn get(&self, key: &[u8]) -> Result<Bytes>;

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Delete `key`; deleting a missing key succeeds
    fn delete(&self, key: &[u8]) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &[u8]) -> Result<Bytes> {
        (**self).get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        (**self).delete(key)
    }
}
