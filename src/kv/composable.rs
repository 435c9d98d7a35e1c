//! Closure-driven cache over a byte store.

use super::KeyValueStore;
use crate::error::Result;

/// Cache whose key and value encodings are chosen per call
///
/// The store underneath only ever sees bytes. Each call brings its own
/// key encoder and value encoder or decoder, so values of different shapes
/// can share one backend:
///
/// ```no_run
/// use logcache::codec::{json_decode, json_encode};
/// use logcache::kv::{ComposableCache, MemoryStore};
///
/// let cache = ComposableCache::new(MemoryStore::new());
/// cache.set("alice", |k: &str| Ok(k.as_bytes().to_vec()), &42u32, json_encode::<u32>)?;
/// let n: u32 = cache.get("alice", |k: &str| Ok(k.as_bytes().to_vec()), json_decode)?;
/// # Ok::<(), logcache::CacheError>(())
/// ```
#[derive(Debug)]
pub struct ComposableCache<S> {
    store: S,
}

impl<S: KeyValueStore> ComposableCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Decode the value stored under the encoded `key`
    ///
    /// `NotFound` from the store and errors from either closure are
    /// returned unchanged.
    pub fn get<K, V, E, D>(&self, key: &K, encode_key: E, decode_value: D) -> Result<V>
    where
        K: ?Sized,
        E: FnOnce(&K) -> Result<Vec<u8>>,
        D: FnOnce(&[u8]) -> Result<V>,
    {
        let key_bytes = encode_key(key)?;
        let bytes = self.store.get(&key_bytes)?;
        decode_value(&bytes)
    }

    /// Encode `value` and store it under the encoded `key`
    pub fn set<K, V, E, F>(&self, key: &K, encode_key: E, value: &V, encode_value: F) -> Result<()>
    where
        K: ?Sized,
        V: ?Sized,
        E: FnOnce(&K) -> Result<Vec<u8>>,
        F: FnOnce(&V) -> Result<Vec<u8>>,
    {
        let key_bytes = encode_key(key)?;
        let value_bytes = encode_value(value)?;
        self.store.set(&key_bytes, &value_bytes)
    }

    pub fn delete<K, E>(&self, key: &K, encode_key: E) -> Result<()>
    where
        K: ?Sized,
        E: FnOnce(&K) -> Result<Vec<u8>>,
    {
        let key_bytes = encode_key(key)?;
        self.store.delete(&key_bytes)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}
