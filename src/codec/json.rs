//! JSON codec
//!
//! serde_json based codec for plain JSON-style values.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Deserializer, Serializer};
use crate::error::{CacheError, Result};

/// Codec storing values as JSON text
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonCodec")
    }
}

impl<T: Serialize> Serializer<T> for JsonCodec<T> {
    fn serialize(&self, value: &T) -> Result<Vec<u8>> {
        json_encode(value)
    }
}

impl<T: DeserializeOwned> Deserializer<T> for JsonCodec<T> {
    fn deserialize(&self, bytes: &[u8]) -> Result<T> {
        json_decode(bytes)
    }
}

/// Encode any serde value as JSON bytes
///
/// Usable directly as an encode closure for
/// [`ComposableCache`](crate::kv::ComposableCache).
pub fn json_encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CacheError::Encode(e.to_string()))
}

/// Decode JSON bytes into any owned serde value
pub fn json_decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| CacheError::Decode(e.to_string()))
}
