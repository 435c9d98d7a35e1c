//! Codec Module
//!
//! Byte codecs for cache keys and values.
//!
//! ## Responsibilities
//! - Turn a key or value into the bytes stored in a record
//! - Turn stored bytes back into a typed value
//! - Stay pluggable per key type and per value type, so one engine can hold
//!   plain JSON values next to compact binary or polymorphic payloads
//!
//! Codecs are shared between stores through `Arc<dyn Codec<T>>`: the value
//! log and the metadata log of one cache use the same key codec, which is
//! what makes their indexes line up.

mod binary;
mod json;
mod raw;

use crate::error::Result;

pub use binary::BincodeCodec;
pub use json::{json_decode, json_encode, JsonCodec};
pub use raw::{RawCodec, StringCodec};

/// Encodes a value of type `T` into bytes
pub trait Serializer<T: ?Sized>: Send + Sync {
    /// Fails with [`CacheError::Encode`](crate::CacheError::Encode) on
    /// values the codec cannot represent.
    fn serialize(&self, value: &T) -> Result<Vec<u8>>;
}

/// Decodes bytes back into a value of type `T`
pub trait Deserializer<T>: Send + Sync {
    /// Fails with [`CacheError::Decode`](crate::CacheError::Decode) on
    /// malformed input.
    fn deserialize(&self, bytes: &[u8]) -> Result<T>;
}

/// A bidirectional codec
pub trait Codec<T>: Serializer<T> + Deserializer<T> {}

impl<T, C> Codec<T> for C where C: Serializer<T> + Deserializer<T> {}
