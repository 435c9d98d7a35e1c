//! Pass-through codecs for byte and string keys.

use super::{Deserializer, Serializer};
use crate::error::{CacheError, Result};

/// Identity codec over `Vec<u8>`
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

impl Serializer<Vec<u8>> for RawCodec {
    fn serialize(&self, value: &Vec<u8>) -> Result<Vec<u8>> {
        Ok(value.clone())
    }
}

impl Deserializer<Vec<u8>> for RawCodec {
    fn deserialize(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        Ok(bytes.to_vec())
    }
}

/// UTF-8 codec over `String`
///
/// Unlike [`JsonCodec`](super::JsonCodec) the bytes on disk are the bare
/// string, without quotes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl Serializer<String> for StringCodec {
    fn serialize(&self, value: &String) -> Result<Vec<u8>> {
        Ok(value.as_bytes().to_vec())
    }
}

impl Deserializer<String> for StringCodec {
    fn deserialize(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| CacheError::Decode(e.to_string()))
    }
}
