//! Cache entries
//!
//! The unit exchanged between callers and the stores.

/// A key with its value
///
/// The key is fixed once the entry exists; the value can be replaced or
/// edited in place before handing the entry back to
/// [`Cache::set_entry`](crate::cache::Cache::set_entry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    /// Create an entry from a key and a value
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Replace the value, returning the previous one
    pub fn set_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V: Default> Entry<K, V> {
    /// Entry holding `key` and the default value of `V`
    pub fn empty(key: K) -> Self {
        Self::new(key, V::default())
    }
}
