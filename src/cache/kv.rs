//! cache/kv — операции над картой в памяти.
//!
//! - set/delete/clear: мутация, затем maybe_persist() (write-through → flush).
//! - get/contains_key/size/iter: только память, файл не читается.
//! - get/delete по отсутствующему ключу → KeyNotFound, без подстановок.

use std::collections::btree_map;

use crate::error::{CacheError, Result};
use crate::value::{check_depth, Value};

use super::core::SnapshotCache;

impl SnapshotCache {
    /// Insert or overwrite `key`.
    ///
    /// Under write-through the snapshot is flushed before returning. If that flush
    /// fails the new value stays in memory and the error is returned.
    ///
    /// A value nested deeper than [`MAX_DEPTH`](crate::value::MAX_DEPTH) is rejected
    /// with `Encode` before anything changes.
    pub fn set<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> Result<()> {
        let key = key.into();
        let value = value.into();
        check_depth(&key, &value)?;
        self.data.insert(key, value);
        self.maybe_persist()
    }

    pub fn get(&self, key: &str) -> Result<&Value> {
        self.data
            .get(key)
            .ok_or_else(|| CacheError::key_not_found(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Number of entries in memory (not on disk).
    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remove `key` and return its value.
    ///
    /// An absent key is `KeyNotFound` and nothing is flushed.
    pub fn delete(&mut self, key: &str) -> Result<Value> {
        let old = self
            .data
            .remove(key)
            .ok_or_else(|| CacheError::key_not_found(key))?;
        self.maybe_persist()?;
        Ok(old)
    }

    /// Remove every entry.
    pub fn clear(&mut self) -> Result<()> {
        self.data.clear();
        self.maybe_persist()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, String, Value> {
        self.data.keys()
    }

    /// Entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.data.iter()
    }
}

impl<'a> IntoIterator for &'a SnapshotCache {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
