//! The interface every state backend implements.

use std::fmt::Debug;

use crate::errors::StoreResult;

/// An ordered key-value store.
///
/// Scans must return entries in ascending key order so that every validator iterates state the
/// same way.
pub trait KvStore: Debug {
    /// Gets, if present, the value stored under `key`.
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &[u8], value: Vec<u8>) -> StoreResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn delete(&mut self, key: &[u8]) -> StoreResult<()>;

    /// Returns every entry whose key starts with `prefix`, in ascending key order.
    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Returns true if a value is stored under `key`.
    fn has(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
