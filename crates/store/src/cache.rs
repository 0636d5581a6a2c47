//! A write overlay that makes a transaction all-or-nothing.

use std::{collections::BTreeMap, fmt};

use tracing::debug;

use crate::{errors::StoreResult, traits::KvStore};

/// Buffers writes on top of a parent store.
///
/// Reads see the buffered writes first and fall through to the parent. Nothing reaches the parent
/// until [`CacheStore::commit`] is called; dropping the cache discards every write.
pub struct CacheStore<'a, S: KvStore + ?Sized> {
    parent: &'a mut S,

    /// Buffered writes. `None` marks a deletion.
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<S: KvStore + ?Sized> fmt::Debug for CacheStore<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("parent", &self.parent)
            .field("pending", &self.writes.len())
            .finish()
    }
}

impl<'a, S: KvStore + ?Sized> CacheStore<'a, S> {
    /// Creates an empty overlay on top of `parent`.
    pub fn new(parent: &'a mut S) -> Self {
        Self {
            parent,
            writes: BTreeMap::new(),
        }
    }

    /// Returns the number of buffered writes.
    pub fn pending(&self) -> usize {
        self.writes.len()
    }

    /// Flushes every buffered write into the parent store.
    pub fn commit(self) -> StoreResult<()> {
        debug!(writes = self.writes.len(), "committing cache");

        for (key, value) in self.writes {
            match value {
                Some(value) => self.parent.set(&key, value)?,
                None => self.parent.delete(&key)?,
            }
        }

        Ok(())
    }
}

impl<S: KvStore + ?Sized> KvStore for CacheStore<'_, S> {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        match self.writes.get(key) {
            Some(value) => Ok(value.clone()),
            None => self.parent.get(key),
        }
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> StoreResult<()> {
        self.writes.insert(key.to_vec(), Some(value));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> StoreResult<()> {
        self.writes.insert(key.to_vec(), None);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.scan_prefix(prefix)?.into_iter().collect();

        for (key, value) in self
            .writes
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
        {
            match value {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }

        Ok(merged.into_iter().collect())
    }
}
