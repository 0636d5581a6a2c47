//! The execution context handed to every keeper.

use custody_primitives::codec::Codec;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    cache::CacheStore, errors::StoreResult, namespace::Namespace, traits::KvStore,
};

/// Mutable access to state for the duration of one transaction or block hook.
///
/// Keepers are stateless: they own a [`Namespace`] and a [`Codec`] and receive the context on
/// every call. This lets a handler use several keepers against the same state without
/// overlapping borrows.
#[derive(Debug)]
pub struct Context<'a> {
    store: &'a mut dyn KvStore,
    block_height: u64,
}

impl<'a> Context<'a> {
    /// Creates a context over `store` at `block_height`.
    pub fn new(store: &'a mut dyn KvStore, block_height: u64) -> Self {
        Self {
            store,
            block_height,
        }
    }

    /// Returns the height of the block being executed.
    pub const fn block_height(&self) -> u64 {
        self.block_height
    }

    /// Opens a write overlay on top of this context's store.
    ///
    /// Build a new [`Context`] over the returned cache to execute a transaction, then commit the
    /// cache if it succeeded.
    pub fn branch(&mut self) -> CacheStore<'_, dyn KvStore + 'a> {
        CacheStore::new(&mut *self.store)
    }

    /// Gets the raw value stored under `key` in `ns`.
    pub fn get(&self, ns: Namespace, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.store.get(&ns.key(key))
    }

    /// Stores a raw value under `key` in `ns`.
    pub fn set(&mut self, ns: Namespace, key: &[u8], value: Vec<u8>) -> StoreResult<()> {
        self.store.set(&ns.key(key), value)
    }

    /// Removes `key` from `ns`.
    pub fn delete(&mut self, ns: Namespace, key: &[u8]) -> StoreResult<()> {
        self.store.delete(&ns.key(key))
    }

    /// Returns true if `key` exists in `ns`.
    pub fn has(&self, ns: Namespace, key: &[u8]) -> StoreResult<bool> {
        self.store.has(&ns.key(key))
    }

    /// Returns every entry of `ns` whose inner key starts with `prefix`. The returned keys have the
    /// namespace prefix removed.
    pub fn scan(&self, ns: Namespace, prefix: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        self.store
            .scan_prefix(&ns.key(prefix))?
            .into_iter()
            .map(|(k, v)| Ok((ns.strip(&k)?.to_vec(), v)))
            .collect()
    }

    /// Gets and decodes the value stored under `key` in `ns`.
    pub fn get_value<T: DeserializeOwned>(
        &self,
        ns: Namespace,
        codec: &Codec,
        key: &[u8],
    ) -> StoreResult<Option<T>> {
        self.get(ns, key)?
            .map(|bytes| codec.decode(&bytes))
            .transpose()
            .map_err(Into::into)
    }

    /// Encodes and stores `value` under `key` in `ns`.
    pub fn set_value<T: Serialize>(
        &mut self,
        ns: Namespace,
        codec: &Codec,
        key: &[u8],
        value: &T,
    ) -> StoreResult<()> {
        let bytes = codec.encode(value)?;
        self.set(ns, key, bytes)
    }
}
