//! In-memory state backend.

use std::collections::BTreeMap;

use crate::{errors::StoreResult, traits::KvStore};

/// A [`KvStore`] over an ordered map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemStore {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> StoreResult<()> {
        self.entries.insert(key.to_vec(), value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        Ok(self
            .entries
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn scan_prefix_is_bounded() {
        let mut store = MemStore::new();
        store.set(b"a\x01", vec![1]).unwrap();
        store.set(b"a\x02", vec![2]).unwrap();
        store.set(b"b\x01", vec![3]).unwrap();

        let found = store.scan_prefix(b"a").unwrap();

        assert_eq!(
            found,
            vec![(b"a\x01".to_vec(), vec![1]), (b"a\x02".to_vec(), vec![2])]
        );
        assert!(store.has(b"b\x01").unwrap());

        store.delete(b"b\x01").unwrap();
        assert!(!store.has(b"b\x01").unwrap());
        assert_eq!(store.len(), 2);
    }

    proptest! {
        #[test]
        fn scan_is_sorted(keys in proptest::collection::btree_set(any::<Vec<u8>>(), 0..32)) {
            let mut store = MemStore::new();
            for key in keys.iter().rev() {
                store.set(key, vec![]).unwrap();
            }

            let scanned: Vec<_> = store
                .scan_prefix(&[])
                .unwrap()
                .into_iter()
                .map(|(k, _)| k)
                .collect();
            let expected: Vec<_> = keys.into_iter().collect();

            prop_assert_eq!(scanned, expected);
        }
    }
}
