//! Persistent state backend on top of sled.

use std::path::Path;

use tracing::info;

use crate::{errors::StoreResult, traits::KvStore};

/// The name of the sled tree that holds the custody state.
pub const STATE_TREE: &str = "custody-state";

/// A [`KvStore`] over a sled tree.
#[derive(Debug, Clone)]
pub struct SledStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledStore {
    /// Opens, creating if needed, the database in `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening sled database");

        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Creates a database that is removed when dropped.
    pub fn temporary() -> StoreResult<Self> {
        info!("creating an in-memory sled database");

        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> StoreResult<Self> {
        let tree = db.open_tree(STATE_TREE)?;
        Ok(Self { db, tree })
    }

    /// Flushes dirty pages to disk and returns the number of bytes written.
    pub fn flush(&self) -> StoreResult<usize> {
        Ok(self.db.flush()?)
    }
}

impl KvStore for SledStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.tree.get(key)?.map(|v| v.to_vec()))
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> StoreResult<()> {
        self.tree.insert(key, value)?;
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> StoreResult<()> {
        self.tree.remove(key)?;
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        self.tree
            .scan_prefix(prefix)
            .map(|entry| {
                let (k, v) = entry?;
                Ok((k.to_vec(), v.to_vec()))
            })
            .collect()
    }
}
