//! Keeper-owned key spaces.

use crate::errors::{StoreError, StoreResult};

/// The key prefix owned by one keeper.
///
/// Namespaces partition the shared store: a keeper only ever reads and writes keys that start with
/// its own prefix, so two keepers may use the same inner key layout without clashing. No prefix
/// may be a prefix of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace(&'static [u8]);

impl Namespace {
    /// Creates a namespace with the given prefix.
    pub const fn new(prefix: &'static [u8]) -> Self {
        Self(prefix)
    }

    /// Returns the prefix.
    pub const fn prefix(&self) -> &'static [u8] {
        self.0
    }

    /// Returns the full store key for `inner`.
    pub fn key(&self, inner: &[u8]) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.0.len() + inner.len());
        key.extend_from_slice(self.0);
        key.extend_from_slice(inner);
        key
    }

    /// Removes the namespace prefix from a full store key.
    pub fn strip<'k>(&self, key: &'k [u8]) -> StoreResult<&'k [u8]> {
        key.strip_prefix(self.0)
            .ok_or_else(|| StoreError::MalformedKey {
                key: hex_string(key),
                reason: format!("missing namespace prefix {}", hex_string(self.0)),
            })
    }
}

pub(crate) fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
