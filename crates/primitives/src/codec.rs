//! Deterministic encoding of persisted values.
//!
//! There is no global codec: a [`Codec`] value is built once at start-up and handed to every
//! keeper that persists state.

use bincode::Options;
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::CodecError;

/// The default upper bound for a single encoded value.
pub const DEFAULT_MAX_ENCODED_LEN: u64 = 4 * 1024 * 1024;

/// Encodes and decodes persisted values with a fixed-width, trailing-byte-rejecting bincode
/// configuration so that the same value always has the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    max_len: u64,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENCODED_LEN)
    }
}

impl Codec {
    /// Creates a codec that refuses values larger than `max_len` bytes.
    pub const fn new(max_len: u64) -> Self {
        Self { max_len }
    }

    fn options(&self) -> impl Options {
        bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .reject_trailing_bytes()
            .with_limit(self.max_len)
    }

    /// Encodes `value`.
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        Ok(self.options().serialize(value)?)
    }

    /// Decodes a value previously produced by [`Self::encode`].
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        Ok(self.options().deserialize(bytes)?)
    }
}
