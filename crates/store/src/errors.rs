//! Errors raised by the state backends.

use custody_primitives::errors::CodecError;
use thiserror::Error;

/// Errors that can occur while reading or writing state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The sled backend failed.
    #[error("sled: {0}")]
    Sled(#[from] sled::Error),

    /// A stored value could not be encoded or decoded.
    #[error("codec: {0}")]
    Codec(#[from] CodecError),

    /// A key read back from the backend does not have the expected layout.
    #[error("malformed key {key}: {reason}")]
    MalformedKey {
        /// The hex-encoded key.
        key: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Result type alias for state operations.
pub type StoreResult<T> = Result<T, StoreError>;
