//! Errors raised by the primitive types.

use thiserror::Error;

/// Errors while parsing a [`CuAddress`](crate::types::CuAddress).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The input is not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// The input has the wrong length.
    #[error("address must be {expected} bytes, got {actual}")]
    InvalidLength {
        /// The required length.
        expected: usize,
        /// The length that was supplied.
        actual: usize,
    },
}

/// Errors from key and signature handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The bytes are not a valid secp256k1 public key.
    #[error("invalid public key: {0}")]
    InvalidPubkey(secp256k1::Error),

    /// A signature failed to verify.
    #[error("signature by {0} does not verify")]
    BadSignature(String),

    /// The same key node signed more than once.
    #[error("duplicate signature by {0}")]
    DuplicateSigner(String),

    /// The recoverable signature is malformed or does not recover.
    #[error("signature does not recover a public key: {0}")]
    Unrecoverable(String),
}

/// Errors while encoding or decoding persisted values.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The underlying serializer failed.
    #[error("bincode: {0}")]
    Bincode(#[from] bincode::Error),
}
