//! The contract of the external chain adapter.

use thiserror::Error;

/// Errors returned by a [`ChainAdapter`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainAdapterError {
    /// The adapter has no support for this chain.
    #[error("chain {0} is not supported")]
    UnsupportedChain(String),

    /// The public key cannot be turned into an address on this chain.
    #[error("invalid public key for chain {0}")]
    InvalidPubkey(String),

    /// The adapter could not be reached or answered with an error.
    #[error("chain adapter: {0}")]
    Rpc(String),
}

/// Derives chain-specific addresses from public keys.
///
/// Implementations are called during transaction execution and must be pure: the same `chain`
/// and `pubkey` must always produce the same address on every validator.
pub trait ChainAdapter {
    /// Converts a compressed secp256k1 public key into an address on `chain`.
    fn convert_address(&self, chain: &str, pubkey: &[u8]) -> Result<String, ChainAdapterError>;

    /// Returns true if the adapter knows how to handle `chain`.
    fn support_chain(&self, chain: &str) -> bool;
}

impl<T: ChainAdapter + ?Sized> ChainAdapter for &T {
    fn convert_address(&self, chain: &str, pubkey: &[u8]) -> Result<String, ChainAdapterError> {
        (**self).convert_address(chain, pubkey)
    }

    fn support_chain(&self, chain: &str) -> bool {
        (**self).support_chain(chain)
    }
}
