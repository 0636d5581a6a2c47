//! Offline address derivation.

use std::collections::BTreeSet;

use custody_primitives::chain::{ChainAdapter, ChainAdapterError};
use secp256k1::PublicKey;
use sha2::{Digest, Sha256};

/// Derives `<chain>:<hex of the first 20 bytes of sha256(pubkey)>` for the configured chains.
///
/// Replays only need addresses that are stable across runs, not ones that are valid on the
/// external chain.
#[derive(Debug, Clone, Default)]
pub(crate) struct DigestChainAdapter {
    chains: BTreeSet<String>,
}

impl DigestChainAdapter {
    pub(crate) fn new(chains: impl IntoIterator<Item = String>) -> Self {
        Self {
            chains: chains.into_iter().collect(),
        }
    }
}

impl ChainAdapter for DigestChainAdapter {
    fn convert_address(&self, chain: &str, pubkey: &[u8]) -> Result<String, ChainAdapterError> {
        if !self.support_chain(chain) {
            return Err(ChainAdapterError::UnsupportedChain(chain.to_string()));
        }

        PublicKey::from_slice(pubkey)
            .map_err(|_| ChainAdapterError::InvalidPubkey(chain.to_string()))?;

        let digest = Sha256::digest(pubkey);
        Ok(format!("{chain}:{}", hex::encode(&digest[..20])))
    }

    fn support_chain(&self, chain: &str) -> bool {
        self.chains.contains(chain)
    }
}
