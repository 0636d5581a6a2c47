//! An in-process chain adapter.

use std::collections::BTreeSet;

use custody_primitives::chain::{ChainAdapter, ChainAdapterError};
use secp256k1::PublicKey;
use sha2::{Digest, Sha256};

/// Derives `<chain>:<hex of the first 20 bytes of sha256(pubkey)>` for the configured chains.
#[derive(Debug, Clone, Default)]
pub struct MockChainAdapter {
    chains: BTreeSet<String>,
    unreachable: bool,
}

impl MockChainAdapter {
    /// Creates an adapter that supports `chains`.
    pub fn new<'a>(chains: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            chains: chains.into_iter().map(str::to_string).collect(),
            unreachable: false,
        }
    }

    /// Creates an adapter whose every call fails as if the service were down.
    pub fn unreachable() -> Self {
        Self {
            chains: BTreeSet::new(),
            unreachable: true,
        }
    }

    /// Returns the address the adapter derives for `pubkey` on `chain`.
    pub fn expected_address(chain: &str, pubkey: &[u8]) -> String {
        let digest = Sha256::digest(pubkey);
        format!("{chain}:{}", hex::encode(&digest[..20]))
    }
}

impl ChainAdapter for MockChainAdapter {
    fn convert_address(&self, chain: &str, pubkey: &[u8]) -> Result<String, ChainAdapterError> {
        if self.unreachable {
            return Err(ChainAdapterError::Rpc("connection refused".to_string()));
        }

        if !self.chains.contains(chain) {
            return Err(ChainAdapterError::UnsupportedChain(chain.to_string()));
        }

        PublicKey::from_slice(pubkey)
            .map_err(|_| ChainAdapterError::InvalidPubkey(chain.to_string()))?;

        Ok(Self::expected_address(chain, pubkey))
    }

    fn support_chain(&self, chain: &str) -> bool {
        !self.unreachable && self.chains.contains(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::generated_pubkey;

    #[test]
    fn derives_for_supported_chains_only() {
        let adapter = MockChainAdapter::new(["eth", "btc"]);
        let pk = generated_pubkey(5);

        assert_eq!(
            adapter.convert_address("eth", &pk).unwrap(),
            MockChainAdapter::expected_address("eth", &pk)
        );
        assert!(adapter.convert_address("trx", &pk).is_err());
        assert!(adapter.convert_address("eth", &[1, 2]).is_err());
        assert!(!MockChainAdapter::unreachable().support_chain("eth"));
    }
}
