//! Deterministic key material.

use custody_primitives::{
    secp::{pubkey_message, KeySig},
    types::CuAddress,
};
use secp256k1::{PublicKey, SecretKey, SECP256K1};

/// A validator key with its derived custodian-unit address.
#[derive(Debug, Clone, Copy)]
pub struct KeyNode {
    /// The secret key.
    pub secret_key: SecretKey,

    /// The public key.
    pub pubkey: PublicKey,

    /// The custodian-unit address of `pubkey`.
    pub address: CuAddress,
}

impl KeyNode {
    /// Endorses a generated public key.
    pub fn sign_pubkey(&self, generated: &[u8]) -> KeySig {
        KeySig {
            pubkey: self.pubkey,
            signature: SECP256K1.sign_ecdsa(&pubkey_message(generated), &self.secret_key),
        }
    }

    /// Produces the 65-byte recoverable signature a validator reports when a ceremony finishes.
    pub fn sign_recoverable(&self, generated: &[u8]) -> Vec<u8> {
        let (recid, compact) = SECP256K1
            .sign_ecdsa_recoverable(&pubkey_message(generated), &self.secret_key)
            .serialize_compact();

        let mut sig = compact.to_vec();
        sig.push(recid.to_i32() as u8);
        sig
    }
}

/// Returns the key node with seed `i`. The seed must be non-zero.
pub fn key_node(i: u8) -> KeyNode {
    let secret_key = SecretKey::from_slice(&[i; 32]).expect("non-zero seed is a valid key");
    let pubkey = secret_key.public_key(SECP256K1);

    KeyNode {
        secret_key,
        pubkey,
        address: CuAddress::from_pubkey(&pubkey),
    }
}

/// Returns the key nodes with seeds `1..=n`, sorted by address.
pub fn key_nodes(n: u8) -> Vec<KeyNode> {
    let mut nodes: Vec<_> = (1..=n).map(key_node).collect();
    nodes.sort_by_key(|node| node.address);
    nodes
}

/// Returns a compressed public key standing in for the output of a ceremony.
pub fn generated_pubkey(seed: u8) -> Vec<u8> {
    SecretKey::from_slice(&[seed; 32])
        .expect("non-zero seed is a valid key")
        .public_key(SECP256K1)
        .serialize()
        .to_vec()
}

#[cfg(test)]
mod tests {
    use custody_primitives::secp::{recover_signer, verify_key_sigs};

    use super::*;

    #[test]
    fn signatures_verify() {
        let generated = generated_pubkey(200);
        let nodes = key_nodes(3);
        let sigs: Vec<_> = nodes.iter().map(|n| n.sign_pubkey(&generated)).collect();

        let signers = verify_key_sigs(&generated, &sigs).unwrap();
        assert_eq!(signers.len(), 3);

        let recovered = recover_signer(&generated, &nodes[0].sign_recoverable(&generated)).unwrap();
        assert_eq!(recovered, nodes[0].pubkey);
    }
}
