//! SECP256K1 primitives used to check the results of a key-generation ceremony.
//!
//! Two different checks exist and they prove different things:
//!
//! - [`verify_key_sigs`] proves that every key node of a ceremony endorses the generated public
//!   key. Each key node signs `sha256(pubkey)` with its own key.
//! - [`recover_signer`] only proves that *some* valid signature over `sha256(pubkey)` exists. It
//!   is used as a liveness receipt when a validator reports that the address binding finished.

use std::collections::BTreeSet;

use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId, Signature},
    Message, PublicKey, SECP256K1,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{errors::CryptoError, types::CuAddress};

/// Length of a compact recoverable signature: 64 bytes of `r || s` followed by the recovery id.
pub const RECOVERABLE_SIG_LEN: usize = 65;

/// A key node's endorsement of a generated public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySig {
    /// The key node's own public key.
    pub pubkey: PublicKey,

    /// ECDSA signature over `sha256(generated pubkey)`.
    pub signature: Signature,
}

impl KeySig {
    /// Returns the address of the key node that produced this signature.
    pub fn signer(&self) -> CuAddress {
        CuAddress::from_pubkey(&self.pubkey)
    }
}

/// Parses a public key in either compressed or uncompressed form and returns its compressed
/// serialization.
///
/// Normalizing here keeps the stored key, and therefore every derived address, identical on all
/// validators regardless of how the key nodes encoded it.
pub fn normalize_pubkey(bytes: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let pubkey = PublicKey::from_slice(bytes).map_err(CryptoError::InvalidPubkey)?;
    Ok(pubkey.serialize().to_vec())
}

/// Returns the message that key nodes sign for a generated public key.
pub fn pubkey_message(pubkey: &[u8]) -> Message {
    let digest: [u8; 32] = Sha256::digest(pubkey).into();
    Message::from_digest(digest)
}

/// Verifies every signature in `sigs` over `pubkey` and returns the set of signers.
///
/// A duplicate signer is an error so that the returned set has exactly one entry per signature.
pub fn verify_key_sigs(pubkey: &[u8], sigs: &[KeySig]) -> Result<BTreeSet<CuAddress>, CryptoError> {
    let msg = pubkey_message(pubkey);
    let mut signers = BTreeSet::new();

    for sig in sigs {
        let signer = sig.signer();

        SECP256K1
            .verify_ecdsa(&msg, &sig.signature, &sig.pubkey)
            .map_err(|_| CryptoError::BadSignature(signer.to_string()))?;

        if !signers.insert(signer) {
            return Err(CryptoError::DuplicateSigner(signer.to_string()));
        }
    }

    Ok(signers)
}

/// Recovers the public key that produced `signature` over `sha256(pubkey)`.
pub fn recover_signer(pubkey: &[u8], signature: &[u8]) -> Result<PublicKey, CryptoError> {
    if signature.len() != RECOVERABLE_SIG_LEN {
        return Err(CryptoError::Unrecoverable(format!(
            "expected {RECOVERABLE_SIG_LEN} bytes, got {}",
            signature.len()
        )));
    }

    let recid = RecoveryId::from_i32(i32::from(signature[64]))
        .map_err(|e| CryptoError::Unrecoverable(e.to_string()))?;
    let sig = RecoverableSignature::from_compact(&signature[..64], recid)
        .map_err(|e| CryptoError::Unrecoverable(e.to_string()))?;

    SECP256K1
        .recover_ecdsa(&pubkey_message(pubkey), &sig)
        .map_err(|e| CryptoError::Unrecoverable(e.to_string()))
}
