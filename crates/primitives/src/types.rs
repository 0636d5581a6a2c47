//! Identity and amount types shared by the custody keepers.

use std::{fmt, str::FromStr};

use secp256k1::PublicKey;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::errors::AddressError;

/// An amount of some token in its smallest unit.
pub type Amount = u128;

/// Caller-supplied, globally unique identifier of an order.
pub type OrderId = String;

/// The length of a [`CuAddress`] in bytes.
pub const CU_ADDRESS_LEN: usize = 20;

/// The address of a custodian unit.
///
/// The address is derived from the owner's secp256k1 public key (first 20 bytes of the sha256 of
/// the compressed key) so that the key can be checked against the address the first time it is
/// revealed.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CuAddress([u8; CU_ADDRESS_LEN]);

impl CuAddress {
    /// Creates an address from raw bytes.
    pub const fn new(bytes: [u8; CU_ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Derives the address that belongs to `pubkey`.
    pub fn from_pubkey(pubkey: &PublicKey) -> Self {
        let digest = Sha256::digest(pubkey.serialize());
        let mut bytes = [0u8; CU_ADDRESS_LEN];
        bytes.copy_from_slice(&digest[..CU_ADDRESS_LEN]);

        Self(bytes)
    }

    /// Returns the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; CU_ADDRESS_LEN] {
        &self.0
    }

    /// Returns true for the all-zero address, which never belongs to a custodian unit.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl AsRef<[u8]> for CuAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for CuAddress {
    type Error = AddressError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; CU_ADDRESS_LEN] =
            bytes.try_into().map_err(|_| AddressError::InvalidLength {
                expected: CU_ADDRESS_LEN,
                actual: bytes.len(),
            })?;

        Ok(Self(array))
    }
}

impl FromStr for CuAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::try_from(bytes.as_slice())
    }
}

impl fmt::Display for CuAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for CuAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CuAddress({})", hex::encode(self.0))
    }
}

impl Serialize for CuAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for CuAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(de::Error::custom)
        } else {
            <[u8; CU_ADDRESS_LEN]>::deserialize(deserializer).map(Self)
        }
    }
}

/// The kind of a custodian unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CuType {
    /// An ordinary holder.
    User,

    /// A custody pool for exactly one symbol.
    Operation,
}

impl fmt::Display for CuType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CuType::User => write!(f, "user"),
            CuType::Operation => write!(f, "operation"),
        }
    }
}
