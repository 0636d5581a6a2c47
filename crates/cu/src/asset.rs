//! Per-chain asset slots of a custodian unit.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The address a custodian unit holds for one symbol (or chain) in one epoch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    /// The symbol or chain this slot belongs to.
    pub symbol: String,

    /// The epoch whose key nodes generated the key.
    pub epoch: u64,

    /// The chain address. Empty until bound.
    pub address: String,

    /// The compressed public key. Empty until bound.
    pub pubkey: Vec<u8>,

    /// The next nonce to use on the external chain.
    pub nonce: u64,
}

impl AssetInfo {
    pub(crate) fn new(symbol: &str, epoch: u64) -> Self {
        Self {
            symbol: symbol.to_string(),
            epoch,
            ..Default::default()
        }
    }
}

/// How far an operation custodian unit has moved its assets to the current epoch's keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationStatus {
    /// No migration has been observed.
    #[default]
    Unknown,

    /// A new epoch started and the unit needs a new key.
    Begin,

    /// A migration keygen order is in flight.
    KeyGenBegin,

    /// The new key is bound.
    KeyGenFinish,

    /// Assets were moved to the new key.
    Finish,
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MigrationStatus::Unknown => "unknown",
            MigrationStatus::Begin => "begin",
            MigrationStatus::KeyGenBegin => "keygen_begin",
            MigrationStatus::KeyGenFinish => "keygen_finish",
            MigrationStatus::Finish => "finish",
        };

        write!(f, "{name}")
    }
}
