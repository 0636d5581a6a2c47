//! Errors for the custodian-unit model.

use custody_primitives::types::{Amount, CuAddress};
use custody_store::StoreError;
use thiserror::Error;

/// Errors raised by custodian units and their keeper.
#[derive(Debug, Error)]
pub enum CuError {
    /// The public key does not hash to the unit's address.
    #[error("public key does not belong to {0}")]
    PubkeyMismatch(CuAddress),

    /// A different public key is already set.
    #[error("public key of {0} is already set")]
    PubkeyAlreadySet(CuAddress),

    /// The sequence must strictly increase.
    #[error("sequence must increase: current {current}, got {new}")]
    SequenceNotIncreasing {
        /// The stored sequence.
        current: u64,
        /// The rejected sequence.
        new: u64,
    },

    /// The operation only applies to operation custodian units.
    #[error("{0} is not an operation custodian unit")]
    NotOperation(CuAddress),

    /// The symbol of an operation custodian unit is immutable.
    #[error("symbol of {0} is already set")]
    SymbolAlreadySet(CuAddress),

    /// A symbol must not be empty.
    #[error("symbol must not be empty")]
    EmptySymbol,

    /// A different address is already bound to this asset slot.
    #[error("{symbol} address of epoch {epoch} is already set")]
    AssetAddressAlreadySet {
        /// The asset.
        symbol: String,
        /// The epoch of the slot.
        epoch: u64,
    },

    /// A different public key is already bound to this asset slot.
    #[error("{symbol} public key of epoch {epoch} is already set")]
    AssetPubkeyAlreadySet {
        /// The asset.
        symbol: String,
        /// The epoch of the slot.
        epoch: u64,
    },

    /// The available balance is too low.
    #[error("insufficient {symbol}: have {available}, need {required}")]
    InsufficientFunds {
        /// The token.
        symbol: String,
        /// What is available.
        available: Amount,
        /// What was requested.
        required: Amount,
    },

    /// The held balance is too low.
    #[error("insufficient held {symbol}: have {held}, need {required}")]
    InsufficientHold {
        /// The token.
        symbol: String,
        /// What is held.
        held: Amount,
        /// What was requested.
        required: Amount,
    },

    /// A balance would exceed the representable range.
    #[error("{0} balance overflow")]
    Overflow(String),

    /// The external address already belongs to another unit.
    #[error("{chain} address {address} is already bound to {owner}")]
    ExtAddressTaken {
        /// The external chain.
        chain: String,
        /// The external address.
        address: String,
        /// The unit that owns it.
        owner: CuAddress,
    },

    /// The state backend failed.
    #[error("store: {0}")]
    Store(#[from] StoreError),

    /// A state that correct handlers never produce.
    #[error("fault: {0}")]
    Fault(String),
}

/// Result type alias for custodian-unit operations.
pub type CuResult<T> = Result<T, CuError>;
