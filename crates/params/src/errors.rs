//! Errors for the custody parameters.

use thiserror::Error;

/// Error while validating the consensus parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    /// A token or the native symbol is empty.
    #[error("symbol must not be empty")]
    EmptySymbol,

    /// The same token is configured twice.
    #[error("token {0} is configured more than once")]
    DuplicateToken(String),

    /// A sub-token references a chain that has no token of its own.
    #[error("token {symbol} lives on chain {chain} which is not configured")]
    UnknownChain {
        /// The sub-token.
        symbol: String,
        /// The missing chain.
        chain: String,
    },

    /// The native token is missing from the token list or not flagged as native.
    #[error("native token {0} is not configured as native")]
    MissingNative(String),

    /// A keygen limit is out of range.
    #[error("invalid keygen limit: {0}")]
    InvalidKeyGenLimit(String),
}
