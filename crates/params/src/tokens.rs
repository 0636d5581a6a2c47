//! Token configuration.

use serde::{Deserialize, Serialize};

use crate::errors::ParamsError;

/// A token that the custody state machine can open addresses for.
///
/// A token whose `chain` differs from its `symbol` is a sub-token: it lives on the chain named by
/// `chain` and shares that chain's address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenInfo {
    /// The token symbol, e.g. `usdt`.
    pub symbol: String,

    /// The chain the token lives on, e.g. `eth`.
    pub chain: String,

    /// Whether this is the chain's own token.
    pub is_native: bool,

    /// The fee, in the native token, charged to a user custodian unit for a fresh address.
    pub open_fee: u64,

    /// The fee, in the native token, charged for an operation custodian unit's fresh address.
    pub sys_open_fee: u64,

    /// The maximum number of operation custodian units for this symbol.
    pub max_op_cu_number: u64,
}

impl TokenInfo {
    /// Returns true if the token lives on another token's chain.
    pub fn is_sub_token(&self) -> bool {
        self.symbol != self.chain
    }

    pub(crate) fn validate(&self) -> Result<(), ParamsError> {
        if self.symbol.is_empty() || self.chain.is_empty() {
            return Err(ParamsError::EmptySymbol);
        }

        Ok(())
    }
}
