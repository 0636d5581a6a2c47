//! This crate contains the consensus-critical parameters that dictate the behavior of the custody
//! state machine in a way that ensures that all validators come to a consensus on the state of
//! every custodian unit.

pub(crate) mod default;
pub mod errors;
pub mod keygen;
pub mod prelude;
pub mod tokens;

use serde::{Deserialize, Serialize};

use crate::{errors::ParamsError, keygen::KeyGenParams, tokens::TokenInfo};

/// The complete set of consensus parameters.
///
/// Every validator must run with an identical copy of these values, otherwise the deterministic
/// replay of keygen orders diverges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// The symbol of the chain's own token. Fees are denominated in it and no external address
    /// can be generated for it.
    pub native_symbol: String,

    /// Limits for the keygen protocol.
    pub keygen: KeyGenParams,

    /// The tokens that are supported for custody.
    pub tokens: Vec<TokenInfo>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            native_symbol: default::NATIVE_SYMBOL.to_string(),
            keygen: KeyGenParams::default(),
            tokens: default::tokens(),
        }
    }
}

impl Params {
    /// Checks the params for internal consistency.
    ///
    /// This must be called once after loading the params from disk.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.native_symbol.is_empty() {
            return Err(ParamsError::EmptySymbol);
        }

        self.keygen.validate()?;

        let mut seen = std::collections::BTreeSet::new();
        for token in &self.tokens {
            token.validate()?;

            if !seen.insert(token.symbol.as_str()) {
                return Err(ParamsError::DuplicateToken(token.symbol.clone()));
            }
        }

        for token in &self.tokens {
            if token.is_sub_token() && !seen.contains(token.chain.as_str()) {
                return Err(ParamsError::UnknownChain {
                    symbol: token.symbol.clone(),
                    chain: token.chain.clone(),
                });
            }
        }

        let native = self
            .tokens
            .iter()
            .find(|t| t.symbol == self.native_symbol)
            .ok_or_else(|| ParamsError::MissingNative(self.native_symbol.clone()))?;
        if !native.is_native {
            return Err(ParamsError::MissingNative(self.native_symbol.clone()));
        }

        Ok(())
    }

    /// Returns the token with the given symbol, if configured.
    pub fn token(&self, symbol: &str) -> Option<&TokenInfo> {
        self.tokens.iter().find(|t| t.symbol == symbol)
    }
}
