//! Access to the token configuration.

use std::collections::BTreeMap;

use custody_params::prelude::{Params, TokenInfo};

/// Provides token configuration.
pub trait TokenKeeper {
    /// Returns the token with `symbol`, if configured.
    fn token(&self, symbol: &str) -> Option<TokenInfo>;

    /// Returns the symbol of the native token, in which fees are paid.
    fn native_symbol(&self) -> &str;

    /// Returns true if `symbol` is the native token.
    fn is_native(&self, symbol: &str) -> bool {
        self.token(symbol).is_some_and(|t| t.is_native)
    }
}

/// A [`TokenKeeper`] built from the consensus parameters.
#[derive(Debug, Clone)]
pub struct TokenTable {
    native_symbol: String,
    tokens: BTreeMap<String, TokenInfo>,
}

impl TokenTable {
    /// Builds the table from validated params.
    pub fn from_params(params: &Params) -> Self {
        Self {
            native_symbol: params.native_symbol.clone(),
            tokens: params
                .tokens
                .iter()
                .map(|t| (t.symbol.clone(), t.clone()))
                .collect(),
        }
    }
}

impl TokenKeeper for TokenTable {
    fn token(&self, symbol: &str) -> Option<TokenInfo> {
        self.tokens.get(symbol).cloned()
    }

    fn native_symbol(&self) -> &str {
        &self.native_symbol
    }
}
