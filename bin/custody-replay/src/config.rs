use std::path::PathBuf;

use custody_primitives::{epoch::Epoch, types::CuAddress};
use serde::{Deserialize, Serialize};

/// The configuration of a replay run.
///
/// Unlike the params, these values are local to the operator running the replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Config {
    /// The directory of the persistent state. The state lives in memory if unset.
    #[serde(default)]
    pub datadir: Option<PathBuf>,

    /// The external chains the address derivation supports.
    pub chains: Vec<String>,

    /// The state that exists before the first entry.
    pub genesis: Genesis,
}

/// Initial state written once into an empty store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Genesis {
    /// The first epoch.
    pub epoch: Epoch,

    /// Initial balances.
    #[serde(default)]
    pub balances: Vec<GenesisBalance>,

    /// Operation units that exist from the start.
    #[serde(default)]
    pub op_cus: Vec<GenesisOpCu>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct GenesisBalance {
    pub address: CuAddress,
    pub symbol: String,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct GenesisOpCu {
    pub address: CuAddress,
    pub symbol: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_config_parses() {
        let config: Config = toml::from_str(include_str!("../config.sample.toml")).unwrap();

        assert!(config.datadir.is_none());
        assert_eq!(config.chains, ["btc", "eth"]);
        assert_eq!(config.genesis.epoch.index, 1);
        assert_eq!(config.genesis.epoch.key_node_set.len(), 4);
        assert_eq!(config.genesis.balances.len(), 1);
        assert_eq!(config.genesis.op_cus[0].symbol, "btc");
    }
}
