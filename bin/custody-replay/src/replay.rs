//! Applies replay entries to a store.

use anyhow::{bail, Context as _};
use custody_keygen::{
    EpochHooks, EpochKeeper, KeyGenHandler, KeyGenKeeper, Msg, StoreEpochKeeper, TokenTable,
};
use custody_params::Params;
use custody_primitives::{codec::Codec, epoch::Epoch, types::CuAddress};
use custody_receipt::{get_receipt_from_result, Receipt};
use custody_store::{Context, KvStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{adapter::DigestChainAdapter, config::Genesis};

pub(crate) type ReplayHandler = KeyGenHandler<StoreEpochKeeper, TokenTable, DigestChainAdapter>;

/// One line of the replay input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum Entry {
    /// A signed keygen transaction.
    Tx {
        height: u64,
        signer: CuAddress,
        msg: Msg,
    },

    /// The first block of a new epoch.
    NewEpoch { height: u64, epoch: Epoch },
}

impl Entry {
    const fn height(&self) -> u64 {
        match self {
            Entry::Tx { height, .. } | Entry::NewEpoch { height, .. } => *height,
        }
    }
}

/// What happened to one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum Outcome {
    Tx {
        height: u64,
        code: u32,
        codespace: String,
        log: String,
        receipt: Option<Receipt>,
    },
    NewEpoch {
        height: u64,
        epoch: u64,
    },
}

/// Replays entries in order, the way a validator executes blocks.
#[derive(Debug)]
pub(crate) struct Replayer {
    handler: ReplayHandler,
    epochs: StoreEpochKeeper,
    codec: Codec,
    height: u64,
}

impl Replayer {
    pub(crate) fn new(params: &Params, chains: &[String]) -> Self {
        let codec = Codec::default();
        let epochs = StoreEpochKeeper::new(codec);
        let keeper = KeyGenKeeper::new(
            codec,
            params.keygen,
            epochs,
            TokenTable::from_params(params),
            DigestChainAdapter::new(chains.iter().cloned()),
        );

        Self {
            handler: KeyGenHandler::new(keeper, codec),
            epochs,
            codec,
            height: 0,
        }
    }

    /// Writes `genesis` unless the store already holds its epoch.
    ///
    /// Returns whether anything was written.
    pub(crate) fn apply_genesis(
        &mut self,
        store: &mut dyn KvStore,
        genesis: &Genesis,
    ) -> anyhow::Result<bool> {
        let height = genesis.epoch.start_height;
        let mut ctx = Context::new(store, height);

        if let Ok(current) = self.epochs.current_epoch(&ctx) {
            info!(epoch = current.index, "store already initialized, skipping genesis");
            self.height = current.start_height;
            return Ok(false);
        }

        let keeper = self.handler.keeper();
        let mut cache = ctx.branch();
        {
            let mut genesis_ctx = Context::new(&mut cache, height);

            self.epochs
                .set_current_epoch(&mut genesis_ctx, &genesis.epoch)
                .context("failed to record the genesis epoch")?;

            for balance in &genesis.balances {
                keeper
                    .bank()
                    .add_coin(
                        &mut genesis_ctx,
                        &balance.address,
                        &balance.symbol,
                        balance.amount.into(),
                    )
                    .with_context(|| format!("failed to fund {}", balance.address))?;
            }

            for op_cu in &genesis.op_cus {
                let created = keeper.cus().new_op_cu_with_address(
                    &mut genesis_ctx,
                    &op_cu.symbol,
                    &op_cu.address,
                )?;
                if created.is_none() {
                    bail!("cannot create operation unit {}", op_cu.address);
                }
            }
        }
        let writes = cache.pending();
        cache.commit()?;

        self.height = height;
        info!(
            epoch = genesis.epoch.index,
            balances = genesis.balances.len(),
            op_cus = genesis.op_cus.len(),
            %writes,
            "genesis applied"
        );

        Ok(true)
    }

    /// Applies one entry.
    ///
    /// A rejected transaction is a normal outcome. An error means the state can no longer be
    /// trusted and the replay must stop.
    pub(crate) fn apply(
        &mut self,
        store: &mut dyn KvStore,
        entry: &Entry,
    ) -> anyhow::Result<Outcome> {
        let height = entry.height();
        if height < self.height {
            bail!("entry at height {height} precedes height {}", self.height);
        }
        self.height = height;

        match entry {
            Entry::Tx { signer, msg, .. } => {
                let mut ctx = Context::new(store, height);
                let result = self.handler.handle(&mut ctx, signer, msg);

                let receipt = if result.is_ok() {
                    Some(get_receipt_from_result(&self.codec, &result)?)
                } else {
                    debug!(%height, code = result.code, "transaction rejected");
                    None
                };

                Ok(Outcome::Tx {
                    height,
                    code: result.code,
                    codespace: result.codespace,
                    log: result.log,
                    receipt,
                })
            }
            Entry::NewEpoch { epoch, .. } => {
                let mut ctx = Context::new(store, height);
                let current = self.epochs.current_epoch(&ctx)?;
                if epoch.index <= current.index {
                    warn!(
                        current = current.index,
                        new = epoch.index,
                        "new epoch does not advance the index"
                    );
                }

                let mut cache = ctx.branch();
                {
                    let mut hook_ctx = Context::new(&mut cache, height);
                    EpochHooks::new()
                        .with(&self.epochs)
                        .with(self.handler.keeper())
                        .after_new_epoch(&mut hook_ctx, epoch)
                        .with_context(|| format!("epoch {} hooks failed", epoch.index))?;
                }
                cache.commit()?;

                Ok(Outcome::NewEpoch {
                    height,
                    epoch: epoch.index,
                })
            }
        }
    }

    #[cfg(test)]
    pub(crate) const fn handler(&self) -> &ReplayHandler {
        &self.handler
    }
}

#[cfg(test)]
mod tests {
    use custody_receipt::Category;
    use custody_store::{MemStore, SledStore};

    use super::*;
    use crate::config::Config;

    fn sample_config() -> Config {
        toml::from_str(include_str!("../config.sample.toml")).unwrap()
    }

    fn sample_entries() -> Vec<Entry> {
        include_str!("../txs.sample.jsonl")
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_sample_replay() {
        let config = sample_config();
        let mut store = MemStore::new();
        let mut replayer = Replayer::new(&Params::default(), &config.chains);

        assert!(replayer.apply_genesis(&mut store, &config.genesis).unwrap());

        let outcomes: Vec<_> = sample_entries()
            .iter()
            .map(|entry| replayer.apply(&mut store, entry).unwrap())
            .collect();

        let Outcome::Tx { code, receipt, .. } = &outcomes[0] else {
            panic!("expected a transaction outcome");
        };
        assert_eq!(*code, 0);
        assert_eq!(receipt.as_ref().unwrap().category, Category::KeyGen);

        // one ceremony per unit at a time
        let Outcome::Tx { code, receipt, .. } = &outcomes[1] else {
            panic!("expected a transaction outcome");
        };
        assert_ne!(*code, 0);
        assert!(receipt.is_none());

        assert_eq!(
            outcomes[2],
            Outcome::NewEpoch {
                height: 4,
                epoch: 2
            }
        );

        let ctx = Context::new(&mut store, 5);
        let order = replayer
            .handler()
            .keeper()
            .orders()
            .get_order(&ctx, "order-1")
            .unwrap()
            .unwrap();
        let epoch = replayer.epochs.current_epoch(&ctx).unwrap();
        assert_eq!(epoch.index, 2);
        assert_eq!(order.as_keygen().unwrap().key_nodes, epoch.key_node_set);
    }

    #[test]
    fn test_genesis_is_written_once() {
        let config = sample_config();
        let dir = tempfile::tempdir().unwrap();

        {
            let mut store = SledStore::open(dir.path()).unwrap();
            let mut replayer = Replayer::new(&Params::default(), &config.chains);
            assert!(replayer.apply_genesis(&mut store, &config.genesis).unwrap());
            store.flush().unwrap();
        }

        let mut store = SledStore::open(dir.path()).unwrap();
        let mut replayer = Replayer::new(&Params::default(), &config.chains);
        assert!(!replayer.apply_genesis(&mut store, &config.genesis).unwrap());

        let funded = config.genesis.balances[0].address;
        let ctx = Context::new(&mut store, 2);
        assert_eq!(
            replayer
                .handler()
                .keeper()
                .bank()
                .get_balance(&ctx, &funded, "hbc")
                .unwrap(),
            1_000_000_000
        );
    }

    #[test]
    fn test_heights_must_not_go_back() {
        let config = sample_config();
        let mut store = MemStore::new();
        let mut replayer = Replayer::new(&Params::default(), &config.chains);
        replayer.apply_genesis(&mut store, &config.genesis).unwrap();

        let entries = sample_entries();
        replayer.apply(&mut store, &entries[1]).unwrap();

        assert!(replayer.apply(&mut store, &entries[0]).is_err());
    }
}
