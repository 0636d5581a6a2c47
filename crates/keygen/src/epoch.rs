//! Access to the validator-set generation.

use custody_primitives::{codec::Codec, epoch::Epoch};
use custody_store::{Context, Namespace};
use tracing::info;

use crate::{
    errors::{KeyGenError, KeyGenResult},
    hooks::EpochObserver,
};

/// The namespace owned by [`StoreEpochKeeper`].
pub const EPOCH_NAMESPACE: Namespace = Namespace::new(b"epoch/");

const CURRENT_EPOCH_KEY: &[u8] = &[0x01];
const EPOCH_PREFIX: u8 = 0x02;

/// Provides the current epoch.
pub trait EpochKeeper {
    /// Returns the epoch transactions currently execute in.
    fn current_epoch(&self, ctx: &Context<'_>) -> KeyGenResult<Epoch>;
}

impl<T: EpochKeeper + ?Sized> EpochKeeper for &T {
    fn current_epoch(&self, ctx: &Context<'_>) -> KeyGenResult<Epoch> {
        (**self).current_epoch(ctx)
    }
}

/// An [`EpochKeeper`] that reads epochs from state.
///
/// Registered as the first [`EpochObserver`], it records each new epoch before the keygen
/// protocol re-arms its orders.
#[derive(Debug, Clone, Copy)]
pub struct StoreEpochKeeper {
    ns: Namespace,
    codec: Codec,
}

impl StoreEpochKeeper {
    /// Creates a keeper in the default namespace.
    pub const fn new(codec: Codec) -> Self {
        Self {
            ns: EPOCH_NAMESPACE,
            codec,
        }
    }

    /// Records `epoch` and makes it current.
    pub fn set_current_epoch(&self, ctx: &mut Context<'_>, epoch: &Epoch) -> KeyGenResult<()> {
        ctx.set_value(self.ns, &self.codec, &epoch_key(epoch.index), epoch)?;
        ctx.set_value(self.ns, &self.codec, CURRENT_EPOCH_KEY, &epoch.index)?;

        info!(
            epoch = epoch.index,
            key_nodes = epoch.key_node_set.len(),
            migration_finished = epoch.migration_finished,
            "epoch recorded"
        );

        Ok(())
    }

    /// Gets, if recorded, the epoch with `index`.
    pub fn get_epoch(&self, ctx: &Context<'_>, index: u64) -> KeyGenResult<Option<Epoch>> {
        Ok(ctx.get_value(self.ns, &self.codec, &epoch_key(index))?)
    }
}

impl EpochKeeper for StoreEpochKeeper {
    fn current_epoch(&self, ctx: &Context<'_>) -> KeyGenResult<Epoch> {
        let index: u64 = ctx
            .get_value(self.ns, &self.codec, CURRENT_EPOCH_KEY)?
            .ok_or_else(|| KeyGenError::Fault("no current epoch".to_string()))?;

        self.get_epoch(ctx, index)?
            .ok_or_else(|| KeyGenError::Fault(format!("current epoch {index} is not recorded")))
    }
}

impl EpochObserver for StoreEpochKeeper {
    fn name(&self) -> &'static str {
        "epoch"
    }

    fn after_new_epoch(&self, ctx: &mut Context<'_>, epoch: &Epoch) -> KeyGenResult<()> {
        self.set_current_epoch(ctx, epoch)
    }
}

fn epoch_key(index: u64) -> Vec<u8> {
    let mut key = vec![EPOCH_PREFIX];
    key.extend_from_slice(&index.to_be_bytes());
    key
}
