//! The new-epoch hook and the keygen protocol's reaction to it.

use std::fmt;

use custody_order::{OrderStatus, OrderType};
use custody_primitives::{chain::ChainAdapter, epoch::Epoch};
use custody_store::Context;
use tracing::{debug, info, warn};

use crate::{
    epoch::EpochKeeper,
    errors::{KeyGenError, KeyGenResult},
    keeper::KeyGenKeeper,
    tokens::TokenKeeper,
};

/// Reacts to the start of a new epoch.
pub trait EpochObserver {
    /// A short name used in logs.
    fn name(&self) -> &'static str;

    /// Called once, at the first block of `epoch`.
    fn after_new_epoch(&self, ctx: &mut Context<'_>, epoch: &Epoch) -> KeyGenResult<()>;
}

/// Observers that are notified of a new epoch in registration order.
#[derive(Default)]
pub struct EpochHooks<'a> {
    observers: Vec<&'a dyn EpochObserver>,
}

impl fmt::Debug for EpochHooks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.observers.iter().map(|o| o.name()))
            .finish()
    }
}

impl<'a> EpochHooks<'a> {
    /// Creates an empty set of hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer` after the ones already registered.
    pub fn register(&mut self, observer: &'a dyn EpochObserver) {
        self.observers.push(observer);
    }

    /// Builder form of [`Self::register`].
    pub fn with(mut self, observer: &'a dyn EpochObserver) -> Self {
        self.register(observer);
        self
    }

    /// Notifies every observer. Stops at the first error.
    pub fn after_new_epoch(&self, ctx: &mut Context<'_>, epoch: &Epoch) -> KeyGenResult<()> {
        for observer in &self.observers {
            debug!(observer = observer.name(), epoch = epoch.index, "running epoch hook");
            observer.after_new_epoch(ctx, epoch)?;
        }

        Ok(())
    }
}

impl<E, T, C> EpochObserver for KeyGenKeeper<E, T, C>
where
    E: EpochKeeper,
    T: TokenKeeper,
    C: ChainAdapter,
{
    fn name(&self) -> &'static str {
        "keygen"
    }

    /// Retires the wait-assign pool and re-arms every unfinished ceremony for the new key-node
    /// set.
    ///
    /// Pooled keys belong to the previous key nodes and are finished without a beneficiary.
    /// Processing orders with a beneficiary restart in `Begin` over the new key nodes, keeping
    /// their held fee. Pre-keygen orders still in flight are cancelled. If the new epoch has not
    /// finished migrating, every operation unit enters migration.
    fn after_new_epoch(&self, ctx: &mut Context<'_>, epoch: &Epoch) -> KeyGenResult<()> {
        let pooled = self.pool.drain(ctx)?;
        for id in &pooled {
            let mut order = self
                .orders
                .get_order(ctx, id)?
                .ok_or_else(|| KeyGenError::Fault(format!("pooled order {id} is missing")))?;

            order.set_status(OrderStatus::Finish);
            self.orders.set_order(ctx, &order)?;
        }

        let key_nodes = epoch.keygen_nodes();
        let threshold = epoch.keygen_threshold() as u64;
        let mut rearmed = 0usize;
        let mut cancelled = 0usize;

        for mut order in self.orders.get_process_orders(ctx, OrderType::KeyGen)? {
            if !matches!(order.status(), OrderStatus::Begin | OrderStatus::WaitSign) {
                continue;
            }

            let id = order.base.id.clone();
            let keygen = order
                .as_keygen_mut()
                .ok_or_else(|| KeyGenError::Fault(format!("order {id} is indexed as keygen")))?;

            if keygen.to.is_some() {
                keygen.key_nodes = key_nodes.clone();
                keygen.sign_threshold = threshold;
                keygen.epoch = epoch.index;
                keygen.pubkey.clear();
                order.set_status(OrderStatus::Begin);
                rearmed += 1;
            } else {
                order.set_status(OrderStatus::Cancel);
                cancelled += 1;
            }

            self.orders.set_order(ctx, &order)?;
        }

        if key_nodes.is_empty() && rearmed > 0 {
            warn!(epoch = epoch.index, rearmed, "re-armed orders have no key nodes");
        }

        let migrating = if epoch.migration_finished {
            0
        } else {
            self.cus.begin_op_cu_migration(ctx)?
        };

        info!(
            epoch = epoch.index,
            retired = pooled.len(),
            rearmed,
            cancelled,
            migrating,
            "keygen orders moved to new epoch"
        );

        Ok(())
    }
}
