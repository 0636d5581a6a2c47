use std::collections::BTreeSet;

use custody_cu::MigrationStatus;
use custody_order::{Order, OrderKeyGen, OrderKind};
use custody_primitives::{chain::ChainAdapter, epoch::sign_threshold, types::CuAddress};
use custody_receipt::{Category, Flow, KeyGenFlow, Receipt};
use custody_store::Context;
use tracing::{debug, info};

use crate::{
    epoch::EpochKeeper,
    errors::{KeyGenError, KeyGenResult},
    keeper::{check_signer, order_flow, KeyGenKeeper},
    msgs::MsgOpcuMigrationKeyGen,
    tokens::TokenKeeper,
};

impl<E, T, C> KeyGenKeeper<E, T, C>
where
    E: EpochKeeper,
    T: TokenKeeper,
    C: ChainAdapter,
{
    /// Starts one ceremony per operation unit while the current epoch's migration is in
    /// progress.
    ///
    /// Order IDs are matched to units ordered by symbol, then address. Units that already have a processing
    /// order or an address in the current epoch are skipped and their order ID goes unused.
    pub fn opcu_migration_key_gen(
        &self,
        ctx: &mut Context<'_>,
        signer: &CuAddress,
        msg: &MsgOpcuMigrationKeyGen,
    ) -> KeyGenResult<Receipt> {
        check_signer(&msg.from, signer)?;

        let epoch = self.epochs.current_epoch(ctx)?;
        if !epoch.is_key_node(&msg.from) {
            return Err(KeyGenError::NotKeyNode(msg.from));
        }

        if epoch.migration_finished {
            return Err(KeyGenError::MigrationFinished(epoch.index));
        }

        let op_cus = self.cus.get_op_cus(ctx, "")?;
        if op_cus.len() != msg.order_ids.len() {
            return Err(KeyGenError::OpCuCountMismatch {
                expected: op_cus.len(),
                actual: msg.order_ids.len(),
            });
        }

        let mut seen = BTreeSet::new();
        for id in &msg.order_ids {
            if !seen.insert(id.as_str()) {
                return Err(KeyGenError::DuplicateOrderId(id.clone()));
            }
            self.ensure_new_order_id(ctx, id)?;
        }

        let key_nodes = epoch.keygen_nodes();
        if key_nodes.is_empty() {
            return Err(KeyGenError::NoKeyNodes);
        }
        let threshold = sign_threshold(key_nodes.len()) as u64;

        let mut flows = Vec::new();
        for (mut cu, id) in op_cus.into_iter().zip(&msg.order_ids) {
            let addr = cu.address();

            if let Some(order_id) = self.processing_keygen_for(ctx, &addr)? {
                debug!(cu = %addr, %order_id, "operation unit already has a processing order");
                continue;
            }

            if cu.get_asset_address(cu.symbol(), epoch.index).is_some() {
                debug!(cu = %addr, epoch = epoch.index, "operation unit already migrated");
                continue;
            }

            let symbol = cu.symbol().to_string();
            let order = Order::new(
                msg.from,
                id.as_str(),
                &symbol,
                OrderKind::KeyGen(OrderKeyGen {
                    key_nodes: key_nodes.clone(),
                    sign_threshold: threshold,
                    to: Some(addr),
                    epoch: epoch.index,
                    ..Default::default()
                }),
            );

            let order = self
                .orders
                .new_order(ctx, order)?
                .ok_or_else(|| KeyGenError::DuplicateOrderId(id.clone()))?;

            cu.set_migration_status(MigrationStatus::KeyGenBegin);
            self.cus.set_cu(ctx, &cu)?;

            flows.push(order_flow(&order));
            flows.push(Flow::KeyGen(KeyGenFlow {
                order_id: id.clone(),
                symbol,
                from: msg.from,
                to: Some(addr),
                is_pre_keygen: false,
                open_fee: 0,
            }));
        }

        info!(
            from = %msg.from,
            started = flows.len() / 2,
            epoch = epoch.index,
            "operation unit migration ceremonies started"
        );

        Ok(Receipt::new(Category::OpcuMigrationKeyGen, flows))
    }
}
