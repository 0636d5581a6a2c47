use std::collections::BTreeSet;

use custody_order::{Order, OrderKeyGen, OrderKind};
use custody_primitives::{chain::ChainAdapter, epoch::sign_threshold, types::CuAddress};
use custody_receipt::{Category, Flow, KeyGenFlow, Receipt};
use custody_store::Context;
use tracing::info;

use crate::{
    epoch::EpochKeeper,
    errors::{KeyGenError, KeyGenResult},
    keeper::{check_signer, order_flow, KeyGenKeeper},
    msgs::MsgPreKeyGen,
    tokens::TokenKeeper,
};

impl<E, T, C> KeyGenKeeper<E, T, C>
where
    E: EpochKeeper,
    T: TokenKeeper,
    C: ChainAdapter,
{
    /// Starts ceremonies for keys with no beneficiary.
    ///
    /// Finished keys are parked in the wait-assign pool and handed out by later
    /// [`key_gen`](Self::key_gen) requests. No fee is charged.
    pub fn pre_key_gen(
        &self,
        ctx: &mut Context<'_>,
        signer: &CuAddress,
        msg: &MsgPreKeyGen,
    ) -> KeyGenResult<Receipt> {
        check_signer(&msg.from, signer)?;

        let epoch = self.epochs.current_epoch(ctx)?;
        if !epoch.is_key_node(&msg.from) {
            return Err(KeyGenError::NotKeyNode(msg.from));
        }

        if !epoch.migration_finished {
            return Err(KeyGenError::MigrationNotFinished(epoch.index));
        }

        let processing = self.orders.get_process_order_list(ctx)?;
        if !processing.is_empty() {
            return Err(KeyGenError::OrdersProcessing(processing.len()));
        }

        let requested = msg.order_ids.len();
        let max = self.params.max_pre_keygen_orders;
        if requested > max {
            return Err(KeyGenError::TooManyOrders { requested, max });
        }

        let pooled = self.pool.len(ctx)?;
        let max_pooled = self.params.max_wait_assign_key_orders;
        if pooled + requested > max_pooled {
            return Err(KeyGenError::PoolFull {
                pooled,
                requested,
                max: max_pooled,
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

        let mut flows = Vec::with_capacity(2 * requested);
        for id in &msg.order_ids {
            let order = Order::new(
                msg.from,
                id.as_str(),
                "",
                OrderKind::KeyGen(OrderKeyGen {
                    key_nodes: key_nodes.clone(),
                    sign_threshold: threshold,
                    epoch: epoch.index,
                    ..Default::default()
                }),
            );

            let order = self
                .orders
                .new_order(ctx, order)?
                .ok_or_else(|| KeyGenError::DuplicateOrderId(id.clone()))?;

            flows.push(order_flow(&order));
            flows.push(Flow::KeyGen(KeyGenFlow {
                order_id: id.clone(),
                symbol: String::new(),
                from: msg.from,
                to: None,
                is_pre_keygen: true,
                open_fee: 0,
            }));
        }

        info!(
            from = %msg.from,
            count = requested,
            epoch = epoch.index,
            "pre-keygen orders created"
        );

        Ok(Receipt::new(Category::PreKeyGen, flows))
    }
}
