use custody_order::OrderStatus;
use custody_primitives::{
    chain::ChainAdapter,
    secp::{normalize_pubkey, recover_signer},
    types::{CuAddress, CuType},
};
use custody_receipt::{Category, Flow, KeyGenFinishFlow, Receipt};
use custody_store::Context;
use tracing::{debug, info};

use crate::{
    epoch::EpochKeeper,
    errors::{KeyGenError, KeyGenResult},
    keeper::{check_signer, order_flow, KeyGenKeeper},
    msgs::MsgKeyGenFinish,
    tokens::TokenKeeper,
};

impl<E, T, C> KeyGenKeeper<E, T, C>
where
    E: EpochKeeper,
    T: TokenKeeper,
    C: ChainAdapter,
{
    /// Completes an order in `WaitSign`.
    ///
    /// An order with a beneficiary binds the derived address to it, finishes, and moves the held
    /// open fee into the fee pool. A pre-generated key is parked in the wait-assign pool instead.
    pub fn key_gen_finish(
        &self,
        ctx: &mut Context<'_>,
        signer: &CuAddress,
        msg: &MsgKeyGenFinish,
    ) -> KeyGenResult<Receipt> {
        check_signer(&msg.validator, signer)?;

        let mut order = self.get_keygen_order(ctx, &msg.order_id)?;
        if order.status() != OrderStatus::WaitSign {
            return Err(KeyGenError::UnexpectedStatus {
                order_id: msg.order_id.clone(),
                status: order.status(),
            });
        }

        let epoch = self.epochs.current_epoch(ctx)?;
        let initiator = order.base.cu_address;
        let symbol = order.base.symbol.clone();
        let keygen = order
            .as_keygen_mut()
            .ok_or_else(|| KeyGenError::NotKeyGenOrder(msg.order_id.clone()))?;

        if keygen.epoch != epoch.index {
            return Err(KeyGenError::StaleEpoch {
                expected: epoch.index,
                actual: keygen.epoch,
            });
        }

        if normalize_pubkey(&msg.pubkey)? != keygen.pubkey {
            return Err(KeyGenError::PubkeyMismatch(msg.order_id.clone()));
        }

        let recovered = recover_signer(&keygen.pubkey, &msg.signature)?;
        debug!(
            order_id = %msg.order_id,
            signer = %CuAddress::from_pubkey(&recovered),
            "recovered finish signature"
        );

        let Some(to) = keygen.to else {
            order.set_status(OrderStatus::SignFinish);
            self.orders.set_order(ctx, &order)?;
            self.pool.push(ctx, msg.order_id.clone())?;

            info!(order_id = %msg.order_id, "pre-generated key parked for assignment");

            return Ok(Receipt::new(
                Category::KeyGenFinish,
                vec![
                    order_flow(&order),
                    Flow::KeyGenFinish(KeyGenFinishFlow {
                        order_id: msg.order_id.clone(),
                        to_addr: String::new(),
                        is_pre_keygen: true,
                    }),
                ],
            ));
        };

        let token = self.custody_token(&symbol)?;
        let address = self.chain.convert_address(&token.chain, &keygen.pubkey)?;
        let pubkey = keygen.pubkey.clone();
        let open_fee = keygen.open_fee;
        keygen.multi_sign_address = address.clone();

        let mut to_cu = self
            .cus
            .get_or_new_cu(ctx, CuType::User, &to)?
            .ok_or_else(|| KeyGenError::Fault(format!("no custodian unit at {to}")))?;
        self.bind_address(ctx, &mut to_cu, &token, &address, &pubkey, epoch.index)?;

        order.set_status(OrderStatus::Finish);
        self.orders.set_order(ctx, &order)?;

        let mut flows = vec![order_flow(&order)];

        if open_fee > 0 {
            let native = self.native_symbol().to_string();
            let flow = self
                .bank
                .sub_coin_hold(ctx, &initiator, &native, open_fee)?;
            let pooled = self.fee_pool.add_to_fee_pool(ctx, &native, open_fee)?;
            debug!(order_id = %msg.order_id, %open_fee, %pooled, "open fee moved to fee pool");
            flows.push(Flow::Balance(flow));
        }

        flows.push(Flow::KeyGenFinish(KeyGenFinishFlow {
            order_id: msg.order_id.clone(),
            to_addr: address.clone(),
            is_pre_keygen: false,
        }));

        info!(order_id = %msg.order_id, %to, %symbol, %address, "keygen order finished");

        Ok(Receipt::new(Category::KeyGenFinish, flows))
    }
}
