use custody_cu::CustodianUnit;
use custody_order::{Order, OrderKeyGen, OrderKind, OrderStatus};
use custody_params::tokens::TokenInfo;
use custody_primitives::{
    chain::ChainAdapter,
    epoch::{sign_threshold, Epoch},
    types::{Amount, CuAddress, CuType},
};
use custody_receipt::{Category, Flow, KeyGenFinishFlow, KeyGenFlow, Receipt};
use custody_store::Context;
use tracing::{debug, info};

use crate::{
    epoch::EpochKeeper,
    errors::{KeyGenError, KeyGenResult},
    keeper::{check_signer, order_flow, KeyGenKeeper},
    msgs::MsgKeyGen,
    tokens::TokenKeeper,
};

impl<E, T, C> KeyGenKeeper<E, T, C>
where
    E: EpochKeeper,
    T: TokenKeeper,
    C: ChainAdapter,
{
    /// Requests an address for `msg.to`'s `msg.symbol` slot.
    ///
    /// The address is resolved, in order of preference, from a key the beneficiary already holds
    /// in the current epoch, from the address of the token's chain, from the oldest pre-generated
    /// key in the wait-assign pool, or by starting a new ceremony whose open fee is held from
    /// `msg.from`.
    pub fn key_gen(
        &self,
        ctx: &mut Context<'_>,
        signer: &CuAddress,
        msg: &MsgKeyGen,
    ) -> KeyGenResult<Receipt> {
        check_signer(&msg.from, signer)?;
        self.ensure_new_order_id(ctx, &msg.order_id)?;

        let token = self.custody_token(&msg.symbol)?;
        let epoch = self.epochs.current_epoch(ctx)?;

        let mut to_cu = self
            .cus
            .get_or_new_cu(ctx, CuType::User, &msg.to)?
            .ok_or_else(|| KeyGenError::Fault(format!("no custodian unit at {}", msg.to)))?;

        if to_cu.get_asset_address(&msg.symbol, epoch.index).is_some() {
            return Err(KeyGenError::AddressAlreadyExists {
                cu: msg.to,
                symbol: msg.symbol.clone(),
            });
        }

        if to_cu.is_operation() {
            if to_cu.symbol() != msg.symbol {
                return Err(KeyGenError::SymbolMismatch {
                    cu_symbol: to_cu.symbol().to_string(),
                    symbol: msg.symbol.clone(),
                });
            }

            if !epoch.is_key_node(&msg.from) {
                return Err(KeyGenError::NotKeyNode(msg.from));
            }
        }

        if let Some(order_id) = self.processing_keygen_for(ctx, &msg.to)? {
            return Err(KeyGenError::OrderInFlight {
                to: msg.to,
                order_id,
            });
        }

        if let Some(pubkey) = to_cu.get_asset_pubkey(epoch.index).map(<[u8]>::to_vec) {
            let address = self.chain.convert_address(&token.chain, &pubkey)?;
            debug!(order_id = %msg.order_id, to = %msg.to, "resolving address from existing key");

            return self.finish_without_ceremony(
                ctx,
                msg,
                &token,
                &epoch,
                &mut to_cu,
                address,
                pubkey,
            );
        }

        if token.is_sub_token() {
            if let Some(address) = to_cu
                .get_asset_address(&token.chain, epoch.index)
                .map(str::to_string)
            {
                let pubkey = to_cu
                    .asset(&token.chain, epoch.index)
                    .map(|a| a.pubkey.clone())
                    .unwrap_or_default();
                debug!(
                    order_id = %msg.order_id,
                    to = %msg.to,
                    chain = %token.chain,
                    "reusing chain address"
                );

                return self.finish_without_ceremony(
                    ctx,
                    msg,
                    &token,
                    &epoch,
                    &mut to_cu,
                    address,
                    pubkey,
                );
            }
        }

        if let Some(receipt) = self.assign_pooled_key(ctx, msg, &token, &mut to_cu)? {
            return Ok(receipt);
        }

        self.start_ceremony(ctx, msg, &token, &epoch, &to_cu)
    }

    /// Creates the order for an address that needs no ceremony and finishes it at once. No fee
    /// is charged.
    #[expect(clippy::too_many_arguments)]
    fn finish_without_ceremony(
        &self,
        ctx: &mut Context<'_>,
        msg: &MsgKeyGen,
        token: &TokenInfo,
        epoch: &Epoch,
        to_cu: &mut CustodianUnit,
        address: String,
        pubkey: Vec<u8>,
    ) -> KeyGenResult<Receipt> {
        let key_nodes = epoch.keygen_nodes();
        let order = Order::new(
            msg.from,
            msg.order_id.as_str(),
            &msg.symbol,
            OrderKind::KeyGen(OrderKeyGen {
                sign_threshold: sign_threshold(key_nodes.len()) as u64,
                key_nodes,
                to: Some(msg.to),
                pubkey: pubkey.clone(),
                multi_sign_address: address.clone(),
                open_fee: 0,
                epoch: epoch.index,
            }),
        );

        let mut order = self
            .orders
            .new_order(ctx, order)?
            .ok_or_else(|| KeyGenError::DuplicateOrderId(msg.order_id.clone()))?;

        self.bind_address(ctx, to_cu, token, &address, &pubkey, epoch.index)?;

        order.set_status(OrderStatus::Finish);
        self.orders.set_order(ctx, &order)?;

        info!(
            order_id = %msg.order_id,
            to = %msg.to,
            symbol = %msg.symbol,
            %address,
            "address resolved without ceremony"
        );

        Ok(Receipt::new(
            Category::KeyGen,
            vec![
                order_flow(&order),
                Flow::KeyGen(KeyGenFlow {
                    order_id: msg.order_id.clone(),
                    symbol: msg.symbol.clone(),
                    from: msg.from,
                    to: Some(msg.to),
                    is_pre_keygen: false,
                    open_fee: 0,
                }),
                Flow::KeyGenFinish(KeyGenFinishFlow {
                    order_id: msg.order_id.clone(),
                    to_addr: address,
                    is_pre_keygen: false,
                }),
            ],
        ))
    }

    /// Binds the oldest pooled key to the beneficiary. No order is created for `msg` and the
    /// receipt carries no flows.
    fn assign_pooled_key(
        &self,
        ctx: &mut Context<'_>,
        msg: &MsgKeyGen,
        token: &TokenInfo,
        to_cu: &mut CustodianUnit,
    ) -> KeyGenResult<Option<Receipt>> {
        let Some(pooled_id) = self.pool.pop_front(ctx)? else {
            return Ok(None);
        };

        let mut pooled = self
            .orders
            .get_order(ctx, &pooled_id)?
            .ok_or_else(|| KeyGenError::Fault(format!("pooled order {pooled_id} is missing")))?;
        let keygen = pooled
            .as_keygen_mut()
            .ok_or_else(|| KeyGenError::Fault(format!("pooled order {pooled_id} is not keygen")))?;

        let address = self.chain.convert_address(&token.chain, &keygen.pubkey)?;
        let pubkey = keygen.pubkey.clone();
        let epoch = keygen.epoch;

        keygen.to = Some(msg.to);
        keygen.multi_sign_address = address.clone();

        self.bind_address(ctx, to_cu, token, &address, &pubkey, epoch)?;

        pooled.set_status(OrderStatus::Finish);
        self.orders.set_order(ctx, &pooled)?;

        info!(
            order_id = %msg.order_id,
            %pooled_id,
            to = %msg.to,
            symbol = %msg.symbol,
            %address,
            "assigned pooled key"
        );

        Ok(Some(Receipt::new(Category::KeyGen, Vec::new())))
    }

    /// Creates a ceremony order in `Begin` and holds the open fee from the initiator.
    fn start_ceremony(
        &self,
        ctx: &mut Context<'_>,
        msg: &MsgKeyGen,
        token: &TokenInfo,
        epoch: &Epoch,
        to_cu: &CustodianUnit,
    ) -> KeyGenResult<Receipt> {
        let key_nodes = epoch.keygen_nodes();
        if key_nodes.is_empty() {
            return Err(KeyGenError::NoKeyNodes);
        }

        let open_fee = Amount::from(if to_cu.is_operation() {
            token.sys_open_fee
        } else {
            token.open_fee
        });

        let order = Order::new(
            msg.from,
            msg.order_id.as_str(),
            &msg.symbol,
            OrderKind::KeyGen(OrderKeyGen {
                sign_threshold: sign_threshold(key_nodes.len()) as u64,
                key_nodes,
                to: Some(msg.to),
                open_fee,
                epoch: epoch.index,
                ..Default::default()
            }),
        );

        let order = self
            .orders
            .new_order(ctx, order)?
            .ok_or_else(|| KeyGenError::DuplicateOrderId(msg.order_id.clone()))?;

        let mut flows = vec![order_flow(&order)];

        if open_fee > 0 {
            let native = self.native_symbol().to_string();
            let flow = self
                .bank
                .lock_coin(ctx, &msg.from, &native, open_fee)
                .map_err(KeyGenError::insufficient_fee)?;
            flows.push(Flow::Balance(flow));
        }

        flows.push(Flow::KeyGen(KeyGenFlow {
            order_id: msg.order_id.clone(),
            symbol: msg.symbol.clone(),
            from: msg.from,
            to: Some(msg.to),
            is_pre_keygen: false,
            open_fee,
        }));

        info!(
            order_id = %msg.order_id,
            to = %msg.to,
            symbol = %msg.symbol,
            %open_fee,
            epoch = epoch.index,
            "keygen ceremony started"
        );

        Ok(Receipt::new(Category::KeyGen, flows))
    }
}
