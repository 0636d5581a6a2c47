use std::collections::BTreeSet;

use custody_order::OrderStatus;
use custody_primitives::{
    chain::ChainAdapter,
    secp::{normalize_pubkey, verify_key_sigs},
    types::{CuAddress, CuType},
};
use custody_receipt::{Category, Flow, KeyGenWaitSignFlow, Receipt};
use custody_store::Context;
use tracing::info;

use crate::{
    epoch::EpochKeeper,
    errors::{KeyGenError, KeyGenResult},
    keeper::{order_flow, KeyGenKeeper},
    msgs::MsgKeyGenWaitSign,
    tokens::TokenKeeper,
};

impl<E, T, C> KeyGenKeeper<E, T, C>
where
    E: EpochKeeper,
    T: TokenKeeper,
    C: ChainAdapter,
{
    /// Records the public key the key nodes generated for an order and moves it to `WaitSign`.
    ///
    /// The transaction may be submitted by any current key node. Every key node of the order
    /// must have endorsed the key.
    pub fn key_gen_wait_sign(
        &self,
        ctx: &mut Context<'_>,
        signer: &CuAddress,
        msg: &MsgKeyGenWaitSign,
    ) -> KeyGenResult<Receipt> {
        let mut order = self.get_keygen_order(ctx, &msg.order_id)?;
        if order.status() != OrderStatus::Begin {
            return Err(KeyGenError::UnexpectedStatus {
                order_id: msg.order_id.clone(),
                status: order.status(),
            });
        }

        let epoch = self.epochs.current_epoch(ctx)?;
        if msg.epoch != epoch.index {
            return Err(KeyGenError::StaleEpoch {
                expected: epoch.index,
                actual: msg.epoch,
            });
        }

        if !epoch.is_key_node(signer) {
            return Err(KeyGenError::NotKeyNode(*signer));
        }

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

        if let Some(to) = keygen.to {
            let to_cu = self
                .cus
                .get_or_new_cu(ctx, CuType::User, &to)?
                .ok_or_else(|| KeyGenError::Fault(format!("no custodian unit at {to}")))?;

            if to_cu.is_operation() {
                if to_cu.symbol() != symbol {
                    return Err(KeyGenError::SymbolMismatch {
                        cu_symbol: to_cu.symbol().to_string(),
                        symbol,
                    });
                }

                if !epoch.is_key_node(&msg.from) {
                    return Err(KeyGenError::NotKeyNode(msg.from));
                }
            }

            if to_cu.get_asset_address(&symbol, epoch.index).is_some() {
                return Err(KeyGenError::AddressAlreadyExists { cu: to, symbol });
            }
        }

        let order_nodes: BTreeSet<CuAddress> = keygen.key_nodes.iter().copied().collect();
        let msg_nodes: BTreeSet<CuAddress> = msg.key_nodes.iter().copied().collect();
        if order_nodes != msg_nodes {
            return Err(KeyGenError::KeyNodesMismatch);
        }

        let pubkey = normalize_pubkey(&msg.pubkey)?;
        let signers = verify_key_sigs(&pubkey, &msg.key_sigs)?;
        if signers != order_nodes {
            return Err(KeyGenError::KeyNodesMismatch);
        }

        keygen.pubkey = pubkey.clone();
        order.set_status(OrderStatus::WaitSign);
        self.orders.set_order(ctx, &order)?;

        info!(
            order_id = %msg.order_id,
            from = %msg.from,
            %signer,
            pubkey = %hex::encode(&pubkey),
            "keygen order waiting for signature"
        );

        Ok(Receipt::new(
            Category::KeyGenWaitSign,
            vec![
                order_flow(&order),
                Flow::KeyGenWaitSign(KeyGenWaitSignFlow {
                    order_id: msg.order_id.clone(),
                    pubkey,
                }),
            ],
        ))
    }
}
