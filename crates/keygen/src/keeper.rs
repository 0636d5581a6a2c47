//! The keygen keeper and the helpers shared by its transitions.

use custody_cu::{Bank, CuKeeper, CustodianUnit, FeePool, MigrationStatus};
use custody_order::{Order, OrderKeeper, OrderType};
use custody_params::prelude::{KeyGenParams, TokenInfo};
use custody_primitives::{chain::ChainAdapter, codec::Codec, types::CuAddress};
use custody_receipt::{Flow, OrderFlow};
use custody_store::Context;
use tracing::debug;

use crate::{
    epoch::EpochKeeper,
    errors::{KeyGenError, KeyGenResult},
    pool::WaitAssignPool,
    tokens::TokenKeeper,
};

/// Drives keygen orders.
///
/// The keeper owns no state: every call receives the [`Context`] of the transaction or hook it
/// runs in. The epoch source, the token configuration and the chain adapter are external
/// collaborators supplied by the embedding application.
#[derive(Debug, Clone)]
pub struct KeyGenKeeper<E, T, C> {
    pub(crate) orders: OrderKeeper,
    pub(crate) cus: CuKeeper,
    pub(crate) bank: Bank,
    pub(crate) fee_pool: FeePool,
    pub(crate) pool: WaitAssignPool,
    pub(crate) epochs: E,
    pub(crate) tokens: T,
    pub(crate) chain: C,
    pub(crate) params: KeyGenParams,
}

impl<E, T, C> KeyGenKeeper<E, T, C>
where
    E: EpochKeeper,
    T: TokenKeeper,
    C: ChainAdapter,
{
    /// Creates a keeper whose sub-keepers all use `codec`.
    pub fn new(codec: Codec, params: KeyGenParams, epochs: E, tokens: T, chain: C) -> Self {
        let cus = CuKeeper::new(codec);

        Self {
            orders: OrderKeeper::new(codec),
            cus,
            bank: Bank::new(cus),
            fee_pool: FeePool::new(codec),
            pool: WaitAssignPool::new(codec),
            epochs,
            tokens,
            chain,
            params,
        }
    }

    /// Returns the order keeper.
    pub const fn orders(&self) -> &OrderKeeper {
        &self.orders
    }

    /// Returns the custodian-unit keeper.
    pub const fn cus(&self) -> &CuKeeper {
        &self.cus
    }

    /// Returns the balance primitives.
    pub const fn bank(&self) -> &Bank {
        &self.bank
    }

    /// Returns the fee pool.
    pub const fn fee_pool(&self) -> &FeePool {
        &self.fee_pool
    }

    /// Returns the wait-assign pool.
    pub const fn wait_assign_pool(&self) -> &WaitAssignPool {
        &self.pool
    }

    /// Returns the epoch source.
    pub const fn epochs(&self) -> &E {
        &self.epochs
    }

    pub(crate) fn native_symbol(&self) -> &str {
        self.tokens.native_symbol()
    }

    /// Returns the configured, non-native token with `symbol` whose chain the adapter supports.
    pub(crate) fn custody_token(&self, symbol: &str) -> KeyGenResult<TokenInfo> {
        let token = self
            .tokens
            .token(symbol)
            .ok_or_else(|| KeyGenError::UnsupportedToken(symbol.to_string()))?;

        if token.is_native {
            return Err(KeyGenError::NativeToken(symbol.to_string()));
        }

        if !self.chain.support_chain(&token.chain) {
            return Err(KeyGenError::UnsupportedToken(symbol.to_string()));
        }

        Ok(token)
    }

    /// Rejects an order ID that is already taken by an order of any type.
    pub(crate) fn ensure_new_order_id(&self, ctx: &Context<'_>, id: &str) -> KeyGenResult<()> {
        if self.orders.has_order(ctx, id)? {
            return Err(KeyGenError::DuplicateOrderId(id.to_string()));
        }

        Ok(())
    }

    /// Loads a keygen order.
    pub(crate) fn get_keygen_order(&self, ctx: &Context<'_>, id: &str) -> KeyGenResult<Order> {
        let order = self
            .orders
            .get_order(ctx, id)?
            .ok_or_else(|| KeyGenError::OrderNotFound(id.to_string()))?;

        if order.order_type() != OrderType::KeyGen {
            return Err(KeyGenError::NotKeyGenOrder(id.to_string()));
        }

        Ok(order)
    }

    /// Returns the ID of the processing keygen order whose beneficiary is `to`, if any.
    pub(crate) fn processing_keygen_for(
        &self,
        ctx: &Context<'_>,
        to: &CuAddress,
    ) -> KeyGenResult<Option<String>> {
        Ok(self
            .orders
            .get_process_orders(ctx, OrderType::KeyGen)?
            .into_iter()
            .find(|o| o.as_keygen().is_some_and(|k| k.to == Some(*to)))
            .map(|o| o.base.id))
    }

    /// Binds a generated key and its derived address to `cu`'s slot for `token` in `epoch`,
    /// persists the unit and indexes the external address.
    ///
    /// A sub-token also binds its chain's slot, since both live at the same address.
    pub(crate) fn bind_address(
        &self,
        ctx: &mut Context<'_>,
        cu: &mut CustodianUnit,
        token: &TokenInfo,
        address: &str,
        pubkey: &[u8],
        epoch: u64,
    ) -> KeyGenResult<()> {
        cu.set_asset_address(&token.symbol, address, epoch)?;
        cu.set_asset_pubkey(&token.symbol, pubkey, epoch)?;

        if token.is_sub_token() {
            cu.set_asset_address(&token.chain, address, epoch)?;
            cu.set_asset_pubkey(&token.chain, pubkey, epoch)?;
        }

        if cu.is_operation()
            && matches!(
                cu.migration_status(),
                MigrationStatus::Begin | MigrationStatus::KeyGenBegin
            )
        {
            cu.set_migration_status(MigrationStatus::KeyGenFinish);
        }

        self.cus.set_cu(ctx, cu)?;
        self.cus
            .set_ext_address_with_cu(ctx, &token.chain, address, &cu.address())?;

        debug!(cu = %cu.address(), symbol = %token.symbol, %address, epoch, "bound address");

        Ok(())
    }
}

/// Builds the flow that records `order`'s current status.
pub(crate) fn order_flow(order: &Order) -> Flow {
    Flow::Order(OrderFlow {
        symbol: order.base.symbol.clone(),
        cu_address: order.base.cu_address,
        order_id: order.base.id.clone(),
        order_type: order.order_type(),
        order_status: order.status(),
    })
}

/// Rejects a transaction whose signer is not the party the message names.
pub(crate) fn check_signer(expected: &CuAddress, actual: &CuAddress) -> KeyGenResult<()> {
    if expected != actual {
        return Err(KeyGenError::UnauthorizedSigner {
            expected: *expected,
            actual: *actual,
        });
    }

    Ok(())
}
