//! Balance primitives that report every change as a flow.

use custody_primitives::types::{Amount, CuAddress, CuType};
use custody_receipt::{flows::signed_delta, BalanceFlow};
use custody_store::Context;
use tracing::debug;

use crate::{
    errors::{CuError, CuResult},
    keeper::CuKeeper,
    unit::CustodianUnit,
};

/// Moves balances of custodian units.
///
/// A unit that does not exist yet is treated as an empty user unit and persisted by the first
/// change.
#[derive(Debug, Clone, Copy)]
pub struct Bank {
    cus: CuKeeper,
}

impl Bank {
    /// Creates a bank on top of `cus`.
    pub const fn new(cus: CuKeeper) -> Self {
        Self { cus }
    }

    /// Returns the available balance of `symbol` at `addr`.
    pub fn get_balance(
        &self,
        ctx: &Context<'_>,
        addr: &CuAddress,
        symbol: &str,
    ) -> CuResult<Amount> {
        Ok(self
            .cus
            .get_cu(ctx, addr)?
            .map(|cu| cu.coins(symbol))
            .unwrap_or_default())
    }

    /// Returns the held balance of `symbol` at `addr`.
    pub fn get_balance_on_hold(
        &self,
        ctx: &Context<'_>,
        addr: &CuAddress,
        symbol: &str,
    ) -> CuResult<Amount> {
        Ok(self
            .cus
            .get_cu(ctx, addr)?
            .map(|cu| cu.coins_hold(symbol))
            .unwrap_or_default())
    }

    /// Credits the available balance.
    pub fn add_coin(
        &self,
        ctx: &mut Context<'_>,
        addr: &CuAddress,
        symbol: &str,
        amount: Amount,
    ) -> CuResult<BalanceFlow> {
        self.update(ctx, addr, symbol, |cu| cu.add_coins(symbol, amount))
    }

    /// Debits the available balance.
    pub fn sub_coin(
        &self,
        ctx: &mut Context<'_>,
        addr: &CuAddress,
        symbol: &str,
        amount: Amount,
    ) -> CuResult<BalanceFlow> {
        self.update(ctx, addr, symbol, |cu| cu.sub_coins(symbol, amount))
    }

    /// Moves `amount` from the available to the held balance.
    pub fn lock_coin(
        &self,
        ctx: &mut Context<'_>,
        addr: &CuAddress,
        symbol: &str,
        amount: Amount,
    ) -> CuResult<BalanceFlow> {
        self.update(ctx, addr, symbol, |cu| {
            cu.sub_coins(symbol, amount)?;
            cu.add_coins_hold(symbol, amount)
        })
    }

    /// Moves `amount` from the held back to the available balance.
    pub fn unlock_coin(
        &self,
        ctx: &mut Context<'_>,
        addr: &CuAddress,
        symbol: &str,
        amount: Amount,
    ) -> CuResult<BalanceFlow> {
        self.update(ctx, addr, symbol, |cu| {
            cu.sub_coins_hold(symbol, amount)?;
            cu.add_coins(symbol, amount)
        })
    }

    /// Removes `amount` from the held balance.
    pub fn sub_coin_hold(
        &self,
        ctx: &mut Context<'_>,
        addr: &CuAddress,
        symbol: &str,
        amount: Amount,
    ) -> CuResult<BalanceFlow> {
        self.update(ctx, addr, symbol, |cu| cu.sub_coins_hold(symbol, amount))
    }

    fn update(
        &self,
        ctx: &mut Context<'_>,
        addr: &CuAddress,
        symbol: &str,
        change: impl FnOnce(&mut CustodianUnit) -> CuResult<()>,
    ) -> CuResult<BalanceFlow> {
        let mut cu = self
            .cus
            .get_or_new_cu(ctx, CuType::User, addr)?
            .ok_or_else(|| CuError::Fault(format!("no custodian unit at {addr}")))?;

        let previous_balance = cu.coins(symbol);
        let previous_balance_on_hold = cu.coins_hold(symbol);

        change(&mut cu)?;

        let flow = BalanceFlow {
            cu_address: *addr,
            symbol: symbol.to_string(),
            previous_balance,
            balance_change: signed_delta(previous_balance, cu.coins(symbol))
                .ok_or_else(|| CuError::Overflow(symbol.to_string()))?,
            previous_balance_on_hold,
            balance_on_hold_change: signed_delta(previous_balance_on_hold, cu.coins_hold(symbol))
                .ok_or_else(|| CuError::Overflow(symbol.to_string()))?,
        };

        self.cus.set_cu(ctx, &cu)?;

        debug!(
            %addr,
            %symbol,
            change = flow.balance_change,
            hold_change = flow.balance_on_hold_change,
            "balance updated"
        );

        Ok(flow)
    }
}
