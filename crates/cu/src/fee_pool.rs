//! The community fee pool.

use custody_primitives::{codec::Codec, types::Amount};
use custody_store::{Context, Namespace};
use tracing::debug;

use crate::{
    errors::{CuError, CuResult},
    keys::FEE_POOL_NAMESPACE,
};

/// Collects charged fees per symbol.
#[derive(Debug, Clone, Copy)]
pub struct FeePool {
    ns: Namespace,
    codec: Codec,
}

impl FeePool {
    /// Creates a fee pool in the default namespace.
    pub const fn new(codec: Codec) -> Self {
        Self {
            ns: FEE_POOL_NAMESPACE,
            codec,
        }
    }

    /// Returns the collected fees in `symbol`.
    pub fn fee_pool(&self, ctx: &Context<'_>, symbol: &str) -> CuResult<Amount> {
        Ok(ctx
            .get_value(self.ns, &self.codec, symbol.as_bytes())?
            .unwrap_or_default())
    }

    /// Adds `amount` to the collected fees in `symbol` and returns the new total.
    pub fn add_to_fee_pool(
        &self,
        ctx: &mut Context<'_>,
        symbol: &str,
        amount: Amount,
    ) -> CuResult<Amount> {
        let total = self
            .fee_pool(ctx, symbol)?
            .checked_add(amount)
            .ok_or_else(|| CuError::Overflow(symbol.to_string()))?;

        ctx.set_value(self.ns, &self.codec, symbol.as_bytes(), &total)?;
        debug!(%symbol, %amount, %total, "fee pool credited");

        Ok(total)
    }
}
