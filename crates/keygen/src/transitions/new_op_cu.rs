use custody_primitives::{chain::ChainAdapter, types::CuAddress};
use custody_receipt::{Category, Receipt};
use custody_store::Context;
use tracing::info;

use crate::{
    epoch::EpochKeeper,
    errors::{KeyGenError, KeyGenResult},
    keeper::{check_signer, KeyGenKeeper},
    msgs::MsgNewOpCu,
    tokens::TokenKeeper,
};

impl<E, T, C> KeyGenKeeper<E, T, C>
where
    E: EpochKeeper,
    T: TokenKeeper,
    C: ChainAdapter,
{
    /// Creates an operation unit for `msg.symbol`, up to the token's configured limit.
    ///
    /// The unit gets its address through a later [`key_gen`](Self::key_gen) request.
    pub fn new_op_cu(
        &self,
        ctx: &mut Context<'_>,
        signer: &CuAddress,
        msg: &MsgNewOpCu,
    ) -> KeyGenResult<Receipt> {
        check_signer(&msg.from, signer)?;

        let epoch = self.epochs.current_epoch(ctx)?;
        if !epoch.is_key_node(&msg.from) {
            return Err(KeyGenError::NotKeyNode(msg.from));
        }

        if !epoch.migration_finished {
            return Err(KeyGenError::MigrationNotFinished(epoch.index));
        }

        let token = self.custody_token(&msg.symbol)?;

        if self.cus.get_cu(ctx, &msg.op_cu_address)?.is_some() {
            return Err(KeyGenError::AddressInUse(msg.op_cu_address));
        }

        let count = self.cus.get_op_cus(ctx, &msg.symbol)?.len() as u64;
        if count >= token.max_op_cu_number {
            return Err(KeyGenError::OpCuLimitReached {
                symbol: msg.symbol.clone(),
                max: token.max_op_cu_number,
            });
        }

        self.cus
            .new_op_cu_with_address(ctx, &msg.symbol, &msg.op_cu_address)?
            .ok_or(KeyGenError::AddressInUse(msg.op_cu_address))?;

        info!(
            symbol = %msg.symbol,
            cu = %msg.op_cu_address,
            from = %msg.from,
            "operation unit created"
        );

        Ok(Receipt::new(Category::NewOpCu, Vec::new()))
    }
}
