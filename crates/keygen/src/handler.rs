//! Dispatches keygen messages and turns their outcome into a [`TxResult`].

use custody_primitives::{chain::ChainAdapter, codec::Codec, types::CuAddress};
use custody_receipt::{save_receipt_to_result, Receipt, TxResult};
use custody_store::Context;
use tracing::{error, info, warn};

use crate::{
    epoch::EpochKeeper,
    errors::{KeyGenError, KeyGenResult},
    keeper::KeyGenKeeper,
    msgs::Msg,
    tokens::TokenKeeper,
};

/// The codespace of results produced by [`KeyGenHandler`].
pub const CODESPACE: &str = "keygen";

/// Executes keygen messages atomically.
///
/// Each message runs against a write overlay of the caller's context. The overlay is committed
/// only if the message succeeds, so a rejected message leaves state untouched.
#[derive(Debug, Clone)]
pub struct KeyGenHandler<E, T, C> {
    keeper: KeyGenKeeper<E, T, C>,
    codec: Codec,
}

impl<E, T, C> KeyGenHandler<E, T, C>
where
    E: EpochKeeper,
    T: TokenKeeper,
    C: ChainAdapter,
{
    /// Creates a handler around `keeper`. Receipts are encoded with `codec`.
    pub const fn new(keeper: KeyGenKeeper<E, T, C>, codec: Codec) -> Self {
        Self { keeper, codec }
    }

    /// Returns the keeper.
    pub const fn keeper(&self) -> &KeyGenKeeper<E, T, C> {
        &self.keeper
    }

    /// Executes `msg`, signed by `signer`, and returns its result.
    ///
    /// A successful result carries the encoded [`Receipt`].
    pub fn handle(&self, ctx: &mut Context<'_>, signer: &CuAddress, msg: &Msg) -> TxResult {
        match self.try_handle(ctx, signer, msg) {
            Ok(result) => result,
            Err(e) => {
                if e.is_fault() {
                    error!(%msg, %signer, err = %e, "keygen message faulted");
                } else {
                    warn!(%msg, %signer, err = %e, "keygen message rejected");
                }

                TxResult::error(CODESPACE, e.code(), e.to_string())
            }
        }
    }

    fn try_handle(
        &self,
        ctx: &mut Context<'_>,
        signer: &CuAddress,
        msg: &Msg,
    ) -> KeyGenResult<TxResult> {
        let height = ctx.block_height();
        let mut cache = ctx.branch();

        let receipt = {
            let mut tx_ctx = Context::new(&mut cache, height);
            self.execute(&mut tx_ctx, signer, msg)?
        };

        let mut result = TxResult::ok();
        save_receipt_to_result(&self.codec, &receipt, &mut result)?;

        let writes = cache.pending();
        cache.commit()?;

        info!(
            %msg,
            %signer,
            height,
            writes,
            flows = receipt.flows.len(),
            "keygen message executed"
        );

        Ok(result)
    }

    /// Executes `msg` directly against `ctx` without an overlay.
    ///
    /// The caller is responsible for discarding `ctx`'s writes if this fails.
    pub fn execute(
        &self,
        ctx: &mut Context<'_>,
        signer: &CuAddress,
        msg: &Msg,
    ) -> KeyGenResult<Receipt> {
        msg.validate_basic()?;

        if let Some(expected) = msg.expected_signer() {
            if expected != *signer {
                return Err(KeyGenError::UnauthorizedSigner {
                    expected,
                    actual: *signer,
                });
            }
        }

        match msg {
            Msg::KeyGen(m) => self.keeper.key_gen(ctx, signer, m),
            Msg::KeyGenWaitSign(m) => self.keeper.key_gen_wait_sign(ctx, signer, m),
            Msg::KeyGenFinish(m) => self.keeper.key_gen_finish(ctx, signer, m),
            Msg::PreKeyGen(m) => self.keeper.pre_key_gen(ctx, signer, m),
            Msg::OpcuMigrationKeyGen(m) => self.keeper.opcu_migration_key_gen(ctx, signer, m),
            Msg::NewOpCu(m) => self.keeper.new_op_cu(ctx, signer, m),
        }
    }
}
