//! Fixtures shared by the keygen tests.

use custody_cu::CustodianUnit;
use custody_order::{Order, OrderKeyGen};
use custody_params::Params;
use custody_primitives::{
    codec::Codec,
    epoch::Epoch,
    types::{Amount, CuAddress, OrderId},
};
use custody_receipt::{get_receipt_from_result, Receipt, TxResult};
use custody_store::{Context, MemStore};
use custody_test_utils::{generated_pubkey, key_nodes, KeyNode, MockChainAdapter};

use crate::{
    epoch::StoreEpochKeeper,
    errors::KeyGenError,
    handler::{KeyGenHandler, CODESPACE},
    hooks::EpochHooks,
    keeper::KeyGenKeeper,
    msgs::{Msg, MsgKeyGen, MsgKeyGenFinish, MsgKeyGenWaitSign},
    tokens::TokenTable,
};

// ===== Test Constants =====

/// Height of the first block in tests.
pub(crate) const INITIAL_HEIGHT: u64 = 100;
/// The native token of the default params.
pub(crate) const NATIVE: &str = "hbc";
/// The default open fee of every custody token.
pub(crate) const OPEN_FEE: Amount = 10_000_000;
/// Native balance given to funded users.
pub(crate) const FUNDS: Amount = 100 * OPEN_FEE;

pub(crate) type TestKeeper = KeyGenKeeper<StoreEpochKeeper, TokenTable, MockChainAdapter>;
pub(crate) type TestHandler = KeyGenHandler<StoreEpochKeeper, TokenTable, MockChainAdapter>;

/// Returns the address of test user `i`. Users hold no key.
pub(crate) fn user(i: u8) -> CuAddress {
    CuAddress::new([0xa0 + i; 20])
}

/// Builds an epoch over `nodes`.
pub(crate) fn epoch(index: u64, nodes: &[KeyNode], migration_finished: bool) -> Epoch {
    Epoch {
        index,
        start_height: INITIAL_HEIGHT + index,
        key_node_set: nodes.iter().map(|n| n.address).collect(),
        migration_finished,
        rotating_out: None,
    }
}

pub(crate) fn key_gen_msg(id: &str, symbol: &str, from: CuAddress, to: CuAddress) -> Msg {
    Msg::KeyGen(MsgKeyGen {
        order_id: id.to_string(),
        symbol: symbol.to_string(),
        from,
        to,
    })
}

/// Builds a wait-sign message endorsed by every node in `signers`.
pub(crate) fn wait_sign_msg(
    from: CuAddress,
    id: &str,
    generated: &[u8],
    epoch: u64,
    signers: &[KeyNode],
) -> Msg {
    Msg::KeyGenWaitSign(MsgKeyGenWaitSign {
        from,
        order_id: id.to_string(),
        pubkey: generated.to_vec(),
        key_nodes: signers.iter().map(|n| n.address).collect(),
        key_sigs: signers.iter().map(|n| n.sign_pubkey(generated)).collect(),
        epoch,
    })
}

pub(crate) fn finish_msg(id: &str, generated: &[u8], validator: &KeyNode) -> Msg {
    Msg::KeyGenFinish(MsgKeyGenFinish {
        order_id: id.to_string(),
        pubkey: generated.to_vec(),
        signature: validator.sign_recoverable(generated),
        validator: validator.address,
    })
}

/// A keygen handler over an in-memory store whose current epoch is 1.
#[derive(Debug)]
pub(crate) struct Fixture {
    pub(crate) store: MemStore,
    pub(crate) handler: TestHandler,
    pub(crate) epochs: StoreEpochKeeper,
    pub(crate) nodes: Vec<KeyNode>,
    pub(crate) epoch: Epoch,
    pub(crate) codec: Codec,
    pub(crate) height: u64,
}

impl Fixture {
    /// Creates a fixture whose first epoch has `n` key nodes and a finished migration.
    pub(crate) fn new(n: u8) -> Self {
        Self::with_params(n, Params::default())
    }

    pub(crate) fn with_params(n: u8, params: Params) -> Self {
        let codec = Codec::default();
        let epochs = StoreEpochKeeper::new(codec);
        let keeper = KeyGenKeeper::new(
            codec,
            params.keygen,
            epochs,
            TokenTable::from_params(&params),
            MockChainAdapter::new(["btc", "eth"]),
        );

        let nodes = key_nodes(n);
        let first = epoch(1, &nodes, true);

        let mut store = MemStore::new();
        epochs
            .set_current_epoch(&mut Context::new(&mut store, INITIAL_HEIGHT), &first)
            .unwrap();

        Self {
            store,
            handler: KeyGenHandler::new(keeper, codec),
            epochs,
            nodes,
            epoch: first,
            codec,
            height: INITIAL_HEIGHT,
        }
    }

    pub(crate) fn keeper(&self) -> &TestKeeper {
        self.handler.keeper()
    }

    pub(crate) fn ctx(&mut self) -> Context<'_> {
        Context::new(&mut self.store, self.height)
    }

    /// Executes `msg` through the handler in a new block.
    pub(crate) fn handle(&mut self, signer: &CuAddress, msg: &Msg) -> TxResult {
        self.height += 1;
        let mut ctx = Context::new(&mut self.store, self.height);
        self.handler.handle(&mut ctx, signer, msg)
    }

    /// Executes `msg` and returns its receipt, failing the test if it is rejected.
    pub(crate) fn handle_ok(&mut self, signer: &CuAddress, msg: &Msg) -> Receipt {
        let result = self.handle(signer, msg);
        assert!(result.is_ok(), "{msg} failed: {}", result.log);

        get_receipt_from_result(&self.codec, &result).unwrap()
    }

    /// Executes `msg` and returns its error code, failing the test if it succeeds.
    pub(crate) fn handle_err(&mut self, signer: &CuAddress, msg: &Msg) -> TxResult {
        let result = self.handle(signer, msg);
        assert!(!result.is_ok(), "{msg} unexpectedly succeeded");

        result
    }

    /// Starts a new epoch over `nodes` and runs the epoch hooks.
    pub(crate) fn rotate(&mut self, nodes: Vec<KeyNode>, migration_finished: bool) -> Epoch {
        let next = epoch(self.epoch.index + 1, &nodes, migration_finished);
        self.nodes = nodes;
        self.apply_epoch(&next);
        next
    }

    /// Runs the epoch hooks for `next`, the way the staking layer does at the epoch's first block.
    pub(crate) fn apply_epoch(&mut self, next: &Epoch) {
        self.height += 1;
        let mut ctx = Context::new(&mut self.store, self.height);
        let mut cache = ctx.branch();
        {
            let mut hook_ctx = Context::new(&mut cache, self.height);
            EpochHooks::new()
                .with(&self.epochs)
                .with(self.handler.keeper())
                .after_new_epoch(&mut hook_ctx, next)
                .unwrap();
        }
        cache.commit().unwrap();

        self.epoch = next.clone();
    }

    pub(crate) fn fund(&mut self, addr: &CuAddress, amount: Amount) {
        let bank = *self.keeper().bank();
        bank.add_coin(&mut self.ctx(), addr, NATIVE, amount).unwrap();
    }

    pub(crate) fn order(&mut self, id: &str) -> Option<Order> {
        let orders = *self.keeper().orders();
        orders.get_order(&self.ctx(), id).unwrap()
    }

    pub(crate) fn cu(&mut self, addr: &CuAddress) -> Option<CustodianUnit> {
        let cus = *self.keeper().cus();
        cus.get_cu(&self.ctx(), addr).unwrap()
    }

    pub(crate) fn balance(&mut self, addr: &CuAddress) -> Amount {
        let bank = *self.keeper().bank();
        bank.get_balance(&self.ctx(), addr, NATIVE).unwrap()
    }

    pub(crate) fn held(&mut self, addr: &CuAddress) -> Amount {
        let bank = *self.keeper().bank();
        bank.get_balance_on_hold(&self.ctx(), addr, NATIVE).unwrap()
    }

    pub(crate) fn fee_pool(&mut self) -> Amount {
        let fee_pool = *self.keeper().fee_pool();
        fee_pool.fee_pool(&self.ctx(), NATIVE).unwrap()
    }

    pub(crate) fn wait_assign_pool(&mut self) -> Vec<OrderId> {
        let pool = *self.keeper().wait_assign_pool();
        pool.list(&self.ctx()).unwrap().into_iter().collect()
    }

    pub(crate) fn processing(&mut self) -> Vec<OrderId> {
        let orders = *self.keeper().orders();
        orders.get_process_order_list(&self.ctx()).unwrap()
    }

    /// Creates operation unit `addr` for `symbol` directly in state.
    pub(crate) fn create_op_cu(&mut self, symbol: &str, addr: &CuAddress) {
        let cus = *self.keeper().cus();
        cus.new_op_cu_with_address(&mut self.ctx(), symbol, addr)
            .unwrap()
            .unwrap();
    }

    /// Runs the wait-sign and finish steps of order `id` with the current key nodes and returns
    /// the generated public key.
    pub(crate) fn complete_ceremony(&mut self, id: &str, seed: u8) -> Vec<u8> {
        let generated = generated_pubkey(seed);
        let reporter = self.nodes[0];

        let msg = wait_sign_msg(reporter.address, id, &generated, self.epoch.index, &self.nodes);
        self.handle_ok(&reporter.address, &msg);

        let msg = finish_msg(id, &generated, &reporter);
        self.handle_ok(&reporter.address, &msg);

        generated
    }
}

/// Asserts that `result` was rejected with the code of `expected`.
pub(crate) fn assert_rejected(result: &TxResult, expected: KeyGenError) {
    assert_eq!(
        result.code,
        expected.code(),
        "expected {expected}, got code {}: {}",
        result.code,
        result.log
    );
    assert_eq!(result.codespace, CODESPACE);
    assert!(result.data.is_empty(), "failed results carry no receipt");
}

pub(crate) fn keygen_of(order: &Order) -> &OrderKeyGen {
    order.as_keygen().expect("keygen order")
}
