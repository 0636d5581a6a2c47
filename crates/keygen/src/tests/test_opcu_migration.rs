//! Unit tests for `opcu_migration_key_gen`.

use custody_cu::MigrationStatus;
use custody_order::OrderStatus;
use custody_primitives::types::CuAddress;
use custody_receipt::Category;

use crate::{
    errors::KeyGenError,
    msgs::{Msg, MsgOpcuMigrationKeyGen},
    testing::*,
};

const BTC_OP: CuAddress = CuAddress::new([0x11; 20]);
const ETH_OP: CuAddress = CuAddress::new([0x22; 20]);

fn migration_msg(from: CuAddress, ids: &[&str]) -> Msg {
    Msg::OpcuMigrationKeyGen(MsgOpcuMigrationKeyGen {
        from,
        order_ids: ids.iter().map(|id| id.to_string()).collect(),
    })
}

/// Creates one operation unit per custody chain and starts a migrating epoch.
fn migrating_fixture() -> Fixture {
    let mut fx = Fixture::new(3);
    fx.create_op_cu("btc", &BTC_OP);
    fx.create_op_cu("eth", &ETH_OP);

    let nodes = fx.nodes.clone();
    fx.rotate(nodes, false);
    fx
}

#[test]
fn test_new_epoch_marks_operation_units() {
    let mut fx = migrating_fixture();

    for op in [BTC_OP, ETH_OP] {
        assert_eq!(fx.cu(&op).unwrap().migration_status(), MigrationStatus::Begin);
    }
}

#[test]
fn test_migration_starts_one_order_per_operation_unit() {
    let mut fx = migrating_fixture();
    let node = fx.nodes[0].address;

    let receipt = fx.handle_ok(&node, &migration_msg(node, &["m1", "m2"]));

    assert_eq!(receipt.category, Category::OpcuMigrationKeyGen);
    assert_eq!(receipt.flows.len(), 4);

    for (id, op, symbol) in [("m1", BTC_OP, "btc"), ("m2", ETH_OP, "eth")] {
        let order = fx.order(id).unwrap();
        assert_eq!(order.status(), OrderStatus::Begin);
        assert_eq!(order.base.symbol, symbol);
        assert_eq!(keygen_of(&order).to, Some(op));
        assert_eq!(keygen_of(&order).open_fee, 0);
        assert_eq!(keygen_of(&order).epoch, 2);
        assert_eq!(
            fx.cu(&op).unwrap().migration_status(),
            MigrationStatus::KeyGenBegin
        );
    }
}

#[test]
fn test_migration_order_count_must_match() {
    let mut fx = migrating_fixture();
    let node = fx.nodes[0].address;

    let result = fx.handle_err(&node, &migration_msg(node, &["m1"]));

    assert_rejected(
        &result,
        KeyGenError::OpCuCountMismatch {
            expected: 2,
            actual: 1,
        },
    );
}

#[test]
fn test_migration_requires_unfinished_migration() {
    let mut fx = Fixture::new(3);
    fx.create_op_cu("btc", &BTC_OP);
    let node = fx.nodes[0].address;

    let result = fx.handle_err(&node, &migration_msg(node, &["m1"]));

    assert_rejected(&result, KeyGenError::MigrationFinished(1));
}

#[test]
fn test_migration_is_validator_only() {
    let mut fx = migrating_fixture();
    let a = user(1);

    let result = fx.handle_err(&a, &migration_msg(a, &["m1", "m2"]));

    assert_rejected(&result, KeyGenError::NotKeyNode(a));
}

#[test]
fn test_migration_skips_units_with_processing_order() {
    let mut fx = migrating_fixture();
    let node = fx.nodes[0].address;
    fx.handle_ok(&node, &key_gen_msg("k1", "btc", node, BTC_OP));

    let receipt = fx.handle_ok(&node, &migration_msg(node, &["m1", "m2"]));

    assert_eq!(receipt.flows.len(), 2);
    assert!(fx.order("m1").is_none());
    assert_eq!(keygen_of(&fx.order("m2").unwrap()).to, Some(ETH_OP));
}

#[test]
fn test_migration_finish_binds_new_address() {
    let mut fx = migrating_fixture();
    let node = fx.nodes[0].address;
    fx.handle_ok(&node, &migration_msg(node, &["m1", "m2"]));

    fx.complete_ceremony("m1", 51);

    let cu = fx.cu(&BTC_OP).unwrap();
    assert_eq!(cu.migration_status(), MigrationStatus::KeyGenFinish);
    assert!(cu.get_asset_address("btc", 2).is_some());
    assert_eq!(
        fx.cu(&ETH_OP).unwrap().migration_status(),
        MigrationStatus::KeyGenBegin
    );
    assert_eq!(fx.fee_pool(), 0);
}
