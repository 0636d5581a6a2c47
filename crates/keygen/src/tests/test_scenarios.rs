//! End-to-end keygen scenarios.

use custody_order::OrderStatus;
use custody_primitives::epoch::sign_threshold;
use custody_test_utils::{generated_pubkey, key_node, key_nodes, MockChainAdapter};

use crate::{
    msgs::{Msg, MsgPreKeyGen},
    testing::*,
};

/// A user pays for a fresh address, two key nodes generate it, and a validator finishes it.
#[test]
fn test_ceremony_for_fresh_beneficiary() {
    let mut fx = Fixture::new(2);
    let (v1, v2) = (fx.nodes[0], fx.nodes[1]);
    let (a, b) = (user(1), user(2));
    fx.fund(&a, FUNDS);

    fx.handle_ok(&a, &key_gen_msg("o1", "eth", a, b));
    assert_eq!(fx.order("o1").unwrap().status(), OrderStatus::Begin);
    assert_eq!(fx.held(&a), OPEN_FEE);

    let pk = generated_pubkey(42);
    fx.handle_ok(&v1.address, &wait_sign_msg(a, "o1", &pk, 1, &[v1, v2]));
    let order = fx.order("o1").unwrap();
    assert_eq!(order.status(), OrderStatus::WaitSign);
    assert_eq!(keygen_of(&order).pubkey, pk);

    fx.handle_ok(&v1.address, &finish_msg("o1", &pk, &v1));
    assert_eq!(fx.order("o1").unwrap().status(), OrderStatus::Finish);
    assert_eq!(
        fx.cu(&b).unwrap().get_asset_address("eth", 1),
        Some(MockChainAdapter::expected_address("eth", &pk).as_str())
    );
    assert_eq!(fx.held(&a), 0);
    assert_eq!(fx.fee_pool(), OPEN_FEE);
}

/// A pre-generated key waits in the pool and is handed to the next beneficiary without an order.
#[test]
fn test_pre_generated_key_is_consumed_by_key_gen() {
    let mut fx = Fixture::new(2);
    let v1 = fx.nodes[0];
    let (a, c) = (user(1), user(3));
    fx.fund(&a, FUNDS);

    let msg = Msg::PreKeyGen(MsgPreKeyGen {
        from: v1.address,
        order_ids: vec!["p1".to_string()],
    });
    fx.handle_ok(&v1.address, &msg);

    let pk = generated_pubkey(41);
    let msg = wait_sign_msg(v1.address, "p1", &pk, 1, &fx.nodes);
    fx.handle_ok(&v1.address, &msg);
    fx.handle_ok(&v1.address, &finish_msg("p1", &pk, &v1));
    assert_eq!(fx.order("p1").unwrap().status(), OrderStatus::SignFinish);
    assert_eq!(fx.wait_assign_pool(), vec!["p1".to_string()]);

    let receipt = fx.handle_ok(&a, &key_gen_msg("o2", "eth", a, c));

    assert!(receipt.flows.is_empty());
    assert!(fx.order("o2").is_none());
    assert_eq!(fx.order("p1").unwrap().status(), OrderStatus::Finish);
    assert_eq!(
        fx.cu(&c).unwrap().get_asset_address("eth", 1),
        Some(MockChainAdapter::expected_address("eth", &pk).as_str())
    );
    assert!(fx.wait_assign_pool().is_empty());
}

/// A ceremony waiting for its signature restarts over the new key-node set.
#[test]
fn test_epoch_change_rearms_waiting_order() {
    let mut fx = Fixture::new(2);
    let v1 = fx.nodes[0];
    let (a, b) = (user(1), user(2));
    fx.fund(&a, FUNDS);

    fx.handle_ok(&a, &key_gen_msg("o1", "eth", a, b));
    let msg = wait_sign_msg(a, "o1", &generated_pubkey(42), 1, &fx.nodes);
    fx.handle_ok(&v1.address, &msg);
    let order = fx.order("o1").unwrap();
    assert_eq!(order.status(), OrderStatus::WaitSign);
    assert_eq!(keygen_of(&order).key_nodes.len(), 2);

    // Seeds 1 and 2 are the current key nodes, seed 3 joins.
    let v3 = key_node(3);
    let next = fx.rotate(key_nodes(3), true);
    assert!(next.key_node_set.contains(&v3.address));

    let order = fx.order("o1").unwrap();
    let keygen = keygen_of(&order);
    assert_eq!(order.status(), OrderStatus::Begin);
    assert_eq!(keygen.key_nodes, next.key_node_set);
    assert_eq!(keygen.sign_threshold, sign_threshold(3) as u64);

    // The fresh ceremony over all three nodes completes.
    let generated = fx.complete_ceremony("o1", 43);
    let expected = MockChainAdapter::expected_address("eth", &generated);
    assert_eq!(
        fx.cu(&b).unwrap().get_asset_address("eth", 2),
        Some(expected.as_str())
    );
    assert_eq!(fx.order("o1").unwrap().status(), OrderStatus::Finish);
}
