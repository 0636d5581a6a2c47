//! Unit tests for `key_gen_wait_sign`.

use custody_order::OrderStatus;
use custody_primitives::{errors::CryptoError, secp::KeySig, types::CuAddress};
use custody_receipt::{Category, Flow};
use custody_test_utils::{generated_pubkey, key_node, key_nodes};

use crate::{
    errors::KeyGenError,
    msgs::{Msg, MsgKeyGenWaitSign},
    testing::*,
};

/// Starts order `o1` from `user(1)` to `user(2)` and returns the initiator.
fn start(fx: &mut Fixture) -> CuAddress {
    let (a, b) = (user(1), user(2));
    fx.fund(&a, FUNDS);
    fx.handle_ok(&a, &key_gen_msg("o1", "eth", a, b));
    a
}

#[test]
fn test_wait_sign_stores_compressed_pubkey() {
    let mut fx = Fixture::new(3);
    let a = start(&mut fx);
    let generated = key_node(77).pubkey;
    let compressed = generated.serialize().to_vec();

    let msg = Msg::KeyGenWaitSign(MsgKeyGenWaitSign {
        from: a,
        order_id: "o1".to_string(),
        pubkey: generated.serialize_uncompressed().to_vec(),
        key_nodes: fx.nodes.iter().map(|n| n.address).collect(),
        key_sigs: fx.nodes.iter().map(|n| n.sign_pubkey(&compressed)).collect(),
        epoch: 1,
    });
    let reporter = fx.nodes[1].address;
    let receipt = fx.handle_ok(&reporter, &msg);

    assert_eq!(receipt.category, Category::KeyGenWaitSign);
    let [Flow::Order(order_flow), Flow::KeyGenWaitSign(flow)] = receipt.flows.as_slice() else {
        panic!("unexpected flows {:?}", receipt.flows);
    };
    assert_eq!(order_flow.order_status, OrderStatus::WaitSign);
    assert_eq!(flow.pubkey, compressed);

    let order = fx.order("o1").unwrap();
    assert_eq!(order.status(), OrderStatus::WaitSign);
    assert_eq!(keygen_of(&order).pubkey, compressed);
    assert_eq!(fx.processing(), vec!["o1".to_string()]);
}

#[test]
fn test_wait_sign_requires_every_key_node() {
    let mut fx = Fixture::new(4);
    let a = start(&mut fx);
    let reporter = fx.nodes[0].address;
    let generated = generated_pubkey(42);

    // A threshold of signers is not enough.
    let msg = wait_sign_msg(a, "o1", &generated, 1, &fx.nodes[..3]);
    let result = fx.handle_err(&reporter, &msg);
    assert_rejected(&result, KeyGenError::KeyNodesMismatch);

    // Listing every node but letting an outsider sign for one of them.
    let outsider = key_node(99);
    let mut msg = MsgKeyGenWaitSign {
        from: a,
        order_id: "o1".to_string(),
        pubkey: generated.clone(),
        key_nodes: fx.nodes.iter().map(|n| n.address).collect(),
        key_sigs: fx.nodes.iter().map(|n| n.sign_pubkey(&generated)).collect(),
        epoch: 1,
    };
    msg.key_sigs[3] = outsider.sign_pubkey(&generated);
    let result = fx.handle_err(&reporter, &Msg::KeyGenWaitSign(msg));
    assert_rejected(&result, KeyGenError::KeyNodesMismatch);

    assert_eq!(fx.order("o1").unwrap().status(), OrderStatus::Begin);
}

#[test]
fn test_wait_sign_rejects_signature_over_other_key() {
    let mut fx = Fixture::new(2);
    let a = start(&mut fx);
    let reporter = fx.nodes[0].address;
    let generated = generated_pubkey(42);
    let other = generated_pubkey(43);

    let key_sigs: Vec<KeySig> = fx.nodes.iter().map(|n| n.sign_pubkey(&other)).collect();
    let msg = Msg::KeyGenWaitSign(MsgKeyGenWaitSign {
        from: a,
        order_id: "o1".to_string(),
        pubkey: generated,
        key_nodes: fx.nodes.iter().map(|n| n.address).collect(),
        key_sigs,
        epoch: 1,
    });

    let result = fx.handle(&reporter, &msg);

    assert_eq!(
        result.code,
        KeyGenError::Crypto(CryptoError::BadSignature(String::new())).code()
    );
    assert!(result.log.contains("does not verify"), "{}", result.log);
}

#[test]
fn test_wait_sign_rejects_stale_epoch() {
    let mut fx = Fixture::new(2);
    let a = start(&mut fx);
    let reporter = fx.nodes[0].address;

    let msg = wait_sign_msg(a, "o1", &generated_pubkey(42), 2, &fx.nodes);
    let result = fx.handle_err(&reporter, &msg);

    assert_rejected(
        &result,
        KeyGenError::StaleEpoch {
            expected: 1,
            actual: 2,
        },
    );
}

#[test]
fn test_wait_sign_signer_must_be_key_node() {
    let mut fx = Fixture::new(2);
    let a = start(&mut fx);

    let msg = wait_sign_msg(a, "o1", &generated_pubkey(42), 1, &fx.nodes);
    let result = fx.handle_err(&a, &msg);

    assert_rejected(&result, KeyGenError::NotKeyNode(a));
}

#[test]
fn test_wait_sign_for_operation_unit_requires_key_node_from() {
    let mut fx = Fixture::new(2);
    let node = fx.nodes[0].address;
    let op = user(9);
    fx.create_op_cu("btc", &op);
    fx.handle_ok(&node, &key_gen_msg("o1", "btc", node, op));

    let outsider = user(1);
    let msg = wait_sign_msg(outsider, "o1", &generated_pubkey(42), 1, &fx.nodes);
    let result = fx.handle_err(&node, &msg);
    assert_rejected(&result, KeyGenError::NotKeyNode(outsider));

    let msg = wait_sign_msg(node, "o1", &generated_pubkey(42), 1, &fx.nodes);
    fx.handle_ok(&node, &msg);
}

#[test]
fn test_wait_sign_only_from_begin() {
    let mut fx = Fixture::new(2);
    let a = start(&mut fx);
    let reporter = fx.nodes[0].address;
    let msg = wait_sign_msg(a, "o1", &generated_pubkey(42), 1, &fx.nodes);

    fx.handle_ok(&reporter, &msg);
    let result = fx.handle_err(&reporter, &msg);

    assert_rejected(
        &result,
        KeyGenError::UnexpectedStatus {
            order_id: "o1".to_string(),
            status: OrderStatus::WaitSign,
        },
    );
}

#[test]
fn test_wait_sign_unknown_order() {
    let mut fx = Fixture::new(2);
    let reporter = fx.nodes[0].address;

    let msg = wait_sign_msg(reporter, "nope", &generated_pubkey(42), 1, &fx.nodes);
    let result = fx.handle_err(&reporter, &msg);

    assert_rejected(&result, KeyGenError::OrderNotFound("nope".to_string()));
}

#[test]
fn test_wait_sign_after_epoch_change_needs_new_nodes() {
    let mut fx = Fixture::new(2);
    let a = start(&mut fx);
    let old_nodes = fx.nodes.clone();
    let next = fx.rotate(key_nodes(3), true);
    let reporter = fx.nodes[0].address;

    let msg = wait_sign_msg(a, "o1", &generated_pubkey(42), next.index, &old_nodes);
    let result = fx.handle_err(&reporter, &msg);
    assert_rejected(&result, KeyGenError::KeyNodesMismatch);

    let msg = wait_sign_msg(a, "o1", &generated_pubkey(42), next.index, &fx.nodes);
    fx.handle_ok(&reporter, &msg);
}
