//! Unit tests for `key_gen_finish`.

use custody_order::OrderStatus;
use custody_primitives::errors::CryptoError;
use custody_receipt::{Category, Flow};
use custody_test_utils::{generated_pubkey, MockChainAdapter};

use crate::{
    errors::KeyGenError,
    msgs::{Msg, MsgKeyGenFinish},
    testing::*,
};

/// Moves order `o1` from `user(1)` to `user(2)` into `WaitSign` with the key of seed 42.
fn wait_sign(fx: &mut Fixture) -> Vec<u8> {
    let (a, b) = (user(1), user(2));
    fx.fund(&a, FUNDS);
    fx.handle_ok(&a, &key_gen_msg("o1", "eth", a, b));

    let generated = generated_pubkey(42);
    let reporter = fx.nodes[0].address;
    let msg = wait_sign_msg(a, "o1", &generated, fx.epoch.index, &fx.nodes);
    fx.handle_ok(&reporter, &msg);

    generated
}

#[test]
fn test_finish_binds_address_and_charges_fee() {
    let mut fx = Fixture::new(3);
    let (a, b) = (user(1), user(2));
    let generated = wait_sign(&mut fx);
    let validator = fx.nodes[2];

    let receipt = fx.handle_ok(&validator.address, &finish_msg("o1", &generated, &validator));

    assert_eq!(receipt.category, Category::KeyGenFinish);
    let [Flow::Order(_), Flow::Balance(balance), Flow::KeyGenFinish(finish)] =
        receipt.flows.as_slice()
    else {
        panic!("unexpected flows {:?}", receipt.flows);
    };

    let expected = MockChainAdapter::expected_address("eth", &generated);
    assert_eq!(finish.to_addr, expected);
    assert!(!finish.is_pre_keygen);
    assert_eq!(balance.cu_address, a);
    assert_eq!(balance.balance_on_hold_change, -(OPEN_FEE as i128));
    assert_eq!(balance.balance_change, 0);

    let order = fx.order("o1").unwrap();
    assert_eq!(order.status(), OrderStatus::Finish);
    assert_eq!(keygen_of(&order).multi_sign_address, expected);

    let cu = fx.cu(&b).unwrap();
    assert_eq!(cu.get_asset_address("eth", 1), Some(expected.as_str()));
    assert_eq!(cu.get_asset_pubkey(1), Some(generated.as_slice()));

    let cus = *fx.keeper().cus();
    assert_eq!(
        cus.get_cu_from_ext_address(&fx.ctx(), "eth", &expected).unwrap(),
        Some(b)
    );

    assert_eq!(fx.held(&a), 0);
    assert_eq!(fx.balance(&a), FUNDS - OPEN_FEE);
    assert_eq!(fx.fee_pool(), OPEN_FEE);
    assert!(fx.processing().is_empty());
}

#[test]
fn test_finish_sub_token_binds_chain_slot() {
    let mut fx = Fixture::new(2);
    let (a, b) = (user(1), user(2));
    fx.fund(&a, FUNDS);
    fx.handle_ok(&a, &key_gen_msg("o1", "usdt", a, b));

    let generated = fx.complete_ceremony("o1", 42);

    let cu = fx.cu(&b).unwrap();
    let expected = MockChainAdapter::expected_address("eth", &generated);
    assert_eq!(cu.get_asset_address("usdt", 1), Some(expected.as_str()));
    assert_eq!(cu.get_asset_address("eth", 1), Some(expected.as_str()));
}

#[test]
fn test_finish_rejects_other_pubkey() {
    let mut fx = Fixture::new(2);
    wait_sign(&mut fx);
    let validator = fx.nodes[0];

    let msg = finish_msg("o1", &generated_pubkey(43), &validator);
    let result = fx.handle_err(&validator.address, &msg);

    assert_rejected(&result, KeyGenError::PubkeyMismatch("o1".to_string()));
    assert_eq!(fx.order("o1").unwrap().status(), OrderStatus::WaitSign);
}

#[test]
fn test_finish_requires_wait_sign() {
    let mut fx = Fixture::new(2);
    let (a, b) = (user(1), user(2));
    fx.fund(&a, FUNDS);
    fx.handle_ok(&a, &key_gen_msg("o1", "eth", a, b));
    let validator = fx.nodes[0];

    let msg = finish_msg("o1", &generated_pubkey(42), &validator);
    let result = fx.handle_err(&validator.address, &msg);

    assert_rejected(
        &result,
        KeyGenError::UnexpectedStatus {
            order_id: "o1".to_string(),
            status: OrderStatus::Begin,
        },
    );
}

#[test]
fn test_finish_signer_must_be_validator() {
    let mut fx = Fixture::new(2);
    let generated = wait_sign(&mut fx);
    let validator = fx.nodes[0];

    let other = fx.nodes[1].address;

    let msg = finish_msg("o1", &generated, &validator);
    let result = fx.handle_err(&other, &msg);

    assert_rejected(
        &result,
        KeyGenError::UnauthorizedSigner {
            expected: validator.address,
            actual: other,
        },
    );
}

#[test]
fn test_finish_rejects_unrecoverable_signature() {
    let mut fx = Fixture::new(2);
    let generated = wait_sign(&mut fx);
    let validator = fx.nodes[0];

    let mut signature = validator.sign_recoverable(&generated);
    signature[64] = 7;
    let msg = Msg::KeyGenFinish(MsgKeyGenFinish {
        order_id: "o1".to_string(),
        pubkey: generated,
        signature,
        validator: validator.address,
    });

    let result = fx.handle(&validator.address, &msg);

    assert_eq!(
        result.code,
        KeyGenError::Crypto(CryptoError::Unrecoverable(String::new())).code()
    );
    assert_eq!(fx.order("o1").unwrap().status(), OrderStatus::WaitSign);
}

#[test]
fn test_finish_rejects_order_from_previous_epoch() {
    let mut fx = Fixture::new(2);
    let generated = wait_sign(&mut fx);
    let validator = fx.nodes[0];

    // Rotation re-arms the order in Begin, so the old report no longer applies.
    let nodes = fx.nodes.clone();
    fx.rotate(nodes, true);
    let result = fx.handle_err(&validator.address, &finish_msg("o1", &generated, &validator));

    assert_rejected(
        &result,
        KeyGenError::UnexpectedStatus {
            order_id: "o1".to_string(),
            status: OrderStatus::Begin,
        },
    );
}
