//! Receipts and their attachment to transaction results.

use custody_primitives::codec::Codec;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{ReceiptError, ReceiptResult},
    flows::Flow,
    result::TxResult,
};

/// The message family that produced a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// An address request.
    KeyGen,

    /// Key nodes reporting a generated public key.
    KeyGenWaitSign,

    /// A validator reporting that a ceremony finished.
    KeyGenFinish,

    /// Pre-generation of pooled keys.
    PreKeyGen,

    /// Migration of operation custodian units to new keys.
    OpcuMigrationKeyGen,

    /// Creation of an operation custodian unit.
    NewOpCu,
}

/// The ordered flows of one successful transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// The message family.
    pub category: Category,

    /// The flows, in the order the handler produced them.
    pub flows: Vec<Flow>,
}

impl Receipt {
    /// Creates a receipt.
    pub fn new(category: Category, flows: Vec<Flow>) -> Self {
        Self { category, flows }
    }
}

/// Encodes `receipt` into the data of `result`.
///
/// Does nothing if `result` is a failure.
pub fn save_receipt_to_result(
    codec: &Codec,
    receipt: &Receipt,
    result: &mut TxResult,
) -> ReceiptResult<()> {
    if !result.is_ok() {
        return Ok(());
    }

    result.data = codec.encode(receipt)?;
    Ok(())
}

/// Decodes the receipt carried by a successful `result`.
pub fn get_receipt_from_result(codec: &Codec, result: &TxResult) -> ReceiptResult<Receipt> {
    if !result.is_ok() {
        return Err(ReceiptError::FailedResult(result.code));
    }

    if result.data.is_empty() {
        return Err(ReceiptError::Missing);
    }

    Ok(codec.decode(&result.data)?)
}

#[cfg(test)]
mod tests {
    use custody_primitives::{
        order::{OrderStatus, OrderType},
        types::CuAddress,
    };
    use proptest::prelude::*;

    use super::*;
    use crate::flows::{BalanceFlow, KeyGenFinishFlow, KeyGenFlow, KeyGenWaitSignFlow, OrderFlow};

    fn arb_addr() -> impl Strategy<Value = CuAddress> {
        any::<[u8; 20]>().prop_map(CuAddress::new)
    }

    fn arb_flow() -> impl Strategy<Value = Flow> {
        prop_oneof![
            (arb_addr(), "[a-z]{1,5}", "[a-z0-9]{1,12}").prop_map(|(cu, symbol, id)| {
                Flow::Order(OrderFlow {
                    symbol,
                    cu_address: cu,
                    order_id: id,
                    order_type: OrderType::KeyGen,
                    order_status: OrderStatus::Begin,
                })
            }),
            (arb_addr(), any::<u64>(), any::<i64>()).prop_map(|(cu, prev, change)| {
                Flow::Balance(BalanceFlow {
                    cu_address: cu,
                    symbol: "hbc".to_string(),
                    previous_balance: u128::from(prev),
                    balance_change: i128::from(change),
                    previous_balance_on_hold: 0,
                    balance_on_hold_change: -i128::from(change),
                })
            }),
            (arb_addr(), proptest::option::of(arb_addr()), any::<u64>()).prop_map(
                |(from, to, fee)| {
                    Flow::KeyGen(KeyGenFlow {
                        order_id: "o".to_string(),
                        symbol: "eth".to_string(),
                        from,
                        to,
                        is_pre_keygen: to.is_none(),
                        open_fee: u128::from(fee),
                    })
                }
            ),
            proptest::collection::vec(any::<u8>(), 33).prop_map(|pubkey| {
                Flow::KeyGenWaitSign(KeyGenWaitSignFlow {
                    order_id: "o".to_string(),
                    pubkey,
                })
            }),
            ("[a-z0-9]{0,40}", any::<bool>()).prop_map(|(to_addr, is_pre_keygen)| {
                Flow::KeyGenFinish(KeyGenFinishFlow {
                    order_id: "o".to_string(),
                    to_addr,
                    is_pre_keygen,
                })
            }),
        ]
    }

    #[test]
    fn failed_result_carries_no_receipt() {
        let codec = Codec::default();
        let receipt = Receipt::new(Category::KeyGen, vec![]);
        let mut result = TxResult::error("keygen", 7, "boom");

        save_receipt_to_result(&codec, &receipt, &mut result).unwrap();

        assert!(result.data.is_empty());
        assert!(matches!(
            get_receipt_from_result(&codec, &result),
            Err(ReceiptError::FailedResult(7))
        ));
    }

    #[test]
    fn empty_data_is_missing() {
        assert!(matches!(
            get_receipt_from_result(&Codec::default(), &TxResult::ok()),
            Err(ReceiptError::Missing)
        ));
    }

    proptest! {
        #[test]
        fn receipt_survives_result(flows in proptest::collection::vec(arb_flow(), 0..8)) {
            let codec = Codec::default();
            let receipt = Receipt::new(Category::KeyGen, flows);
            let mut result = TxResult::ok();

            save_receipt_to_result(&codec, &receipt, &mut result).unwrap();
            let decoded = get_receipt_from_result(&codec, &result).unwrap();

            prop_assert_eq!(decoded, receipt);
        }
    }
}
