//! Typed audit records.

use custody_primitives::{
    order::{OrderStatus, OrderType},
    types::{Amount, CuAddress, OrderId},
};
use serde::{Deserialize, Serialize};

/// One side effect of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flow {
    /// An order was created or changed status.
    Order(OrderFlow),

    /// A balance or held balance changed.
    Balance(BalanceFlow),

    /// A keygen ceremony was requested.
    KeyGen(KeyGenFlow),

    /// Key nodes reported a generated public key.
    KeyGenWaitSign(KeyGenWaitSignFlow),

    /// A generated address was bound or pooled.
    KeyGenFinish(KeyGenFinishFlow),
}

/// Records the status of an order after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFlow {
    /// The token the order is about.
    pub symbol: String,

    /// The custodian unit that initiated the order.
    pub cu_address: CuAddress,

    /// The order.
    pub order_id: OrderId,

    /// The kind of order.
    pub order_type: OrderType,

    /// The status the order moved to.
    pub order_status: OrderStatus,
}

/// Records a balance change of one custodian unit in one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceFlow {
    /// The custodian unit whose balance changed.
    pub cu_address: CuAddress,

    /// The token.
    pub symbol: String,

    /// The available balance before the change.
    pub previous_balance: Amount,

    /// The signed change of the available balance.
    pub balance_change: i128,

    /// The held balance before the change.
    pub previous_balance_on_hold: Amount,

    /// The signed change of the held balance.
    pub balance_on_hold_change: i128,
}

impl BalanceFlow {
    /// Returns the available balance after the change.
    pub fn balance(&self) -> Option<Amount> {
        apply_delta(self.previous_balance, self.balance_change)
    }

    /// Returns the held balance after the change.
    pub fn balance_on_hold(&self) -> Option<Amount> {
        apply_delta(self.previous_balance_on_hold, self.balance_on_hold_change)
    }
}

/// Returns `next - prev` as a signed value, or `None` if it does not fit.
pub fn signed_delta(prev: Amount, next: Amount) -> Option<i128> {
    if next >= prev {
        i128::try_from(next - prev).ok()
    } else {
        i128::try_from(prev - next).ok().map(|d| -d)
    }
}

fn apply_delta(value: Amount, delta: i128) -> Option<Amount> {
    if delta >= 0 {
        value.checked_add(delta.unsigned_abs())
    } else {
        value.checked_sub(delta.unsigned_abs())
    }
}

/// Records a keygen request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyGenFlow {
    /// The keygen order.
    pub order_id: OrderId,

    /// The token the address is for.
    pub symbol: String,

    /// The custodian unit that requested, and pays for, the address.
    pub from: CuAddress,

    /// The beneficiary, if any.
    pub to: Option<CuAddress>,

    /// Whether the order was created ahead of demand, with no beneficiary.
    pub is_pre_keygen: bool,

    /// The fee held for the ceremony.
    pub open_fee: Amount,
}

/// Records the public key reported by the key nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyGenWaitSignFlow {
    /// The keygen order.
    pub order_id: OrderId,

    /// The compressed public key.
    pub pubkey: Vec<u8>,
}

/// Records the end of a ceremony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyGenFinishFlow {
    /// The keygen order.
    pub order_id: OrderId,

    /// The derived chain address. Empty when the key went to the wait-assign pool.
    pub to_addr: String,

    /// Whether the key went to the wait-assign pool.
    pub is_pre_keygen: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_flow_applies_changes() {
        let flow = BalanceFlow {
            cu_address: CuAddress::new([1; 20]),
            symbol: "hbc".to_string(),
            previous_balance: 100,
            balance_change: signed_delta(100, 40).unwrap(),
            previous_balance_on_hold: 0,
            balance_on_hold_change: signed_delta(0, 60).unwrap(),
        };

        assert_eq!(flow.balance_change, -60);
        assert_eq!(flow.balance(), Some(40));
        assert_eq!(flow.balance_on_hold(), Some(60));
    }

    #[test]
    fn oversized_delta_does_not_fit() {
        assert_eq!(signed_delta(0, u128::MAX), None);
        assert_eq!(signed_delta(u128::MAX, 0), None);
    }
}
