//! The order record.

use custody_primitives::{
    order::{OrderStatus, OrderType},
    types::{Amount, CuAddress, OrderId},
};
use serde::{Deserialize, Serialize};

/// Fields shared by every order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBase {
    /// The custodian unit that initiated the order.
    pub cu_address: CuAddress,

    /// The caller-supplied, globally unique ID.
    pub id: OrderId,

    /// The lifecycle status.
    pub status: OrderStatus,

    /// The token the order is about.
    pub symbol: String,

    /// The block height at which the order was created.
    pub height: u64,
}

/// A keygen ceremony.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderKeyGen {
    /// The key nodes that must take part, in canonical order.
    pub key_nodes: Vec<CuAddress>,

    /// The minimum number of signers over `key_nodes`.
    pub sign_threshold: u64,

    /// The beneficiary. `None` for keys generated ahead of demand.
    pub to: Option<CuAddress>,

    /// The generated compressed public key, once reported.
    pub pubkey: Vec<u8>,

    /// The chain address derived from `pubkey`, once bound.
    pub multi_sign_address: String,

    /// The fee held from the initiator, charged on success.
    pub open_fee: Amount,

    /// The epoch whose key nodes run the ceremony.
    pub epoch: u64,
}

/// Sweeps a deposit into custody.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCollect {
    /// The unit that received the deposit.
    pub collect_from: CuAddress,

    /// The deposited amount.
    pub amount: Amount,

    /// The hash of the deposit transaction.
    pub tx_hash: String,
}

/// Pays out to an external address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithdrawal {
    /// The external destination.
    pub withdraw_to: String,

    /// The amount paid out.
    pub amount: Amount,

    /// The external gas fee.
    pub gas_fee: Amount,

    /// The hash of the payout transaction, once broadcast.
    pub tx_hash: String,
}

/// Moves funds to a system-controlled address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSysTransfer {
    /// The receiving unit.
    pub to_cu: CuAddress,

    /// The receiving external address.
    pub to_addr: String,

    /// The amount moved.
    pub amount: Amount,
}

/// Moves an operation unit's assets to its new key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOpcuAssetTransfer {
    /// The old external address.
    pub from_addr: String,

    /// The new external address.
    pub to_addr: String,

    /// The amount moved.
    pub amount: Amount,
}

/// The per-type payload of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    /// See [`OrderKeyGen`].
    KeyGen(OrderKeyGen),

    /// See [`OrderCollect`].
    Collect(OrderCollect),

    /// See [`OrderWithdrawal`].
    Withdrawal(OrderWithdrawal),

    /// See [`OrderSysTransfer`].
    SysTransfer(OrderSysTransfer),

    /// See [`OrderOpcuAssetTransfer`].
    OpcuAssetTransfer(OrderOpcuAssetTransfer),
}

impl OrderKind {
    /// Returns the discriminant.
    pub const fn order_type(&self) -> OrderType {
        match self {
            OrderKind::KeyGen(_) => OrderType::KeyGen,
            OrderKind::Collect(_) => OrderType::Collect,
            OrderKind::Withdrawal(_) => OrderType::Withdrawal,
            OrderKind::SysTransfer(_) => OrderType::SysTransfer,
            OrderKind::OpcuAssetTransfer(_) => OrderType::OpcuAssetTransfer,
        }
    }
}

/// One custody operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// The shared fields.
    pub base: OrderBase,

    /// The per-type payload.
    pub kind: OrderKind,
}

impl Order {
    /// Creates an order in `Begin`. The height is assigned when the order is stored.
    pub fn new(
        cu_address: CuAddress,
        id: impl Into<OrderId>,
        symbol: &str,
        kind: OrderKind,
    ) -> Self {
        Self {
            base: OrderBase {
                cu_address,
                id: id.into(),
                status: OrderStatus::Begin,
                symbol: symbol.to_string(),
                height: 0,
            },
            kind,
        }
    }

    /// Returns the order ID.
    pub fn id(&self) -> &str {
        &self.base.id
    }

    /// Returns the order type.
    pub const fn order_type(&self) -> OrderType {
        self.kind.order_type()
    }

    /// Returns the status.
    pub const fn status(&self) -> OrderStatus {
        self.base.status
    }

    /// Sets the status.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.base.status = status;
    }

    /// Returns the keygen payload of a keygen order.
    pub const fn as_keygen(&self) -> Option<&OrderKeyGen> {
        match &self.kind {
            OrderKind::KeyGen(k) => Some(k),
            _ => None,
        }
    }

    /// Returns the mutable keygen payload of a keygen order.
    pub fn as_keygen_mut(&mut self) -> Option<&mut OrderKeyGen> {
        match &mut self.kind {
            OrderKind::KeyGen(k) => Some(k),
            _ => None,
        }
    }
}
