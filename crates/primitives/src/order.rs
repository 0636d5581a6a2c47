//! Order discriminants and statuses shared by the order store and the receipt log.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of custody operation an order tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Generates an address for a custodian unit.
    KeyGen,

    /// Sweeps a deposit into an operation custodian unit.
    Collect,

    /// Pays out to an external address.
    Withdrawal,

    /// Moves funds between system-controlled addresses.
    SysTransfer,

    /// Moves an operation custodian unit's assets to a new key.
    OpcuAssetTransfer,
}

impl OrderType {
    /// Every order type, in index order.
    pub const ALL: [OrderType; 5] = [
        OrderType::KeyGen,
        OrderType::Collect,
        OrderType::Withdrawal,
        OrderType::SysTransfer,
        OrderType::OpcuAssetTransfer,
    ];

    /// Returns the stable two-byte code used in the processing index.
    pub const fn code(&self) -> u16 {
        match self {
            OrderType::KeyGen => 1,
            OrderType::Collect => 2,
            OrderType::Withdrawal => 3,
            OrderType::SysTransfer => 4,
            OrderType::OpcuAssetTransfer => 5,
        }
    }

    /// Returns the order type with the given code.
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderType::KeyGen => "keygen",
            OrderType::Collect => "collect",
            OrderType::Withdrawal => "withdrawal",
            OrderType::SysTransfer => "sys_transfer",
            OrderType::OpcuAssetTransfer => "opcu_asset_transfer",
        };

        write!(f, "{name}")
    }
}

/// The lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Created, waiting for the first round.
    Begin,

    /// The key nodes reported a result that awaits confirmation.
    WaitSign,

    /// Signing finished but the result has not been consumed yet.
    SignFinish,

    /// Done.
    Finish,

    /// Aborted.
    Cancel,
}

impl OrderStatus {
    /// Returns true if an order in this status no longer belongs in the processing index.
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::SignFinish | OrderStatus::Finish | OrderStatus::Cancel
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Begin => "begin",
            OrderStatus::WaitSign => "wait_sign",
            OrderStatus::SignFinish => "sign_finish",
            OrderStatus::Finish => "finish",
            OrderStatus::Cancel => "cancel",
        };

        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for t in OrderType::ALL {
            assert_eq!(OrderType::from_code(t.code()), Some(t));
        }
        assert_eq!(OrderType::from_code(0), None);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!OrderStatus::Begin.is_terminal());
        assert!(!OrderStatus::WaitSign.is_terminal());
        assert!(OrderStatus::SignFinish.is_terminal());
        assert!(OrderStatus::Finish.is_terminal());
        assert!(OrderStatus::Cancel.is_terminal());
    }
}
