//! Messages handled by the keygen protocol.

use std::{collections::BTreeSet, fmt};

use custody_primitives::{
    secp::{KeySig, RECOVERABLE_SIG_LEN},
    types::{CuAddress, OrderId},
};
use custody_receipt::Category;
use serde::{Deserialize, Serialize};

use crate::errors::{KeyGenError, KeyGenResult};

/// Requests an address for `to`'s `symbol` slot, paid for by `from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgKeyGen {
    /// The ID of the order to create.
    pub order_id: OrderId,

    /// The token.
    pub symbol: String,

    /// The initiator, who pays the open fee.
    pub from: CuAddress,

    /// The beneficiary.
    pub to: CuAddress,
}

/// Key nodes report the public key they generated for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgKeyGenWaitSign {
    /// The reporting key node.
    pub from: CuAddress,

    /// The keygen order.
    pub order_id: OrderId,

    /// The generated public key, compressed or uncompressed.
    #[serde(with = "hex::serde")]
    pub pubkey: Vec<u8>,

    /// The key nodes that took part.
    pub key_nodes: Vec<CuAddress>,

    /// One endorsement of `pubkey` per key node.
    pub key_sigs: Vec<KeySig>,

    /// The epoch the ceremony ran in.
    pub epoch: u64,
}

/// A validator reports that a ceremony finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgKeyGenFinish {
    /// The keygen order.
    pub order_id: OrderId,

    /// The public key reported for the order.
    #[serde(with = "hex::serde")]
    pub pubkey: Vec<u8>,

    /// A 65-byte recoverable signature over `sha256(pubkey)`.
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,

    /// The reporting validator.
    pub validator: CuAddress,
}

/// Pre-generates keys with no beneficiary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgPreKeyGen {
    /// The requesting key node.
    pub from: CuAddress,

    /// One ID per key to generate.
    pub order_ids: Vec<OrderId>,
}

/// Generates new keys for every operation unit after a validator-set change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgOpcuMigrationKeyGen {
    /// The requesting key node.
    pub from: CuAddress,

    /// One ID per operation unit.
    pub order_ids: Vec<OrderId>,
}

/// Creates an operation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgNewOpCu {
    /// The token the unit will hold.
    pub symbol: String,

    /// The address of the new unit.
    pub op_cu_address: CuAddress,

    /// The requesting key node.
    pub from: CuAddress,
}

/// Any keygen message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Msg {
    /// See [`MsgKeyGen`].
    KeyGen(MsgKeyGen),

    /// See [`MsgKeyGenWaitSign`].
    KeyGenWaitSign(MsgKeyGenWaitSign),

    /// See [`MsgKeyGenFinish`].
    KeyGenFinish(MsgKeyGenFinish),

    /// See [`MsgPreKeyGen`].
    PreKeyGen(MsgPreKeyGen),

    /// See [`MsgOpcuMigrationKeyGen`].
    OpcuMigrationKeyGen(MsgOpcuMigrationKeyGen),

    /// See [`MsgNewOpCu`].
    NewOpCu(MsgNewOpCu),
}

impl Msg {
    /// Returns the party that must sign the transaction carrying this message.
    ///
    /// `None` for [`MsgKeyGenWaitSign`], which any current key node may submit on behalf of
    /// `from`.
    pub const fn expected_signer(&self) -> Option<CuAddress> {
        match self {
            Msg::KeyGen(m) => Some(m.from),
            Msg::KeyGenWaitSign(_) => None,
            Msg::KeyGenFinish(m) => Some(m.validator),
            Msg::PreKeyGen(m) => Some(m.from),
            Msg::OpcuMigrationKeyGen(m) => Some(m.from),
            Msg::NewOpCu(m) => Some(m.from),
        }
    }

    /// Returns the receipt category of this message.
    pub const fn category(&self) -> Category {
        match self {
            Msg::KeyGen(_) => Category::KeyGen,
            Msg::KeyGenWaitSign(_) => Category::KeyGenWaitSign,
            Msg::KeyGenFinish(_) => Category::KeyGenFinish,
            Msg::PreKeyGen(_) => Category::PreKeyGen,
            Msg::OpcuMigrationKeyGen(_) => Category::OpcuMigrationKeyGen,
            Msg::NewOpCu(_) => Category::NewOpCu,
        }
    }

    /// Performs the checks that need no state.
    pub fn validate_basic(&self) -> KeyGenResult<()> {
        match self {
            Msg::KeyGen(m) => {
                check_id(&m.order_id)?;
                check_symbol(&m.symbol)?;
                check_address("from", &m.from)?;
                check_address("to", &m.to)
            }
            Msg::KeyGenWaitSign(m) => {
                check_id(&m.order_id)?;
                check_address("from", &m.from)?;
                if m.pubkey.is_empty() {
                    return Err(invalid("pubkey is empty"));
                }
                if m.key_nodes.is_empty() {
                    return Err(invalid("key_nodes is empty"));
                }
                if m.key_sigs.len() != m.key_nodes.len() {
                    return Err(invalid(format!(
                        "{} signatures for {} key nodes",
                        m.key_sigs.len(),
                        m.key_nodes.len()
                    )));
                }
                check_unique_addresses(&m.key_nodes)
            }
            Msg::KeyGenFinish(m) => {
                check_id(&m.order_id)?;
                check_address("validator", &m.validator)?;
                if m.pubkey.is_empty() {
                    return Err(invalid("pubkey is empty"));
                }
                if m.signature.len() != RECOVERABLE_SIG_LEN {
                    return Err(invalid(format!(
                        "signature must be {RECOVERABLE_SIG_LEN} bytes, got {}",
                        m.signature.len()
                    )));
                }
                Ok(())
            }
            Msg::PreKeyGen(m) => {
                check_address("from", &m.from)?;
                check_ids(&m.order_ids)
            }
            Msg::OpcuMigrationKeyGen(m) => {
                check_address("from", &m.from)?;
                check_ids(&m.order_ids)
            }
            Msg::NewOpCu(m) => {
                check_symbol(&m.symbol)?;
                check_address("from", &m.from)?;
                check_address("op_cu_address", &m.op_cu_address)
            }
        }
    }
}

impl fmt::Display for Msg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Msg::KeyGen(m) => write!(f, "KeyGen({}, {})", m.order_id, m.symbol),
            Msg::KeyGenWaitSign(m) => write!(f, "KeyGenWaitSign({})", m.order_id),
            Msg::KeyGenFinish(m) => write!(f, "KeyGenFinish({})", m.order_id),
            Msg::PreKeyGen(m) => write!(f, "PreKeyGen({} orders)", m.order_ids.len()),
            Msg::OpcuMigrationKeyGen(m) => {
                write!(f, "OpcuMigrationKeyGen({} orders)", m.order_ids.len())
            }
            Msg::NewOpCu(m) => write!(f, "NewOpCu({}, {})", m.symbol, m.op_cu_address),
        }
    }
}

fn invalid(reason: impl Into<String>) -> KeyGenError {
    KeyGenError::InvalidMsg(reason.into())
}

fn check_id(id: &str) -> KeyGenResult<()> {
    if id.is_empty() {
        return Err(invalid("order id is empty"));
    }

    Ok(())
}

fn check_ids(ids: &[OrderId]) -> KeyGenResult<()> {
    if ids.is_empty() {
        return Err(invalid("order_ids is empty"));
    }

    let mut seen = BTreeSet::new();
    for id in ids {
        check_id(id)?;
        if !seen.insert(id) {
            return Err(invalid(format!("order id {id} is repeated")));
        }
    }

    Ok(())
}

fn check_symbol(symbol: &str) -> KeyGenResult<()> {
    if symbol.is_empty() {
        return Err(invalid("symbol is empty"));
    }

    Ok(())
}

fn check_address(field: &str, addr: &CuAddress) -> KeyGenResult<()> {
    if addr.is_empty() {
        return Err(invalid(format!("{field} is empty")));
    }

    Ok(())
}

fn check_unique_addresses(addrs: &[CuAddress]) -> KeyGenResult<()> {
    let unique: BTreeSet<_> = addrs.iter().collect();
    if unique.len() != addrs.len() {
        return Err(invalid("key_nodes contains duplicates"));
    }

    Ok(())
}
