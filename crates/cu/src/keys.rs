//! Key layout of the custodian-unit namespace.

use custody_primitives::types::{CuAddress, CU_ADDRESS_LEN};
use custody_store::Namespace;

/// The namespace owned by [`CuKeeper`](crate::CuKeeper).
pub const CU_NAMESPACE: Namespace = Namespace::new(b"cu/");

/// The namespace owned by [`FeePool`](crate::FeePool).
pub const FEE_POOL_NAMESPACE: Namespace = Namespace::new(b"feepool/");

const CU_PREFIX: u8 = 0x01;
const OP_CU_PREFIX: u8 = 0x02;
const SEPARATOR: u8 = 0x01;
const EXT_ADDRESS_PREFIX: &[u8] = b"extAddress";

/// `0x01 ‖ address`
pub fn cu_key(addr: &CuAddress) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + CU_ADDRESS_LEN);
    key.push(CU_PREFIX);
    key.extend_from_slice(addr.as_bytes());
    key
}

/// The prefix of every custodian-unit record.
pub fn cu_prefix() -> Vec<u8> {
    vec![CU_PREFIX]
}

/// `0x02 ‖ symbol ‖ 0x01 ‖ address`
pub fn op_cu_key(symbol: &str, addr: &CuAddress) -> Vec<u8> {
    let mut key = op_cu_prefix(symbol);
    key.extend_from_slice(addr.as_bytes());
    key
}

/// The prefix of the operation units of `symbol`, or of all of them if `symbol` is empty.
pub fn op_cu_prefix(symbol: &str) -> Vec<u8> {
    let mut key = vec![OP_CU_PREFIX];
    if !symbol.is_empty() {
        key.extend_from_slice(symbol.as_bytes());
        key.push(SEPARATOR);
    }
    key
}

/// Returns the address at the tail of an operation-unit index key.
pub fn address_from_op_cu_key(key: &[u8]) -> Option<CuAddress> {
    let start = key.len().checked_sub(CU_ADDRESS_LEN)?;
    CuAddress::try_from(&key[start..]).ok()
}

/// `"extAddress" ‖ chain ‖ 0x01 ‖ external address`
pub fn ext_address_key(chain: &str, ext_address: &str) -> Vec<u8> {
    let mut key = EXT_ADDRESS_PREFIX.to_vec();
    key.extend_from_slice(chain.as_bytes());
    key.push(SEPARATOR);
    key.extend_from_slice(ext_address.as_bytes());
    key
}
