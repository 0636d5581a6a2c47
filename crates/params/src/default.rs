//! Default values for the custody parameters.

use crate::tokens::TokenInfo;

/// Default symbol of the native token.
pub(crate) const NATIVE_SYMBOL: &str = "hbc";

/// Default number of orders a single pre-keygen request may create.
pub(crate) const MAX_PRE_KEYGEN_ORDERS: usize = 20;

/// Default upper bound of the wait-assign pool.
pub(crate) const MAX_WAIT_ASSIGN_KEY_ORDERS: usize = 100;

/// Default fee charged to a user custodian unit for opening an address.
pub(crate) const OPEN_FEE: u64 = 10_000_000;

/// Default number of operation custodian units per symbol.
pub(crate) const MAX_OP_CU_NUMBER: u64 = 2;

/// The tokens that are supported out of the box.
pub(crate) fn tokens() -> Vec<TokenInfo> {
    vec![
        TokenInfo {
            symbol: NATIVE_SYMBOL.to_string(),
            chain: NATIVE_SYMBOL.to_string(),
            is_native: true,
            open_fee: 0,
            sys_open_fee: 0,
            max_op_cu_number: 0,
        },
        TokenInfo {
            symbol: "btc".to_string(),
            chain: "btc".to_string(),
            is_native: false,
            open_fee: OPEN_FEE,
            sys_open_fee: 0,
            max_op_cu_number: MAX_OP_CU_NUMBER,
        },
        TokenInfo {
            symbol: "eth".to_string(),
            chain: "eth".to_string(),
            is_native: false,
            open_fee: OPEN_FEE,
            sys_open_fee: 0,
            max_op_cu_number: MAX_OP_CU_NUMBER,
        },
        TokenInfo {
            symbol: "usdt".to_string(),
            chain: "eth".to_string(),
            is_native: false,
            open_fee: OPEN_FEE,
            sys_open_fee: 0,
            max_op_cu_number: MAX_OP_CU_NUMBER,
        },
    ]
}
