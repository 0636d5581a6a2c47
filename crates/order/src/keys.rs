//! Key layout of the order namespace.

use custody_primitives::order::OrderType;
use custody_store::Namespace;

use crate::errors::{OrderError, OrderResult};

/// The namespace owned by [`OrderKeeper`](crate::OrderKeeper).
pub const ORDER_NAMESPACE: Namespace = Namespace::new(b"order/");

const ORDER_PREFIX: [u8; 2] = [0x01, 0x02];
const PROCESS_PREFIX: [u8; 2] = [0x03, 0x04];

/// `0x01 0x02 ‖ id`
pub fn order_key(id: &str) -> Vec<u8> {
    let mut key = ORDER_PREFIX.to_vec();
    key.extend_from_slice(id.as_bytes());
    key
}

/// `0x03 0x04 ‖ type (u16, big-endian) ‖ id`
pub fn process_key(order_type: OrderType, id: &str) -> Vec<u8> {
    let mut key = process_prefix(Some(order_type));
    key.extend_from_slice(id.as_bytes());
    key
}

/// The prefix of the processing index of `order_type`, or of the whole index.
pub fn process_prefix(order_type: Option<OrderType>) -> Vec<u8> {
    let mut key = PROCESS_PREFIX.to_vec();
    if let Some(t) = order_type {
        key.extend_from_slice(&t.code().to_be_bytes());
    }
    key
}

/// Splits a processing-index key into its type and order ID.
pub fn parse_process_key(key: &[u8]) -> OrderResult<(OrderType, String)> {
    let malformed = || {
        OrderError::MalformedIndexKey(key.iter().map(|b| format!("{b:02x}")).collect())
    };

    let rest = key.strip_prefix(&PROCESS_PREFIX[..]).ok_or_else(malformed)?;
    if rest.len() < 2 {
        return Err(malformed());
    }

    let code = u16::from_be_bytes([rest[0], rest[1]]);
    let order_type = OrderType::from_code(code).ok_or_else(malformed)?;
    let id = String::from_utf8(rest[2..].to_vec()).map_err(|_| malformed())?;

    Ok((order_type, id))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn layout_matches_wire_format() {
        assert_eq!(order_key("o1"), vec![0x01, 0x02, b'o', b'1']);
        assert_eq!(
            process_key(OrderType::Withdrawal, "o1"),
            vec![0x03, 0x04, 0x00, 0x03, b'o', b'1']
        );
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(parse_process_key(&[0x03, 0x04, 0xff, 0xff, b'x']).is_err());
        assert!(parse_process_key(&[0x03, 0x04, 0x00]).is_err());
    }

    proptest! {
        #[test]
        fn process_key_parses_back(idx in 0usize..5, id in "[a-zA-Z0-9-]{0,36}") {
            let t = OrderType::ALL[idx];
            prop_assert_eq!(parse_process_key(&process_key(t, &id)).unwrap(), (t, id.clone()));
            prop_assert!(process_key(t, &id).starts_with(&process_prefix(Some(t))));
        }
    }
}
