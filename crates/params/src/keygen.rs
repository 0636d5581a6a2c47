//! Limits for the keygen protocol.

use serde::{Deserialize, Serialize};

use crate::{
    default::{MAX_PRE_KEYGEN_ORDERS, MAX_WAIT_ASSIGN_KEY_ORDERS},
    errors::ParamsError,
};

/// Limits that bound how many ceremonies may be pre-generated ahead of demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyGenParams {
    /// The number of orders a single pre-keygen request may create.
    pub max_pre_keygen_orders: usize,

    /// The maximum number of completed ceremonies that may wait for a beneficiary.
    pub max_wait_assign_key_orders: usize,
}

impl Default for KeyGenParams {
    fn default() -> Self {
        Self {
            max_pre_keygen_orders: MAX_PRE_KEYGEN_ORDERS,
            max_wait_assign_key_orders: MAX_WAIT_ASSIGN_KEY_ORDERS,
        }
    }
}

impl KeyGenParams {
    pub(crate) fn validate(&self) -> Result<(), ParamsError> {
        if self.max_pre_keygen_orders == 0 {
            return Err(ParamsError::InvalidKeyGenLimit(
                "max_pre_keygen_orders must be positive".to_string(),
            ));
        }

        if self.max_pre_keygen_orders > self.max_wait_assign_key_orders {
            return Err(ParamsError::InvalidKeyGenLimit(format!(
                "max_pre_keygen_orders ({}) exceeds max_wait_assign_key_orders ({})",
                self.max_pre_keygen_orders, self.max_wait_assign_key_orders
            )));
        }

        Ok(())
    }
}
