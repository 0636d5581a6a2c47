//! Errors for the order store.

use custody_store::StoreError;
use thiserror::Error;

/// Errors raised by the order keeper.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The state backend failed.
    #[error("store: {0}")]
    Store(#[from] StoreError),

    /// A processing-index key does not have the expected layout.
    #[error("malformed processing index key: {0}")]
    MalformedIndexKey(String),
}

/// Result type alias for order operations.
pub type OrderResult<T> = Result<T, OrderError>;
