//! Errors while attaching or reading receipts.

use custody_primitives::errors::CodecError;
use thiserror::Error;

/// Errors while moving a receipt in or out of a transaction result.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// The receipt could not be encoded or decoded.
    #[error("codec: {0}")]
    Codec(#[from] CodecError),

    /// The result is a failure and therefore carries no receipt.
    #[error("result failed with code {0}")]
    FailedResult(u32),

    /// The result succeeded but its data is empty.
    #[error("result carries no receipt")]
    Missing,
}

/// Result type alias for receipt operations.
pub type ReceiptResult<T> = Result<T, ReceiptError>;
