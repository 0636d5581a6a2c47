//! The outcome of executing one transaction.

use serde::{Deserialize, Serialize};

/// The result code of a successful transaction.
pub const CODE_OK: u32 = 0;

/// The deterministic outcome of a transaction, as seen by every validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResult {
    /// Zero on success, otherwise an error code unique within `codespace`.
    pub code: u32,

    /// The module that produced `code`.
    pub codespace: String,

    /// The encoded receipt of a successful transaction.
    pub data: Vec<u8>,

    /// A human-readable message.
    pub log: String,
}

impl TxResult {
    /// Creates an empty successful result.
    pub fn ok() -> Self {
        Self::default()
    }

    /// Creates a failed result.
    pub fn error(codespace: impl Into<String>, code: u32, log: impl Into<String>) -> Self {
        Self {
            code,
            codespace: codespace.into(),
            data: Vec::new(),
            log: log.into(),
        }
    }

    /// Returns true for a successful result.
    pub const fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }
}
