//! The audit log of every state-changing side effect.
//!
//! Handlers collect [`Flow`]s while they execute and wrap them in a [`Receipt`], which is
//! serialized into the data of a successful [`TxResult`]. Failed results never carry a receipt.

pub mod errors;
pub mod flows;
pub mod receipt;
pub mod result;

pub use errors::{ReceiptError, ReceiptResult};
pub use flows::{BalanceFlow, Flow, KeyGenFinishFlow, KeyGenFlow, KeyGenWaitSignFlow, OrderFlow};
pub use receipt::{get_receipt_from_result, save_receipt_to_result, Category, Receipt};
pub use result::TxResult;
