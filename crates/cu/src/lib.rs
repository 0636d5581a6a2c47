//! The custodian-unit account model.
//!
//! A [`CustodianUnit`] is the on-chain record of who controls which address on which external
//! chain, together with its balances. [`CuKeeper`] persists units and the secondary indexes the
//! keygen protocol relies on, [`Bank`] moves balances and reports every change as a
//! [`BalanceFlow`](custody_receipt::BalanceFlow), and [`FeePool`] collects charged fees.

pub mod asset;
pub mod bank;
pub mod errors;
pub mod fee_pool;
pub mod keeper;
pub mod keys;
pub mod unit;

pub use asset::{AssetInfo, MigrationStatus};
pub use bank::Bank;
pub use errors::{CuError, CuResult};
pub use fee_pool::FeePool;
pub use keeper::CuKeeper;
pub use unit::CustodianUnit;
