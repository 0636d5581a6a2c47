//! In-flight custody operations.
//!
//! An [`Order`] is a tagged union of a common [`OrderBase`] and a per-type payload
//! ([`OrderKind`]). The [`OrderKeeper`] stores every order by ID forever and keeps a processing
//! index of the non-terminal ones, partitioned by [`OrderType`] so that a single type can be
//! scanned without touching the others.

pub mod errors;
pub mod keeper;
pub mod keys;
pub mod types;

pub use custody_primitives::order::{OrderStatus, OrderType};
pub use errors::{OrderError, OrderResult};
pub use keeper::OrderKeeper;
pub use types::{
    Order, OrderBase, OrderCollect, OrderKeyGen, OrderKind, OrderOpcuAssetTransfer,
    OrderSysTransfer, OrderWithdrawal,
};
