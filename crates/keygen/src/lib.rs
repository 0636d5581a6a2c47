//! The keygen protocol.
//!
//! A keygen order asks the key nodes of the current epoch to run a threshold key-generation
//! ceremony for a custodian unit's slot of one token. An order moves through
//!
//! ```text
//! Begin --KeyGenWaitSign--> WaitSign --KeyGenFinish--> Finish
//!                                                  \--> SignFinish (no beneficiary, pooled)
//! ```
//!
//! and is re-armed in `Begin` whenever a new epoch starts before it finishes. Keys generated
//! without a beneficiary ([`MsgPreKeyGen`]) wait in the [`WaitAssignPool`] until a later
//! [`MsgKeyGen`] claims one.
//!
//! [`KeyGenHandler`] is the entry point for messages. [`EpochHooks`] is the entry point for the
//! start of a new epoch.

pub mod epoch;
pub mod errors;
pub mod handler;
pub mod hooks;
pub mod keeper;
pub mod msgs;
pub mod pool;
pub mod tokens;
mod transitions;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;

pub use epoch::{EpochKeeper, StoreEpochKeeper};
pub use errors::{KeyGenError, KeyGenResult};
pub use handler::{KeyGenHandler, CODESPACE};
pub use hooks::{EpochHooks, EpochObserver};
pub use keeper::KeyGenKeeper;
pub use msgs::{
    Msg, MsgKeyGen, MsgKeyGenFinish, MsgKeyGenWaitSign, MsgNewOpCu, MsgOpcuMigrationKeyGen,
    MsgPreKeyGen,
};
pub use pool::WaitAssignPool;
pub use tokens::{TokenKeeper, TokenTable};
