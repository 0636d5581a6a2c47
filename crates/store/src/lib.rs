//! Versioned key-value state for the custody keepers.
//!
//! Every keeper reads and writes through a [`Context`], which wraps a [`KvStore`] backend and the
//! height of the block being executed. Backends:
//!
//! - [`MemStore`]: an ordered in-memory map, used by tests and replay without a data directory.
//! - [`SledStore`]: a persistent sled tree.
//! - [`CacheStore`]: a write overlay on top of another store that is committed only when a
//!   transaction succeeds.

pub mod cache;
pub mod context;
pub mod errors;
pub mod mem;
pub mod namespace;
pub mod persistent;
pub mod traits;

pub use cache::CacheStore;
pub use context::Context;
pub use errors::{StoreError, StoreResult};
pub use mem::MemStore;
pub use namespace::Namespace;
pub use persistent::SledStore;
pub use traits::KvStore;
