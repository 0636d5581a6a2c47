//! This crate provides test-utilities for the custody crates: deterministic key nodes that can
//! endorse generated keys, and an in-process chain adapter.

pub mod chain;
pub mod keys;

pub use chain::MockChainAdapter;
pub use keys::{generated_pubkey, key_node, key_nodes, KeyNode};
