//! This crate contains general types, traits and pure functions that need to be shared across
//! multiple crates.
//!
//! It lies near the bottom of the crate-hierarchy in this workspace: it only depends on external
//! crates, so every keeper and handler can use its types without creating cycles.

pub mod chain;
pub mod codec;
pub mod epoch;
pub mod errors;
pub mod order;
pub mod secp;
pub mod types;
