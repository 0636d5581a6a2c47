//! Validator-set generations and the key nodes that take part in ceremonies.

use serde::{Deserialize, Serialize};

use crate::types::CuAddress;

/// A validator-set generation.
///
/// The staking layer owns epochs. The custody core only reads them, except through the
/// `after_new_epoch` hook that re-arms in-flight ceremonies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epoch {
    /// Monotonic index of this epoch.
    pub index: u64,

    /// The block height at which the epoch started.
    pub start_height: u64,

    /// The validators that hold key shares in this epoch, in canonical order.
    pub key_node_set: Vec<CuAddress>,

    /// Whether custody assets have been fully migrated to this epoch's keys.
    pub migration_finished: bool,

    /// A key node that is rotating out and must not join new ceremonies.
    pub rotating_out: Option<CuAddress>,
}

impl Epoch {
    /// Returns true if `addr` holds a key share in this epoch.
    pub fn is_key_node(&self, addr: &CuAddress) -> bool {
        self.key_node_set.contains(addr)
    }

    /// Returns the key nodes eligible for a new ceremony: the key-node set minus the node that is
    /// rotating out.
    pub fn keygen_nodes(&self) -> Vec<CuAddress> {
        self.key_node_set
            .iter()
            .filter(|node| Some(**node) != self.rotating_out)
            .copied()
            .collect()
    }

    /// Returns the number of signers required for a ceremony over [`Self::keygen_nodes`].
    pub fn keygen_threshold(&self) -> usize {
        sign_threshold(self.keygen_nodes().len())
    }
}

/// Returns `2f + 1` where `f = (n - 1) / 3` is the number of faulty key nodes tolerated among
/// `n`.
pub const fn sign_threshold(n: usize) -> usize {
    if n == 0 {
        return 0;
    }

    let f = (n - 1) / 3;
    2 * f + 1
}
