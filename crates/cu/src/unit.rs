//! The custodian-unit record.

use std::collections::BTreeMap;

use custody_primitives::types::{Amount, CuAddress, CuType};
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};

use crate::{
    asset::{AssetInfo, MigrationStatus},
    errors::{CuError, CuResult},
};

/// An on-chain account that can own addresses on external chains.
///
/// The identity fields are write-once: the address is fixed at construction, the public key can
/// be revealed once and must hash to the address, and the symbol of an operation unit is set once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodianUnit {
    cu_type: CuType,
    address: CuAddress,
    pubkey: Option<Vec<u8>>,
    sequence: u64,
    symbol: String,
    assets: Vec<AssetInfo>,
    coins: BTreeMap<String, Amount>,
    coins_hold: BTreeMap<String, Amount>,
    gas_used: BTreeMap<String, Amount>,
    gas_received: BTreeMap<String, Amount>,
    migration_status: MigrationStatus,
}

impl CustodianUnit {
    /// Creates an empty unit.
    pub fn new(cu_type: CuType, address: CuAddress) -> Self {
        Self {
            cu_type,
            address,
            pubkey: None,
            sequence: 0,
            symbol: String::new(),
            assets: Vec::new(),
            coins: BTreeMap::new(),
            coins_hold: BTreeMap::new(),
            gas_used: BTreeMap::new(),
            gas_received: BTreeMap::new(),
            migration_status: MigrationStatus::Unknown,
        }
    }

    /// Creates an operation unit bound to `symbol`.
    pub fn new_op(symbol: &str, address: CuAddress) -> CuResult<Self> {
        let mut cu = Self::new(CuType::Operation, address);
        cu.set_symbol(symbol)?;
        Ok(cu)
    }

    /// Returns the kind of unit.
    pub const fn cu_type(&self) -> CuType {
        self.cu_type
    }

    /// Returns true for an operation unit.
    pub fn is_operation(&self) -> bool {
        self.cu_type == CuType::Operation
    }

    /// Returns the unit's address.
    pub const fn address(&self) -> CuAddress {
        self.address
    }

    /// Returns the owner's compressed public key, once revealed.
    pub fn pubkey(&self) -> Option<&[u8]> {
        self.pubkey.as_deref()
    }

    /// Reveals the owner's public key.
    ///
    /// Setting the same key again is a no-op. A different key, or one that does not hash to the
    /// address, is rejected.
    pub fn set_pubkey(&mut self, pubkey: &PublicKey) -> CuResult<()> {
        let bytes = pubkey.serialize().to_vec();

        match &self.pubkey {
            Some(existing) if *existing == bytes => Ok(()),
            Some(_) => Err(CuError::PubkeyAlreadySet(self.address)),
            None => {
                if CuAddress::from_pubkey(pubkey) != self.address {
                    return Err(CuError::PubkeyMismatch(self.address));
                }

                self.pubkey = Some(bytes);
                Ok(())
            }
        }
    }

    /// Returns the replay-protection nonce.
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Advances the replay-protection nonce.
    pub fn set_sequence(&mut self, sequence: u64) -> CuResult<()> {
        if sequence <= self.sequence {
            return Err(CuError::SequenceNotIncreasing {
                current: self.sequence,
                new: sequence,
            });
        }

        self.sequence = sequence;
        Ok(())
    }

    /// Returns the symbol of an operation unit, empty for user units.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Binds an operation unit to its symbol.
    pub fn set_symbol(&mut self, symbol: &str) -> CuResult<()> {
        if !self.is_operation() {
            return Err(CuError::NotOperation(self.address));
        }

        if symbol.is_empty() {
            return Err(CuError::EmptySymbol);
        }

        if !self.symbol.is_empty() {
            return Err(CuError::SymbolAlreadySet(self.address));
        }

        self.symbol = symbol.to_string();
        Ok(())
    }

    /// Returns the migration status of an operation unit.
    pub const fn migration_status(&self) -> MigrationStatus {
        self.migration_status
    }

    /// Sets the migration status.
    pub fn set_migration_status(&mut self, status: MigrationStatus) {
        self.migration_status = status;
    }

    /// Returns every asset slot.
    pub fn assets(&self) -> &[AssetInfo] {
        &self.assets
    }

    /// Returns the asset slot for `symbol` in `epoch`.
    pub fn asset(&self, symbol: &str, epoch: u64) -> Option<&AssetInfo> {
        self.assets
            .iter()
            .find(|a| a.symbol == symbol && a.epoch == epoch)
    }

    fn asset_mut(&mut self, symbol: &str, epoch: u64) -> &mut AssetInfo {
        let pos = match self
            .assets
            .iter()
            .position(|a| a.symbol == symbol && a.epoch == epoch)
        {
            Some(pos) => pos,
            None => {
                self.assets.push(AssetInfo::new(symbol, epoch));
                self.assets.len() - 1
            }
        };

        &mut self.assets[pos]
    }

    /// Returns the bound address for `symbol` in `epoch`.
    pub fn get_asset_address(&self, symbol: &str, epoch: u64) -> Option<&str> {
        self.asset(symbol, epoch)
            .map(|a| a.address.as_str())
            .filter(|a| !a.is_empty())
    }

    /// Returns a public key bound to any asset slot of `epoch`.
    ///
    /// All slots of one epoch share the key generated for this unit in that epoch.
    pub fn get_asset_pubkey(&self, epoch: u64) -> Option<&[u8]> {
        self.assets
            .iter()
            .filter(|a| a.epoch == epoch)
            .map(|a| a.pubkey.as_slice())
            .find(|pk| !pk.is_empty())
    }

    /// Binds `address` to the slot of `symbol` in `epoch`.
    ///
    /// Binding the same address again is a no-op. A different address is rejected.
    pub fn set_asset_address(&mut self, symbol: &str, address: &str, epoch: u64) -> CuResult<()> {
        let asset = self.asset_mut(symbol, epoch);

        if !asset.address.is_empty() && asset.address != address {
            return Err(CuError::AssetAddressAlreadySet {
                symbol: symbol.to_string(),
                epoch,
            });
        }

        asset.address = address.to_string();
        Ok(())
    }

    /// Binds `pubkey` to the slot of `symbol` in `epoch`.
    pub fn set_asset_pubkey(&mut self, symbol: &str, pubkey: &[u8], epoch: u64) -> CuResult<()> {
        let asset = self.asset_mut(symbol, epoch);

        if !asset.pubkey.is_empty() && asset.pubkey != pubkey {
            return Err(CuError::AssetPubkeyAlreadySet {
                symbol: symbol.to_string(),
                epoch,
            });
        }

        asset.pubkey = pubkey.to_vec();
        Ok(())
    }

    /// Sets the external-chain nonce of the slot of `symbol` in `epoch`.
    pub fn set_asset_nonce(&mut self, symbol: &str, nonce: u64, epoch: u64) {
        self.asset_mut(symbol, epoch).nonce = nonce;
    }

    /// Returns the available balance of `symbol`.
    pub fn coins(&self, symbol: &str) -> Amount {
        self.coins.get(symbol).copied().unwrap_or_default()
    }

    /// Returns the held balance of `symbol`.
    pub fn coins_hold(&self, symbol: &str) -> Amount {
        self.coins_hold.get(symbol).copied().unwrap_or_default()
    }

    /// Returns the gas spent in `symbol`.
    pub fn gas_used(&self, symbol: &str) -> Amount {
        self.gas_used.get(symbol).copied().unwrap_or_default()
    }

    /// Returns the gas refunded in `symbol`.
    pub fn gas_received(&self, symbol: &str) -> Amount {
        self.gas_received.get(symbol).copied().unwrap_or_default()
    }

    /// Increases the available balance.
    pub fn add_coins(&mut self, symbol: &str, amount: Amount) -> CuResult<()> {
        credit(&mut self.coins, symbol, amount)
    }

    /// Decreases the available balance.
    pub fn sub_coins(&mut self, symbol: &str, amount: Amount) -> CuResult<()> {
        let available = self.coins(symbol);
        if available < amount {
            return Err(CuError::InsufficientFunds {
                symbol: symbol.to_string(),
                available,
                required: amount,
            });
        }

        set_or_remove(&mut self.coins, symbol, available - amount);
        Ok(())
    }

    /// Increases the held balance.
    pub fn add_coins_hold(&mut self, symbol: &str, amount: Amount) -> CuResult<()> {
        credit(&mut self.coins_hold, symbol, amount)
    }

    /// Decreases the held balance.
    pub fn sub_coins_hold(&mut self, symbol: &str, amount: Amount) -> CuResult<()> {
        let held = self.coins_hold(symbol);
        if held < amount {
            return Err(CuError::InsufficientHold {
                symbol: symbol.to_string(),
                held,
                required: amount,
            });
        }

        set_or_remove(&mut self.coins_hold, symbol, held - amount);
        Ok(())
    }

    /// Records gas spent.
    pub fn add_gas_used(&mut self, symbol: &str, amount: Amount) -> CuResult<()> {
        credit(&mut self.gas_used, symbol, amount)
    }

    /// Records gas refunded.
    pub fn add_gas_received(&mut self, symbol: &str, amount: Amount) -> CuResult<()> {
        credit(&mut self.gas_received, symbol, amount)
    }
}

fn credit(map: &mut BTreeMap<String, Amount>, symbol: &str, amount: Amount) -> CuResult<()> {
    let current = map.get(symbol).copied().unwrap_or_default();
    let next = current
        .checked_add(amount)
        .ok_or_else(|| CuError::Overflow(symbol.to_string()))?;

    set_or_remove(map, symbol, next);
    Ok(())
}

// Zero entries are removed so that equal balances always encode to equal bytes.
fn set_or_remove(map: &mut BTreeMap<String, Amount>, symbol: &str, value: Amount) {
    if value == 0 {
        map.remove(symbol);
    } else {
        map.insert(symbol.to_string(), value);
    }
}
