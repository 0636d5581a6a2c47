//! Persistence of custodian units and their secondary indexes.

use custody_primitives::{
    codec::Codec,
    types::{CuAddress, CuType},
};
use custody_store::{Context, Namespace};
use tracing::{debug, info, warn};

use crate::{
    asset::MigrationStatus,
    errors::{CuError, CuResult},
    keys::{
        address_from_op_cu_key, cu_key, cu_prefix, ext_address_key, op_cu_key, op_cu_prefix,
        CU_NAMESPACE,
    },
    unit::CustodianUnit,
};

/// Reads and writes custodian units.
#[derive(Debug, Clone, Copy)]
pub struct CuKeeper {
    ns: Namespace,
    codec: Codec,
}

impl CuKeeper {
    /// Creates a keeper in the default namespace.
    pub const fn new(codec: Codec) -> Self {
        Self::with_namespace(CU_NAMESPACE, codec)
    }

    /// Creates a keeper in `ns`.
    pub const fn with_namespace(ns: Namespace, codec: Codec) -> Self {
        Self { ns, codec }
    }

    /// Gets, if present, the unit at `addr`.
    pub fn get_cu(&self, ctx: &Context<'_>, addr: &CuAddress) -> CuResult<Option<CustodianUnit>> {
        Ok(ctx.get_value(self.ns, &self.codec, &cu_key(addr))?)
    }

    /// Returns the unit at `addr`.
    ///
    /// A missing user unit is constructed but not persisted. A missing unit of any other type is
    /// `None`: operation units must be created explicitly.
    pub fn get_or_new_cu(
        &self,
        ctx: &Context<'_>,
        cu_type: CuType,
        addr: &CuAddress,
    ) -> CuResult<Option<CustodianUnit>> {
        if let Some(cu) = self.get_cu(ctx, addr)? {
            return Ok(Some(cu));
        }

        match cu_type {
            CuType::User => Ok(Some(CustodianUnit::new(CuType::User, *addr))),
            CuType::Operation => Ok(None),
        }
    }

    /// Creates and persists an operation unit for `symbol` at `addr`.
    ///
    /// Returns `None` if the symbol or address is empty or the address is already in use.
    pub fn new_op_cu_with_address(
        &self,
        ctx: &mut Context<'_>,
        symbol: &str,
        addr: &CuAddress,
    ) -> CuResult<Option<CustodianUnit>> {
        if symbol.is_empty() || addr.is_empty() {
            warn!(%symbol, %addr, "refusing to create operation unit with empty identity");
            return Ok(None);
        }

        if ctx.has(self.ns, &cu_key(addr))? {
            warn!(%symbol, %addr, "address is already in use");
            return Ok(None);
        }

        let cu = CustodianUnit::new_op(symbol, *addr)?;
        self.set_cu(ctx, &cu)?;

        info!(%symbol, %addr, "created operation unit");

        Ok(Some(cu))
    }

    /// Persists `cu` and, for operation units, its entry in the per-symbol index.
    pub fn set_cu(&self, ctx: &mut Context<'_>, cu: &CustodianUnit) -> CuResult<()> {
        let addr = cu.address();

        if cu.is_operation() {
            if cu.symbol().is_empty() || addr.is_empty() {
                return Err(CuError::Fault(format!(
                    "operation unit {addr} must have a symbol and an address"
                )));
            }

            ctx.set(self.ns, &op_cu_key(cu.symbol(), &addr), Vec::new())?;
        }

        ctx.set_value(self.ns, &self.codec, &cu_key(&addr), cu)?;

        Ok(())
    }

    /// Removes the unit at `addr` together with its index entries.
    pub fn remove_cu(&self, ctx: &mut Context<'_>, addr: &CuAddress) -> CuResult<()> {
        let Some(cu) = self.get_cu(ctx, addr)? else {
            return Ok(());
        };

        if cu.is_operation() {
            ctx.delete(self.ns, &op_cu_key(cu.symbol(), addr))?;
        }
        ctx.delete(self.ns, &cu_key(addr))?;

        info!(%addr, cu_type = %cu.cu_type(), "removed custodian unit");

        Ok(())
    }

    /// Returns the operation units of `symbol`, or all of them if `symbol` is empty, sorted by
    /// symbol then address.
    pub fn get_op_cus(&self, ctx: &Context<'_>, symbol: &str) -> CuResult<Vec<CustodianUnit>> {
        let entries = ctx.scan(self.ns, &op_cu_prefix(symbol))?;
        debug!(%symbol, count = entries.len(), "scanned operation units");

        let mut cus = Vec::with_capacity(entries.len());
        for (key, _) in entries {
            let addr = address_from_op_cu_key(&key)
                .ok_or_else(|| CuError::Fault("malformed operation unit index key".to_string()))?;
            let cu = self.get_cu(ctx, &addr)?.ok_or_else(|| {
                CuError::Fault(format!("operation unit index points at missing unit {addr}"))
            })?;
            cus.push(cu);
        }

        Ok(cus)
    }

    /// Returns every persisted unit in address order.
    pub fn get_all_cus(&self, ctx: &Context<'_>) -> CuResult<Vec<CustodianUnit>> {
        ctx.scan(self.ns, &cu_prefix())?
            .into_iter()
            .map(|(_, bytes)| {
                self.codec
                    .decode(&bytes)
                    .map_err(|e| CuError::Store(e.into()))
            })
            .collect()
    }

    /// Records that `ext_address` on `chain` belongs to `addr`.
    ///
    /// Rebinding to the same unit is a no-op; binding to a different unit is rejected.
    pub fn set_ext_address_with_cu(
        &self,
        ctx: &mut Context<'_>,
        chain: &str,
        ext_address: &str,
        addr: &CuAddress,
    ) -> CuResult<()> {
        if let Some(owner) = self.get_cu_from_ext_address(ctx, chain, ext_address)? {
            if owner != *addr {
                return Err(CuError::ExtAddressTaken {
                    chain: chain.to_string(),
                    address: ext_address.to_string(),
                    owner,
                });
            }

            return Ok(());
        }

        ctx.set_value(
            self.ns,
            &self.codec,
            &ext_address_key(chain, ext_address),
            addr,
        )?;

        Ok(())
    }

    /// Returns the unit that owns `ext_address` on `chain`.
    pub fn get_cu_from_ext_address(
        &self,
        ctx: &Context<'_>,
        chain: &str,
        ext_address: &str,
    ) -> CuResult<Option<CuAddress>> {
        Ok(ctx.get_value(self.ns, &self.codec, &ext_address_key(chain, ext_address))?)
    }

    /// Marks every operation unit as needing a new key. Returns the number of units touched.
    pub fn begin_op_cu_migration(&self, ctx: &mut Context<'_>) -> CuResult<usize> {
        let cus = self.get_op_cus(ctx, "")?;
        let count = cus.len();

        for mut cu in cus {
            cu.set_migration_status(MigrationStatus::Begin);
            self.set_cu(ctx, &cu)?;
        }

        info!(count, "operation units entered migration");

        Ok(count)
    }
}
