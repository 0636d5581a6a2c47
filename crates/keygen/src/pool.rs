//! The wait-assign pool of pre-generated keys.

use std::collections::VecDeque;

use custody_primitives::{codec::Codec, types::OrderId};
use custody_store::{Context, Namespace};
use tracing::debug;

use crate::errors::KeyGenResult;

/// The namespace owned by the keygen protocol.
pub const KEYGEN_NAMESPACE: Namespace = Namespace::new(b"keygen/");

const WAIT_ASSIGN_KEY: &[u8] = b"waitAssignKeyGenOrders";

/// A FIFO of keygen orders whose key is ready but not yet assigned to a beneficiary.
///
/// The whole list is stored under a single key.
#[derive(Debug, Clone, Copy)]
pub struct WaitAssignPool {
    ns: Namespace,
    codec: Codec,
}

impl WaitAssignPool {
    /// Creates a pool in the keygen namespace.
    pub const fn new(codec: Codec) -> Self {
        Self {
            ns: KEYGEN_NAMESPACE,
            codec,
        }
    }

    /// Returns the pooled order IDs, oldest first.
    pub fn list(&self, ctx: &Context<'_>) -> KeyGenResult<VecDeque<OrderId>> {
        Ok(ctx
            .get_value(self.ns, &self.codec, WAIT_ASSIGN_KEY)?
            .unwrap_or_default())
    }

    /// Returns the number of pooled orders.
    pub fn len(&self, ctx: &Context<'_>) -> KeyGenResult<usize> {
        Ok(self.list(ctx)?.len())
    }

    /// Appends `id`.
    pub fn push(&self, ctx: &mut Context<'_>, id: OrderId) -> KeyGenResult<()> {
        let mut list = self.list(ctx)?;
        debug!(order_id = %id, pooled = list.len() + 1, "pooled keygen order");
        list.push_back(id);
        self.store(ctx, &list)
    }

    /// Removes and returns the oldest order ID.
    pub fn pop_front(&self, ctx: &mut Context<'_>) -> KeyGenResult<Option<OrderId>> {
        let mut list = self.list(ctx)?;
        let Some(id) = list.pop_front() else {
            return Ok(None);
        };

        self.store(ctx, &list)?;
        Ok(Some(id))
    }

    /// Empties the pool and returns its contents, oldest first.
    pub fn drain(&self, ctx: &mut Context<'_>) -> KeyGenResult<Vec<OrderId>> {
        let list = self.list(ctx)?;
        ctx.delete(self.ns, WAIT_ASSIGN_KEY)?;
        Ok(list.into())
    }

    fn store(&self, ctx: &mut Context<'_>, list: &VecDeque<OrderId>) -> KeyGenResult<()> {
        if list.is_empty() {
            ctx.delete(self.ns, WAIT_ASSIGN_KEY)?;
        } else {
            ctx.set_value(self.ns, &self.codec, WAIT_ASSIGN_KEY, list)?;
        }

        Ok(())
    }
}
