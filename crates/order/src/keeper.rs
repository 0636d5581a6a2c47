//! Persistence of orders and the processing index.

use custody_primitives::{
    codec::Codec,
    order::{OrderStatus, OrderType},
    types::OrderId,
};
use custody_store::{Context, Namespace};
use tracing::{debug, info, warn};

use crate::{
    errors::OrderResult,
    keys::{order_key, parse_process_key, process_key, process_prefix, ORDER_NAMESPACE},
    types::Order,
};

/// Reads and writes orders.
#[derive(Debug, Clone, Copy)]
pub struct OrderKeeper {
    ns: Namespace,
    codec: Codec,
}

impl OrderKeeper {
    /// Creates a keeper in the default namespace.
    pub const fn new(codec: Codec) -> Self {
        Self {
            ns: ORDER_NAMESPACE,
            codec,
        }
    }

    /// Stores a new order in `Begin` at the current block height and adds it to the processing
    /// index.
    ///
    /// Returns `None` if the initiator or ID is empty or an order with the same ID exists, of any
    /// type.
    pub fn new_order(&self, ctx: &mut Context<'_>, mut order: Order) -> OrderResult<Option<Order>> {
        if order.base.cu_address.is_empty() || order.id().is_empty() {
            warn!(order_id = %order.id(), "refusing to create order without initiator or id");
            return Ok(None);
        }

        if self.has_order(ctx, order.id())? {
            warn!(order_id = %order.id(), "order already exists");
            return Ok(None);
        }

        order.base.status = OrderStatus::Begin;
        order.base.height = ctx.block_height();

        ctx.set_value(self.ns, &self.codec, &order_key(order.id()), &order)?;
        ctx.set(self.ns, &process_key(order.order_type(), order.id()), Vec::new())?;

        info!(
            order_id = %order.id(),
            order_type = %order.order_type(),
            symbol = %order.base.symbol,
            "created order"
        );

        Ok(Some(order))
    }

    /// Persists `order`. A terminal order is dropped from the processing index.
    ///
    /// An order without an initiator is ignored.
    pub fn set_order(&self, ctx: &mut Context<'_>, order: &Order) -> OrderResult<()> {
        if order.base.cu_address.is_empty() {
            warn!(order_id = %order.id(), "ignoring order without initiator");
            return Ok(());
        }

        ctx.set_value(self.ns, &self.codec, &order_key(order.id()), order)?;

        if order.status().is_terminal() {
            ctx.delete(self.ns, &process_key(order.order_type(), order.id()))?;
        }

        debug!(order_id = %order.id(), status = %order.status(), "stored order");

        Ok(())
    }

    /// Gets, if present, the order with `id`.
    pub fn get_order(&self, ctx: &Context<'_>, id: &str) -> OrderResult<Option<Order>> {
        Ok(ctx.get_value(self.ns, &self.codec, &order_key(id))?)
    }

    /// Returns true if an order with `id` exists.
    pub fn has_order(&self, ctx: &Context<'_>, id: &str) -> OrderResult<bool> {
        Ok(ctx.has(self.ns, &order_key(id))?)
    }

    /// Returns the IDs of the processing orders of the given types, grouped by type in the order
    /// given and sorted by ID within a type.
    pub fn get_process_order_list_by_type(
        &self,
        ctx: &Context<'_>,
        types: &[OrderType],
    ) -> OrderResult<Vec<OrderId>> {
        let mut ids = Vec::new();

        for t in types {
            for (key, _) in ctx.scan(self.ns, &process_prefix(Some(*t)))? {
                let (_, id) = parse_process_key(&key)?;
                ids.push(id);
            }
        }

        Ok(ids)
    }

    /// Returns the IDs of every processing order, ordered by type then ID.
    pub fn get_process_order_list(&self, ctx: &Context<'_>) -> OrderResult<Vec<OrderId>> {
        ctx.scan(self.ns, &process_prefix(None))?
            .into_iter()
            .map(|(key, _)| parse_process_key(&key).map(|(_, id)| id))
            .collect()
    }

    /// Returns the processing orders of `order_type`.
    pub fn get_process_orders(
        &self,
        ctx: &Context<'_>,
        order_type: OrderType,
    ) -> OrderResult<Vec<Order>> {
        let mut orders = Vec::new();

        for id in self.get_process_order_list_by_type(ctx, &[order_type])? {
            match self.get_order(ctx, &id)? {
                Some(order) => orders.push(order),
                None => warn!(order_id = %id, "processing index points at a missing order"),
            }
        }

        Ok(orders)
    }
}
