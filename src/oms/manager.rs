//! Order lifecycle tracking, trading limits, and wash-trade avoidance

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::common::RateLimiter;
use crate::config::StrategyConfig;
use crate::connector::ExecutionConnector;
use crate::oms::types::{Order, OrderStatus};
use crate::types::{OrderId, Price, SequenceNumber, Side, Volume};

/// Tracks every live order and gates new submissions.
///
/// Approval for a new order requires room under the outstanding-order cap,
/// room under the position limit net of already-working same-direction
/// volume, and message headroom in the rate limiter. Before either check, a
/// resting opposite-side order quoted at the identical price is cancelled:
/// matching our own bid and ask at one price earns nothing and burns quota.
pub struct OrderManager {
    orders: HashMap<OrderId, Order>,
    /// Orders with a cancellation requested but not yet confirmed
    cancel_requested: HashSet<OrderId>,
    outstanding: usize,
    max_outstanding: usize,
    position_limit: i64,
}

impl OrderManager {
    pub fn new(config: &StrategyConfig) -> Self {
        OrderManager {
            orders: HashMap::new(),
            cancel_requested: HashSet::new(),
            outstanding: 0,
            max_outstanding: config.max_outstanding,
            position_limit: config.position_limit,
        }
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    /// Total lots still promised by tracked orders on one side
    pub fn working_volume(&self, side: Side) -> Volume {
        self.orders
            .values()
            .filter(|order| order.side == side)
            .map(|order| order.remaining)
            .sum()
    }

    /// Approve a prospective buy of `count` lots at `price`, cancelling any
    /// wash-trade conflict first
    pub fn can_buy(
        &mut self,
        count: Volume,
        price: Price,
        position: i64,
        limiter: &mut RateLimiter,
        connector: &mut dyn ExecutionConnector,
    ) -> bool {
        self.cancel_wash_orders(Side::Sell, price, limiter, connector);
        let working = self.working_volume(Side::Buy) as i64;
        self.outstanding < self.max_outstanding
            && position + working + count as i64 <= self.position_limit
            && limiter.has_headroom()
            && count > 0
            && count <= 2 * self.position_limit as u64
    }

    /// Approve a prospective sell of `count` lots at `price`
    pub fn can_sell(
        &mut self,
        count: Volume,
        price: Price,
        position: i64,
        limiter: &mut RateLimiter,
        connector: &mut dyn ExecutionConnector,
    ) -> bool {
        self.cancel_wash_orders(Side::Buy, price, limiter, connector);
        let working = self.working_volume(Side::Sell) as i64;
        self.outstanding < self.max_outstanding
            && position - working - (count as i64) >= -self.position_limit
            && limiter.has_headroom()
            && count > 0
            && count <= 2 * self.position_limit as u64
    }

    /// Track a freshly submitted order
    pub fn record_order(&mut self, order: Order) {
        self.outstanding += 1;
        self.orders.insert(order.id, order);
    }

    /// Register a fill against a tracked order; returns its side
    pub fn on_fill(&mut self, id: OrderId, volume: Volume) -> Option<Side> {
        let order = self.orders.get_mut(&id)?;
        order.remaining = order.remaining.saturating_sub(volume);
        if order.remaining == 0 {
            order.status = OrderStatus::Filled;
        } else if order.status == OrderStatus::Pending {
            order.status = OrderStatus::PartiallyFilled;
        }
        Some(order.side)
    }

    /// Status callback: zero remaining volume means the order is complete
    /// (filled out or cancellation confirmed) and leaves all tracking
    pub fn on_status(&mut self, id: OrderId, fill_volume: Volume, remaining: Volume, fees: i64) {
        debug!(order_id = id, fill_volume, remaining, fees, "order status");
        if remaining == 0 {
            if self.orders.remove(&id).is_some() {
                self.outstanding -= 1;
            }
            self.cancel_requested.remove(&id);
        } else if fill_volume > 0 {
            if let Some(order) = self.orders.get_mut(&id) {
                if order.status == OrderStatus::Pending {
                    order.status = OrderStatus::PartiallyFilled;
                }
            }
        }
    }

    /// Exchange reported an error for a specific order: treat it as
    /// live-but-broken and request cancellation, exactly once
    pub fn on_error(
        &mut self,
        id: OrderId,
        limiter: &mut RateLimiter,
        connector: &mut dyn ExecutionConnector,
    ) {
        if !self.orders.contains_key(&id) || self.cancel_requested.contains(&id) {
            return;
        }
        limiter.await_capacity();
        connector.cancel_order(id);
        limiter.record_event();
        self.mark_cancel_requested(id);
        info!(order_id = id, "requested cancel for errored order");
    }

    /// Cancel orders older than `lifespan` sequence generations so stale
    /// quotes neither fill at bad prices nor occupy outstanding slots.
    /// Stops as soon as the message window runs out of capacity.
    pub fn expire_stale(
        &mut self,
        sequence: SequenceNumber,
        lifespan: u64,
        limiter: &mut RateLimiter,
        connector: &mut dyn ExecutionConnector,
    ) {
        let expired: Vec<OrderId> = self
            .orders
            .values()
            .filter(|order| {
                sequence.saturating_sub(order.sequence) > lifespan
                    && !self.cancel_requested.contains(&order.id)
            })
            .map(|order| order.id)
            .collect();

        for id in expired {
            if !limiter.has_capacity() {
                break;
            }
            connector.cancel_order(id);
            limiter.record_event();
            self.mark_cancel_requested(id);
            info!(order_id = id, sequence, "cancelled stale order");
        }
    }

    /// Cancel resting `side` orders quoted exactly at `price`.
    ///
    /// Candidate ids are snapshotted before any cancellation so the order
    /// map is never mutated mid-scan.
    fn cancel_wash_orders(
        &mut self,
        side: Side,
        price: Price,
        limiter: &mut RateLimiter,
        connector: &mut dyn ExecutionConnector,
    ) {
        let candidates: Vec<OrderId> = self
            .orders
            .values()
            .filter(|order| {
                order.side == side
                    && order.price == price
                    && !self.cancel_requested.contains(&order.id)
            })
            .map(|order| order.id)
            .collect();

        for id in candidates {
            limiter.await_capacity();
            connector.cancel_order(id);
            limiter.record_event();
            self.mark_cancel_requested(id);
            info!(order_id = id, price, "cancelled wash-trade conflict");
        }
    }

    fn mark_cancel_requested(&mut self, id: OrderId) {
        if let Some(order) = self.orders.get_mut(&id) {
            order.status = OrderStatus::CancelRequested;
        }
        self.cancel_requested.insert(id);
    }
}
