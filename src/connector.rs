//! Boundary to the exchange execution connector
//!
//! The strategy never owns the transport or the wire encoding; it issues
//! commands through this trait and receives callbacks on [`crate::ArbTrader`].
//! Every call here must already have passed the rate limiter.

use crate::types::{Lifespan, OrderId, Price, Side, Volume};

/// Outbound command surface of the execution connector
pub trait ExecutionConnector {
    /// Insert a limit order on the ETF
    fn insert_order(
        &mut self,
        id: OrderId,
        side: Side,
        price: Price,
        volume: Volume,
        lifespan: Lifespan,
    );

    /// Cancel a previously inserted order
    fn cancel_order(&mut self, id: OrderId);

    /// Insert a hedge order on the future
    fn insert_hedge_order(&mut self, id: OrderId, side: Side, price: Price, volume: Volume);
}
