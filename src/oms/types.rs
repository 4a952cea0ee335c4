//! Order tracking types

use crate::types::{OrderId, Price, SequenceNumber, Side, Volume};

/// Order state as tracked by the strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Submitted, no fills yet
    Pending,
    PartiallyFilled,
    Filled,
    /// Cancellation requested, confirmation outstanding
    CancelRequested,
    /// Cancellation confirmed
    Deleted,
}

/// A live order owned by the [`crate::oms::OrderManager`]
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub price: Price,
    /// Lots not yet traded
    pub remaining: Volume,
    /// Sequence number of the snapshot that motivated the order; drives
    /// stale-order expiry
    pub sequence: SequenceNumber,
    pub status: OrderStatus,
}

impl Order {
    pub fn new(
        id: OrderId,
        side: Side,
        price: Price,
        volume: Volume,
        sequence: SequenceNumber,
    ) -> Self {
        Order {
            id,
            side,
            price,
            remaining: volume,
            sequence,
            status: OrderStatus::Pending,
        }
    }

    /// Still eligible for fills
    pub fn is_live(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::Pending | OrderStatus::PartiallyFilled | OrderStatus::CancelRequested
        )
    }
}
