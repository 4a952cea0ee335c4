//! Core market data types used across the trading system

use serde::{Deserialize, Serialize};

/// Price in cents
pub type Price = u64;

/// Volume in lots
pub type Volume = u64;

/// Client-assigned order identifier
pub type OrderId = u64;

/// Exchange snapshot sequence number
pub type SequenceNumber = u64;

/// Number of price levels reported per book side
pub const TOP_LEVEL_COUNT: usize = 5;

/// The two correlated instruments the strategy trades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    Future,
    Etf,
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instrument::Future => write!(f, "future"),
            Instrument::Etf => write!(f, "etf"),
        }
    }
}

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Time-in-force for an inserted order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifespan {
    /// Rest in the book until filled or cancelled
    GoodForDay,
    /// Fill immediately or cancel
    FillAndKill,
}

/// One side of a five-level book snapshot, best price first.
///
/// Sides with fewer than five levels carry zeros at the tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ladder {
    pub prices: [Price; TOP_LEVEL_COUNT],
    pub volumes: [Volume; TOP_LEVEL_COUNT],
}

impl Ladder {
    pub fn new(prices: [Price; TOP_LEVEL_COUNT], volumes: [Volume; TOP_LEVEL_COUNT]) -> Self {
        Ladder { prices, volumes }
    }

    /// Best (first) price level, zero when the side is empty
    pub fn best_price(&self) -> Price {
        self.prices[0]
    }

    /// Volume at the best price level
    pub fn best_volume(&self) -> Volume {
        self.volumes[0]
    }
}

/// A periodic order-book or trade-tick snapshot for one instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookUpdate {
    pub instrument: Instrument,
    pub sequence: SequenceNumber,
    pub asks: Ladder,
    pub bids: Ladder,
}
