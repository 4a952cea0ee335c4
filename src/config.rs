//! Strategy configuration
//!
//! All policy constants live here. Defaults reproduce the tuned production
//! values; a JSON file can override any subset of them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Policy constants for the arbitrage strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Base order size in lots; quoted size scales up from this with edge
    pub lot_size: u64,
    /// Hard cap on absolute net position
    pub position_limit: i64,
    /// Exchange tick size in cents
    pub tick_size: u64,
    /// Lowest price the exchange accepts
    pub minimum_bid: u64,
    /// Highest price the exchange accepts
    pub maximum_ask: u64,

    // === Message rate limit ===
    /// Trailing window the exchange enforces its quota over, in milliseconds
    pub window_ms: u64,
    /// Messages allowed per window
    pub message_limit: usize,
    /// Slots held back for hedge and cancel traffic when approving new orders
    pub reserved_messages: usize,

    // === Order lifecycle ===
    /// Cap on simultaneously outstanding orders
    pub max_outstanding: usize,
    /// Orders older than this many sequence generations are cancelled
    pub order_lifespan_seqs: u64,

    // === Pricing ===
    /// Stop accumulating book levels into the weighted mid past this volume
    pub weight_volume_cap: u64,
    /// Aggressiveness adjustment subtracted from the far touch, in cents
    pub price_adjust: u64,
    /// Minimum theoretical hedge edge required to quote, in cents
    pub min_edge: u64,
    /// Top-of-book volume above which a one-tick spread is still crossed,
    /// accepting the exchange fee
    pub fee_take_min_volume: u64,

    // === Hedging ===
    /// Samples in the future-mid moving average
    pub hedge_window: usize,
    /// Force a full hedge once an exposure episode is older than this
    pub hedge_timeout_ms: u64,
    /// Unhedged quantity treated as neutral; the episode clock starts when
    /// exposure leaves this band
    pub neutral_band: i64,
    /// A partial hedge covers ceil(|unhedged| / ratio) lots
    pub partial_hedge_ratio: i64,
    /// Trend younger than this tolerates one adverse observation
    pub trend_tier_fast_ms: u64,
    /// Trend younger than this (but past the fast tier) tolerates two
    pub trend_tier_slow_ms: u64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            lot_size: 8,
            position_limit: 100,
            tick_size: 100,
            minimum_bid: 1,
            maximum_ask: 2_147_483_647,

            window_ms: 1050,
            message_limit: 48,
            reserved_messages: 3,

            max_outstanding: 10,
            order_lifespan_seqs: 5,

            weight_volume_cap: 300,
            price_adjust: 600,
            min_edge: 100,
            fee_take_min_volume: 6,

            hedge_window: 3,
            hedge_timeout_ms: 58_000,
            neutral_band: 10,
            partial_hedge_ratio: 10,
            trend_tier_fast_ms: 2_000,
            trend_tier_slow_ms: 5_000,
        }
    }
}

impl StrategyConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let config: StrategyConfig =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;
        Ok(config)
    }

    /// Lowest accepted price rounded up to a tick; sell-side hedges quote
    /// here to guarantee a fill
    pub fn min_bid_nearest_tick(&self) -> u64 {
        (self.minimum_bid + self.tick_size) / self.tick_size * self.tick_size
    }

    /// Highest accepted price rounded down to a tick; buy-side hedges quote
    /// here to guarantee a fill
    pub fn max_ask_nearest_tick(&self) -> u64 {
        self.maximum_ask / self.tick_size * self.tick_size
    }
}
