//! ETF/future arbitrage autotrader
//!
//! Decision core of a market-making/arbitrage strategy that trades an ETF
//! against a correlated future. Periodic book snapshots for the two
//! instruments are paired by sequence number; when the price discrepancy
//! between them clears fees, the strategy quotes the ETF and hedges the
//! resulting exposure on the future, all under a hard cap on outgoing
//! message rate.
//!
//! The exchange transport is abstracted behind [`ExecutionConnector`]; the
//! strategy only issues commands through it and receives callbacks on
//! [`ArbTrader`].
//!
//! ```no_run
//! use etf_arb::{ArbTrader, StrategyConfig};
//! use etf_arb::replay::LoggingConnector;
//!
//! let mut trader = ArbTrader::new(StrategyConfig::default(), LoggingConnector);
//! // feed callbacks from the connector:
//! // trader.on_order_book(&update);
//! // trader.on_order_filled(id, price, volume);
//! ```

pub mod book;
pub mod common;
pub mod config;
pub mod connector;
pub mod hedging;
pub mod oms;
pub mod pricing;
pub mod replay;
pub mod trader;
pub mod types;

pub use config::StrategyConfig;
pub use connector::ExecutionConnector;
pub use trader::ArbTrader;
pub use types::*;
